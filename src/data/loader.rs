//! CSV Data Loader Module
//! Reads the List PO extract and the DimPTJ table with Polars, validates their
//! headers and left-joins them into a typed `MergedTable`.

use crate::data::records::{MergedRecord, MergedTable, OrderRecord, UnitRecord};
use polars::prelude::*;
use rayon::prelude::*;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Column names in the order extract (after header trimming).
pub mod order_columns {
    pub const PO: &str = "PO";
    pub const VENDOR: &str = "Vendor";
    pub const UNIT_CODE: &str = "PTJ";
    pub const AMOUNT: &str = "Total_Amount";
    pub const DATE: &str = "PO_Date";

    pub const REQUIRED: [&str; 5] = [PO, VENDOR, UNIT_CODE, AMOUNT, DATE];
}

/// Column names in the PTJ dimension table (after header trimming).
pub mod unit_columns {
    pub const UNIT_CODE: &str = "PTJ NO";
    pub const GROUP_CODE: &str = "PTJ";
    pub const UNIT_NAME: &str = "BAHAGIAN/UNIT";

    pub const REQUIRED: [&str; 3] = [UNIT_CODE, GROUP_CODE, UNIT_NAME];
}

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("{table} is missing required column '{column}'")]
    Schema {
        table: &'static str,
        column: &'static str,
    },
    #[error("PTJ NO '{code}' appears more than once with different values")]
    DuplicateUnitCode { code: String },
}

/// A CSV file read entirely as text columns.
struct CsvTable {
    label: &'static str,
    path: PathBuf,
    df: DataFrame,
}

impl CsvTable {
    /// Read a CSV file, tolerating a UTF-8 byte-order mark.
    fn read(path: &Path, label: &'static str) -> Result<Self, LoaderError> {
        let mut bytes = std::fs::read(path).map_err(|source| LoaderError::SourceRead {
            path: path.to_path_buf(),
            source,
        })?;
        if bytes.starts_with(UTF8_BOM) {
            bytes.drain(..UTF8_BOM.len());
        }

        // No schema inference: every column stays a string so coercion is ours
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()
            .map_err(|source| LoaderError::Csv {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(table = label, rows = df.height(), columns = df.width(), "Read CSV");

        Ok(Self {
            label,
            path: path.to_path_buf(),
            df,
        })
    }

    fn find_column(&self, name: &str) -> Option<&Column> {
        self.df
            .get_columns()
            .iter()
            .find(|c| c.name().trim() == name)
    }

    /// Fail on the first required column that is absent.
    fn require(&self, columns: &[&'static str]) -> Result<(), LoaderError> {
        match columns.iter().find(|c| self.find_column(c).is_none()) {
            Some(column) => Err(LoaderError::Schema {
                table: self.label,
                column: *column,
            }),
            None => Ok(()),
        }
    }

    /// Get a column as owned strings, nulls mapped to empty.
    fn text_column(&self, name: &'static str) -> Result<Vec<String>, LoaderError> {
        let column = self.find_column(name).ok_or(LoaderError::Schema {
            table: self.label,
            column: name,
        })?;
        let as_text = column
            .cast(&DataType::String)
            .map_err(|source| self.csv_error(source))?;
        let values = as_text
            .str()
            .map_err(|source| self.csv_error(source))?
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect();
        Ok(values)
    }

    fn csv_error(&self, source: PolarsError) -> LoaderError {
        LoaderError::Csv {
            path: self.path.clone(),
            source,
        }
    }

    fn height(&self) -> usize {
        self.df.height()
    }
}

/// Loads and merges the purchase-order extract with the PTJ dimension.
pub struct DataLoader;

impl DataLoader {
    /// Load both files and left-join orders onto units.
    ///
    /// Every order row yields exactly one merged row, in input order.
    pub fn load(order_path: &Path, unit_path: &Path) -> Result<MergedTable, LoaderError> {
        let order_table = CsvTable::read(order_path, "List PO")?;
        let unit_table = CsvTable::read(unit_path, "DimPTJ")?;

        order_table.require(&order_columns::REQUIRED)?;
        unit_table.require(&unit_columns::REQUIRED)?;

        let orders = Self::read_orders(&order_table)?;
        let units = Self::index_units(Self::read_units(&unit_table)?)?;

        let table = Self::merge(&orders, &units);

        let undefined_dates = table.rows.iter().filter(|r| r.date.is_none()).count();
        debug!(undefined_dates, "Dates left undefined");

        info!(
            rows = table.len(),
            units = units.len(),
            unmatched = table.unmatched_count(),
            "Loaded merged PO table"
        );

        Ok(table)
    }

    /// Left join: unmatched orders keep empty unit fields.
    pub fn merge(orders: &[OrderRecord], units: &HashMap<String, UnitRecord>) -> MergedTable {
        let rows = orders
            .par_iter()
            .map(|order| MergedRecord::merge(order, units.get(&order.unit_code)))
            .collect();
        MergedTable::new(rows)
    }

    /// Index units by `PTJ NO`.
    ///
    /// Exact duplicate rows collapse into one; conflicting duplicates are an
    /// error so the join can never fan out. Rows with an empty code are
    /// skipped since an empty order code never matches.
    pub fn index_units(
        units: Vec<UnitRecord>,
    ) -> Result<HashMap<String, UnitRecord>, LoaderError> {
        let mut index: HashMap<String, UnitRecord> = HashMap::with_capacity(units.len());

        for unit in units {
            if unit.unit_code.is_empty() {
                continue;
            }
            match index.entry(unit.unit_code.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(unit);
                }
                Entry::Occupied(existing) => {
                    if existing.get() != &unit {
                        return Err(LoaderError::DuplicateUnitCode {
                            code: unit.unit_code,
                        });
                    }
                    warn!(code = %unit.unit_code, "Collapsing duplicate DimPTJ row");
                }
            }
        }

        Ok(index)
    }

    fn read_orders(table: &CsvTable) -> Result<Vec<OrderRecord>, LoaderError> {
        let po = table.text_column(order_columns::PO)?;
        let vendor = table.text_column(order_columns::VENDOR)?;
        let unit_code = table.text_column(order_columns::UNIT_CODE)?;
        let amount = table.text_column(order_columns::AMOUNT)?;
        let date = table.text_column(order_columns::DATE)?;

        let mut orders = Vec::with_capacity(table.height());
        for ((((po, vendor), unit_code), raw_amount), raw_date) in
            po.into_iter().zip(vendor).zip(unit_code).zip(amount).zip(date)
        {
            orders.push(OrderRecord {
                po,
                vendor,
                unit_code,
                raw_amount,
                raw_date,
            });
        }
        Ok(orders)
    }

    fn read_units(table: &CsvTable) -> Result<Vec<UnitRecord>, LoaderError> {
        let unit_code = table.text_column(unit_columns::UNIT_CODE)?;
        let group_code = table.text_column(unit_columns::GROUP_CODE)?;
        let unit_name = table.text_column(unit_columns::UNIT_NAME)?;

        Ok(unit_code
            .into_iter()
            .zip(group_code)
            .zip(unit_name)
            .map(|((unit_code, group_code), unit_name)| UnitRecord {
                unit_code,
                group_code,
                unit_name,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const UNITS: &str = "\
PTJ NO,PTJ,BAHAGIAN/UNIT
PL01,PL,Logistics
SD01,SD,Sains Data
XX01,XX,Luar Senarai
";

    fn write(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn fixture(orders: &str, units: &str) -> (TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let order_path = write(&dir, "List_PO_EXTRACT.csv", orders.as_bytes());
        let unit_path = write(&dir, "DimPTJ.csv", units.as_bytes());
        (dir, order_path, unit_path)
    }

    #[test]
    fn test_load_joins_and_coerces() {
        let orders = "\
PO,Vendor,PTJ,Total_Amount,PO_Date
PO100,Vendor A,PL01,\"1,000\",15.03.2024
PO101,Vendor B,SD01,N/A,01.06.2023
PO102,Vendor C,ZZ99,250.50,31.02.2024
";
        let (_dir, order_path, unit_path) = fixture(orders, UNITS);
        let table = DataLoader::load(&order_path, &unit_path).unwrap();

        assert_eq!(table.len(), 3);

        let first = &table.rows[0];
        assert_eq!(first.po, "PO100");
        assert_eq!(first.amount, 1000.0);
        assert_eq!(first.year(), Some(2024));
        assert_eq!(first.group_code, "PL");
        assert_eq!(first.unit_name, "Logistics");

        let second = &table.rows[1];
        assert_eq!(second.amount, 0.0);
        assert_eq!(second.date, NaiveDate::from_ymd_opt(2023, 6, 1));

        let third = &table.rows[2];
        assert!(!third.matched);
        assert_eq!(third.group_code, "");
        assert_eq!(third.unit_name, "");
        assert_eq!(third.amount, 250.5);
        assert_eq!(third.date, None);
        assert_eq!(table.unmatched_count(), 1);
    }

    #[test]
    fn test_load_tolerates_bom_and_padded_headers() {
        let mut orders = UTF8_BOM.to_vec();
        orders.extend_from_slice(
            b" PO ,Vendor , PTJ,Total_Amount ,PO_Date\nPO100,Vendor A,PL01,10,15.03.2024\n",
        );
        let mut units = UTF8_BOM.to_vec();
        units.extend_from_slice(b"PTJ NO , PTJ ,BAHAGIAN/UNIT \nPL01,PL,Logistics\n");

        let dir = tempfile::tempdir().unwrap();
        let order_path = write(&dir, "orders.csv", &orders);
        let unit_path = write(&dir, "units.csv", &units);

        let table = DataLoader::load(&order_path, &unit_path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].po, "PO100");
        assert_eq!(table.rows[0].unit_name, "Logistics");
    }

    #[test]
    fn test_load_missing_file_is_source_error() {
        let (dir, order_path, _) = fixture("PO,Vendor,PTJ,Total_Amount,PO_Date\n", UNITS);
        let missing = dir.path().join("nope.csv");

        let err = DataLoader::load(&order_path, &missing).unwrap_err();
        assert!(matches!(err, LoaderError::SourceRead { .. }));
    }

    #[test]
    fn test_load_missing_join_key_is_schema_error() {
        let orders = "PO,Vendor,PTJ,Total_Amount,PO_Date\nPO1,V,PL01,1,01.01.2024\n";
        let units = "CODE,PTJ,BAHAGIAN/UNIT\nPL01,PL,Logistics\n";
        let (_dir, order_path, unit_path) = fixture(orders, units);

        let err = DataLoader::load(&order_path, &unit_path).unwrap_err();
        assert!(matches!(
            err,
            LoaderError::Schema {
                table: "DimPTJ",
                column: "PTJ NO"
            }
        ));
    }

    #[test]
    fn test_load_missing_order_column_is_schema_error() {
        let orders = "PO,Vendor,Total_Amount,PO_Date\nPO1,V,1,01.01.2024\n";
        let (_dir, order_path, unit_path) = fixture(orders, UNITS);

        let err = DataLoader::load(&order_path, &unit_path).unwrap_err();
        assert!(matches!(
            err,
            LoaderError::Schema {
                table: "List PO",
                column: "PTJ"
            }
        ));
    }

    #[test]
    fn test_load_is_idempotent() {
        let orders = "\
PO,Vendor,PTJ,Total_Amount,PO_Date
PO100,Vendor A,PL01,5,15.03.2024
PO100,Vendor A,PL01,7,15.03.2024
";
        let (_dir, order_path, unit_path) = fixture(orders, UNITS);

        let first = DataLoader::load(&order_path, &unit_path).unwrap();
        let second = DataLoader::load(&order_path, &unit_path).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_empty_unit_code_never_matches() {
        let orders = "PO,Vendor,PTJ,Total_Amount,PO_Date\nPO1,V,,1,01.01.2024\n";
        let units = "PTJ NO,PTJ,BAHAGIAN/UNIT\n,PL,Orphan\n";
        let (_dir, order_path, unit_path) = fixture(orders, units);

        let table = DataLoader::load(&order_path, &unit_path).unwrap();
        assert_eq!(table.len(), 1);
        assert!(!table.rows[0].matched);
    }

    #[test]
    fn test_worked_example_lands_in_2024_pl_bucket() {
        use crate::report::{GroupCount, ReportProjector, ALLOWED_GROUP_CODES};

        let orders = "\
PO,Vendor,PTJ,Total_Amount,PO_Date
PO100,Vendor A,PL01,\"1,000\",15.03.2024
PO101,Vendor B,PL01,N/A,02.04.2024
PO102,Vendor C,PL01,40,31.02.2024
";
        let (_dir, order_path, unit_path) = fixture(orders, UNITS);
        let table = DataLoader::load(&order_path, &unit_path).unwrap();
        let view = ReportProjector::project(&table, &ALLOWED_GROUP_CODES, &[]);

        assert_eq!(view.summary.order_count, 3);
        assert_eq!(view.summary.total_amount, 1040.0);
        assert_eq!(view.summary.total_amount_display(), "RM 1,040.00");
        assert_eq!(view.unit_options, vec!["Logistics"]);

        let y2024 = view.year_charts.iter().find(|c| c.year == 2024).unwrap();
        assert_eq!(
            y2024.groups,
            vec![GroupCount {
                group_code: "PL".to_string(),
                order_count: 2
            }]
        );
        assert_eq!(view.detail_rows[0].amount, "RM 1,000.00");
        assert_eq!(view.detail_rows[0].date, "15.03.2024");
        assert_eq!(view.detail_rows[2].date, "");
    }

    fn unit(code: &str, group: &str, name: &str) -> UnitRecord {
        UnitRecord {
            unit_code: code.to_string(),
            group_code: group.to_string(),
            unit_name: name.to_string(),
        }
    }

    #[test]
    fn test_index_units_collapses_identical_duplicates() {
        let index = DataLoader::index_units(vec![
            unit("PL01", "PL", "Logistics"),
            unit("PL01", "PL", "Logistics"),
        ])
        .unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_index_units_rejects_conflicting_duplicates() {
        let err = DataLoader::index_units(vec![
            unit("PL01", "PL", "Logistics"),
            unit("PL01", "SD", "Something Else"),
        ])
        .unwrap_err();
        assert!(matches!(err, LoaderError::DuplicateUnitCode { code } if code == "PL01"));
    }

    #[test]
    fn test_merge_preserves_row_count_and_order() {
        let units = DataLoader::index_units(vec![unit("PL01", "PL", "Logistics")]).unwrap();
        let orders: Vec<OrderRecord> = (0..50)
            .map(|i| OrderRecord {
                po: format!("PO{i}"),
                unit_code: if i % 2 == 0 { "PL01" } else { "NONE" }.to_string(),
                ..Default::default()
            })
            .collect();

        let table = DataLoader::merge(&orders, &units);
        assert_eq!(table.len(), orders.len());
        for (order, row) in orders.iter().zip(&table.rows) {
            assert_eq!(order.po, row.po);
        }
        assert_eq!(table.unmatched_count(), 25);
    }
}
