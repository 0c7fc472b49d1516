//! Typed Records Module
//! Row types for the order extract, the PTJ dimension and the merged table.

use chrono::{Datelike, NaiveDate};

/// Date format used by `PO_Date` in the extract (e.g. `15.03.2024`).
pub const PO_DATE_FORMAT: &str = "%d.%m.%Y";

/// One row of the purchase-order extract, as read (all text).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderRecord {
    pub po: String,
    pub vendor: String,
    pub unit_code: String,
    pub raw_amount: String,
    pub raw_date: String,
}

/// One row of the PTJ dimension table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnitRecord {
    /// `PTJ NO`, the join key.
    pub unit_code: String,
    /// `PTJ`, the coarse group code used by the allow-list.
    pub group_code: String,
    /// `BAHAGIAN/UNIT`, the human-readable unit name.
    pub unit_name: String,
}

/// An order row combined with its (possibly absent) unit record.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub po: String,
    pub vendor: String,
    pub unit_code: String,
    /// Empty when the order's unit code had no match.
    pub group_code: String,
    /// Empty when the order's unit code had no match.
    pub unit_name: String,
    /// Coerced `Total_Amount`; zero when unparseable.
    pub amount: f64,
    /// Parsed `PO_Date`; `None` when undefined.
    pub date: Option<NaiveDate>,
    /// Whether a dimension record was found for this row.
    pub matched: bool,
}

impl MergedRecord {
    /// Left-join a single order onto its unit record.
    pub fn merge(order: &OrderRecord, unit: Option<&UnitRecord>) -> Self {
        Self {
            po: order.po.clone(),
            vendor: order.vendor.clone(),
            unit_code: order.unit_code.clone(),
            group_code: unit.map(|u| u.group_code.clone()).unwrap_or_default(),
            unit_name: unit.map(|u| u.unit_name.clone()).unwrap_or_default(),
            amount: coerce_amount(&order.raw_amount).unwrap_or(0.0),
            date: coerce_date(&order.raw_date),
            matched: unit.is_some(),
        }
    }

    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }
}

/// The joined, typed result of a load. Rows keep the order-extract order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergedTable {
    pub rows: Vec<MergedRecord>,
}

impl MergedTable {
    pub fn new(rows: Vec<MergedRecord>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn unmatched_count(&self) -> usize {
        self.rows.iter().filter(|r| !r.matched).count()
    }
}

/// Parse an amount cell, tolerating thousands separators and padding.
///
/// Returns `None` for anything that is not a finite number; callers decide
/// the fallback.
pub fn coerce_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a `DD.MM.YYYY` date cell. Impossible calendar dates are rejected.
pub fn coerce_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), PO_DATE_FORMAT).ok()
}
