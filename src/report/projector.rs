//! Report Projector Module
//! Filters the merged PO table and derives everything the dashboard shows:
//! summary cards, per-year PTJ charts and the detail table.

use crate::data::{MergedRecord, MergedTable};
use crate::report::format::{format_date, format_ringgit};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

/// PTJ group codes shown by the dashboard. Applied before any user filter.
pub const ALLOWED_GROUP_CODES: [&str; 6] = ["PL", "SD", "TW", "BT", "MR", "SI"];

/// Years with a fixed "Total PO by PTJ" chart.
pub const REPORT_YEARS: [i32; 3] = [2023, 2024, 2025];

/// Values for the two summary cards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    /// Distinct PO numbers.
    pub order_count: usize,
    pub total_amount: f64,
}

impl Summary {
    pub fn total_amount_display(&self) -> String {
        format_ringgit(self.total_amount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub group_code: String,
    pub order_count: usize,
}

/// Distinct PO count per group code for one year, largest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearChart {
    pub year: i32,
    pub groups: Vec<GroupCount>,
}

/// One display row of the detail table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    /// 1-based position in the filtered table.
    pub index: usize,
    pub po: String,
    pub vendor: String,
    pub date: String,
    pub amount: String,
}

/// Everything derived from one filter selection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewResult {
    /// Sorted distinct unit names available for selection.
    pub unit_options: Vec<String>,
    pub summary: Summary,
    pub year_charts: Vec<YearChart>,
    pub detail_rows: Vec<DetailRow>,
}

/// Stateless filter/aggregate pass over a merged table.
pub struct ReportProjector;

impl ReportProjector {
    /// Build the full view for a unit-name selection.
    ///
    /// An empty selection means "no further restriction", not "nothing".
    /// Year charts ignore the selection and only honour the group allow-list.
    pub fn project(
        table: &MergedTable,
        allowed_group_codes: &[&str],
        selected_unit_names: &[String],
    ) -> ViewResult {
        let allowed = Self::restrict_groups(table, allowed_group_codes);
        let unit_options = Self::unit_options(&allowed);
        let selected = Self::restrict_units(&allowed, selected_unit_names);

        let summary = Self::summarize(&selected);
        let year_charts = REPORT_YEARS
            .par_iter()
            .map(|&year| Self::year_chart(&allowed, year))
            .collect();
        let detail_rows = Self::detail_rows(&selected);

        debug!(
            allowed = allowed.len(),
            selected = selected.len(),
            orders = summary.order_count,
            "Projected report view"
        );

        ViewResult {
            unit_options,
            summary,
            year_charts,
            detail_rows,
        }
    }

    /// Rows whose group code is in the allow-list, in table order.
    pub fn restrict_groups<'a>(
        table: &'a MergedTable,
        allowed_group_codes: &[&str],
    ) -> Vec<&'a MergedRecord> {
        table
            .rows
            .iter()
            .filter(|r| allowed_group_codes.contains(&r.group_code.as_str()))
            .collect()
    }

    pub fn unit_options(rows: &[&MergedRecord]) -> Vec<String> {
        rows.iter()
            .filter(|r| !r.unit_name.is_empty())
            .map(|r| r.unit_name.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn restrict_units<'a>(
        rows: &[&'a MergedRecord],
        selected_unit_names: &[String],
    ) -> Vec<&'a MergedRecord> {
        if selected_unit_names.is_empty() {
            return rows.to_vec();
        }
        let selected: HashSet<&str> = selected_unit_names.iter().map(String::as_str).collect();
        rows.iter()
            .copied()
            .filter(|r| selected.contains(r.unit_name.as_str()))
            .collect()
    }

    /// Distinct PO count ignores rows without a PO number; their amounts
    /// still count towards the total.
    pub fn summarize(rows: &[&MergedRecord]) -> Summary {
        let order_count = rows
            .iter()
            .filter(|r| !r.po.is_empty())
            .map(|r| r.po.as_str())
            .collect::<HashSet<_>>()
            .len();
        let total_amount = rows.iter().map(|r| r.amount).sum();
        Summary {
            order_count,
            total_amount,
        }
    }

    /// Distinct POs per group for one year; ties keep group-code order.
    pub fn year_chart(rows: &[&MergedRecord], year: i32) -> YearChart {
        let mut per_group: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
        for row in rows
            .iter()
            .filter(|r| !r.po.is_empty() && r.year() == Some(year))
        {
            per_group
                .entry(row.group_code.as_str())
                .or_default()
                .insert(row.po.as_str());
        }

        let mut groups: Vec<GroupCount> = per_group
            .into_iter()
            .map(|(group_code, orders)| GroupCount {
                group_code: group_code.to_string(),
                order_count: orders.len(),
            })
            .collect();
        groups.sort_by(|a, b| b.order_count.cmp(&a.order_count));

        YearChart { year, groups }
    }

    pub fn detail_rows(rows: &[&MergedRecord]) -> Vec<DetailRow> {
        rows.iter()
            .enumerate()
            .map(|(i, r)| DetailRow {
                index: i + 1,
                po: r.po.clone(),
                vendor: r.vendor.clone(),
                date: format_date(r.date),
                amount: format_ringgit(r.amount),
            })
            .collect()
    }
}
