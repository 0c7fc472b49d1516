//! Display formatting for amounts and dates.

use crate::data::PO_DATE_FORMAT;
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString as _};

/// Prefix for ringgit amounts.
pub const CURRENCY_PREFIX: &str = "RM ";

/// Format with thousands separators and two decimals (`1,234.50`).
///
/// Always uses the en locale ('.' as decimal mark) regardless of the host.
pub fn format_amount(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as i64;
    let sign = if amount < 0.0 && cents != 0 { "-" } else { "" };
    format!(
        "{}{}.{:02}",
        sign,
        (cents / 100).to_formatted_string(&Locale::en),
        cents % 100
    )
}

/// `RM 1,234.50`
pub fn format_ringgit(amount: f64) -> String {
    format!("{}{}", CURRENCY_PREFIX, format_amount(amount))
}

/// `DD.MM.YYYY`, or empty for an undefined date.
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(PO_DATE_FORMAT).to_string())
        .unwrap_or_default()
}
