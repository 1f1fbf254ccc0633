//! Number and date conventions used by Argentine publishers
//! (`.` groups thousands, `,` separates decimals, dates are `dd/mm/yyyy`).

use crate::utils::error::{IndicesError, Result};
use chrono::NaiveDate;

/// Parses `"1.234,56"` as `1234.56`.
pub fn parse_locale_number(raw: &str) -> Result<f64> {
    let normalized: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    let value: f64 = normalized.parse().map_err(|_| {
        IndicesError::extraction(format!("malformed numeric value: {:?}", raw))
    })?;

    if !value.is_finite() {
        return Err(IndicesError::extraction(format!(
            "malformed numeric value: {:?}",
            raw
        )));
    }

    Ok(value)
}

/// Parses a day-first, slash separated date such as `31/07/2025`.
pub fn parse_slash_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y")
        .map_err(|e| IndicesError::extraction(format!("malformed date {:?}: {}", raw, e)))
}
