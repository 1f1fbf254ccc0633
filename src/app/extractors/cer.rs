use crate::domain::model::RateObservation;
use crate::domain::ports::RateExtractor;
use crate::utils::error::{IndicesError, Result};
use crate::utils::html::HtmlDocument;
use crate::utils::locale::{parse_locale_number, parse_slash_date};

pub const DEFAULT_ROW_LABEL: &str = "CER";

/// Reads BCRA's "Principales Variables" table: the first row whose first cell
/// mentions `row_label` (case-insensitive) gives the date in the second cell
/// and the value in the third.
pub struct TableRowExtractor {
    row_label: String,
}

impl TableRowExtractor {
    pub fn new(row_label: impl Into<String>) -> Self {
        Self {
            row_label: row_label.into().to_uppercase(),
        }
    }
}

impl Default for TableRowExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_LABEL)
    }
}

impl RateExtractor for TableRowExtractor {
    fn extract(&self, document: &str) -> Result<RateObservation> {
        let rows = HtmlDocument::parse(document).first_table_rows()?;

        let row = rows
            .iter()
            .find(|cols| cols.len() >= 3 && cols[0].to_uppercase().contains(&self.row_label))
            .ok_or_else(|| {
                IndicesError::extraction(format!("pattern not found: no {} row", self.row_label))
            })?;

        let effective_date = parse_slash_date(&row[1])?;
        let value = parse_locale_number(&row[2])?;

        tracing::info!("📊 {} {} -> {}", self.row_label, effective_date, value);

        Ok(RateObservation {
            effective_date,
            rate: value,
        })
    }
}
