pub mod activa;
pub mod cer;

pub use activa::ActivaExtractor;
pub use cer::TableRowExtractor;

use crate::domain::model::IndexKind;
use crate::domain::ports::RateExtractor;

/// Extractor for an index's source page.
pub fn for_index(kind: IndexKind, row_label: &str) -> Box<dyn RateExtractor> {
    match kind {
        IndexKind::Activa => Box::new(ActivaExtractor::new()),
        IndexKind::Cer => Box::new(TableRowExtractor::new(row_label)),
    }
}
