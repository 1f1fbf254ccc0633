pub mod backfill;
pub mod series_store;
pub mod updater;

pub use crate::domain::model::{IndexSeries, RateObservation, UpdateOutcome};
pub use crate::domain::ports::{DocumentSource, Publisher, RateExtractor, Storage};
pub use crate::utils::error::Result;
