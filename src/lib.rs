pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{GitHubPublisher, HttpDocumentSource};
pub use config::{cli::LocalStorage, IndexDefinition, IndexSelection, PublishTarget, RunConfig};
pub use crate::core::{backfill::BackfillStrategy, series_store::SeriesStore, updater::IndexUpdater};
pub use domain::model::{IndexKind, IndexSeries, RateObservation, RunReport, UpdateOutcome};
pub use utils::error::{IndicesError, Result};
