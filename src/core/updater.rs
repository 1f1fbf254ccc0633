use crate::app::extractors;
use crate::config::{IndexDefinition, PublishTarget};
use crate::core::series_store::SeriesStore;
use crate::domain::model::{PublishRequest, RunReport, UpdateOutcome};
use crate::domain::ports::{DocumentSource, Publisher, Storage};
use crate::utils::error::Result;
use chrono::NaiveDate;

/// Runs index updates: fetch → extract → load → merge → save → publish.
///
/// Nothing is written unless the merge added dates, and nothing is published
/// unless something was written. Any failure stops the run at that step; a
/// publish failure leaves the saved local file ahead of the remote one, and
/// later runs over the same source data find nothing new to publish.
pub struct IndexUpdater<D: DocumentSource, S: Storage + Clone, P: Publisher> {
    source: D,
    storage: S,
    publisher: Option<(P, PublishTarget)>,
}

impl<D: DocumentSource, S: Storage + Clone, P: Publisher> IndexUpdater<D, S, P> {
    pub fn new(source: D, storage: S) -> Self {
        Self {
            source,
            storage,
            publisher: None,
        }
    }

    pub fn with_publisher(mut self, publisher: P, target: PublishTarget) -> Self {
        self.publisher = Some((publisher, target));
        self
    }

    /// Updates each index in order, stopping at the first failure.
    pub async fn run(
        &self,
        definitions: &[IndexDefinition],
        today: NaiveDate,
    ) -> Result<Vec<RunReport>> {
        let mut reports = Vec::with_capacity(definitions.len());
        for definition in definitions {
            reports.push(self.run_index(definition, today).await?);
        }
        Ok(reports)
    }

    pub async fn run_index(&self, definition: &IndexDefinition, today: NaiveDate) -> Result<RunReport> {
        tracing::info!("🚀 Updating {} from {}", definition.kind, definition.source_url);

        let document = self.source.fetch(&definition.source_url).await?;
        let extractor = extractors::for_index(definition.kind, &definition.row_label);
        let observation = extractor.extract(&document)?;

        let store = SeriesStore::new(self.storage.clone(), definition.path.clone());
        let mut series = store.load().await?;
        tracing::info!("📚 {} has {} entries", store.path(), series.len());

        let outcome = definition.strategy.apply(&mut series, &observation, today);

        let receipt = match &outcome {
            UpdateOutcome::Unchanged => {
                tracing::info!(
                    "⏸️ No new data for {} (effective {}, today {})",
                    definition.kind,
                    observation.effective_date,
                    today
                );
                None
            }
            UpdateOutcome::Changed { inserted } => {
                if let (Some(first), Some(last)) = (inserted.first(), inserted.last()) {
                    tracing::info!(
                        "➕ Added {} entries to {} ({} .. {})",
                        inserted.len(),
                        definition.kind,
                        first,
                        last
                    );
                }

                let content = store.save(&series).await?;
                tracing::info!("💾 Saved {}", store.path());

                match &self.publisher {
                    Some((publisher, target)) => {
                        let request = PublishRequest {
                            path: definition.path.clone(),
                            content,
                            repo: target.repo.clone(),
                            branch: target.branch.clone(),
                            message: definition.commit_message.clone(),
                        };
                        Some(publisher.publish(&request).await?)
                    }
                    None => {
                        tracing::info!("Publishing disabled, {} kept locally", store.path());
                        None
                    }
                }
            }
        };

        Ok(RunReport {
            index: definition.kind,
            observation,
            outcome,
            entries: series.len(),
            receipt,
        })
    }
}
