use crate::domain::model::{PublishReceipt, PublishRequest, RateObservation};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Fetches a source page as text.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Turns a fetched page into exactly one observation. Pure: no I/O.
pub trait RateExtractor: Send + Sync {
    fn extract(&self, document: &str) -> Result<RateObservation>;
}

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, request: &PublishRequest) -> Result<PublishReceipt>;
}
