// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod github;
pub mod http_source;

pub use github::GitHubPublisher;
pub use http_source::HttpDocumentSource;
