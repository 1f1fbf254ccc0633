use crate::domain::ports::DocumentSource;
use crate::utils::error::{IndicesError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Fetches source pages over HTTP(S) with a bounded timeout.
pub struct HttpDocumentSource {
    client: Client,
}

impl HttpDocumentSource {
    /// `accept_invalid_certs` turns off certificate validation for the source
    /// sites. Operator opt-in only.
    pub fn new(timeout: Duration, accept_invalid_certs: bool) -> Result<Self> {
        if accept_invalid_certs {
            tracing::warn!("⚠️ TLS certificate validation is disabled for source pages");
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .user_agent(concat!("finfocus-indices/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentSource for HttpDocumentSource {
    async fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!("Fetching source page: {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::debug!("Source response status: {}", status);

        if !status.is_success() {
            return Err(IndicesError::UnexpectedStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start();
        let page = server.mock(|when, then| {
            when.method(GET).path("/Principales_variables.asp");
            then.status(200)
                .header("Content-Type", "text/html; charset=utf-8")
                .body("<table><tr><td>CER</td></tr></table>");
        });

        let source = HttpDocumentSource::new(Duration::from_secs(5), false).unwrap();
        let body = source
            .fetch(&server.url("/Principales_variables.asp"))
            .await
            .unwrap();

        page.assert();
        assert!(body.contains("CER"));
    }

    #[tokio::test]
    async fn test_fetch_fails_on_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/down");
            then.status(503);
        });

        let source = HttpDocumentSource::new(Duration::from_secs(5), false).unwrap();
        let result = source.fetch(&server.url("/down")).await;

        assert!(matches!(
            result,
            Err(IndicesError::UnexpectedStatusError { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).delay(Duration::from_millis(1500)).body("late");
        });

        let source = HttpDocumentSource::new(Duration::from_millis(200), false).unwrap();
        let result = source.fetch(&server.url("/slow")).await;

        assert!(matches!(result, Err(IndicesError::NetworkError(e)) if e.is_timeout()));
    }
}
