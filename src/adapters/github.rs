use crate::domain::model::{PublishReceipt, PublishRequest};
use crate::domain::ports::Publisher;
use crate::utils::error::{IndicesError, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Environment variables searched for the publish token, in order.
pub const TOKEN_ENV_VARS: [&str; 2] = ["PAT", "GITHUB_TOKEN"];

/// Publishes files through the GitHub contents API.
///
/// Each publish reads the file's current blob SHA and sends the new content
/// keyed to it, so a concurrent writer makes the update fail with
/// [`IndicesError::ConflictError`] instead of being overwritten.
pub struct GitHubPublisher {
    client: Client,
    api_base: Url,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
}

#[derive(Debug, Serialize)]
struct UpdateContentsBody<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    branch: &'a str,
}

#[derive(Debug, Deserialize)]
struct UpdateContentsResponse {
    content: Option<ContentsResponse>,
}

impl GitHubPublisher {
    /// A missing token is only reported when a publish is attempted.
    pub fn new(api_base: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let invalid = |reason: &str| IndicesError::InvalidConfigValueError {
            field: "publish.api_base".to_string(),
            value: api_base.to_string(),
            reason: reason.to_string(),
        };
        let api_base = Url::parse(api_base).map_err(|e| invalid(&e.to_string()))?;
        if api_base.cannot_be_a_base() {
            return Err(invalid("not a hierarchical URL"));
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!("finfocus-indices/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_base,
            token,
        })
    }

    pub fn token_from_env() -> Option<String> {
        TOKEN_ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
    }

    /// `{api_base}/repos/{owner}/{name}/contents/{path}`, each segment
    /// percent-encoded.
    fn contents_url(&self, repo: &str, path: &str) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| IndicesError::InvalidConfigValueError {
                field: "publish.api_base".to_string(),
                value: self.api_base.to_string(),
                reason: "not a hierarchical URL".to_string(),
            })?
            .pop_if_empty()
            .push("repos")
            .extend(repo.split('/'))
            .push("contents")
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn current_sha(&self, request: &PublishRequest, token: &str) -> Result<Option<String>> {
        let url = self.contents_url(&request.repo, &request.path)?;
        tracing::debug!("Fetching current version of {} at {}", request.path, request.branch);

        let response = self
            .authorized(self.client.get(url.clone()), token)
            .query(&[("ref", request.branch.as_str())])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::info!("🆕 {} does not exist on {} yet, it will be created", request.path, request.branch);
            return Ok(None);
        }

        let body: ContentsResponse =
            check_status(response, url.as_str(), &request.path)?.json().await?;
        Ok(Some(body.sha))
    }
}

fn check_status(response: Response, url: &str, path: &str) -> Result<Response> {
    let status = response.status();
    match status {
        s if s.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(IndicesError::AuthError {
            url: url.to_string(),
            status: status.as_u16(),
        }),
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => Err(IndicesError::ConflictError {
            path: path.to_string(),
            status: status.as_u16(),
        }),
        _ => Err(IndicesError::UnexpectedStatusError {
            url: url.to_string(),
            status: status.as_u16(),
        }),
    }
}

#[async_trait]
impl Publisher for GitHubPublisher {
    async fn publish(&self, request: &PublishRequest) -> Result<PublishReceipt> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| IndicesError::MissingConfigError {
                field: TOKEN_ENV_VARS.join(" or "),
            })?;

        let previous_sha = self.current_sha(request, token).await?;

        let url = self.contents_url(&request.repo, &request.path)?;
        let body = UpdateContentsBody {
            message: &request.message,
            content: base64::engine::general_purpose::STANDARD.encode(&request.content),
            sha: previous_sha.as_deref(),
            branch: &request.branch,
        };

        tracing::debug!(
            "Uploading {} ({} bytes) to {}@{}",
            request.path,
            request.content.len(),
            request.repo,
            request.branch
        );
        let response = self
            .authorized(self.client.put(url.clone()), token)
            .json(&body)
            .send()
            .await?;

        let updated: UpdateContentsResponse =
            check_status(response, url.as_str(), &request.path)?.json().await?;

        tracing::info!("✅ Published {} to {}@{}", request.path, request.repo, request.branch);

        Ok(PublishReceipt {
            previous_sha,
            new_sha: updated.content.map(|c| c.sha),
        })
    }
}
