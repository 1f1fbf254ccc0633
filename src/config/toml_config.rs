use crate::domain::model::IndexKind;
use crate::utils::error::{IndicesError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional file-based overrides. Every field may be omitted; anything left
/// unset falls back to the command line and then to the built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub data_dir: Option<String>,
    pub publish: Option<PublishSection>,
    pub http: Option<HttpSection>,
    pub sources: Option<SourcesSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublishSection {
    pub enabled: Option<bool>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSection {
    pub timeout_seconds: Option<u64>,
    pub accept_invalid_certs: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourcesSection {
    pub activa: Option<SourceSection>,
    pub cer: Option<SourceSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSection {
    pub url: Option<String>,
    pub path: Option<String>,
    pub commit_message: Option<String>,
    pub row_label: Option<String>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(IndicesError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| IndicesError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value. Unknown variables are left as is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| IndicesError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn source(&self, kind: IndexKind) -> Option<&SourceSection> {
        let sources = self.sources.as_ref()?;
        match kind {
            IndexKind::Activa => sources.activa.as_ref(),
            IndexKind::Cer => sources.cer.as_ref(),
        }
    }
}
