use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndicesError {
    #[error("Extraction failed: {message}")]
    ExtractionError { message: String },

    #[error("Corrupt state in {path}: {message}")]
    CorruptStateError { path: String, message: String },

    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatusError { url: String, status: u16 },

    #[error("Authorization rejected by {url} (HTTP {status})")]
    AuthError { url: String, status: u16 },

    #[error("Remote version conflict on {path} (HTTP {status})")]
    ConflictError { path: String, status: u16 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Source,
    State,
    Remote,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IndicesError {
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::ExtractionError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ExtractionError { .. } => ErrorCategory::Source,
            Self::CorruptStateError { .. } | Self::SerializationError(_) => ErrorCategory::State,
            Self::NetworkError(_)
            | Self::UnexpectedStatusError { .. }
            | Self::AuthError { .. }
            | Self::ConflictError { .. } => ErrorCategory::Remote,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Source | ErrorCategory::State => ErrorSeverity::High,
            ErrorCategory::Remote => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a run that ended with this error. Always non-zero.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low | ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ExtractionError { message } => {
                format!("Could not read the published rate from the source page: {}", message)
            }
            Self::CorruptStateError { path, .. } => {
                format!("The series file {} is not a valid date -> number mapping", path)
            }
            Self::NetworkError(_) | Self::UnexpectedStatusError { .. } => {
                "A remote service could not be reached or answered unexpectedly".to_string()
            }
            Self::AuthError { .. } => "The publish token was rejected".to_string(),
            Self::ConflictError { path, .. } => {
                format!("{} changed remotely while this run was publishing it", path)
            }
            Self::MissingConfigError { field } => format!("{} is not set", field),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ExtractionError { .. } => {
                "Check whether the source page layout changed; no local state was modified"
            }
            Self::CorruptStateError { .. } | Self::SerializationError(_) => {
                "Restore the series file from the remote repository and run again"
            }
            Self::NetworkError(_) | Self::UnexpectedStatusError { .. } => {
                "Run again later; if publishing failed, restore the series file from the remote repository first, since an unchanged run publishes nothing"
            }
            Self::AuthError { .. } => {
                "Renew the token in PAT (or GITHUB_TOKEN), restore the series file from the remote repository and run again"
            }
            Self::ConflictError { .. } => {
                "Another run published first; pull the remote file and run again"
            }
            Self::MissingConfigError { .. } => {
                "Export PAT (or GITHUB_TOKEN), or pass --no-publish"
            }
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the command line arguments or the TOML configuration file"
            }
            Self::IoError(_) => "Check that the data directory exists and is writable",
        }
    }
}

pub type Result<T> = std::result::Result<T, IndicesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_exits_non_zero() {
        let errors = vec![
            IndicesError::extraction("pattern not found"),
            IndicesError::CorruptStateError {
                path: "indices/cer.json".to_string(),
                message: "expected a map".to_string(),
            },
            IndicesError::AuthError {
                url: "https://api.github.com".to_string(),
                status: 401,
            },
            IndicesError::ConflictError {
                path: "indices/cer.json".to_string(),
                status: 409,
            },
            IndicesError::MissingConfigError {
                field: "PAT".to_string(),
            },
        ];

        for error in errors {
            assert_ne!(error.exit_code(), 0, "{error}");
        }
    }

    #[test]
    fn test_remote_failures_are_retryable_severity() {
        let error = IndicesError::ConflictError {
            path: "indices/activa.json".to_string(),
            status: 409,
        };
        assert_eq!(error.category(), ErrorCategory::Remote);
        assert_eq!(error.severity(), ErrorSeverity::Medium);
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_publish_failures_point_to_restoring_the_file() {
        let errors = [
            IndicesError::UnexpectedStatusError {
                url: "https://api.github.com/repos/o/r/contents/indices/cer.json".to_string(),
                status: 503,
            },
            IndicesError::AuthError {
                url: "https://api.github.com".to_string(),
                status: 401,
            },
        ];

        for error in errors {
            let hint = error.recovery_suggestion();
            assert!(hint.contains("restore the series file"), "{hint}");
            assert!(!hint.contains("published next run"), "{hint}");
        }
    }
}
