use crate::utils::error::{IndicesError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> IndicesError {
    IndicesError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(field_name, url_str, format!("Invalid URL format: {}", e))),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

/// `owner/name`, both parts non-empty and without whitespace.
pub fn validate_repo_name(field_name: &str, repo: &str) -> Result<()> {
    let mut parts = repo.split('/');
    let valid = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(owner), Some(name), None)
            if !owner.is_empty()
                && !name.is_empty()
                && !repo.chars().any(char::is_whitespace)
    );

    if valid {
        Ok(())
    } else {
        Err(invalid(field_name, repo, "Repository must be written as owner/name"))
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("sources.cer.url", "https://www.bcra.gob.ar").is_ok());
        assert!(validate_url("sources.cer.url", "http://localhost:8080/bna").is_ok());
        assert!(validate_url("sources.cer.url", "").is_err());
        assert!(validate_url("sources.cer.url", "invalid-url").is_err());
        assert!(validate_url("sources.cer.url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_repo_name() {
        assert!(validate_repo_name("publish.repo", "owner/indices").is_ok());
        assert!(validate_repo_name("publish.repo", "owner").is_err());
        assert!(validate_repo_name("publish.repo", "/indices").is_err());
        assert!(validate_repo_name("publish.repo", "owner/indices/extra").is_err());
        assert!(validate_repo_name("publish.repo", "my org/indices").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("timeout_seconds", 30u64, 1, 300).is_ok());
        assert!(validate_range("timeout_seconds", 0u64, 1, 300).is_err());
        assert!(validate_range("timeout_seconds", 301u64, 1, 300).is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("sources.activa.path", "indices/activa.json").is_ok());
        assert!(validate_path("sources.activa.path", " ").is_err());
        assert!(validate_path("sources.activa.path", "bad\0path").is_err());
    }
}
