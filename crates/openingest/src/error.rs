//! Error types for OpenIngest

use std::path::PathBuf;
use thiserror::Error;

/// Errors that terminate an ingestion call
#[derive(Debug, Error)]
pub enum IngestError {
    /// URL is missing
    #[error("Missing required parameter: url")]
    MissingUrl,

    /// URL has invalid scheme
    #[error("Invalid URL: must start with http:// or https://")]
    InvalidUrlScheme,

    /// Repository reference could not be parsed from a URL
    #[error("Invalid repository URL: {0}")]
    InvalidRepositoryUrl(String),

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    ConnectError(#[source] reqwest::Error),

    /// Other request error
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// Repository does not exist or is not visible with the given credentials
    #[error("Repository {owner}/{name} not found")]
    RepositoryNotFound { owner: String, name: String },

    /// Repository host rejected the credentials
    #[error("Authentication failed: check the access token")]
    AuthenticationFailed,

    /// Repository host refused the request (usually the anonymous rate limit)
    #[error("GitHub API rate limit exceeded or access forbidden")]
    RateLimited,

    /// Local file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Local file could not be read
    #[error("Failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Structured content could not be parsed
    #[error("Failed to parse {format}: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    /// Document format needs an extraction capability that is not available
    #[error("{format} support is not available: {hint}")]
    MissingCapability {
        format: &'static str,
        hint: &'static str,
    },

    /// Document extraction capability failed
    #[error("{format} extraction failed: {message}")]
    Extraction {
        format: &'static str,
        message: String,
    },

    /// Connection string could not be understood
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// Query or connection failure reported by the database
    #[error("Database error: {0}")]
    Database(String),

    /// Ingestor-specific error
    #[error("Ingestor error: {0}")]
    IngestorError(String),
}

impl IngestError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_connect() {
            IngestError::ConnectError(err)
        } else {
            IngestError::RequestError(err.to_string())
        }
    }

    /// Create an error from a sqlx error
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(e) => IngestError::InvalidConnectionString(e.to_string()),
            other => IngestError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            IngestError::MissingUrl.to_string(),
            "Missing required parameter: url"
        );
        assert_eq!(
            IngestError::InvalidUrlScheme.to_string(),
            "Invalid URL: must start with http:// or https://"
        );
        assert_eq!(
            IngestError::FileNotFound(PathBuf::from("data/missing.csv")).to_string(),
            "File not found: data/missing.csv"
        );
        assert_eq!(
            IngestError::RepositoryNotFound {
                owner: "octo".to_string(),
                name: "nothing".to_string()
            }
            .to_string(),
            "Repository octo/nothing not found"
        );
        assert_eq!(
            IngestError::HttpStatus {
                url: "https://example.com/".to_string(),
                status: 503
            }
            .to_string(),
            "HTTP 503 from https://example.com/"
        );
    }

    #[test]
    fn test_missing_capability_message_is_actionable() {
        let err = IngestError::MissingCapability {
            format: "PDF",
            hint: "rebuild openingest with the `pdf` feature enabled",
        };
        let msg = err.to_string();
        assert!(msg.starts_with("PDF support is not available"));
        assert!(msg.contains("`pdf` feature"));
    }
}
