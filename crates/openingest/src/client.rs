//! Entry points for OpenIngest
//!
//! This module provides the option set shared by every ingestor and the
//! free functions that run one ingestion with the default registry.
//! The per-source logic lives in the [`ingestors`](crate::ingestors) module.

use crate::error::IngestError;
use crate::ingestors::IngestorRegistry;
use crate::types::{Document, SourceDescriptor};
use url::Url;

/// Default GitHub REST API root
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Hosts treated as repository hosting when no override is configured
pub const DEFAULT_REPOSITORY_HOSTS: &[&str] = &["github.com", "www.github.com"];

/// Ingestion options that can be configured via [`IngesterBuilder`](crate::IngesterBuilder)
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Custom User-Agent
    pub user_agent: Option<String>,
    /// Access token for the repository host
    pub github_token: Option<String>,
    /// Override for the GitHub API root
    pub github_api_base: Option<String>,
    /// Hosts whose URLs are ingested as repositories; empty means the defaults
    pub repository_hosts: Vec<String>,
    /// Repository file extensions to keep (without the dot); empty keeps all
    pub include_extensions: Vec<String>,
}

impl IngestOptions {
    /// API root without a trailing slash
    pub fn github_api_base(&self) -> &str {
        self.github_api_base
            .as_deref()
            .unwrap_or(DEFAULT_GITHUB_API)
            .trim_end_matches('/')
    }

    /// Returns true if the URL points at a repository host
    pub fn is_repository_url(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        if self.repository_hosts.is_empty() {
            DEFAULT_REPOSITORY_HOSTS
                .iter()
                .any(|h| host.eq_ignore_ascii_case(h))
        } else {
            self.repository_hosts
                .iter()
                .any(|h| host.eq_ignore_ascii_case(h))
        }
    }

    /// Returns true if a repository file with this path should be ingested
    pub fn includes_path(&self, path: &str) -> bool {
        if self.include_extensions.is_empty() {
            return true;
        }
        let Some((_, ext)) = path.rsplit_once('.') else {
            return false;
        };
        self.include_extensions
            .iter()
            .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}

/// Ingest a source and return the canonical document
///
/// Uses the default ingestor registry with all built-in ingestors.
/// For custom options, use [`ingest_with_options`].
pub async fn ingest(source: SourceDescriptor) -> Result<Document, IngestError> {
    ingest_with_options(source, IngestOptions::default()).await
}

/// Ingest a source with custom options
///
/// Uses the default ingestor registry with all built-in ingestors.
/// For custom capability configuration, use [`IngestorRegistry`] directly.
pub async fn ingest_with_options(
    source: SourceDescriptor,
    options: IngestOptions,
) -> Result<Document, IngestError> {
    let registry = IngestorRegistry::with_defaults();
    registry.ingest(&source, &options).await
}
