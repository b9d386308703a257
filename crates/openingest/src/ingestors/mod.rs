//! Ingestor system for source-specific extraction
//!
//! Design: Each ingestor handles specific source descriptors with custom logic.
//! IngestorRegistry dispatches to the first matching ingestor.

mod database;
mod file;
mod github_repo;
mod web;

pub use database::DatabaseIngestor;
pub use file::{FileIngestor, FileKind};
pub use github_repo::GitHubRepoIngestor;
pub use web::WebIngestor;

use crate::client::IngestOptions;
use crate::error::IngestError;
use crate::types::{Document, SourceDescriptor};
use async_trait::async_trait;
use tracing::{debug, error, Instrument};

/// Trait for source-specific ingestors
///
/// Implement this trait to add a new kind of source. Each ingestor declares
/// which descriptors it can handle via `matches()` and performs the
/// extraction via `ingest()`.
#[async_trait]
pub trait Ingestor: Send + Sync {
    /// Unique identifier for this ingestor (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Returns true if this ingestor can handle the given source
    ///
    /// Called by the registry to determine which ingestor to use.
    /// More specific ingestors should be registered before generic ones.
    fn matches(&self, source: &SourceDescriptor, options: &IngestOptions) -> bool;

    /// Extract the source into a canonical document
    ///
    /// Called only if `matches()` returned true.
    async fn ingest(
        &self,
        source: &SourceDescriptor,
        options: &IngestOptions,
    ) -> Result<Document, IngestError>;
}

/// Registry of ingestors that dispatches to the appropriate handler
///
/// Maintains an ordered list of ingestors. When ingesting a source, iterates
/// through ingestors and uses the first one that matches.
pub struct IngestorRegistry {
    ingestors: Vec<Box<dyn Ingestor>>,
}

impl Default for IngestorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IngestorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            ingestors: Vec::new(),
        }
    }

    /// Create a registry with default ingestors pre-registered
    ///
    /// Includes (in order of priority):
    /// 1. GitHubRepoIngestor - repositories and repository-host URLs
    /// 2. WebIngestor - all other HTTP/HTTPS URLs
    /// 3. FileIngestor - local files, with the compiled-in capabilities
    /// 4. DatabaseIngestor - SQL queries
    pub fn with_defaults() -> Self {
        Self::with_file_ingestor(FileIngestor::new())
    }

    /// Default registry using a custom-configured file ingestor
    pub fn with_file_ingestor(file: FileIngestor) -> Self {
        let mut registry = Self::new();
        // Repository hosts must win over the generic web ingestor
        registry.register(Box::new(GitHubRepoIngestor::new()));
        registry.register(Box::new(WebIngestor::new()));
        registry.register(Box::new(file));
        registry.register(Box::new(DatabaseIngestor::new()));
        registry
    }

    /// Register an ingestor
    ///
    /// Ingestors are checked in registration order, so register more
    /// specific ingestors before generic ones.
    pub fn register(&mut self, ingestor: Box<dyn Ingestor>) {
        self.ingestors.push(ingestor);
    }

    /// Ingest a source using the appropriate ingestor
    ///
    /// Failures are logged here once and returned to the caller unchanged.
    pub async fn ingest(
        &self,
        source: &SourceDescriptor,
        options: &IngestOptions,
    ) -> Result<Document, IngestError> {
        // Validate web URLs early
        if let SourceDescriptor::Web { url } = source {
            if url.is_empty() {
                return Err(IngestError::MissingUrl);
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(IngestError::InvalidUrlScheme);
            }
        }

        let Some(ingestor) = self
            .ingestors
            .iter()
            .find(|ingestor| ingestor.matches(source, options))
        else {
            return Err(IngestError::IngestorError(format!(
                "No ingestor available for {} source",
                source.kind()
            )));
        };

        let span = tracing::info_span!("ingest", kind = source.kind(), ingestor = ingestor.name());
        async {
            debug!("Using ingestor");
            let result = ingestor.ingest(source, options).await;
            if let Err(ref e) = result {
                error!(error = %e, "Ingestion failed");
            }
            result
        }
        .instrument(span)
        .await
    }
}
