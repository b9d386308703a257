//! Configured ingester and its builder

use crate::client::IngestOptions;
use crate::documents::DocumentExtractor;
use crate::error::IngestError;
use crate::ingestors::{FileIngestor, IngestorRegistry};
use crate::types::{Document, SourceDescriptor};
use std::path::PathBuf;
use std::sync::Arc;

/// Builder for configuring an [`Ingester`]
#[derive(Clone, Default)]
pub struct IngesterBuilder {
    options: IngestOptions,
    file: Option<FileIngestor>,
}

impl IngesterBuilder {
    /// Create a new builder with default options and capabilities
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.options.user_agent = Some(ua.into());
        self
    }

    /// Set the repository access token
    pub fn github_token(mut self, token: Option<String>) -> Self {
        self.options.github_token = token;
        self
    }

    /// Point repository requests at another API root
    pub fn github_api_base(mut self, base: impl Into<String>) -> Self {
        self.options.github_api_base = Some(base.into());
        self
    }

    /// Add a host whose URLs are ingested as repositories
    ///
    /// The first call replaces the default host list.
    pub fn repository_host(mut self, host: impl Into<String>) -> Self {
        self.options.repository_hosts.push(host.into());
        self
    }

    /// Only ingest repository files with this extension (repeatable)
    pub fn include_extension(mut self, ext: impl Into<String>) -> Self {
        self.options.include_extensions.push(ext.into());
        self
    }

    /// Replace the PDF extraction capability; `None` disables PDF support
    pub fn pdf_extractor(mut self, extractor: Option<Arc<dyn DocumentExtractor>>) -> Self {
        let file = self.file.take().unwrap_or_default();
        self.file = Some(file.with_pdf_extractor(extractor));
        self
    }

    /// Replace the DOCX extraction capability; `None` disables DOCX support
    pub fn docx_extractor(mut self, extractor: Option<Arc<dyn DocumentExtractor>>) -> Self {
        let file = self.file.take().unwrap_or_default();
        self.file = Some(file.with_docx_extractor(extractor));
        self
    }

    /// Build the ingester
    pub fn build(self) -> Ingester {
        Ingester {
            options: self.options,
            registry: IngestorRegistry::with_file_ingestor(self.file.unwrap_or_default()),
        }
    }
}

/// Configured content normalizer
///
/// Holds the options and the ingestor registry; every call is independent.
pub struct Ingester {
    options: IngestOptions,
    registry: IngestorRegistry,
}

impl Default for Ingester {
    fn default() -> Self {
        IngesterBuilder::new().build()
    }
}

impl Ingester {
    /// Create a new ingester builder
    pub fn builder() -> IngesterBuilder {
        IngesterBuilder::new()
    }

    /// Options this ingester was built with
    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Ingest any source into a canonical document
    pub async fn ingest(&self, source: &SourceDescriptor) -> Result<Document, IngestError> {
        self.registry.ingest(source, &self.options).await
    }

    /// Ingest a repository given its URL (or `owner/name`)
    pub async fn ingest_github(&self, repo_url: &str) -> Result<String, IngestError> {
        let source = SourceDescriptor::repository_from_url(repo_url, None)?;
        Ok(self.ingest(&source).await?.render())
    }

    /// Ingest a web page; repository-host URLs are ingested as repositories
    pub async fn ingest_url(&self, url: &str) -> Result<String, IngestError> {
        Ok(self.ingest(&SourceDescriptor::web(url)).await?.render())
    }

    /// Ingest a local file
    pub async fn ingest_file(&self, path: impl Into<PathBuf>) -> Result<String, IngestError> {
        Ok(self.ingest(&SourceDescriptor::file(path)).await?.render())
    }

    /// Run a query and ingest its result set
    pub async fn ingest_database(
        &self,
        connection: &str,
        query: &str,
    ) -> Result<String, IngestError> {
        Ok(self
            .ingest(&SourceDescriptor::database(connection, query))
            .await?
            .render())
    }
}
