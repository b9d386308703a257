//! Web page ingestor
//!
//! Handles HTTP/HTTPS URLs that are not on a repository host: fetches the
//! page and reduces its markup to visible text lines.

use crate::client::IngestOptions;
use crate::convert::html_to_text;
use crate::error::IngestError;
use crate::ingestors::Ingestor;
use crate::types::{Block, Document, SourceDescriptor};
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use tracing::info;

/// Web page ingestor
pub struct WebIngestor;

impl WebIngestor {
    /// Create a new web ingestor
    pub fn new() -> Self {
        Self
    }
}

impl Default for WebIngestor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ingestor for WebIngestor {
    fn name(&self) -> &'static str {
        "web"
    }

    fn matches(&self, source: &SourceDescriptor, _options: &IngestOptions) -> bool {
        matches!(source, SourceDescriptor::Web { .. })
    }

    async fn ingest(
        &self,
        source: &SourceDescriptor,
        options: &IngestOptions,
    ) -> Result<Document, IngestError> {
        let SourceDescriptor::Web { url } = source else {
            return Err(IngestError::IngestorError(format!(
                "Not a web source: {}",
                source.kind()
            )));
        };
        if url.is_empty() {
            return Err(IngestError::MissingUrl);
        }

        // Build headers
        let mut headers = HeaderMap::new();
        let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html, text/plain, */*;q=0.8"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(IngestError::ClientBuildError)?;

        let response = client
            .get(url)
            .send()
            .await
            .map_err(IngestError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::HttpStatus {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(IngestError::from_reqwest)?;
        let text = html_to_text(&body);
        info!(url = %url, bytes = body.len(), "Fetched page");

        Ok(Document::from(Block::new(
            format!("URL: {}", url),
            format!("Content:\n{}", text),
        )))
    }
}
