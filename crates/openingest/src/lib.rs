//! OpenIngest - flatten content sources into LLM-ready text
//!
//! This crate turns four kinds of sources into one canonical text document:
//! GitHub repositories, web pages, local files and SQL query results.
//!
//! ## Ingestor System
//!
//! Each source kind is handled by an [`Ingestor`]. The [`IngestorRegistry`]
//! dispatches a [`SourceDescriptor`] to the first ingestor that matches it.
//!
//! Built-in ingestors:
//! - [`GitHubRepoIngestor`] - repository metadata and every text file in the tree
//! - [`WebIngestor`] - visible text of an HTML page
//! - [`FileIngestor`] - CSV, Excel, JSON, PDF, DOCX and plain text files
//! - [`DatabaseIngestor`] - query results rendered as a table
//!
//! ## Example
//!
//! ```no_run
//! # async fn run() -> Result<(), openingest::IngestError> {
//! let ingester = openingest::Ingester::default();
//! let text = ingester.ingest_file("data.json").await?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```

pub mod client;
mod convert;
pub mod documents;
mod error;
mod ingester;
pub mod ingestors;
pub mod table;
mod types;

pub use client::{ingest, ingest_with_options, IngestOptions};
pub use convert::{collapse_lines, html_to_text};
pub use documents::DocumentExtractor;
pub use error::IngestError;
pub use ingester::{Ingester, IngesterBuilder};
pub use ingestors::{
    DatabaseIngestor, FileIngestor, GitHubRepoIngestor, Ingestor, IngestorRegistry, WebIngestor,
};
pub use table::Table;
pub use types::{Block, Document, SourceDescriptor};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "OpenIngest/0.1";
