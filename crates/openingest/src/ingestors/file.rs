//! Local file ingestor
//!
//! Dispatches on the file extension: tables for CSV and spreadsheets,
//! indented JSON, extracted text for PDF and Word documents, and the raw
//! text for everything else.

use crate::client::IngestOptions;
use crate::documents::DocumentExtractor;
use crate::error::IngestError;
use crate::ingestors::Ingestor;
use crate::table::Table;
use crate::types::{Block, Document, SourceDescriptor};
use async_trait::async_trait;
use calamine::Reader;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// How a file is turned into text, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Excel,
    Json,
    Pdf,
    Docx,
    Text,
}

impl FileKind {
    /// Classify a path by its (case-insensitive) extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => FileKind::Csv,
            Some("xls") | Some("xlsx") => FileKind::Excel,
            Some("json") => FileKind::Json,
            Some("pdf") => FileKind::Pdf,
            Some("docx") => FileKind::Docx,
            _ => FileKind::Text,
        }
    }

    /// Label that prefixes the output
    pub fn label(&self) -> &'static str {
        match self {
            FileKind::Csv => "CSV File:",
            FileKind::Excel => "Excel File:",
            FileKind::Json => "JSON File:",
            FileKind::Pdf => "PDF File:",
            FileKind::Docx => "DOCX File:",
            FileKind::Text => "File:",
        }
    }
}

/// Local file ingestor
///
/// PDF and Word support come from injected [`DocumentExtractor`]s;
/// [`FileIngestor::new`] registers the ones compiled into this build.
#[derive(Clone)]
pub struct FileIngestor {
    pdf: Option<Arc<dyn DocumentExtractor>>,
    docx: Option<Arc<dyn DocumentExtractor>>,
}

impl FileIngestor {
    /// Create a file ingestor with the built-in capabilities
    pub fn new() -> Self {
        Self {
            pdf: default_pdf_extractor(),
            docx: default_docx_extractor(),
        }
    }

    /// File ingestor with no document capabilities at all
    pub fn without_capabilities() -> Self {
        Self {
            pdf: None,
            docx: None,
        }
    }

    /// Replace the PDF capability
    pub fn with_pdf_extractor(mut self, extractor: Option<Arc<dyn DocumentExtractor>>) -> Self {
        self.pdf = extractor;
        self
    }

    /// Replace the DOCX capability
    pub fn with_docx_extractor(mut self, extractor: Option<Arc<dyn DocumentExtractor>>) -> Self {
        self.docx = extractor;
        self
    }

    /// Convert file bytes into the body text for the given kind
    fn render(&self, kind: FileKind, path: &Path, bytes: Vec<u8>) -> Result<String, IngestError> {
        match kind {
            FileKind::Csv => Ok(csv_table(&bytes)?.render()),
            FileKind::Excel => Ok(excel_table(bytes)?.render()),
            FileKind::Json => pretty_json(&bytes),
            FileKind::Pdf => extract_with(
                self.pdf.as_deref(),
                "PDF",
                "rebuild openingest with the `pdf` feature or register a PDF extractor",
                &bytes,
            ),
            FileKind::Docx => extract_with(
                self.docx.as_deref(),
                "DOCX",
                "rebuild openingest with the `docx` feature or register a DOCX extractor",
                &bytes,
            ),
            FileKind::Text => String::from_utf8(bytes).map_err(|e| IngestError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            }),
        }
    }
}

impl Default for FileIngestor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "pdf")]
fn default_pdf_extractor() -> Option<Arc<dyn DocumentExtractor>> {
    Some(Arc::new(crate::documents::PdfExtractor))
}

#[cfg(not(feature = "pdf"))]
fn default_pdf_extractor() -> Option<Arc<dyn DocumentExtractor>> {
    None
}

#[cfg(feature = "docx")]
fn default_docx_extractor() -> Option<Arc<dyn DocumentExtractor>> {
    Some(Arc::new(crate::documents::DocxExtractor))
}

#[cfg(not(feature = "docx"))]
fn default_docx_extractor() -> Option<Arc<dyn DocumentExtractor>> {
    None
}

#[async_trait]
impl Ingestor for FileIngestor {
    fn name(&self) -> &'static str {
        "file"
    }

    fn matches(&self, source: &SourceDescriptor, _options: &IngestOptions) -> bool {
        matches!(source, SourceDescriptor::File { .. })
    }

    async fn ingest(
        &self,
        source: &SourceDescriptor,
        _options: &IngestOptions,
    ) -> Result<Document, IngestError> {
        let SourceDescriptor::File { path } = source else {
            return Err(IngestError::IngestorError(format!(
                "Not a file source: {}",
                source.kind()
            )));
        };

        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(IngestError::FileNotFound(path.clone()));
        }

        let bytes = tokio::fs::read(path).await.map_err(|source| IngestError::Io {
            path: path.clone(),
            source,
        })?;

        let kind = FileKind::from_path(path);
        let body = self.render(kind, path, bytes)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        info!(path = %path.display(), kind = ?kind, "Read file");

        Ok(Document::from(Block::new(
            format!("{} {}", kind.label(), file_name),
            body,
        )))
    }
}

fn extract_with(
    extractor: Option<&dyn DocumentExtractor>,
    format: &'static str,
    hint: &'static str,
    bytes: &[u8],
) -> Result<String, IngestError> {
    extractor
        .ok_or(IngestError::MissingCapability { format, hint })?
        .extract_text(bytes)
}

/// Parse CSV with the first record as header
fn csv_table(bytes: &[u8]) -> Result<Table, IngestError> {
    let parse_error = |e: csv::Error| IngestError::Parse {
        format: "CSV",
        message: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let columns = reader
        .headers()
        .map_err(parse_error)?
        .iter()
        .enumerate()
        .map(|(i, name)| column_name(name, i))
        .collect();
    let mut table = Table::new(columns);

    for record in reader.records() {
        let record = record.map_err(parse_error)?;
        table.push_row(
            record
                .iter()
                .map(|field| (!field.is_empty()).then(|| field.to_string()))
                .collect(),
        );
    }

    Ok(table)
}

/// Read the first worksheet with the first row as header
fn excel_table(bytes: Vec<u8>) -> Result<Table, IngestError> {
    let parse_error = |message: String| IngestError::Parse {
        format: "Excel",
        message,
    };

    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| parse_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| parse_error("workbook has no worksheets".to_string()))?
        .map_err(|e| parse_error(e.to_string()))?;

    let mut rows = range.rows();
    let columns = rows
        .next()
        .map(|header| {
            header
                .iter()
                .enumerate()
                .map(|(i, cell)| column_name(&cell.to_string(), i))
                .collect()
        })
        .unwrap_or_default();
    let mut table = Table::new(columns);

    for row in rows {
        table.push_row(
            row.iter()
                .map(|cell| match cell {
                    calamine::Data::Empty => None,
                    other => Some(other.to_string()),
                })
                .collect(),
        );
    }

    Ok(table)
}

/// Header text, or a positional name for blank header cells
fn column_name(name: &str, index: usize) -> String {
    if name.trim().is_empty() {
        format!("Unnamed: {}", index)
    } else {
        name.to_string()
    }
}

/// Re-serialize JSON with 2-space indentation, keeping key order
fn pretty_json(bytes: &[u8]) -> Result<String, IngestError> {
    let parse_error = |e: serde_json::Error| IngestError::Parse {
        format: "JSON",
        message: e.to_string(),
    };
    let value: serde_json::Value = serde_json::from_slice(bytes).map_err(parse_error)?;
    serde_json::to_string_pretty(&value).map_err(parse_error)
}
