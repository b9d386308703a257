//! Text extraction capabilities for binary document formats
//!
//! PDF and Word support are optional: the built-in extractors are compiled
//! in behind the `pdf` and `docx` features, and callers can inject their own
//! [`DocumentExtractor`] into a [`FileIngestor`](crate::FileIngestor).

use crate::error::IngestError;

/// Extracts plain text from the bytes of one document format
pub trait DocumentExtractor: Send + Sync {
    /// Format name used in labels and error messages, e.g. `"PDF"`
    fn format(&self) -> &'static str;

    /// Return the document text
    fn extract_text(&self, bytes: &[u8]) -> Result<String, IngestError>;
}

/// PDF extractor backed by `pdf-extract`; pages are joined with newlines
#[cfg(feature = "pdf")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

#[cfg(feature = "pdf")]
impl DocumentExtractor for PdfExtractor {
    fn format(&self) -> &'static str {
        "PDF"
    }

    fn extract_text(&self, bytes: &[u8]) -> Result<String, IngestError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| {
            IngestError::Extraction {
                format: "PDF",
                message: e.to_string(),
            }
        })?;
        Ok(pages
            .iter()
            .map(|page| page.trim_end())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Word extractor reading `word/document.xml`; paragraphs are joined with newlines
#[cfg(feature = "docx")]
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxExtractor;

#[cfg(feature = "docx")]
impl DocumentExtractor for DocxExtractor {
    fn format(&self) -> &'static str {
        "DOCX"
    }

    fn extract_text(&self, bytes: &[u8]) -> Result<String, IngestError> {
        use std::io::Read;

        let ooxml_error = |message: String| IngestError::Extraction {
            format: "DOCX",
            message,
        };

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
            .map_err(|e| ooxml_error(e.to_string()))?;
        let mut xml = Vec::new();
        archive
            .by_name("word/document.xml")
            .map_err(|e| ooxml_error(format!("word/document.xml: {}", e)))?
            .read_to_end(&mut xml)
            .map_err(|e| ooxml_error(e.to_string()))?;

        docx_paragraphs(&xml)
            .map(|paragraphs| paragraphs.join("\n"))
            .map_err(ooxml_error)
    }
}

/// Collect the text of each `<w:p>` in document order
///
/// Tabs and breaks count only inside a run (`<w:r>`); the same element
/// names in paragraph properties are tab-stop and layout definitions.
#[cfg(feature = "docx")]
fn docx_paragraphs(xml: &[u8]) -> Result<Vec<String>, String> {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    let mut in_run = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => current.clear(),
                b"r" => in_run = true,
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" if in_run => current.push('\t'),
                b"br" | b"cr" if in_run => current.push('\n'),
                _ => {}
            },
            Ok(Event::Text(te)) if in_text => {
                let text = te.unescape().map_err(|e| e.to_string())?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"r" => in_run = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}
