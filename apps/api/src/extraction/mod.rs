//! Format routing and raw text recovery for uploaded resumes.
//!
//! Every extractor follows the same discipline: a precise structural pass
//! first, crude printable-byte scraping as the safety net.

pub mod docx;
pub mod pdf;
pub mod text;

use crate::errors::ExtractionError;

/// The three extraction strategies an upload can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentFormat {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::PlainText => "TXT",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "txt" => Some(DocumentFormat::PlainText),
            _ => None,
        }
    }

    fn from_content_type(content_type: &str) -> Option<Self> {
        if content_type.contains("pdf") {
            Some(DocumentFormat::Pdf)
        } else if content_type.contains("wordprocessingml") {
            Some(DocumentFormat::Docx)
        } else if content_type.starts_with("text/plain") {
            Some(DocumentFormat::PlainText)
        } else {
            None
        }
    }
}

/// Picks an extractor from the declared file name and content type alone.
///
/// The extension wins when it is recognised; otherwise the content type is
/// matched by substring. Both comparisons are case-insensitive.
pub fn route(file_name: &str, content_type: &str) -> Result<DocumentFormat, ExtractionError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_ascii_lowercase())
        .unwrap_or_default();
    let content_type = content_type.trim().to_ascii_lowercase();

    DocumentFormat::from_extension(&extension)
        .or_else(|| DocumentFormat::from_content_type(&content_type))
        .ok_or_else(|| {
            let declared = if !extension.is_empty() {
                format!(".{extension}")
            } else if !content_type.is_empty() {
                content_type
            } else {
                "unknown".to_string()
            };
            ExtractionError::UnsupportedFormat(declared)
        })
}

/// Runs the extractor for `format` over the raw upload bytes.
pub fn extract_text(
    format: DocumentFormat,
    bytes: &[u8],
    min_text_length: usize,
) -> Result<String, ExtractionError> {
    match format {
        DocumentFormat::Pdf => pdf::extract(bytes, min_text_length),
        DocumentFormat::Docx => docx::extract(bytes),
        DocumentFormat::PlainText => text::extract(bytes),
    }
}

/// Character count of the text once surrounding whitespace is ignored.
pub fn text_length(text: &str) -> usize {
    text.trim().chars().count()
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Last-resort recovery: every byte outside printable ASCII becomes a space,
/// then whitespace runs collapse.
pub(crate) fn scrape_printable(bytes: &[u8]) -> String {
    let printable: String = bytes
        .iter()
        .map(|&b| if (0x20..=0x7e).contains(&b) { b as char } else { ' ' })
        .collect();
    collapse_whitespace(&printable)
}
