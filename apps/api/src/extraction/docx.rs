//! DOCX text recovery: unzip `word/document.xml` and collect its `<w:t>` runs.

use std::io::{Cursor, Read};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};
use zip::{result::ZipError, ZipArchive};

use super::{collapse_whitespace, scrape_printable};
use crate::errors::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Inflated size past which the document part is refused instead of read.
const MAX_DOCUMENT_XML_BYTES: u64 = 20 * 1024 * 1024;

/// A WordprocessingML text run. `<w:tab/>`, `<w:tbl>` and friends do not match.
static TEXT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>").expect("valid text run regex"));

static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

#[derive(Debug, Error)]
enum DocumentPartError {
    #[error("not a ZIP container: {0}")]
    Container(#[from] ZipError),

    #[error("document part could not be inflated: {0}")]
    Inflate(#[from] std::io::Error),

    #[error("word/document.xml inflates past {limit} bytes")]
    TooLarge { limit: u64 },
}

pub fn extract(bytes: &[u8]) -> Result<String, ExtractionError> {
    extract_with_limit(bytes, MAX_DOCUMENT_XML_BYTES)
}

fn extract_with_limit(bytes: &[u8], limit: u64) -> Result<String, ExtractionError> {
    if bytes.is_empty() {
        return Err(ExtractionError::ExtractionFailed {
            format: "DOCX",
            message: "file is empty".to_string(),
        });
    }

    match read_document_xml(bytes, limit) {
        Ok(xml) => {
            let runs = text_runs(&xml);
            if !runs.is_empty() {
                return Ok(runs);
            }
            warn!("DOCX document part has no text runs; stripping all markup");
            Ok(strip_tags(&xml))
        }
        Err(e @ DocumentPartError::TooLarge { .. }) => Err(ExtractionError::ExtractionFailed {
            format: "DOCX",
            message: e.to_string(),
        }),
        Err(e) => {
            debug!("Not a readable DOCX container ({e}); scanning raw bytes");
            let runs = text_runs(&String::from_utf8_lossy(bytes));
            if !runs.is_empty() {
                return Ok(runs);
            }
            warn!("No DOCX text runs found in raw bytes; scraping printable bytes");
            Ok(scrape_printable(bytes))
        }
    }
}

/// Inflates the document part, never holding more than `limit + 1` bytes of it.
/// The declared size is only a first check; the read is bounded as well.
fn read_document_xml(bytes: &[u8], limit: u64) -> Result<String, DocumentPartError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let part = archive.by_name(DOCUMENT_PART)?;
    if part.size() > limit {
        return Err(DocumentPartError::TooLarge { limit });
    }

    let mut xml = Vec::new();
    part.take(limit + 1).read_to_end(&mut xml)?;
    if xml.len() as u64 > limit {
        return Err(DocumentPartError::TooLarge { limit });
    }
    Ok(String::from_utf8_lossy(&xml).into_owned())
}

/// Contents of every `<w:t>` run, entity-decoded, space-joined and collapsed.
fn text_runs(xml: &str) -> String {
    let runs: Vec<String> = TEXT_RUN
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|run| decode_entities(run.as_str()))
        .collect();
    collapse_whitespace(&runs.join(" "))
}

fn strip_tags(xml: &str) -> String {
    collapse_whitespace(&decode_entities(&ANY_TAG.replace_all(xml, " ")))
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
