//! PDF text recovery without a general-purpose parser on the hot path.
//!
//! Content streams frequently keep their text operators readable even when
//! binary data surrounds them, so the first pass scans `stream ... endstream`
//! regions and keeps what is printable. Regions whose dictionary declares a
//! `/Filter`, or that are mostly binary, are encoded and skipped by that scan;
//! for those documents the `pdf-extract` decoder gets a turn before the whole
//! buffer is scraped.

use once_cell::sync::Lazy;
use regex::bytes::Regex;
use tracing::{debug, warn};

use super::{collapse_whitespace, scrape_printable, text_length};
use crate::errors::ExtractionError;

/// `-u` so `.` matches arbitrary bytes, not just UTF-8 sequences.
static STREAM_REGION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s-u)stream(.*?)endstream").expect("valid stream regex"));

/// Regions shorter than this after cleanup are binary noise.
const MIN_REGION_LEN: usize = 10;

/// Percentage of printable or whitespace bytes below which a region is encoded data.
const MIN_PRINTABLE_PERCENT: usize = 75;

const FILTER_KEY: &[u8] = b"/Filter";

pub fn extract(bytes: &[u8], min_text_length: usize) -> Result<String, ExtractionError> {
    if bytes.is_empty() {
        return Err(ExtractionError::ExtractionFailed {
            format: "PDF",
            message: "file is empty".to_string(),
        });
    }

    let from_streams = stream_text(bytes);
    if text_length(&from_streams) >= min_text_length {
        debug!("PDF text recovered from content streams ({} chars)", from_streams.len());
        return Ok(from_streams);
    }

    if let Some(decoded) = decode_with_parser(bytes) {
        if text_length(&decoded) >= min_text_length {
            debug!("PDF text recovered by decoder ({} chars)", decoded.len());
            return Ok(decoded);
        }
    }

    warn!("PDF stream scan and decoder both came up short; scraping the raw buffer");
    Ok(scrape_printable(bytes))
}

/// Printable content of every unencoded `stream ... endstream` region, one
/// region per line.
fn stream_text(bytes: &[u8]) -> String {
    let mut regions = Vec::new();
    let mut previous_end = 0;

    for caps in STREAM_REGION.captures_iter(bytes) {
        let (Some(whole), Some(region)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        // The stream's dictionary sits between the previous region and this one.
        let preamble = &bytes[previous_end..whole.start()];
        previous_end = whole.end();

        if declares_filter(preamble) || !looks_like_text(region.as_bytes()) {
            debug!("Skipping encoded PDF stream at byte {}", whole.start());
            continue;
        }
        let text = scrape_printable(region.as_bytes());
        if text.len() >= MIN_REGION_LEN {
            regions.push(text);
        }
    }

    regions.join("\n")
}

fn declares_filter(preamble: &[u8]) -> bool {
    preamble
        .windows(FILTER_KEY.len())
        .any(|window| window == FILTER_KEY)
}

fn looks_like_text(region: &[u8]) -> bool {
    if region.is_empty() {
        return false;
    }
    let readable = region
        .iter()
        .filter(|&&b| (0x20..=0x7e).contains(&b) || b.is_ascii_whitespace())
        .count();
    readable * 100 >= region.len() * MIN_PRINTABLE_PERCENT
}

/// Full decode through `pdf-extract`. Malformed input may make it panic,
/// which is contained here and treated like any other decode miss.
fn decode_with_parser(bytes: &[u8]) -> Option<String> {
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Some(tidy_lines(&text)),
        Ok(Err(e)) => {
            debug!("PDF decoder rejected document: {e}");
            None
        }
        Err(_) => {
            warn!("PDF decoder panicked; ignoring its output");
            None
        }
    }
}

fn tidy_lines(text: &str) -> String {
    text.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
