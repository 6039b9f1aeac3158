use crate::errors::ExtractionError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Plain-text pass-through. A leading byte-order mark is removed and bytes
/// that are not valid UTF-8 become U+FFFD, so this never fails.
pub fn extract(bytes: &[u8]) -> Result<String, ExtractionError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    Ok(String::from_utf8_lossy(bytes).into_owned())
}
