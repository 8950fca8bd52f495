//! Best-effort note reading.
//!
//! Notes are expected to be UTF-8, but exports from older editors show up as UTF-16 (with BOM) or
//! legacy code pages. Reading never fails on content: undecodable bytes become U+FFFD.

use anyhow::{Context, Result};
use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use std::path::Path;

const DETECT_SAMPLE_SIZE: usize = 8192;

/// Decode raw note bytes. Returns the text and the encoding label used.
pub fn decode_note(bytes: &[u8]) -> (String, &'static str) {
    if let Some(rest) = bytes.strip_prefix(&[0xef, 0xbb, 0xbf]) {
        let (text, _) = UTF_8.decode_without_bom_handling(rest);
        return (text.into_owned(), "utf-8-sig");
    }
    if let Some(rest) = bytes.strip_prefix(&[0xff, 0xfe]) {
        let (text, _) = UTF_16LE.decode_without_bom_handling(rest);
        return (text.into_owned(), "utf-16le");
    }
    if let Some(rest) = bytes.strip_prefix(&[0xfe, 0xff]) {
        let (text, _) = UTF_16BE.decode_without_bom_handling(rest);
        return (text.into_owned(), "utf-16be");
    }

    // Fast path
    if let Ok(text) = std::str::from_utf8(bytes) {
        return (text.to_string(), "utf-8");
    }

    let mut detector = EncodingDetector::new();
    detector.feed(&bytes[..bytes.len().min(DETECT_SAMPLE_SIZE)], bytes.len() <= DETECT_SAMPLE_SIZE);
    let encoding: &'static Encoding = detector.guess(None, true);
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!("decoded with replacement characters as {}", encoding.name());
    }
    (text.into_owned(), encoding.name())
}

/// Read a note from disk with [`decode_note`].
pub fn read_note(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let (text, encoding) = decode_note(&bytes);
    if encoding != "utf-8" {
        tracing::debug!("{}: read as {}", path.display(), encoding);
    }
    Ok(text)
}
