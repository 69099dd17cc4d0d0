//! Charset detection for novel files
//!
//! Novels come from everywhere: UTF-8 with or without BOM, UTF-16 dumps
//! from Windows editors, and a long tail of GBK-encoded files. Detection
//! is BOM-first, then a strict UTF-8 scan, then GBK as the legacy
//! fallback.

use encoding_rs::{Encoding, GBK, UTF_16BE, UTF_16LE, UTF_8};

/// How many bytes the UTF-8 validity scan inspects.
const UTF8_SCAN_LIMIT: usize = 8192;

/// Detect the encoding of a raw byte buffer.
///
/// Returns the best-fit encoding and the number of prefix bytes to skip
/// (non-zero only when a BOM was found).
pub fn detect(bytes: &[u8]) -> (&'static Encoding, usize) {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return (UTF_8, 3);
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return (UTF_16LE, 2);
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return (UTF_16BE, 2);
    }
    if is_valid_utf8(bytes) {
        return (UTF_8, 0);
    }
    (GBK, 0)
}

/// Decode `bytes` under `encoding`, skipping `offset` prefix bytes.
///
/// Strict decode first; if the input is malformed under the detected
/// encoding, re-decode as lossy UTF-8 rather than surfacing an error.
pub fn decode(bytes: &[u8], encoding: &'static Encoding, offset: usize) -> String {
    let body = &bytes[offset..];
    match encoding.decode_without_bom_handling_and_without_replacement(body) {
        Some(text) => text.into_owned(),
        None => {
            log::warn!(
                "decode: malformed {} input, falling back to lossy UTF-8",
                encoding.name()
            );
            String::from_utf8_lossy(body).into_owned()
        }
    }
}

/// Strict UTF-8 validity scan over at most the first 8 KiB.
///
/// A multi-byte sequence cut off by the scan window is inconclusive and
/// does not fail the scan; a real mismatch does.
fn is_valid_utf8(bytes: &[u8]) -> bool {
    let len = bytes.len().min(UTF8_SCAN_LIMIT);
    let mut i = 0;
    while i < len {
        let b = bytes[i];
        let continuation_count = match b {
            0x00..=0x7F => {
                i += 1;
                continue;
            }
            0xC2..=0xDF => 1,
            0xE0..=0xEF => 2,
            0xF0..=0xF4 => 3,
            _ => return false,
        };
        if i + continuation_count >= len {
            // Truncated by the scan window, not by the data.
            break;
        }
        for j in 1..=continuation_count {
            let cb = bytes[i + j];
            if !(0x80..=0xBF).contains(&cb) {
                return false;
            }
        }
        i += continuation_count + 1;
    }
    true
}
