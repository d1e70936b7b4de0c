//! Windows-1252 encoding utilities for Latin thermal printers
//!
//! Portuguese receipts need accented letters (Ã, Ç, É). Printers are
//! switched to the WPC1252 code page (`ESC t 16`) and text is encoded
//! to single bytes before it reaches the wire.

use tracing::instrument;

/// `ESC t n` table number for WPC1252 on Epson-compatible printers
pub const CODE_PAGE_WPC1252: u8 = 16;

/// Byte printed for characters the code page cannot represent
const REPLACEMENT: u8 = b'?';

/// Convert UTF-8 text to WPC1252 bytes
///
/// ASCII passes through untouched. Characters outside the code page are
/// replaced with `?` (encoding_rs would otherwise emit HTML entities).
#[instrument(skip(s), fields(len = s.len()))]
pub fn encode_text(s: &str) -> Vec<u8> {
    if s.is_ascii() {
        return s.as_bytes().to_vec();
    }

    let mut out = Vec::with_capacity(s.len());
    let mut tmp = [0u8; 4];
    for c in s.chars() {
        if c.is_ascii() {
            out.push(c as u8);
            continue;
        }
        let (bytes, _, had_errors) = encoding_rs::WINDOWS_1252.encode(c.encode_utf8(&mut tmp));
        if had_errors || bytes.len() != 1 {
            out.push(REPLACEMENT);
        } else {
            out.push(bytes[0]);
        }
    }
    out
}
