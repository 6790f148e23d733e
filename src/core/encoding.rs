//! XML Encoding Detection and Conversion
//!
//! Handles detection of UTF-16 and UTF-8 based on BOM and initial bytes.
//! Converts UTF-16 input to UTF-8 for parsing.

use crate::error::{ErrorKind, ParseError, Position};
use std::borrow::Cow;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Detect the encoding of XML input based on BOM or byte patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl XmlEncoding {
    /// Detect encoding from byte order mark or initial bytes
    pub fn detect(input: &[u8]) -> Self {
        match input {
            // UTF-16 LE BOM: 0xFF 0xFE
            [0xFF, 0xFE, ..] => XmlEncoding::Utf16Le,
            // UTF-16 BE BOM: 0xFE 0xFF
            [0xFE, 0xFF, ..] => XmlEncoding::Utf16Be,
            // No BOM - check for UTF-16 pattern (< followed by null or null followed by <)
            [0x00, b'<', ..] => XmlEncoding::Utf16Be,
            [b'<', 0x00, ..] => XmlEncoding::Utf16Le,
            _ => XmlEncoding::Utf8,
        }
    }
}

/// Turn raw document bytes into UTF-8 text.
///
/// UTF-8 input (with or without BOM) is borrowed; UTF-16 input is transcoded.
/// Invalid sequences are reported as malformed markup at the first bad byte.
pub fn decode_document(input: &[u8]) -> Result<Cow<'_, str>, ParseError> {
    match XmlEncoding::detect(input) {
        XmlEncoding::Utf8 => {
            let bom = if input.starts_with(UTF8_BOM) { UTF8_BOM.len() } else { 0 };
            let body = &input[bom..];
            match std::str::from_utf8(body) {
                Ok(text) => Ok(Cow::Borrowed(text)),
                Err(e) => {
                    let valid = e.valid_up_to();
                    Err(invalid_encoding(&body[..valid], bom + valid, "invalid UTF-8 sequence"))
                }
            }
        }
        XmlEncoding::Utf16Le => decode_utf16(input, [0xFF, 0xFE], u16::from_le_bytes).map(Cow::Owned),
        XmlEncoding::Utf16Be => decode_utf16(input, [0xFE, 0xFF], u16::from_be_bytes).map(Cow::Owned),
    }
}

fn decode_utf16(input: &[u8], bom: [u8; 2], unit: fn([u8; 2]) -> u16) -> Result<String, ParseError> {
    // Skip BOM if present
    let start = if input.starts_with(&bom) { 2 } else { 0 };
    let bytes = &input[start..];

    if bytes.len() % 2 != 0 {
        return Err(invalid_encoding(b"", input.len() - 1, "invalid UTF-16: odd number of bytes"));
    }

    let mut text = String::with_capacity(bytes.len() / 2);

    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    let mut consumed = 0usize;
    for decoded in char::decode_utf16(units) {
        match decoded {
            Ok(c) => {
                text.push(c);
                consumed += c.len_utf16();
            }
            Err(_) => {
                return Err(invalid_encoding(
                    text.as_bytes(),
                    start + consumed * 2,
                    "invalid UTF-16: unpaired surrogate",
                ));
            }
        }
    }
    Ok(text)
}

/// Error at byte `offset` of the raw input, with line and column taken from
/// the text decoded so far
fn invalid_encoding(decoded_prefix: &[u8], offset: usize, message: &str) -> ParseError {
    let prefix = String::from_utf8_lossy(decoded_prefix);
    let position = Position {
        offset,
        ..Position::from_offset(&prefix, prefix.len())
    };
    ParseError::new(ErrorKind::MalformedMarkup, message, Some(position))
}
