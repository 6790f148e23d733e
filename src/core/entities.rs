//! XML Entity Decoding
//!
//! Handles decoding of XML entities:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Numeric character references: &#123; &#x7B;
//!
//! Uses Cow for zero-copy when no entities are present. There is no DTD
//! support, so any other named entity is an error.

use memchr::memchr;
use std::borrow::Cow;

/// Problem found in character data, located by byte offset into the decoded slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentError {
    pub offset: usize,
    pub message: &'static str,
}

impl ContentError {
    fn at(offset: usize, message: &'static str) -> Self {
        ContentError { offset, message }
    }
}

/// Decode entity and character references in text or attribute content
///
/// Returns Borrowed if no entities present (zero-copy),
/// returns Owned if entities were decoded.
pub fn decode_text(input: &str) -> Result<Cow<'_, str>, ContentError> {
    validate_xml_chars(input)?;

    // Fast path: check if there are any entities using SIMD
    let Some(first) = memchr(b'&', input.as_bytes()) else {
        return Ok(Cow::Borrowed(input));
    };

    let bytes = input.as_bytes();
    let mut result = String::with_capacity(input.len());
    result.push_str(&input[..first]);
    let mut pos = first;

    loop {
        let semi = memchr(b';', &bytes[pos..])
            .ok_or_else(|| ContentError::at(pos, "bare '&' or unterminated entity reference"))?;
        let entity = &input[pos + 1..pos + semi];
        match decode_entity(entity) {
            Ok(c) => result.push(c),
            Err(message) => return Err(ContentError::at(pos, message)),
        }
        pos += semi + 1;

        match memchr(b'&', &bytes[pos..]) {
            Some(next) => {
                result.push_str(&input[pos..pos + next]);
                pos += next;
            }
            None => {
                result.push_str(&input[pos..]);
                break;
            }
        }
    }

    Ok(Cow::Owned(result))
}

/// Decode a single entity (without & and ;)
fn decode_entity(entity: &str) -> Result<char, &'static str> {
    if let Some(numeric) = entity.strip_prefix('#') {
        return decode_numeric_entity(numeric);
    }
    match entity {
        "lt" => Ok('<'),
        "gt" => Ok('>'),
        "amp" => Ok('&'),
        "quot" => Ok('"'),
        "apos" => Ok('\''),
        "" => Err("bare '&' or empty entity reference"),
        _ => Err("undefined entity reference"),
    }
}

/// Decode a numeric character reference
fn decode_numeric_entity(entity: &str) -> Result<char, &'static str> {
    let codepoint = if let Some(hex) = entity.strip_prefix('x') {
        // Hexadecimal: &#xHHHH;
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err("malformed hexadecimal character reference");
        }
        u32::from_str_radix(hex, 16).map_err(|_| "character reference out of range")?
    } else {
        // Decimal: &#DDDD;
        if entity.is_empty() || !entity.bytes().all(|b| b.is_ascii_digit()) {
            return Err("malformed decimal character reference");
        }
        entity.parse::<u32>().map_err(|_| "character reference out of range")?
    };

    if !is_valid_xml_char(codepoint) {
        return Err("character reference to an illegal XML character");
    }
    char::from_u32(codepoint).ok_or("character reference out of range")
}

/// Check if a code point is a valid XML 1.0 Char
/// Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
#[inline]
pub fn is_valid_xml_char(codepoint: u32) -> bool {
    matches!(codepoint,
        0x9 | 0xA | 0xD |
        0x20..=0xD7FF |
        0xE000..=0xFFFD |
        0x10000..=0x10FFFF
    )
}

/// Reject characters not allowed anywhere in an XML 1.0 document
pub fn validate_xml_chars(content: &str) -> Result<(), ContentError> {
    // ASCII fast path covers the common case without decoding chars
    if content.is_ascii() {
        return match content
            .bytes()
            .position(|b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r'))
        {
            Some(i) => Err(ContentError::at(i, "illegal control character")),
            None => Ok(()),
        };
    }
    match content
        .char_indices()
        .find(|&(_, c)| !is_valid_xml_char(c as u32))
    {
        Some((i, _)) => Err(ContentError::at(i, "illegal XML character")),
        None => Ok(()),
    }
}
