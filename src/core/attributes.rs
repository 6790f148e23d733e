//! XML Attribute Parsing
//!
//! Parses XML attributes from tag content.

use super::entities::decode_text;
use super::scanner::{is_whitespace, validate_name};
use crate::error::ParseError;
use memchr::memchr;
use std::borrow::Cow;

/// A parsed XML attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Attribute name (may include namespace prefix, kept verbatim)
    pub name: &'a str,
    /// Attribute value (entities decoded)
    pub value: Cow<'a, str>,
}

impl<'a> Attribute<'a> {
    pub fn new(name: &'a str, value: Cow<'a, str>) -> Self {
        Attribute { name, value }
    }
}

/// Parse attributes from raw tag content (after the element name)
///
/// `content` is the text between the element name and `>` or `/>`, and
/// `base` is its byte offset within `input` so errors point at the
/// right place.
pub fn parse_attributes<'a>(
    content: &'a str,
    base: usize,
    input: &str,
) -> Result<Vec<Attribute<'a>>, ParseError> {
    let bytes = content.as_bytes();
    let err = |at: usize, msg: &str| ParseError::malformed(input, base + at, msg);

    let mut attrs: Vec<Attribute<'a>> = Vec::new();
    let mut pos = 0;

    loop {
        let ws_start = pos;
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }
        if pos >= bytes.len() {
            return Ok(attrs);
        }
        if pos == ws_start {
            return Err(err(pos, "whitespace required before attribute"));
        }

        // Attribute name runs to whitespace or '='
        let name_start = pos;
        while pos < bytes.len() && !is_whitespace(bytes[pos]) && bytes[pos] != b'=' {
            pos += 1;
        }
        let name = &content[name_start..pos];
        if let Err(msg) = validate_name(name) {
            return Err(err(name_start, &format!("invalid attribute name '{name}': {msg}")));
        }
        if attrs.iter().any(|a| a.name == name) {
            return Err(err(name_start, &format!("duplicate attribute '{name}'")));
        }

        // Skip whitespace around '='
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }
        if pos >= bytes.len() || bytes[pos] != b'=' {
            return Err(err(pos, &format!("attribute '{name}' has no value")));
        }
        pos += 1;
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }

        let quote = match bytes.get(pos) {
            Some(&q @ (b'"' | b'\'')) => q,
            _ => return Err(err(pos, "attribute value must be quoted")),
        };
        pos += 1;
        let value_start = pos;
        let close = memchr(quote, &bytes[value_start..])
            .ok_or_else(|| err(value_start - 1, "unterminated attribute value"))?;
        pos = value_start + close;

        let raw = &content[value_start..pos];
        if let Some(lt) = memchr(b'<', raw.as_bytes()) {
            return Err(err(value_start + lt, "'<' not allowed in attribute value"));
        }
        let value = decode_text(raw).map_err(|e| err(value_start + e.offset, e.message))?;
        attrs.push(Attribute::new(name, value));

        pos += 1; // Skip closing quote
    }
}
