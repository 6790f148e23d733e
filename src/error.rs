//! Parse error taxonomy
//!
//! Every failure is terminal for the call. Errors raised while scanning carry
//! a position; errors raised by a materializer on a hand-built event stream
//! do not, since there is no input to point into.

use std::fmt;
use thiserror::Error;

/// Category of a parse failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unterminated construct, bad name, bad entity, invalid character data
    MalformedMarkup,
    /// End tag without a matching start tag, mismatched name, or unclosed element
    UnbalancedTags,
    /// No root element found
    EmptyDocument,
}

impl ErrorKind {
    /// Short snake_case identifier, stable across releases
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MalformedMarkup => "malformed_markup",
            ErrorKind::UnbalancedTags => "unbalanced_tags",
            ErrorKind::EmptyDocument => "empty_document",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location of an error in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset from the start of the input
    pub offset: usize,
    /// 1-based line number
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

impl Position {
    /// Compute line and column for a byte offset into `input`.
    ///
    /// Offsets past the end, or inside a multi-byte character, are clamped
    /// to the nearest preceding character boundary.
    pub fn from_offset(input: &str, offset: usize) -> Self {
        let mut offset = offset.min(input.len());
        while !input.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &input.as_bytes()[..offset];
        let line = memchr::memchr_iter(b'\n', before).count() + 1;
        let line_start = memchr::memrchr(b'\n', before).map_or(0, |i| i + 1);
        let column = input[line_start..offset].chars().count() + 1;
        Position { offset, line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Error returned by every parse entry point
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}{}", .position.as_ref().map(|p| format!(" at {p}")).unwrap_or_default())]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub position: Option<Position>,
}

impl ParseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, position: Option<Position>) -> Self {
        ParseError {
            kind,
            message: message.into(),
            position,
        }
    }

    /// Malformed markup at a byte offset of `input`
    pub fn malformed(input: &str, offset: usize, message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::MalformedMarkup,
            message,
            Some(Position::from_offset(input, offset)),
        )
    }

    /// Unbalanced tags at a byte offset of `input`
    pub fn unbalanced(input: &str, offset: usize, message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::UnbalancedTags,
            message,
            Some(Position::from_offset(input, offset)),
        )
    }

    pub fn empty_document(position: Option<Position>) -> Self {
        Self::new(ErrorKind::EmptyDocument, "no root element found", position)
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_first_line() {
        let pos = Position::from_offset("<a>bc</a>", 3);
        assert_eq!(pos, Position { offset: 3, line: 1, column: 4 });
    }

    #[test]
    fn test_position_after_newlines() {
        let input = "<a>\n  <b>\n</a>";
        let pos = Position::from_offset(input, input.find("<b>").unwrap());
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 3);
    }

    #[test]
    fn test_position_counts_characters() {
        let input = "<é>ü<";
        let pos = Position::from_offset(input, input.len() - 1);
        assert_eq!(pos.column, 5);
    }

    #[test]
    fn test_position_clamps() {
        let pos = Position::from_offset("ab", 99);
        assert_eq!(pos.offset, 2);
        let pos = Position::from_offset("é", 1);
        assert_eq!(pos.offset, 0);
    }

    #[test]
    fn test_display() {
        let err = ParseError::unbalanced("<a></b>", 3, "mismatched end tag");
        assert_eq!(err.to_string(), "unbalanced_tags: mismatched end tag at line 1, column 4");

        let err = ParseError::empty_document(None);
        assert_eq!(err.to_string(), "empty_document: no root element found");
    }
}
