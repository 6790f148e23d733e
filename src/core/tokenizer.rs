//! XML Tokenizer - State machine for XML token extraction
//!
//! Implements a pull-parser style tokenizer that extracts XML tokens:
//! - Element start/end tags
//! - Text content (entities decoded)
//! - CDATA sections
//! - Comments
//! - Processing instructions and the XML declaration
//! - DOCTYPE declarations, internal subset included
//!
//! The tokenizer is always strict: the first well-formedness violation ends
//! the token stream with a positioned [`ParseError`]. Tag balance is not
//! checked here; that is the reader's job.

use super::entities::{decode_text, validate_xml_chars};
use super::scanner::{is_whitespace, validate_name, Scanner};
use crate::error::ParseError;
use log::trace;
use memchr::{memchr, memchr3, memmem};
use std::borrow::Cow;

const BOM: &str = "\u{FEFF}";

/// Current parsing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Initial state before parsing starts
    Init,
    /// Between markup constructs
    Content,
    /// End of input reached, or an error was returned
    Done,
}

/// Type of XML token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Element start tag: <element>
    StartTag,
    /// Element end tag: </element>
    EndTag,
    /// Empty element: <element/>
    EmptyTag,
    /// Text content
    Text,
    /// CDATA section: <![CDATA[...]]>
    CData,
    /// Comment: <!--...-->
    Comment,
    /// Processing instruction: <?target ...?>
    ProcessingInstruction,
    /// XML declaration: <?xml ...?>
    XmlDeclaration,
    /// DOCTYPE declaration
    DocType,
    /// End of file
    Eof,
}

/// A parsed XML token
#[derive(Debug, Clone)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Raw span in input (start, end)
    pub span: (usize, usize),
    /// For tags: the element name. For PIs: the target
    pub name: Option<&'a str>,
    /// For text/cdata/comments: the content (owned only if entities were decoded)
    pub content: Option<Cow<'a, str>>,
    /// Raw markup covered by `span`
    pub raw: &'a str,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, span: (usize, usize), raw: &'a str) -> Self {
        Token {
            kind,
            span,
            name: None,
            content: None,
            raw,
        }
    }

    fn with_name(mut self, name: &'a str) -> Self {
        self.name = Some(name);
        self
    }

    fn with_content(mut self, content: Cow<'a, str>) -> Self {
        self.content = Some(content);
        self
    }

    /// For start and empty tags: the attribute section after the name, with
    /// its byte offset into the input
    pub fn attribute_source(&self) -> (usize, &'a str) {
        let name_len = self.name.map_or(0, str::len);
        let close = if self.kind == TokenKind::EmptyTag { 2 } else { 1 };
        let start = (1 + name_len).min(self.raw.len());
        let end = self.raw.len().saturating_sub(close).max(start);
        (self.span.0 + start, &self.raw[start..end])
    }
}

/// XML tokenizer implementing a pull-parser pattern
pub struct Tokenizer<'a> {
    input: &'a str,
    scanner: Scanner<'a>,
    state: ParseState,
    /// Offset of the first byte after an optional BOM
    doc_start: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            input,
            scanner: Scanner::new(input),
            state: ParseState::Init,
            doc_start: 0,
        }
    }

    /// Get the current parse state
    pub fn state(&self) -> ParseState {
        self.state
    }

    fn malformed(&mut self, offset: usize, message: impl Into<String>) -> ParseError {
        self.state = ParseState::Done;
        ParseError::malformed(self.input, offset, message)
    }

    /// Get the next token. `None` after `Eof` or after an error.
    pub fn next_token(&mut self) -> Option<Result<Token<'a>, ParseError>> {
        match self.state {
            ParseState::Done => return None,
            ParseState::Init => {
                if self.scanner.starts_with(BOM) {
                    self.scanner.advance(BOM.len());
                }
                self.doc_start = self.scanner.position();
                self.state = ParseState::Content;
            }
            ParseState::Content => {}
        }

        let pos = self.scanner.position();
        if self.scanner.is_eof() {
            self.state = ParseState::Done;
            return Some(Ok(Token::new(TokenKind::Eof, (pos, pos), "")));
        }

        let result = match self.scanner.peek() {
            Some(b'<') => self.parse_markup(),
            _ => self.parse_text(),
        };
        if result.is_err() {
            self.state = ParseState::Done;
        }
        Some(result)
    }

    /// Parse markup starting with '<'
    fn parse_markup(&mut self) -> Result<Token<'a>, ParseError> {
        let start = self.scanner.position();
        self.scanner.advance(1); // Skip '<'

        match self.scanner.peek() {
            Some(b'/') => self.parse_end_tag(start),
            Some(b'!') => self.parse_bang_markup(start),
            Some(b'?') => self.parse_pi(start),
            Some(_) => self.parse_start_tag(start),
            None => Err(self.malformed(start, "unexpected end of input after '<'")),
        }
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token<'a> {
        let end = self.scanner.position();
        Token::new(kind, (start, end), self.scanner.slice(start, end))
    }

    /// Read and validate an element name at the current position
    fn read_element_name(&mut self, start: usize, what: &str) -> Result<&'a str, ParseError> {
        let name_pos = self.scanner.position();
        let Some(name) = self.scanner.read_name() else {
            return Err(self.malformed(name_pos, format!("invalid {what}")));
        };
        if let Err(msg) = validate_name(name) {
            return Err(self.malformed(name_pos, format!("invalid {what} '{name}': {msg}")));
        }
        match self.scanner.peek() {
            Some(b) if is_whitespace(b) || b == b'>' || b == b'/' => Ok(name),
            Some(_) => {
                let at = self.scanner.position();
                Err(self.malformed(at, format!("invalid character in {what} '{name}'")))
            }
            None => Err(self.malformed(start, format!("unterminated tag '{name}'"))),
        }
    }

    /// Parse a start tag or empty element tag
    fn parse_start_tag(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        let name = self.read_element_name(start, "element name")?;

        // Find the end of the tag, handling quoted attributes
        let Some(end) = self.scanner.find_tag_end_quoted() else {
            return Err(self.malformed(start, format!("unterminated start tag '{name}'")));
        };

        let name_end = start + 1 + name.len();
        let is_empty = end > name_end && self.input.as_bytes()[end - 1] == b'/';

        self.scanner.set_position(end + 1);
        let kind = if is_empty { TokenKind::EmptyTag } else { TokenKind::StartTag };
        Ok(self.token(kind, start).with_name(name))
    }

    /// Parse an end tag
    fn parse_end_tag(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '/'
        let name = self.read_element_name(start, "end tag name")?;

        // End tag can only have whitespace after name, not attributes
        self.scanner.skip_whitespace();
        match self.scanner.peek() {
            Some(b'>') => {}
            Some(_) => {
                let at = self.scanner.position();
                return Err(self.malformed(at, format!("unexpected content in end tag '{name}'")));
            }
            None => return Err(self.malformed(start, format!("unterminated end tag '{name}'"))),
        }
        self.scanner.advance(1);
        Ok(self.token(TokenKind::EndTag, start).with_name(name))
    }

    /// Parse markup starting with '!' (comment, CDATA, DOCTYPE)
    fn parse_bang_markup(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '!'

        if self.scanner.starts_with("--") {
            self.parse_comment(start)
        } else if self.scanner.starts_with("[CDATA[") {
            self.parse_cdata(start)
        } else if self.scanner.starts_with("DOCTYPE") {
            self.parse_doctype(start)
        } else {
            Err(self.malformed(start, "invalid declaration, expected comment, CDATA or DOCTYPE"))
        }
    }

    /// Parse a comment <!--...-->
    fn parse_comment(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(2); // Skip '--'
        let content_start = self.scanner.position();

        let Some(end) = self.scanner.find_str("-->") else {
            return Err(self.malformed(start, "unterminated comment"));
        };
        let content = self.scanner.slice(content_start, end);

        if let Some(i) = memmem::find(content.as_bytes(), b"--") {
            return Err(self.malformed(content_start + i, "'--' not allowed inside a comment"));
        }
        if content.ends_with('-') {
            return Err(self.malformed(end - 1, "comment cannot end with '-'"));
        }
        if let Err(e) = validate_xml_chars(content) {
            return Err(self.malformed(content_start + e.offset, e.message));
        }

        self.scanner.set_position(end + 3); // Skip '-->'
        trace!("comment skipped at offset {start}");
        Ok(self.token(TokenKind::Comment, start).with_content(Cow::Borrowed(content)))
    }

    /// Parse a CDATA section <![CDATA[...]]>
    fn parse_cdata(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(7); // Skip '[CDATA['
        let content_start = self.scanner.position();

        let Some(end) = self.scanner.find_str("]]>") else {
            return Err(self.malformed(start, "unterminated CDATA section"));
        };
        let content = self.scanner.slice(content_start, end);
        if let Err(e) = validate_xml_chars(content) {
            return Err(self.malformed(content_start + e.offset, e.message));
        }

        self.scanner.set_position(end + 3); // Skip ']]>'
        Ok(self.token(TokenKind::CData, start).with_content(Cow::Borrowed(content)))
    }

    /// Parse a DOCTYPE declaration
    ///
    /// Format: `<!DOCTYPE name [internal subset]>` or `<!DOCTYPE name SYSTEM "uri">`.
    /// The declaration is only delimited, never interpreted.
    fn parse_doctype(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(7); // Skip 'DOCTYPE'

        if !self.scanner.peek().is_some_and(is_whitespace) {
            let at = self.scanner.position();
            return Err(self.malformed(at, "whitespace required after DOCTYPE"));
        }
        self.scanner.skip_whitespace();
        let name_pos = self.scanner.position();
        let name = match self.scanner.read_name() {
            Some(name) if validate_name(name).is_ok() => name,
            _ => return Err(self.malformed(name_pos, "invalid DOCTYPE name")),
        };

        let bytes = self.input.as_bytes();
        let mut pos = self.scanner.position();
        let mut depth = 0usize;
        loop {
            let Some(i) = memchr3(b'>', b'[', b']', &bytes[pos..]).map(|i| pos + i) else {
                return Err(self.malformed(start, "unterminated DOCTYPE declaration"));
            };
            // Quoted literals and comments may contain any delimiter
            let skipped = &bytes[pos..i];
            let quote = skipped.iter().position(|&b| b == b'"' || b == b'\'');
            let comment = memmem::find(skipped, b"<!--");
            match (quote, comment) {
                (Some(q), c) if c.is_none_or(|c| q < c) => {
                    let open = pos + q;
                    match memchr(bytes[open], &bytes[open + 1..]) {
                        Some(close) => pos = open + close + 2,
                        None => return Err(self.malformed(open, "unterminated literal in DOCTYPE")),
                    }
                    continue;
                }
                (_, Some(c)) => {
                    let open = pos + c;
                    match memmem::find(&bytes[open + 4..], b"-->") {
                        Some(close) => pos = open + 4 + close + 3,
                        None => return Err(self.malformed(open, "unterminated comment in DOCTYPE")),
                    }
                    continue;
                }
                _ => {}
            }
            match bytes[i] {
                b'[' => depth += 1,
                b']' => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| ParseError::malformed(self.input, i, "unbalanced ']' in DOCTYPE"))?;
                }
                _ if depth == 0 => {
                    self.scanner.set_position(i + 1);
                    break;
                }
                _ => {}
            }
            pos = i + 1;
        }

        trace!("DOCTYPE '{name}' skipped at offset {start}");
        Ok(self.token(TokenKind::DocType, start).with_name(name))
    }

    /// Parse a processing instruction <?...?>
    fn parse_pi(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        self.scanner.advance(1); // Skip '?'

        let target_pos = self.scanner.position();
        let name = match self.scanner.read_name() {
            Some(name) if validate_name(name).is_ok() => name,
            _ => return Err(self.malformed(target_pos, "invalid processing instruction target")),
        };

        // After the target there must be whitespace or '?>'
        match self.scanner.peek() {
            Some(b) if is_whitespace(b) => {}
            Some(b'?') if self.scanner.peek_at(1) == Some(b'>') => {}
            Some(_) => {
                let at = self.scanner.position();
                return Err(self.malformed(at, "invalid character after processing instruction target"));
            }
            None => return Err(self.malformed(start, "unterminated processing instruction")),
        }

        // Only exact lowercase "xml" at document start is valid (XML declaration)
        let is_xml_decl = name.eq_ignore_ascii_case("xml");
        if is_xml_decl && (name != "xml" || start != self.doc_start) {
            return Err(self.malformed(
                start,
                "processing instruction target 'xml' is reserved for the XML declaration at document start",
            ));
        }

        let content_start = self.scanner.position();
        let Some(end) = self.scanner.find_str("?>") else {
            return Err(self.malformed(start, "unterminated processing instruction"));
        };
        let content = self.scanner.slice(content_start, end);
        if let Err(e) = validate_xml_chars(content) {
            return Err(self.malformed(content_start + e.offset, e.message));
        }

        self.scanner.set_position(end + 2); // Skip '?>'
        trace!("processing instruction '{name}' skipped at offset {start}");
        let kind = if is_xml_decl { TokenKind::XmlDeclaration } else { TokenKind::ProcessingInstruction };
        Ok(self
            .token(kind, start)
            .with_name(name)
            .with_content(Cow::Borrowed(content.trim_start())))
    }

    /// Parse text content
    fn parse_text(&mut self) -> Result<Token<'a>, ParseError> {
        let start = self.scanner.position();
        let end = self.scanner.find_tag_start().unwrap_or(self.input.len());
        let content = self.scanner.slice(start, end);

        if let Some(i) = memmem::find(content.as_bytes(), b"]]>") {
            return Err(self.malformed(start + i, "']]>' not allowed in character data"));
        }
        let decoded = match decode_text(content) {
            Ok(decoded) => decoded,
            Err(e) => return Err(self.malformed(start + e.offset, e.message)),
        };

        self.scanner.set_position(end);
        Ok(self.token(TokenKind::Text, start).with_content(decoded))
    }
}

/// Iterator adapter for tokenizer
impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token()? {
            Ok(token) if token.kind == TokenKind::Eof => None,
            other => Some(other),
        }
    }
}
