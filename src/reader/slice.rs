//! Zero-Copy Slice Reader
//!
//! Turns the token stream of a `&str` into the structural [`Event`] sequence,
//! enforcing tag balance and the single-root rule on the way. Events borrow
//! from the input unless entity decoding forced a copy.

use super::events::Event;
use crate::core::attributes::parse_attributes;
use crate::core::scanner::is_blank;
use crate::core::tokenizer::{Token, TokenKind, Tokenizer};
use crate::error::{ParseError, Position};
use log::debug;
use std::borrow::Cow;
use std::collections::VecDeque;

/// Forward-only event reader over an XML string
///
/// Yields `Result<Event, ParseError>`; the sequence ends after the first error.
pub struct SliceReader<'a> {
    input: &'a str,
    tokenizer: Tokenizer<'a>,
    /// Names of currently open elements, innermost last
    open: Vec<&'a str>,
    /// Events produced by the last token but not yet handed out
    pending: VecDeque<Event<'a>>,
    seen_root: bool,
    seen_doctype: bool,
    elements: usize,
    done: bool,
}

impl<'a> SliceReader<'a> {
    pub fn new(input: &'a str) -> Self {
        SliceReader {
            input,
            tokenizer: Tokenizer::new(input),
            open: Vec::new(),
            pending: VecDeque::new(),
            seen_root: false,
            seen_doctype: false,
            elements: 0,
            done: false,
        }
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Number of elements started so far
    pub fn element_count(&self) -> usize {
        self.elements
    }

    /// Get the next XML event
    pub fn next_event(&mut self) -> Option<Result<Event<'a>, ParseError>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            if self.done {
                return None;
            }

            let result = match self.tokenizer.next_token() {
                Some(Ok(token)) => self.handle(token),
                Some(Err(e)) => Err(e),
                None => {
                    self.done = true;
                    return None;
                }
            };
            if let Err(e) = result {
                self.done = true;
                self.pending.clear();
                return Some(Err(e));
            }
        }
    }

    fn handle(&mut self, token: Token<'a>) -> Result<(), ParseError> {
        let offset = token.span.0;
        match token.kind {
            TokenKind::StartTag | TokenKind::EmptyTag => {
                let Some(name) = token.name else {
                    return Err(ParseError::malformed(self.input, offset, "start tag without a name"));
                };
                if self.open.is_empty() && self.seen_root {
                    return Err(ParseError::malformed(
                        self.input,
                        offset,
                        format!("second root element '{name}'"),
                    ));
                }
                let (attr_offset, source) = token.attribute_source();
                let attrs = parse_attributes(source, attr_offset, self.input)?;

                self.seen_root = true;
                self.elements += 1;
                self.pending.push_back(Event::StartElement(Cow::Borrowed(name)));
                self.pending.extend(
                    attrs
                        .into_iter()
                        .map(|a| Event::Attribute { name: Cow::Borrowed(a.name), value: a.value }),
                );
                if token.kind == TokenKind::EmptyTag {
                    self.pending.push_back(Event::EndElement(Cow::Borrowed(name)));
                } else {
                    self.open.push(name);
                }
            }

            TokenKind::EndTag => {
                let Some(name) = token.name else {
                    return Err(ParseError::malformed(self.input, offset, "end tag without a name"));
                };
                match self.open.pop() {
                    None => {
                        return Err(ParseError::unbalanced(
                            self.input,
                            offset,
                            format!("end tag '</{name}>' has no matching start tag"),
                        ));
                    }
                    Some(expected) if expected != name => {
                        return Err(ParseError::unbalanced(
                            self.input,
                            offset,
                            format!("mismatched end tag: expected '</{expected}>', found '</{name}>'"),
                        ));
                    }
                    Some(_) => self.pending.push_back(Event::EndElement(Cow::Borrowed(name))),
                }
            }

            TokenKind::Text => {
                if self.open.is_empty() {
                    // Only whitespace may surround the root element
                    if !is_blank(token.raw) {
                        return Err(ParseError::malformed(
                            self.input,
                            offset,
                            "text outside the root element",
                        ));
                    }
                } else if let Some(content) = token.content {
                    self.pending.push_back(Event::Text(content));
                }
            }

            TokenKind::CData => {
                if self.open.is_empty() {
                    return Err(ParseError::malformed(
                        self.input,
                        offset,
                        "CDATA section outside the root element",
                    ));
                }
                if let Some(content) = token.content {
                    self.pending.push_back(Event::Text(content));
                }
            }

            TokenKind::DocType => {
                if self.seen_root || self.seen_doctype {
                    return Err(ParseError::malformed(
                        self.input,
                        offset,
                        "DOCTYPE must appear once, before the root element",
                    ));
                }
                self.seen_doctype = true;
            }

            TokenKind::Comment | TokenKind::ProcessingInstruction | TokenKind::XmlDeclaration => {}

            TokenKind::Eof => {
                if let Some(name) = self.open.last() {
                    return Err(ParseError::unbalanced(
                        self.input,
                        offset,
                        format!("unexpected end of input, element '{name}' is not closed"),
                    ));
                }
                if !self.seen_root {
                    return Err(ParseError::empty_document(Some(Position::from_offset(
                        self.input, offset,
                    ))));
                }
                debug!("read {} elements from {} bytes", self.elements, self.input.len());
                self.done = true;
            }
        }
        Ok(())
    }
}

impl<'a> Iterator for SliceReader<'a> {
    type Item = Result<Event<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}

/// Parse XML from a string and return all events
pub fn parse_events(input: &str) -> Result<Vec<Event<'_>>, ParseError> {
    SliceReader::new(input).collect()
}
