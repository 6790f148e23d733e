//! Direct materializer
//!
//! Folds elements as their end tags arrive. Memory holds one frame per open
//! element plus the child values collected so far at each level; no tree of
//! raw nodes is ever built.

use crate::config::ParseOptions;
use crate::core::scanner::is_blank;
use crate::error::{ErrorKind, ParseError};
use crate::fold::{wrap_root, ElementBuilder};
use crate::reader::events::Event;
use crate::reader::slice::SliceReader;
use crate::value::Value;
use log::debug;

/// One open element
struct Frame {
    name: String,
    builder: ElementBuilder,
    /// A child or text arrived, so no more attributes are accepted
    has_content: bool,
}

/// Push-style state machine over the event sequence
pub struct DirectMaterializer<'o> {
    options: &'o ParseOptions,
    stack: Vec<Frame>,
    result: Option<Value>,
    elements: usize,
}

impl<'o> DirectMaterializer<'o> {
    pub fn new(options: &'o ParseOptions) -> Self {
        DirectMaterializer {
            options,
            stack: Vec::new(),
            result: None,
            elements: 0,
        }
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Feed one event
    pub fn push(&mut self, event: Event<'_>) -> Result<(), ParseError> {
        match event {
            Event::StartElement(name) => {
                if self.result.is_some() {
                    return Err(structure(
                        ErrorKind::MalformedMarkup,
                        format!("second root element '{name}'"),
                    ));
                }
                if let Some(parent) = self.stack.last_mut() {
                    parent.has_content = true;
                }
                self.elements += 1;
                self.stack.push(Frame {
                    name: name.into_owned(),
                    builder: ElementBuilder::new(),
                    has_content: false,
                });
            }

            Event::Attribute { name, value } => match self.stack.last_mut() {
                Some(frame) if !frame.has_content => frame.builder.add_attribute(name, value),
                Some(frame) => {
                    return Err(structure(
                        ErrorKind::MalformedMarkup,
                        format!("attribute '{name}' after content of element '{}'", frame.name),
                    ));
                }
                None => {
                    return Err(structure(
                        ErrorKind::MalformedMarkup,
                        format!("attribute '{name}' outside any element"),
                    ));
                }
            },

            Event::Text(content) => match self.stack.last_mut() {
                Some(frame) => {
                    frame.has_content = true;
                    frame.builder.add_text(&content);
                }
                None if is_blank(&content) => {}
                None => {
                    return Err(structure(ErrorKind::MalformedMarkup, "text outside the root element"));
                }
            },

            Event::EndElement(name) => {
                let Some(frame) = self.stack.pop() else {
                    return Err(structure(
                        ErrorKind::UnbalancedTags,
                        format!("end tag '</{name}>' has no matching start tag"),
                    ));
                };
                if frame.name != name {
                    return Err(structure(
                        ErrorKind::UnbalancedTags,
                        format!("mismatched end tag: expected '</{}>', found '</{name}>'", frame.name),
                    ));
                }
                let value = frame.builder.finish(self.options);
                match self.stack.last_mut() {
                    Some(parent) => parent.builder.add_child(frame.name, value),
                    None => self.result = Some(wrap_root(frame.name, value)),
                }
            }
        }
        Ok(())
    }

    /// End of the event sequence
    pub fn finish(self) -> Result<Value, ParseError> {
        if let Some(open) = self.stack.last() {
            return Err(structure(
                ErrorKind::UnbalancedTags,
                format!("unexpected end of input, element '{}' is not closed", open.name),
            ));
        }
        let value = self.result.ok_or_else(|| ParseError::empty_document(None))?;
        debug!("direct: folded {} elements", self.elements);
        Ok(value)
    }
}

/// Drain an event sequence through the direct materializer.
///
/// The whole sequence is consumed even after the root closes, so a trailing
/// error still fails the call.
pub fn materialize<'a, I>(events: I, options: &ParseOptions) -> Result<Value, ParseError>
where
    I: IntoIterator<Item = Result<Event<'a>, ParseError>>,
{
    let mut materializer = DirectMaterializer::new(options);
    for event in events {
        materializer.push(event?)?;
    }
    materializer.finish()
}

/// Convert an XML string in a single pass
pub fn parse(xml: &str, options: &ParseOptions) -> Result<Value, ParseError> {
    materialize(SliceReader::new(xml), options)
}

fn structure(kind: ErrorKind, message: impl Into<String>) -> ParseError {
    ParseError::new(kind, message, None)
}
