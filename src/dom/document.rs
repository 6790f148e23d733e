//! Intermediate document - phase one of the indirect strategy
//!
//! Consumes a complete event sequence into an [`IntermediateNode`] tree
//! under a synthetic container node. The same structural checks as the
//! direct materializer apply, so a document that fails one path fails the
//! other with the same error kind.

use super::node::IntermediateNode;
use crate::core::scanner::is_blank;
use crate::error::{ErrorKind, ParseError};
use crate::reader::events::Event;
use crate::reader::slice::SliceReader;
use log::debug;

/// A fully parsed document in intermediate form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Synthetic container; its children are the top-level elements
    root: IntermediateNode,
}

impl Document {
    /// Parse an XML string into an intermediate document
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        Self::from_events(SliceReader::new(input))
    }

    /// Build the tree from an event sequence.
    ///
    /// Structural errors found here carry no position since the events may
    /// not come from any input text.
    pub fn from_events<'a, I>(events: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = Result<Event<'a>, ParseError>>,
    {
        // Stack of open nodes; index 0 is the synthetic container
        let mut stack: Vec<IntermediateNode> = vec![IntermediateNode::new("")];
        let mut node_count = 0usize;

        for event in events {
            let depth = stack.len() - 1;
            match event? {
                Event::StartElement(name) => {
                    if stack.len() == 1 && !stack[0].children.is_empty() {
                        return Err(structure(
                            ErrorKind::MalformedMarkup,
                            format!("second root element '{name}'"),
                        ));
                    }
                    node_count += 1;
                    stack.push(IntermediateNode::new(name));
                }

                Event::Attribute { name, value } => match stack.last_mut().filter(|_| depth > 0) {
                    Some(node) if !node.has_content() => {
                        node.attributes.push((name.into_owned(), value.into_owned()));
                    }
                    Some(node) => {
                        return Err(structure(
                            ErrorKind::MalformedMarkup,
                            format!("attribute '{name}' after content of element '{}'", node.name),
                        ));
                    }
                    _ => {
                        return Err(structure(
                            ErrorKind::MalformedMarkup,
                            format!("attribute '{name}' outside any element"),
                        ));
                    }
                },

                Event::Text(content) => {
                    if stack.len() == 1 {
                        if !is_blank(&content) {
                            return Err(structure(
                                ErrorKind::MalformedMarkup,
                                "text outside the root element",
                            ));
                        }
                    } else if let Some(node) = stack.last_mut() {
                        node.text.push(content.into_owned());
                    }
                }

                Event::EndElement(name) => {
                    if stack.len() == 1 {
                        return Err(structure(
                            ErrorKind::UnbalancedTags,
                            format!("end tag '</{name}>' has no matching start tag"),
                        ));
                    }
                    let Some(node) = stack.pop() else {
                        return Err(structure(ErrorKind::UnbalancedTags, "element stack is empty"));
                    };
                    if node.name != name {
                        return Err(structure(
                            ErrorKind::UnbalancedTags,
                            format!("mismatched end tag: expected '</{}>', found '</{name}>'", node.name),
                        ));
                    }
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(node);
                    }
                }
            }
        }

        if let Some(open) = stack.get(1) {
            return Err(structure(
                ErrorKind::UnbalancedTags,
                format!("unexpected end of input, element '{}' is not closed", open.name),
            ));
        }
        let Some(root) = stack.pop() else {
            return Err(ParseError::empty_document(None));
        };
        if root.children.is_empty() {
            return Err(ParseError::empty_document(None));
        }

        debug!("built intermediate tree with {node_count} nodes");
        Ok(Document { root })
    }

    /// The single top-level element
    pub fn root_element(&self) -> Option<&IntermediateNode> {
        self.root.children.first()
    }

    /// Take the top-level element, releasing the container
    pub fn into_root_element(mut self) -> Option<IntermediateNode> {
        self.root.children.pop()
    }

    /// Number of elements in the document
    pub fn node_count(&self) -> usize {
        self.root_element().map_or(0, IntermediateNode::subtree_size)
    }
}

fn structure(kind: ErrorKind, message: impl Into<String>) -> ParseError {
    ParseError::new(kind, message, None)
}
