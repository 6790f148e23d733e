//! Indirect materializer
//!
//! Phase one builds a [`Document`] from the full event sequence; phase two
//! folds that tree bottom-up through the same [`ElementBuilder`] the direct
//! path uses. The walk keeps its own stack, so nesting depth is limited by
//! memory rather than by the thread's call stack.

use crate::config::ParseOptions;
use crate::dom::{Document, IntermediateNode};
use crate::error::ParseError;
use crate::fold::{wrap_root, ElementBuilder};
use crate::reader::events::Event;
use crate::value::Value;
use log::debug;
use std::mem;
use std::vec;

/// A node whose children are still being folded
struct Frame {
    name: String,
    builder: ElementBuilder,
    children: vec::IntoIter<IntermediateNode>,
}

impl Frame {
    fn open(mut node: IntermediateNode) -> Self {
        let mut builder = ElementBuilder::new();
        for (name, value) in mem::take(&mut node.attributes) {
            builder.add_attribute(name, value);
        }
        for segment in &node.text {
            builder.add_text(segment);
        }
        Frame {
            name: mem::take(&mut node.name),
            builder,
            children: mem::take(&mut node.children).into_iter(),
        }
    }
}

/// Fold one element and everything below it
pub fn fold_node(node: IntermediateNode, options: &ParseOptions) -> (String, Value) {
    let mut current = Frame::open(node);
    let mut parents: Vec<Frame> = Vec::new();
    loop {
        if let Some(child) = current.children.next() {
            parents.push(mem::replace(&mut current, Frame::open(child)));
            continue;
        }

        let value = current.builder.finish(options);
        match parents.pop() {
            Some(mut parent) => {
                parent.builder.add_child(current.name, value);
                current = parent;
            }
            None => return (current.name, value),
        }
    }
}

/// Phase two: turn an intermediate document into the output value
pub fn transform(document: Document, options: &ParseOptions) -> Result<Value, ParseError> {
    let nodes = document.node_count();
    let root = document
        .into_root_element()
        .ok_or_else(|| ParseError::empty_document(None))?;
    let (name, value) = fold_node(root, options);
    debug!("indirect: folded {nodes} intermediate nodes");
    Ok(wrap_root(name, value))
}

/// Both phases over an event sequence
pub fn materialize<'a, I>(events: I, options: &ParseOptions) -> Result<Value, ParseError>
where
    I: IntoIterator<Item = Result<Event<'a>, ParseError>>,
{
    transform(Document::from_events(events)?, options)
}

/// Convert an XML string in two passes
pub fn parse(xml: &str, options: &ParseOptions) -> Result<Value, ParseError> {
    transform(Document::parse(xml)?, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn convert(xml: &str) -> serde_json::Value {
        serde_json::to_value(parse(xml, &ParseOptions::default()).unwrap()).unwrap()
    }

    #[test]
    fn test_leaf_root() {
        assert_eq!(convert("<name>Cake</name>"), json!({"name": "Cake"}));
    }

    #[test]
    fn test_attributes_and_children() {
        let xml = r#"<item id="0001" type="donut"><name>Cake</name><ppu>0.55</ppu></item>"#;
        assert_eq!(
            convert(xml),
            json!({"item": {"$": {"id": "0001", "type": "donut"}, "name": "Cake", "ppu": "0.55"}})
        );
    }

    #[test]
    fn test_fold_node_directly() {
        let mut node = IntermediateNode::new("a");
        node.text.push(" x ".into());
        let mut child = IntermediateNode::new("b");
        child.attributes.push(("k".into(), "v".into()));
        node.children.push(child);

        let (name, value) = fold_node(node, &ParseOptions::default());
        assert_eq!(name, "a");
        assert_eq!(
            serde_json::to_value(value).unwrap(),
            json!({"b": {"$": {"k": "v"}}, "_": "x"})
        );
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 400;
        let xml = format!("{}leaf{}", "<n>".repeat(depth), "</n>".repeat(depth));
        let opts = ParseOptions::default();
        let value = parse(&xml, &opts).unwrap();

        let mut current = &value;
        for _ in 0..depth {
            current = current.get("n").unwrap();
        }
        assert_eq!(current.as_str(), Some("leaf"));
        assert_eq!(value, crate::strategy::direct::parse(&xml, &opts).unwrap());
    }

    #[test]
    fn test_malformed_fails_in_phase_one() {
        let err = parse("<a><b></a>", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnbalancedTags);
    }
}
