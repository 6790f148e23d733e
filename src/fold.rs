//! Folding rules shared by both materializers
//!
//! An [`ElementBuilder`] collects one element's attributes, child values and
//! text, then folds them into that element's [`Value`]:
//!
//! - children are grouped by tag name in first-occurrence order; a group of
//!   one is stored bare, larger groups become a sequence in document order
//! - attributes fold under the attribute marker key, text under the text
//!   marker key, but only when the element also has attributes or children
//! - an element with neither collapses to its text
//!
//! Whether text arrives before, between or after children makes no
//! difference to the result, so the direct and indirect paths agree no
//! matter how they interleave their calls.

use crate::config::ParseOptions;
use crate::value::{Mapping, Value};
use indexmap::IndexMap;

/// Accumulates one element and folds it into a [`Value`]
#[derive(Debug, Default)]
pub struct ElementBuilder {
    attributes: Mapping,
    children: IndexMap<String, Vec<Value>>,
    text: String,
}

impl ElementBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an attribute. A repeated name keeps its first position and the last value.
    pub fn add_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), Value::String(value.into()));
    }

    /// Record a completed child element's value
    pub fn add_child(&mut self, name: impl Into<String>, value: Value) {
        self.children.entry(name.into()).or_default().push(value);
    }

    /// Append one text segment verbatim; trimming happens once in [`finish`](Self::finish)
    pub fn add_text(&mut self, segment: &str) {
        self.text.push_str(segment);
    }

    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Accumulated text so far, untrimmed
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Fold the element into its value.
    ///
    /// With `trim_text` the accumulated text loses leading and trailing XML
    /// whitespace; whitespace between segments is kept.
    pub fn finish(self, options: &ParseOptions) -> Value {
        let ElementBuilder { attributes, children, mut text } = self;
        if options.trim_text {
            trim_in_place(&mut text);
        }

        if attributes.is_empty() && children.is_empty() {
            return Value::from_text(text, options.coerce_numbers);
        }

        // Entries go in as attribute marker, children, text marker. A marker
        // key that equals a child tag name joins that group.
        let mut groups: IndexMap<String, Vec<Value>> = IndexMap::with_capacity(children.len() + 2);
        if !attributes.is_empty() {
            groups
                .entry(options.attribute_key.clone())
                .or_default()
                .push(Value::Mapping(attributes));
        }
        for (name, mut values) in children {
            groups.entry(name).or_default().append(&mut values);
        }
        if !is_xml_blank(&text) {
            groups
                .entry(options.text_key.clone())
                .or_default()
                .push(Value::from_text(text, options.coerce_numbers));
        }

        Value::Mapping(
            groups
                .into_iter()
                .map(|(key, values)| {
                    let value = match <[Value; 1]>::try_from(values) {
                        Ok([only]) => only,
                        Err(values) => Value::Sequence(values),
                    };
                    (key, value)
                })
                .collect(),
        )
    }
}

/// Document result: a one-entry mapping from the root tag name to its value
pub fn wrap_root(name: impl Into<String>, value: Value) -> Value {
    let mut root = Mapping::with_capacity(1);
    root.insert(name.into(), value);
    Value::Mapping(root)
}

fn is_xml_ws(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Trim XML whitespace only; other Unicode spaces are content
pub fn trim_xml_whitespace(s: &str) -> &str {
    s.trim_matches(is_xml_ws)
}

fn trim_in_place(text: &mut String) {
    let trimmed = trim_xml_whitespace(text);
    if trimmed.len() != text.len() {
        *text = trimmed.to_string();
    }
}

fn is_xml_blank(s: &str) -> bool {
    s.chars().all(is_xml_ws)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn json(v: &Value) -> serde_json::Value {
        serde_json::to_value(v).unwrap()
    }

    fn leaf(text: &str) -> Value {
        Value::String(text.to_string())
    }

    #[test]
    fn test_leaf_collapses_to_text() {
        let opts = ParseOptions::default();
        let mut b = ElementBuilder::new();
        b.add_text("  Cake \n");
        assert_eq!(b.finish(&opts), leaf("Cake"));
    }

    #[test]
    fn test_empty_leaf_is_empty_string() {
        let opts = ParseOptions::default();
        assert_eq!(ElementBuilder::new().finish(&opts), leaf(""));
    }

    #[test]
    fn test_segments_joined_then_trimmed() {
        let opts = ParseOptions::default();
        let mut b = ElementBuilder::new();
        for seg in ["\n  Hello ", "\n", " world\n"] {
            b.add_text(seg);
        }
        assert_eq!(b.text(), "\n  Hello \n world\n");
        assert_eq!(b.finish(&opts), leaf("Hello \n world"));
    }

    #[test]
    fn test_text_around_child_keeps_inner_space() {
        let opts = ParseOptions::default();
        let mut b = ElementBuilder::new();
        b.add_text("Hello ");
        b.add_child("b", leaf("big"));
        b.add_text(" world");
        assert_eq!(json(&b.finish(&opts)), json!({"b": "big", "_": "Hello  world"}));
    }

    #[test]
    fn test_segments_verbatim_without_trim() {
        let opts = ParseOptions::default().with_trim_text(false);
        let mut b = ElementBuilder::new();
        b.add_text(" a ");
        b.add_text("\n");
        assert_eq!(b.finish(&opts), leaf(" a \n"));
    }

    #[test]
    fn test_repeated_children_become_sequence() {
        let opts = ParseOptions::default();
        let mut b = ElementBuilder::new();
        b.add_child("item", leaf("1"));
        b.add_child("other", leaf("x"));
        b.add_child("item", leaf("2"));
        let v = b.finish(&opts);
        assert_eq!(json(&v), json!({"item": ["1", "2"], "other": "x"}));
        let keys: Vec<_> = v.as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["item", "other"]);
    }

    #[test]
    fn test_attributes_children_and_text() {
        let opts = ParseOptions::default();
        let mut b = ElementBuilder::new();
        b.add_attribute("id", "0001");
        b.add_attribute("type", "donut");
        b.add_text("extra");
        b.add_child("name", leaf("Cake"));
        let v = b.finish(&opts);
        assert_eq!(
            json(&v),
            json!({"$": {"id": "0001", "type": "donut"}, "name": "Cake", "_": "extra"})
        );
        let keys: Vec<_> = v.as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["$", "name", "_"]);
    }

    #[test]
    fn test_attribute_only_element() {
        let opts = ParseOptions::default();
        let mut b = ElementBuilder::new();
        b.add_attribute("id", "1");
        assert_eq!(json(&b.finish(&opts)), json!({"$": {"id": "1"}}));
    }

    #[test]
    fn test_whitespace_text_omitted_next_to_children() {
        let opts = ParseOptions::default().with_trim_text(false);
        let mut b = ElementBuilder::new();
        b.add_text("\n  ");
        b.add_child("a", leaf("1"));
        b.add_text("\n");
        assert_eq!(json(&b.finish(&opts)), json!({"a": "1"}));
    }

    #[test]
    fn test_marker_key_collision_folds_into_sequence() {
        let opts = ParseOptions::default().with_text_key("note");
        let mut b = ElementBuilder::new();
        b.add_child("note", leaf("child"));
        b.add_text("own text");
        assert_eq!(json(&b.finish(&opts)), json!({"note": ["child", "own text"]}));
    }

    #[test]
    fn test_custom_markers() {
        let opts = ParseOptions::default().with_attribute_key("@").with_text_key("#text");
        let mut b = ElementBuilder::new();
        b.add_attribute("lang", "en");
        b.add_text("hi");
        assert_eq!(json(&b.finish(&opts)), json!({"@": {"lang": "en"}, "#text": "hi"}));
    }

    #[test]
    fn test_numeric_coercion_applies_to_text_only() {
        let opts = ParseOptions::default().with_coerce_numbers(true);
        let mut b = ElementBuilder::new();
        b.add_attribute("id", "7");
        b.add_text("0.55");
        assert_eq!(json(&b.finish(&opts)), json!({"$": {"id": "7"}, "_": 0.55}));

        let mut b = ElementBuilder::new();
        b.add_text("Cake");
        assert_eq!(b.finish(&opts), leaf("Cake"));
    }

    #[test]
    fn test_nbsp_is_not_trimmed() {
        assert_eq!(trim_xml_whitespace("\u{A0}x\t"), "\u{A0}x");
    }

    #[test]
    fn test_wrap_root() {
        assert_eq!(json(&wrap_root("doc", leaf("x"))), json!({"doc": "x"}));
    }
}
