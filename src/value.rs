//! Generic value tree produced by both strategies
//!
//! A closed set of shapes: text scalars, optional numeric scalars, ordered
//! mappings and sequences. There is no boolean or null.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::mem;

/// Ordered string-keyed mapping
pub type Mapping = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Element text or attribute value
    String(String),
    /// Numeric-looking element text, kept in its lexical form
    Number(String),
    Mapping(Mapping),
    Sequence(Vec<Value>),
}

impl Value {
    /// Scalar for element text, coerced to `Number` when asked and the text
    /// reads as a finite number
    pub fn from_text(text: String, coerce_numbers: bool) -> Value {
        if coerce_numbers && is_numeric(&text) {
            Value::Number(text)
        } else {
            Value::String(text)
        }
    }

    /// Look up a key in a mapping
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping()?.get(key)
    }

    /// Text of a `String` or `Number`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Number(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Parse a `Number` as `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.parse().ok(),
            _ => None,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Mapping(_))
    }

    /// Longest path from this value down to a descendant; scalars and empty containers are 0
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 0usize)];
        while let Some((value, level)) = pending.pop() {
            deepest = deepest.max(level);
            match value {
                Value::Mapping(entries) => pending.extend(entries.values().map(|v| (v, level + 1))),
                Value::Sequence(items) => pending.extend(items.iter().map(|v| (v, level + 1))),
                Value::String(_) | Value::Number(_) => {}
            }
        }
        deepest
    }

    fn is_container(&self) -> bool {
        matches!(self, Value::Mapping(_) | Value::Sequence(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Value::Sequence(_))
    }

    /// Shape name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Mapping(_) => "mapping",
            Value::Sequence(_) => "sequence",
        }
    }

    /// Same keys, same key order and same shapes all the way down.
    ///
    /// `==` on mappings ignores key order; this does not.
    pub fn same_structure(&self, other: &Value) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            match (a, b) {
                (Value::String(x), Value::String(y)) | (Value::Number(x), Value::Number(y)) => {
                    if x != y {
                        return false;
                    }
                }
                (Value::Mapping(x), Value::Mapping(y)) => {
                    if x.len() != y.len() || !x.keys().eq(y.keys()) {
                        return false;
                    }
                    pending.extend(x.values().zip(y.values()));
                }
                (Value::Sequence(x), Value::Sequence(y)) => {
                    if x.len() != y.len() {
                        return false;
                    }
                    pending.extend(x.iter().zip(y.iter()));
                }
                _ => return false,
            }
        }
        true
    }
}

// Iterative drop: a deeply nested result must not recurse once per level.
impl Drop for Value {
    fn drop(&mut self) {
        let mut pending: Vec<Value> = match self {
            Value::Mapping(entries) if entries.values().any(Value::is_container) => {
                entries.drain(..).map(|(_, value)| value).collect()
            }
            Value::Sequence(items) if items.iter().any(Value::is_container) => mem::take(items),
            _ => return,
        };
        while let Some(mut value) = pending.pop() {
            match &mut value {
                Value::Mapping(entries) => pending.extend(entries.drain(..).map(|(_, v)| v)),
                Value::Sequence(items) => pending.append(items),
                Value::String(_) | Value::Number(_) => {}
            }
        }
    }
}

/// True when `text` reads as a finite integer or float
pub fn is_numeric(text: &str) -> bool {
    text.parse::<i64>().is_ok() || text.parse::<f64>().is_ok_and(f64::is_finite)
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Self {
        Value::Mapping(m)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Number(n) => {
                if let Ok(i) = n.parse::<i64>() {
                    serializer.serialize_i64(i)
                } else if let Ok(u) = n.parse::<u64>() {
                    serializer.serialize_u64(u)
                } else {
                    match n.parse::<f64>() {
                        Ok(f) if f.is_finite() => serializer.serialize_f64(f),
                        _ => serializer.serialize_str(n),
                    }
                }
            }
            Value::Mapping(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Sequence(items) => serializer.collect_seq(items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(entries: &[(&str, Value)]) -> Value {
        Value::Mapping(entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
    }

    #[test]
    fn test_numeric_detection() {
        for s in ["0", "-12", "0001", "0.55", "1e3", "+7", ".5"] {
            assert!(is_numeric(s), "{s}");
        }
        for s in ["", "abc", "1.2.3", "inf", "NaN", " 1", "0x10", "1_000"] {
            assert!(!is_numeric(s), "{s}");
        }
    }

    #[test]
    fn test_from_text() {
        assert_eq!(Value::from_text("0.8".into(), false), Value::String("0.8".into()));
        assert_eq!(Value::from_text("0.8".into(), true), Value::Number("0.8".into()));
        assert_eq!(Value::from_text("Cake".into(), true), Value::String("Cake".into()));
    }

    #[test]
    fn test_accessors() {
        let v = mapping(&[
            ("name", Value::from("Cake")),
            ("tags", Value::Sequence(vec![Value::from("a"), Value::from("b")])),
        ]);
        assert_eq!(v.get("name").and_then(Value::as_str), Some("Cake"));
        assert_eq!(v.get("tags").and_then(Value::as_sequence).map(<[Value]>::len), Some(2));
        assert!(v.get("missing").is_none());
        assert!(Value::from("x").get("name").is_none());
        assert_eq!(Value::Number("2.5".into()).as_f64(), Some(2.5));
        assert_eq!(v.kind_name(), "mapping");
    }

    #[test]
    fn test_serialize() {
        let v = mapping(&[
            ("s", Value::from("0.55")),
            ("i", Value::Number("0001".into())),
            ("f", Value::Number("0.8".into())),
            ("seq", Value::Sequence(vec![Value::from("x")])),
        ]);
        assert_eq!(
            serde_json::to_value(&v).unwrap(),
            json!({"s": "0.55", "i": 1, "f": 0.8, "seq": ["x"]})
        );
    }

    #[test]
    fn test_serialize_keeps_key_order() {
        let v = mapping(&[("b", Value::from("1")), ("a", Value::from("2"))]);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"{"b":"1","a":"2"}"#);
    }

    #[test]
    fn test_deep_value_drops_without_recursion() {
        let depth = 100_000;
        let xml = format!("{}leaf{}", "<n>".repeat(depth), "</n>".repeat(depth));
        let options = crate::config::ParseOptions::default();

        let direct = crate::strategy::direct::parse(&xml, &options).unwrap();
        let indirect = crate::strategy::indirect::parse(&xml, &options).unwrap();
        assert!(direct.same_structure(&indirect));
        assert_eq!(direct.depth(), depth);
        drop(direct);
        drop(indirect);

        let mut nested = Value::Sequence(Vec::new());
        for _ in 0..depth {
            nested = Value::Sequence(vec![nested, Value::from("x")]);
        }
        drop(nested);
    }

    #[test]
    fn test_depth() {
        assert_eq!(Value::from("x").depth(), 0);
        assert_eq!(Value::Sequence(Vec::new()).depth(), 0);
        assert_eq!(Value::Sequence(vec![Value::from("x")]).depth(), 1);
        let v = mapping(&[
            ("a", Value::from("1")),
            ("b", Value::Sequence(vec![mapping(&[("c", Value::from("2"))])])),
        ]);
        assert_eq!(v.depth(), 3);
    }

    #[test]
    fn test_same_structure_checks_order() {
        let a = mapping(&[("x", Value::from("1")), ("y", Value::from("2"))]);
        let b = mapping(&[("y", Value::from("2")), ("x", Value::from("1"))]);
        assert_eq!(a, b);
        assert!(!a.same_structure(&b));
        assert!(a.same_structure(&a.clone()));
        assert!(!Value::from("1").same_structure(&Value::Number("1".into())));
    }
}
