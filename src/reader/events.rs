//! XML Event Types
//!
//! The structural events both materializers consume. Comments, processing
//! instructions and declarations never reach this level.

use std::borrow::Cow;
use std::fmt;

/// XML parsing event
///
/// Payloads borrow from the input whenever no decoding was needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    /// Start of an element: <name ...>
    StartElement(Cow<'a, str>),
    /// One attribute of the most recent `StartElement`, in document order
    Attribute { name: Cow<'a, str>, value: Cow<'a, str> },
    /// Character data, entities decoded. CDATA sections arrive verbatim
    Text(Cow<'a, str>),
    /// End of an element: </name>, or the implicit end of <name/>
    EndElement(Cow<'a, str>),
}

impl<'a> Event<'a> {
    pub fn start(name: impl Into<Cow<'a, str>>) -> Self {
        Event::StartElement(name.into())
    }

    pub fn attribute(name: impl Into<Cow<'a, str>>, value: impl Into<Cow<'a, str>>) -> Self {
        Event::Attribute {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn text(content: impl Into<Cow<'a, str>>) -> Self {
        Event::Text(content.into())
    }

    pub fn end(name: impl Into<Cow<'a, str>>) -> Self {
        Event::EndElement(name.into())
    }

    /// Get text content if applicable
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Event::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Detach the event from the input buffer
    pub fn into_owned(self) -> Event<'static> {
        match self {
            Event::StartElement(n) => Event::StartElement(Cow::Owned(n.into_owned())),
            Event::Attribute { name, value } => Event::Attribute {
                name: Cow::Owned(name.into_owned()),
                value: Cow::Owned(value.into_owned()),
            },
            Event::Text(t) => Event::Text(Cow::Owned(t.into_owned())),
            Event::EndElement(n) => Event::EndElement(Cow::Owned(n.into_owned())),
        }
    }
}

impl fmt::Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::StartElement(n) => write!(f, "start '{n}'"),
            Event::Attribute { name, .. } => write!(f, "attribute '{name}'"),
            Event::Text(_) => f.write_str("text"),
            Event::EndElement(n) => write!(f, "end '{n}'"),
        }
    }
}
