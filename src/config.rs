//! Parse configuration
//!
//! An explicit record passed into every parse call. There is no global parser
//! state; two concurrent calls may use different options.

/// Default marker key for the attribute mapping
pub const DEFAULT_ATTRIBUTE_KEY: &str = "$";
/// Default marker key for element text next to attributes or children
pub const DEFAULT_TEXT_KEY: &str = "_";

/// Options controlling how element structure folds into values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Key under which an element's attributes are folded
    pub attribute_key: String,
    /// Key under which text is folded when the element also has attributes or children
    pub text_key: String,
    /// Trim leading and trailing XML whitespace from an element's accumulated text
    pub trim_text: bool,
    /// Turn numeric-looking element text into `Value::Number`
    pub coerce_numbers: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            attribute_key: DEFAULT_ATTRIBUTE_KEY.to_string(),
            text_key: DEFAULT_TEXT_KEY.to_string(),
            trim_text: true,
            coerce_numbers: false,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute_key(mut self, key: impl Into<String>) -> Self {
        self.attribute_key = key.into();
        self
    }

    pub fn with_text_key(mut self, key: impl Into<String>) -> Self {
        self.text_key = key.into();
        self
    }

    pub fn with_trim_text(mut self, trim: bool) -> Self {
        self.trim_text = trim;
        self
    }

    pub fn with_coerce_numbers(mut self, coerce: bool) -> Self {
        self.coerce_numbers = coerce;
        self
    }
}
