//! xmlobj - XML to generic value-tree conversion
//!
//! Converts an XML document into a tree of [`Value`]s: elements become
//! mappings, repeated children become sequences, attributes and text sit
//! under marker keys (`$` and `_` by default).
//!
//! Strategies:
//! - Direct: folds each element as its end tag arrives (single pass)
//! - Indirect: builds an intermediate DOM, then folds it (two passes)
//! - Parallel: rayon batch conversion over either strategy
//!
//! Both strategies produce identical trees for every well-formed input.
//!
//! ```
//! use serde_json::json;
//!
//! let value = xmlobj::parse_direct(r#"<item id="1"><name>Cake</name></item>"#).unwrap();
//! assert_eq!(
//!     serde_json::to_value(&value).unwrap(),
//!     json!({"item": {"$": {"id": "1"}, "name": "Cake"}})
//! );
//! ```

pub mod config;
pub mod core;
pub mod dom;
pub mod error;
pub mod fold;
pub mod reader;
pub mod strategy;
pub mod value;

#[cfg(feature = "nif")]
mod term;

pub use config::ParseOptions;
pub use error::{ErrorKind, ParseError, Position};
pub use reader::{parse_events, Event, SliceReader};
pub use strategy::Strategy;
pub use value::{Mapping, Value};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Public API
// ============================================================================

/// Convert with the single-pass materializer and default options
pub fn parse_direct(xml: &str) -> Result<Value, ParseError> {
    parse_direct_with(xml, &ParseOptions::default())
}

/// Convert with the two-pass materializer and default options
pub fn parse_indirect(xml: &str) -> Result<Value, ParseError> {
    parse_indirect_with(xml, &ParseOptions::default())
}

pub fn parse_direct_with(xml: &str, options: &ParseOptions) -> Result<Value, ParseError> {
    strategy::direct::parse(xml, options)
}

pub fn parse_indirect_with(xml: &str, options: &ParseOptions) -> Result<Value, ParseError> {
    strategy::indirect::parse(xml, options)
}

pub fn parse(xml: &str, strategy: Strategy, options: &ParseOptions) -> Result<Value, ParseError> {
    strategy.parse(xml, options)
}

/// Convert raw bytes.
///
/// UTF-8 (with or without BOM) and UTF-16 LE/BE are accepted. Invalid
/// UTF-8 fails with the offset of the first bad byte.
pub fn parse_bytes(bytes: &[u8], strategy: Strategy, options: &ParseOptions) -> Result<Value, ParseError> {
    let text = crate::core::encoding::decode_document(bytes)?;
    strategy.parse(&text, options)
}

// ============================================================================
// NIF Bindings
// ============================================================================

#[cfg(feature = "nif")]
mod atoms {
    rustler::atoms! {
        ok,
        error,
    }
}

#[cfg(feature = "nif")]
fn convert_binary<'a>(
    env: rustler::Env<'a>,
    input: rustler::Binary<'a>,
    strategy: Strategy,
) -> rustler::NifResult<rustler::Term<'a>> {
    use rustler::Encoder;

    match parse_bytes(input.as_slice(), strategy, &ParseOptions::default()) {
        Ok(value) => Ok((atoms::ok(), term::value_to_term(env, &value)?).encode(env)),
        Err(e) => Ok((atoms::error(), term::error_to_term(env, &e)).encode(env)),
    }
}

/// `parse_direct/1`: `{:ok, term}` or `{:error, {kind, message, line, column}}`
#[cfg(feature = "nif")]
#[rustler::nif(name = "parse_direct", schedule = "DirtyCpu")]
fn nif_parse_direct<'a>(
    env: rustler::Env<'a>,
    input: rustler::Binary<'a>,
) -> rustler::NifResult<rustler::Term<'a>> {
    convert_binary(env, input, Strategy::Direct)
}

/// `parse_indirect/1`: same contract as `parse_direct/1`
#[cfg(feature = "nif")]
#[rustler::nif(name = "parse_indirect", schedule = "DirtyCpu")]
fn nif_parse_indirect<'a>(
    env: rustler::Env<'a>,
    input: rustler::Binary<'a>,
) -> rustler::NifResult<rustler::Term<'a>> {
    convert_binary(env, input, Strategy::Indirect)
}

#[cfg(feature = "nif")]
rustler::init!("Elixir.XmlObj.Native");
