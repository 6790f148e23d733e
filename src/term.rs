//! Elixir Term Conversion Utilities
//!
//! Converts value trees and parse errors to Elixir terms.

use crate::error::{ErrorKind, ParseError};
use crate::value::Value;
use rustler::{Encoder, Env, NewBinary, NifResult, Term};

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    malformed_markup,
    unbalanced_tags,
    empty_document,
}

/// Nesting limit for term conversion. Conversion recurses once per level and
/// runs on a dirty scheduler thread, whose stack is much smaller than a
/// regular thread's; deeper values raise `:nesting_too_deep`.
pub const MAX_TERM_DEPTH: usize = 1024;

/// Convert a value tree: mappings to maps, sequences to lists, scalars to binaries
pub fn value_to_term<'a>(env: Env<'a>, value: &Value) -> NifResult<Term<'a>> {
    if value.depth() > MAX_TERM_DEPTH {
        return Err(rustler::Error::RaiseAtom("nesting_too_deep"));
    }
    nested_to_term(env, value)
}

fn nested_to_term<'a>(env: Env<'a>, value: &Value) -> NifResult<Term<'a>> {
    match value {
        Value::String(s) | Value::Number(s) => Ok(str_to_binary(env, s)),
        Value::Sequence(items) => {
            // Build in reverse order so prepending keeps document order
            let mut list = Term::list_new_empty(env);
            for item in items.iter().rev() {
                list = list.list_prepend(nested_to_term(env, item)?);
            }
            Ok(list)
        }
        Value::Mapping(entries) => {
            let pairs = entries
                .iter()
                .map(|(key, item)| Ok((str_to_binary(env, key), nested_to_term(env, item)?)))
                .collect::<NifResult<Vec<_>>>()?;
            Term::map_from_pairs(env, &pairs)
        }
    }
}

/// `{kind, message, line, column}`; line and column are nil without a position
pub fn error_to_term<'a>(env: Env<'a>, err: &ParseError) -> Term<'a> {
    let kind = match err.kind {
        ErrorKind::MalformedMarkup => malformed_markup(),
        ErrorKind::UnbalancedTags => unbalanced_tags(),
        ErrorKind::EmptyDocument => empty_document(),
    };
    let (line, column) = err.position.map(|p| (p.line, p.column)).unzip();
    (kind, str_to_binary(env, &err.message), line, column).encode(env)
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}
