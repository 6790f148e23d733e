//! Parallel batch conversion
//!
//! Uses Rayon to convert many independent documents at once. Each document
//! is still parsed by a single thread; nothing is shared between calls.

use super::Strategy;
use crate::config::ParseOptions;
use crate::error::ParseError;
use crate::value::Value;
use log::debug;
use rayon::prelude::*;

/// Convert many documents in parallel, one result per input in input order
pub fn parse_batch<S>(inputs: &[S], strategy: Strategy, options: &ParseOptions) -> Vec<Result<Value, ParseError>>
where
    S: AsRef<str> + Sync,
{
    debug!("{strategy}: converting batch of {} documents", inputs.len());
    inputs
        .par_iter()
        .map(|xml| strategy.parse(xml.as_ref(), options))
        .collect()
}

/// Convert a batch and stop at the first failure
pub fn try_parse_batch<S>(inputs: &[S], strategy: Strategy, options: &ParseOptions) -> Result<Vec<Value>, ParseError>
where
    S: AsRef<str> + Sync,
{
    inputs
        .par_iter()
        .map(|xml| strategy.parse(xml.as_ref(), options))
        .collect()
}

/// Run both strategies on the same document concurrently
///
/// Returns `(direct, indirect)`.
pub fn parse_both(
    xml: &str,
    options: &ParseOptions,
) -> (Result<Value, ParseError>, Result<Value, ParseError>) {
    rayon::join(
        || Strategy::Direct.parse(xml, options),
        || Strategy::Indirect.parse(xml, options),
    )
}
