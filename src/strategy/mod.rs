//! Materialization Strategy Module
//!
//! Two interchangeable ways of turning the event sequence into a value tree:
//! - Direct: folds elements while reading, never building a tree
//! - Indirect: builds the intermediate DOM first, then folds it in a second pass
//! - Parallel: rayon-driven batch conversion on top of either

pub mod direct;
pub mod indirect;
pub mod parallel;

use crate::config::ParseOptions;
use crate::error::ParseError;
use crate::value::Value;
use std::fmt;
use std::str::FromStr;

/// Which materializer to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    #[default]
    Direct,
    Indirect,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Direct => "direct",
            Strategy::Indirect => "indirect",
        }
    }

    /// Convert an XML string with this strategy
    pub fn parse(self, xml: &str, options: &ParseOptions) -> Result<Value, ParseError> {
        match self {
            Strategy::Direct => direct::parse(xml, options),
            Strategy::Indirect => indirect::parse(xml, options),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(Strategy::Direct),
            "indirect" => Ok(Strategy::Indirect),
            other => Err(format!("unknown strategy '{other}', expected 'direct' or 'indirect'")),
        }
    }
}
