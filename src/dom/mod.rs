//! DOM Module - intermediate tree for the indirect strategy
//!
//! Holds raw element structure (names, attributes, text segments, ordered
//! children) between event consumption and folding.

pub mod document;
pub mod node;

pub use document::Document;
pub use node::IntermediateNode;
