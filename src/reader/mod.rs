//! XML Reader Module
//!
//! - SliceReader: zero-copy event reader over a `&str`
//! - Events: the structural event model both strategies consume

pub mod events;
pub mod slice;

pub use events::Event;
pub use slice::{parse_events, SliceReader};
