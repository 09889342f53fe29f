//! Channel layer: byte-stream cleanup and pattern matching.
//!
//! Incoming bytes pass through the telnet filter, then ANSI stripping, and
//! land in a pattern buffer that flows search with tagged pattern sets.

mod buffer;
mod patterns;
mod telnet;

pub use buffer::PatternBuffer;
pub use patterns::{Match, PatternSet};
pub use telnet::{Filtered, TelnetFilter};
