//! Data models for rhythm reconstruction
//!
//! Leaf types shared across the engine: exact rational time values and
//! the chord/id/geometry vocabulary used by slots and voices.

pub mod core;
pub mod duration;

// Re-export commonly used types
pub use self::core::*;
pub use duration::{format_rational, Rational};
