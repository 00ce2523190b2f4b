//! Rhythm reconstruction core
//!
//! Rebuilds the rhythmic structure of recognized music notation: chords
//! already grouped per measure are clustered into time slots (one per
//! simultaneous onset), each slot's exact rational offset from measure
//! start is computed and propagated, and every chord is assigned to a
//! continuous voice whose chords never overlap in time.
//!
//! Glyph recognition, layout, editing and serialization are external
//! collaborators: they supply chords (positions, durations, staff
//! membership, beam grouping) and consume slot start times and voice
//! ids through the [`rhythm::Measure`] arena.

pub mod diagnostics;
pub mod injection;
pub mod models;
pub mod rhythm;

// Re-export commonly used types
pub use models::core::*;
pub use models::duration::{format_rational, Rational};
pub use rhythm::{BeamGroup, Measure, RhythmError, Slot, SlotVoice, Voice, VoiceStatus};
