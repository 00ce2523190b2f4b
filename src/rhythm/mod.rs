//! Rhythm reconstruction engine
//!
//! Reconstructs the rhythmic structure of one measure from its
//! recognized chords: clusters of simultaneous onsets become `Slot`s,
//! each slot's exact offset from measure start is derived and
//! propagated, and every chord is resolved to a continuous `Voice`.
//!
//! ```text
//! recognized chords → Measure::new_slot (per onset cluster, left to right)
//!                   → Measure::build_voices (per slot, with ending chords)
//!                   → Measure::set_start_time (per slot, cascades into
//!                     beam groups and voice slot tables)
//! ```
//!
//! The whole pass for one measure is synchronous and runs to completion;
//! slots must be processed strictly left to right because voice
//! continuity at each slot depends on the state produced by the previous
//! one.

pub mod beam;
pub mod errors;
pub mod measure;
pub mod slot;
pub mod voice;

pub use beam::BeamGroup;
pub use errors::RhythmError;
pub use measure::Measure;
pub use slot::Slot;
pub use voice::{SlotVoice, Voice, VoiceStatus};
