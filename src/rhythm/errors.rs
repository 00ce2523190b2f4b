//! Error types for rhythm reconstruction
//!
//! Hard failures are rare in this core: most anomalies (start-time
//! conflicts, ambiguous voices) are recorded as diagnostics and
//! processing continues. The errors here cover the structural violations
//! a caller must not ignore.

use thiserror::Error;

use crate::models::{ChordId, VoiceId};

/// Failures of voice assignment
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RhythmError {
    /// A chord already carries a different established voice; merging two
    /// distinct voices is forbidden.
    #[error("chord {chord:?} already belongs to voice {current:?}, cannot assign voice {requested:?}")]
    VoiceConflict {
        chord: ChordId,
        current: VoiceId,
        requested: VoiceId,
    },

    /// The chord has not been gathered into a slot yet, so its voice
    /// occupancy cannot be recorded.
    #[error("chord {chord:?} has no slot, cannot assign a voice")]
    ChordWithoutSlot { chord: ChordId },
}
