//! Diagnostics for rhythm reconstruction
//!
//! Non-fatal anomalies (start-time conflicts, failed voice assignments)
//! are recorded as marks attached to the smallest relevant entity, a
//! chord or a slot, and surfaced later by the UI/export layers. The core
//! never aborts a whole measure over a local rhythm ambiguity.

use serde::{Deserialize, Serialize};

use crate::models::{ChordId, SlotId};

/// Severity level for diagnostic marks
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
}

/// Entity a diagnostic mark is attached to
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticTarget {
    Chord(ChordId),
    Slot(SlotId),
}

/// A diagnostic mark highlighting an issue on a chord or slot
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DiagnosticMark {
    /// Entity the issue is attached to
    pub target: DiagnosticTarget,
    /// Severity level
    pub severity: DiagnosticSeverity,
    /// Kind identifier (e.g., "start-time-conflict", "voice-assignment-failure")
    pub kind: String,
    /// Human-readable message
    pub message: String,
}

impl DiagnosticMark {
    /// Create a new diagnostic mark
    pub fn new(
        target: DiagnosticTarget,
        severity: DiagnosticSeverity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            target,
            severity,
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Collection of diagnostic marks for one measure
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Diagnostics {
    /// All diagnostic marks, in detection order
    pub marks: Vec<DiagnosticMark>,
}

impl Diagnostics {
    /// Create empty diagnostics
    pub fn new() -> Self {
        Self { marks: Vec::new() }
    }

    /// Add a mark
    pub fn add(&mut self, mark: DiagnosticMark) {
        log::debug!("diagnostic: {} ({:?})", mark.message, mark.target);
        self.marks.push(mark);
    }

    /// Whether no issue has been recorded
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Number of recorded marks
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// Marks attached to the given chord
    pub fn for_chord(&self, chord: ChordId) -> impl Iterator<Item = &DiagnosticMark> {
        self.marks
            .iter()
            .filter(move |mark| mark.target == DiagnosticTarget::Chord(chord))
    }

    /// Marks attached to the given slot
    pub fn for_slot(&self, slot: SlotId) -> impl Iterator<Item = &DiagnosticMark> {
        self.marks
            .iter()
            .filter(move |mark| mark.target == DiagnosticTarget::Slot(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks_filter_by_target() {
        let mut diags = Diagnostics::new();
        diags.add(DiagnosticMark::new(
            DiagnosticTarget::Chord(ChordId(0)),
            DiagnosticSeverity::Warning,
            "start-time-conflict",
            "reassigning start time",
        ));
        diags.add(DiagnosticMark::new(
            DiagnosticTarget::Slot(SlotId(1)),
            DiagnosticSeverity::Info,
            "note",
            "note",
        ));

        assert_eq!(diags.len(), 2);
        assert_eq!(diags.for_chord(ChordId(0)).count(), 1);
        assert_eq!(diags.for_chord(ChordId(1)).count(), 0);
        assert_eq!(diags.for_slot(SlotId(1)).count(), 1);
    }
}
