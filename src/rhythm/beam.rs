//! Beam groups
//!
//! Chords visually connected by a beam share one rhythmic cluster: once
//! the onset of any one of them is known, the whole group's start times
//! are derived by chaining durations, each chord beginning where the
//! previous one ends.

use serde::{Deserialize, Serialize};

use crate::diagnostics::DiagnosticTarget;
use crate::models::{BeamGroupId, ChordId};

use super::measure::Measure;

/// A set of chords connected by a beam, left to right
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BeamGroup {
    /// Arena index of this group
    id: BeamGroupId,

    /// Member chords, in ascending abscissa order
    chords: Vec<ChordId>,
}

impl BeamGroup {
    /// The group's arena index
    pub fn id(&self) -> BeamGroupId {
        self.id
    }

    /// Member chords, left to right
    pub fn chords(&self) -> &[ChordId] {
        &self.chords
    }
}

impl Measure {
    /// The beam group at the given arena index
    pub fn beam_group(&self, id: BeamGroupId) -> &BeamGroup {
        &self.beam_groups()[id.0]
    }

    /// Register a beamed group of chords, ordered by abscissa
    pub fn new_beam_group(&mut self, chords: &[ChordId]) -> BeamGroupId {
        let id = BeamGroupId(self.beam_groups().len());

        let mut members = chords.to_vec();
        members.sort_by_key(|&chord| self.chord(chord).center.x);
        for &chord in &members {
            self.chord_mut(chord).beam_group = Some(id);
        }

        self.beam_groups_mut().push(BeamGroup { id, chords: members });
        id
    }

    /// Derive consistent start times across a beamed group
    ///
    /// Any member with a known start time anchors the group, regardless
    /// of which chord triggered the propagation: the first chord's start
    /// is recovered by walking durations back from the anchor, then the
    /// whole group is stamped forward. Conflicting derived times go
    /// through the chord-level first-writer-wins path and surface as
    /// diagnostics, never as silent overwrites.
    pub fn compute_beam_start_times(&mut self, group_id: BeamGroupId) {
        let members = self.beam_group(group_id).chords.clone();

        let anchor = members
            .iter()
            .position(|&chord| self.chord(chord).start_time.is_some());
        let Some(anchor) = anchor else {
            if let Some(&first) = members.first() {
                self.report(
                    DiagnosticTarget::Chord(first),
                    "beam-group-untimed",
                    "computing beam group times with no chord start time known",
                );
            }
            return;
        };
        let Some(mut start) = self.chord(members[anchor]).start_time else {
            return;
        };

        // Recover the first chord's start from the anchor
        for &chord in members[..anchor].iter().rev() {
            start -= self.chord(chord).duration;
        }

        // Each chord begins where the previous one ends
        for &chord in &members {
            self.set_chord_start_time(chord, start);
            start += self.chord(chord).duration;
        }
    }
}
