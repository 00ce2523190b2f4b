//! Measure arena
//!
//! One `Measure` owns every entity of one measure of one staff-part:
//! chords, slots, voices, beam groups, plus the diagnostics recorded
//! while reconstructing its rhythm. Measures are independent of one
//! another; an outer scheduler may process them in parallel as long as
//! each measure is driven by a single worker.

use serde::{Deserialize, Serialize};

use crate::diagnostics::{DiagnosticMark, DiagnosticSeverity, DiagnosticTarget, Diagnostics};
use crate::models::{format_rational, Chord, ChordId, Point, Rational, StaffId, StemDirection};

use super::beam::BeamGroup;
use super::slot::Slot;
use super::voice::Voice;

/// Arena for one measure of one staff-part
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Measure {
    /// Interline unit (pixel distance between staff lines), used to
    /// normalize vertical distances in the voice-continuity heuristics
    interline: u32,

    /// All chords of this measure, indexed by `ChordId`
    chords: Vec<Chord>,

    /// Slots in construction order; slot ids are 1-based
    slots: Vec<Slot>,

    /// Voices in allocation order; voice ids are 1-based
    voices: Vec<Voice>,

    /// Beam groups, indexed by `BeamGroupId`
    beam_groups: Vec<BeamGroup>,

    /// Issues detected while reconstructing this measure
    diagnostics: Diagnostics,
}

impl Measure {
    /// Create an empty measure with the given interline unit
    pub fn new(interline: u32) -> Self {
        assert!(interline > 0, "interline unit must be positive");
        Measure {
            interline,
            chords: Vec::new(),
            slots: Vec::new(),
            voices: Vec::new(),
            beam_groups: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Register a recognized chord, as supplied by chord detection
    pub fn add_chord(
        &mut self,
        staff: StaffId,
        center: Point,
        head_location: Option<Point>,
        stem_direction: StemDirection,
        duration: Rational,
    ) -> ChordId {
        let id = ChordId(self.chords.len());
        self.chords.push(Chord {
            id,
            staff,
            center,
            head_location,
            stem_direction,
            duration,
            slot: None,
            voice: None,
            beam_group: None,
            start_time: None,
        });
        id
    }

    /// Interline unit of the containing staff
    pub fn interline(&self) -> u32 {
        self.interline
    }

    /// The chord at the given arena index
    pub fn chord(&self, id: ChordId) -> &Chord {
        &self.chords[id.0]
    }

    pub(super) fn chord_mut(&mut self, id: ChordId) -> &mut Chord {
        &mut self.chords[id.0]
    }

    /// All chords of this measure
    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    /// All slots, in construction (left-to-right) order
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub(super) fn slots_mut(&mut self) -> &mut Vec<Slot> {
        &mut self.slots
    }

    /// All voices, in ascending id order
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub(super) fn voices_mut(&mut self) -> &mut Vec<Voice> {
        &mut self.voices
    }

    /// Number of voices allocated so far
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub(super) fn beam_groups_mut(&mut self) -> &mut Vec<BeamGroup> {
        &mut self.beam_groups
    }

    /// All beam groups of this measure
    pub fn beam_groups(&self) -> &[BeamGroup] {
        &self.beam_groups
    }

    /// Issues recorded while reconstructing this measure
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub(super) fn report(
        &mut self,
        target: DiagnosticTarget,
        kind: &str,
        message: impl Into<String>,
    ) {
        self.diagnostics.add(DiagnosticMark::new(
            target,
            DiagnosticSeverity::Warning,
            kind,
            message,
        ));
    }

    /// Render one slot and its chords for diagnostics ("slot#1 start=1/4 [Ch#00,Ch#01]")
    pub fn to_chord_string(&self, slot: &Slot) -> String {
        let mut sb = format!("slot#{}", slot.id().0);

        if let Some(start) = slot.start_time() {
            sb.push_str(&format!(" start={:>5}", format_rational(start)));
        }

        sb.push_str(" [");
        for (i, &chord) in slot.chords().iter().enumerate() {
            if i > 0 {
                sb.push(',');
            }
            sb.push_str(&format!("Ch#{:02}", chord.0));
        }
        sb.push(']');
        sb
    }

    /// Render one slot as a voice-indexed row for diagnostics
    pub fn to_voice_string(&self, slot: &Slot) -> String {
        let start = match slot.start_time() {
            Some(start) => format_rational(start),
            None => "none".to_string(),
        };
        let mut sb = format!("slot#{} start={:>5} [", slot.id().0, start);

        for iv in 1..=self.voice_count() {
            if iv > 1 {
                sb.push_str(", ");
            }

            let held = slot.chords().iter().find(|&&id| {
                self.chord(id).voice.map(|voice| voice.0) == Some(iv)
            });

            match held {
                Some(&id) => {
                    let chord = self.chord(id);
                    sb.push_str(&format!(
                        "V{} Ch#{:02} St{} Dur={:>5}",
                        iv,
                        id.0,
                        chord.staff.0,
                        format_rational(chord.duration)
                    ));
                }
                None => sb.push_str("----------------------"),
            }
        }

        sb.push(']');
        sb
    }

    /// Dump every slot of this measure, one chord row and one voice row
    /// per slot. Diagnostic output only, not a stable interchange format.
    pub fn dump_slots(&self) -> String {
        let mut out = String::new();
        for slot in &self.slots {
            out.push_str(&self.to_chord_string(slot));
            out.push('\n');
            out.push_str(&self.to_voice_string(slot));
            out.push('\n');
        }
        out
    }
}
