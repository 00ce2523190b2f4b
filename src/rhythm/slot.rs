//! Time slots
//!
//! A slot gathers all chords that start at the same instant within a
//! measure. Building a slot fixes the canonical top-to-bottom chord
//! order and the slot's reference point; `build_voices` then decides
//! which melodic line each chord continues (or starts), and
//! `set_start_time` stamps the slot's exact offset from measure start
//! and propagates it through beamed groups and voice tables.
//!
//! # Voice building
//!
//! Voice resolution is two-phase. Chords that already carry a voice
//! (propagated from a beam group) keep it and close the matching ending
//! chord. The remaining "rookies" are matched against the still-open
//! ending chords by a minimum-cost injection, where the cost rewards
//! vertical proximity on the same staff and forbids merging two distinct
//! established voices. Rookies left unmatched reuse the lowest-id free
//! voice on their staff, or seed a brand-new voice.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::diagnostics::DiagnosticTarget;
use crate::injection;
use crate::models::{format_rational, Chord, ChordId, Point, Rational, SlotId, VoiceId};

use super::measure::Measure;

/// Cost of leaving a rookie without a voice continuation
const NO_LINK: u32 = 20;

/// Cost of continuing a voice across staves
const STAFF_DIFF: u32 = 40;

/// Forbidden: merging two distinct established voices
const INCOMPATIBLE_VOICES: u32 = injection::FORBIDDEN;

/// A cluster of chords sharing one onset instant within a measure
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Slot {
    /// Id unique within the containing measure (1-based, construction order)
    id: SlotId,

    /// Mean position of the member chord centers
    ref_point: Point,

    /// Member chords, sorted top to bottom
    incomings: Vec<ChordId>,

    /// Time offset since measure start, at most one value ever recorded
    start_time: Option<Rational>,
}

impl Slot {
    /// The slot id (1-based within its measure)
    pub fn id(&self) -> SlotId {
        self.id
    }

    /// Abscissa of the slot's reference point
    pub fn x(&self) -> i32 {
        self.ref_point.x
    }

    /// Reference point (mean of member chord centers)
    pub fn ref_point(&self) -> Point {
        self.ref_point
    }

    /// Member chords, top to bottom
    pub fn chords(&self) -> &[ChordId] {
        &self.incomings
    }

    /// Time offset since measure start, once known
    pub fn start_time(&self) -> Option<Rational> {
        self.start_time
    }
}

// Slots order by reference-point abscissa, keeping a measure's slot
// sequence temporally ordered left to right; ids disambiguate.
impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Slot {}

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Slot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x().cmp(&other.x()).then(self.id.cmp(&other.id))
    }
}

impl Measure {
    /// The slot with the given id
    pub fn slot(&self, id: SlotId) -> &Slot {
        &self.slots()[id.0 - 1]
    }

    /// Create the next slot from one onset cluster of chords
    ///
    /// Slots must be created in increasing abscissa order; ids are the
    /// strictly increasing sequence 1..n. The incoming list is copied
    /// (sorted top to bottom), each chord gets its back-reference, and
    /// the reference point is the rounded mean of the chord centers.
    pub fn new_slot(&mut self, chords: &[ChordId]) -> SlotId {
        assert!(!chords.is_empty(), "a slot needs at least one chord");

        let id = SlotId(self.slots().len() + 1);

        let mut incomings = chords.to_vec();
        incomings.sort_by(|&a, &b| Chord::by_ordinate(self.chord(a), self.chord(b)));

        for &chord in &incomings {
            self.chord_mut(chord).slot = Some(id);
        }

        let count = incomings.len() as f64;
        let sum_x: f64 = incomings.iter().map(|&c| self.chord(c).center.x as f64).sum();
        let sum_y: f64 = incomings.iter().map(|&c| self.chord(c).center.y as f64).sum();
        let ref_point = Point::new(
            (sum_x / count).round() as i32,
            (sum_y / count).round() as i32,
        );

        self.slots_mut().push(Slot {
            id,
            ref_point,
            incomings,
            start_time: None,
        });
        id
    }

    /// Resolve the voices of this slot's chords
    ///
    /// `ending_chords` are the chords from earlier slots whose melodic
    /// line is still open at this slot boundary (continuing through a
    /// beam or tie), candidates for continuation by this slot's chords.
    pub fn build_voices(&mut self, slot_id: SlotId, ending_chords: &[ChordId]) {
        log::debug!(
            "slot#{} build_voices endings={:?} incomings={:?}",
            slot_id.0,
            ending_chords,
            self.slot(slot_id).chords()
        );

        // Canonical top-to-bottom order
        let mut incomings = self.slot(slot_id).chords().to_vec();
        incomings.sort_by(|&a, &b| Chord::by_ordinate(self.chord(a), self.chord(b)));
        self.slots_mut()[slot_id.0 - 1].incomings = incomings.clone();

        let mut endings: Vec<ChordId> = ending_chords.to_vec();
        let mut rookies: Vec<ChordId> = Vec::new();

        for &chord in &incomings {
            if let Some(voice) = self.chord(chord).voice {
                // Re-apply, to populate the voice's slot table
                let _ = self.set_chord_voice(chord, voice);

                // This chord closes the ending chord held by the same voice
                if let Some(pos) = endings
                    .iter()
                    .position(|&e| self.chord(e).voice == Some(voice))
                {
                    endings.remove(pos);
                }
            } else {
                rookies.push(chord);
            }
        }

        // Nothing left to assign?
        if rookies.is_empty() {
            return;
        }

        // Try to continue some ending voices into some rookies
        if !endings.is_empty() {
            let target_count = endings.len() + rookies.len();
            let costs: Vec<Vec<u32>> = rookies
                .iter()
                .map(|&rookie| {
                    (0..target_count)
                        .map(|target| match endings.get(target) {
                            Some(&ending) => self.voice_distance(rookie, ending),
                            None => NO_LINK,
                        })
                        .collect()
                })
                .collect();
            let links = injection::solve_matrix(&costs);

            for (i, &target) in links.iter().enumerate() {
                // Padding target: the rookie starts fresh
                if target >= endings.len() {
                    continue;
                }

                let Some(voice) = self.chord(endings[target]).voice else {
                    continue;
                };
                log::debug!("slot#{} reusing voice#{}", slot_id.0, voice.0);

                if let Err(err) = self.set_chord_voice(rookies[i], voice) {
                    self.report(
                        DiagnosticTarget::Chord(rookies[i]),
                        "voice-assignment-failure",
                        err.to_string(),
                    );
                    // Abandon the remaining reuse assignments; resolved
                    // rookies keep theirs and the fallback below still runs
                    break;
                }
            }
        }

        // Assign remaining non-mapped chords, using first voice available
        self.assign_voices(slot_id);
    }

    /// Continuation cost between a rookie and an ending chord
    fn voice_distance(&self, rookie: ChordId, ending: ChordId) -> u32 {
        let new = self.chord(rookie);
        let old = self.chord(ending);

        if new.voice.is_some() && old.voice.is_some() && new.voice != old.voice {
            return INCOMPATIBLE_VOICES;
        }
        if new.staff != old.staff {
            return STAFF_DIFF;
        }

        let dy = (new.ordinate() - old.ordinate()).unsigned_abs() / self.interline();
        let d_stem = (new.stem_direction.sign() - old.stem_direction.sign()).unsigned_abs();
        dy + 2 * d_stem
    }

    /// Fallback allocation for chords left without a voice: reuse the
    /// lowest-id free voice whose latest chord stands on the same staff
    /// (continuity must not silently jump staves), else seed a new voice.
    fn assign_voices(&mut self, slot_id: SlotId) {
        let incomings = self.slot(slot_id).chords().to_vec();

        for chord in incomings {
            if self.chord(chord).voice.is_some() {
                continue;
            }
            let staff = self.chord(chord).staff;

            let mut reused = None;
            for voice in self.voices() {
                if voice.is_free(slot_id) {
                    if let Some(prev) = voice.chord_before(slot_id) {
                        if self.chord(prev).staff == staff {
                            reused = Some(voice.id());
                            break;
                        }
                    }
                }
            }

            match reused {
                Some(voice) => {
                    let _ = self.set_chord_voice(chord, voice);
                }
                None => {
                    log::debug!("slot#{} creating voice for Ch#{:02}", slot_id.0, chord.0);
                    if let Err(err) = self.new_voice(chord) {
                        self.report(
                            DiagnosticTarget::Chord(chord),
                            "voice-assignment-failure",
                            err.to_string(),
                        );
                    }
                }
            }
        }
    }

    /// Assign the time offset of this slot since the beginning of the
    /// measure, for all chords in the slot
    ///
    /// First writer wins: the first recorded value is immutable, and a
    /// later differing value is reported as a diagnostic on the slot's
    /// first chord rather than overwriting. Recording a value stamps
    /// every member chord, extends through their beam groups, and
    /// refreshes every voice's slot table.
    pub fn set_start_time(&mut self, slot_id: SlotId, start_time: Rational) {
        let idx = slot_id.0 - 1;
        match self.slots()[idx].start_time {
            None => {
                log::debug!(
                    "slot#{} start time {}",
                    slot_id.0,
                    format_rational(start_time)
                );
                self.slots_mut()[idx].start_time = Some(start_time);

                // Assign to all chords of this slot first
                let chords = self.slot(slot_id).chords().to_vec();
                for &chord in &chords {
                    self.set_chord_start_time(chord, start_time);
                }

                // Then extend this information through the beamed chords
                for &chord in &chords {
                    if let Some(group) = self.chord(chord).beam_group {
                        self.compute_beam_start_times(group);
                    }
                }

                // Update all voices
                for iv in 1..=self.voice_count() {
                    self.update_slot_table(VoiceId(iv));
                }
            }
            Some(existing) if existing != start_time => {
                let first = self.slot(slot_id).chords()[0];
                self.report(
                    DiagnosticTarget::Chord(first),
                    "start-time-conflict",
                    format!(
                        "reassigning start time from {} to {} in slot#{}",
                        format_rational(existing),
                        format_rational(start_time),
                        slot_id.0
                    ),
                );
            }
            Some(_) => {}
        }
    }

    /// Stamp one chord's start time, first writer wins
    pub(super) fn set_chord_start_time(&mut self, chord: ChordId, start_time: Rational) {
        match self.chord(chord).start_time {
            None => self.chord_mut(chord).start_time = Some(start_time),
            Some(existing) if existing != start_time => {
                self.report(
                    DiagnosticTarget::Chord(chord),
                    "start-time-conflict",
                    format!(
                        "reassigning chord start time from {} to {}",
                        format_rational(existing),
                        format_rational(start_time)
                    ),
                );
            }
            Some(_) => {}
        }
    }

    /// The chord just above the given point in this slot, if any
    pub fn chord_above(&self, slot_id: SlotId, point: Point) -> Option<ChordId> {
        let mut above = None;
        for &id in self.slot(slot_id).chords() {
            match self.chord(id).head_location {
                Some(head) if head.y < point.y => above = Some(id),
                Some(_) => break,
                // Chords without a recognized head never match
                None => continue,
            }
        }
        above
    }

    /// The chord just below the given point in this slot, if any
    pub fn chord_below(&self, slot_id: SlotId, point: Point) -> Option<ChordId> {
        for &id in self.slot(slot_id).chords() {
            if let Some(head) = self.chord(id).head_location {
                if head.y > point.y {
                    return Some(id);
                }
            }
        }
        None
    }

    /// The chords whose heads stand in the given vertical range
    pub fn embraced_chords(&self, slot_id: SlotId, top: Point, bottom: Point) -> Vec<ChordId> {
        self.slot(slot_id)
            .chords()
            .iter()
            .copied()
            .filter(|&id| self.chord(id).is_embraced_by(top, bottom))
            .collect()
    }
}
