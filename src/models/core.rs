//! Core data model for rhythm reconstruction
//!
//! Chords, slots, voices and beam groups live in a per-measure arena and
//! refer to each other through small index newtypes instead of owning
//! pointers. "Belongs to slot" / "belongs to voice" is an index field on
//! the chord, which keeps back-lookup O(1) without ownership cycles.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::duration::Rational;

/// Index of a chord within its measure's arena (0-based)
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChordId(pub usize);

/// Id of a slot within its measure (1-based, construction order)
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub usize);

/// Id of a voice within its measure (1-based, allocation order)
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub usize);

/// Index of a beam group within its measure's arena (0-based)
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BeamGroupId(pub usize);

/// Id of the staff a chord belongs to
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StaffId(pub usize);

/// Integer pixel position on the page
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

/// Stem orientation of a chord, as recognized on the page
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StemDirection {
    Up,
    #[default]
    None,
    Down,
}

impl StemDirection {
    /// Sign value used by the voice-continuity distance function
    pub fn sign(self) -> i32 {
        match self {
            StemDirection::Up => 1,
            StemDirection::None => 0,
            StemDirection::Down => -1,
        }
    }
}

/// A simultaneous group of note-heads sharing one stem and duration
///
/// Created by the (out-of-scope) chord-detection phase, then mutated by
/// slot construction and voice building: `slot`, `voice` and `start_time`
/// are filled in as rhythm reconstruction proceeds.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Chord {
    /// Arena index of this chord
    pub id: ChordId,

    /// Staff this chord stands on
    pub staff: StaffId,

    /// Geometric center of the chord glyphs
    pub center: Point,

    /// Position of the head closest to the stem tail, if known
    pub head_location: Option<Point>,

    /// Stem orientation
    pub stem_direction: StemDirection,

    /// Duration as an exact fraction of a whole note
    pub duration: Rational,

    /// Slot this chord has been gathered into
    pub slot: Option<SlotId>,

    /// Voice this chord has been resolved to
    pub voice: Option<VoiceId>,

    /// Beam group this chord is part of, if beamed
    pub beam_group: Option<BeamGroupId>,

    /// Time offset since measure start, once known
    pub start_time: Option<Rational>,
}

impl Chord {
    /// End time (start + duration), once the start time is known
    pub fn end_time(&self) -> Option<Rational> {
        self.start_time.map(|start| start + self.duration)
    }

    /// Vertical position used for top-to-bottom ordering
    ///
    /// The head location is preferred; chords without a recognized head
    /// fall back to their center.
    pub fn ordinate(&self) -> i32 {
        match self.head_location {
            Some(head) => head.y,
            None => self.center.y,
        }
    }

    /// Whether this chord's head stands in the given vertical range
    pub fn is_embraced_by(&self, top: Point, bottom: Point) -> bool {
        match self.head_location {
            Some(head) => head.y >= top.y && head.y <= bottom.y,
            None => false,
        }
    }

    /// Top-to-bottom comparator, the canonical tie-break for voice
    /// building and display; arena index disambiguates equal ordinates so
    /// that the order is total and deterministic.
    pub fn by_ordinate(a: &Chord, b: &Chord) -> Ordering {
        a.ordinate().cmp(&b.ordinate()).then(a.id.cmp(&b.id))
    }
}
