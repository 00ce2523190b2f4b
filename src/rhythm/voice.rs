//! Voices
//!
//! A voice is one continuous melodic line through a measure, represented
//! as a slot-indexed table: for each slot, the chord (if any) sounding
//! in this voice, marked as beginning there or continuing from an
//! earlier slot. Voice ids are small positive integers, unique within
//! the measure, allocated monotonically; voices are never reused across
//! measures.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{ChordId, SlotId, VoiceId};

use super::errors::RhythmError;
use super::measure::Measure;

/// Whether the chord begins at a slot or is still sounding there
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VoiceStatus {
    Begin,
    Continue,
}

/// One entry of a voice's slot table
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotVoice {
    pub chord: ChordId,
    pub status: VoiceStatus,
}

/// One melodic line across a measure
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Voice {
    /// Id unique within the containing measure (1-based)
    id: VoiceId,

    /// Chord sounding in this voice, per slot
    slot_table: BTreeMap<SlotId, SlotVoice>,
}

impl Voice {
    fn new(id: VoiceId) -> Self {
        Voice {
            id,
            slot_table: BTreeMap::new(),
        }
    }

    /// The voice id (1-based within its measure)
    pub fn id(&self) -> VoiceId {
        self.id
    }

    /// Whether no chord occupies this voice at or after the given slot
    pub fn is_free(&self, slot: SlotId) -> bool {
        self.slot_table.range(slot..).next().is_none()
    }

    /// The latest chord held by this voice strictly before the given slot
    pub fn chord_before(&self, slot: SlotId) -> Option<ChordId> {
        self.slot_table
            .range(..slot)
            .next_back()
            .map(|(_, info)| info.chord)
    }

    /// The table entry for the given slot, if any
    pub fn slot_info(&self, slot: SlotId) -> Option<&SlotVoice> {
        self.slot_table.get(&slot)
    }

    /// The full slot table, in slot order
    pub fn slot_table(&self) -> &BTreeMap<SlotId, SlotVoice> {
        &self.slot_table
    }

    pub(super) fn put_slot_info(&mut self, slot: SlotId, info: SlotVoice) {
        self.slot_table.insert(slot, info);
    }
}

impl Measure {
    /// The voice with the given id
    pub fn voice(&self, id: VoiceId) -> &Voice {
        &self.voices()[id.0 - 1]
    }

    /// Allocate a brand-new voice seeded by the given chord
    pub fn new_voice(&mut self, seed: ChordId) -> Result<VoiceId, RhythmError> {
        let slot = self
            .chord(seed)
            .slot
            .ok_or(RhythmError::ChordWithoutSlot { chord: seed })?;

        let id = VoiceId(self.voice_count() + 1);
        let mut voice = Voice::new(id);
        voice.put_slot_info(
            slot,
            SlotVoice {
                chord: seed,
                status: VoiceStatus::Begin,
            },
        );
        self.voices_mut().push(voice);
        self.chord_mut(seed).voice = Some(id);
        Ok(id)
    }

    /// Set a chord's voice, recording its occupancy at the chord's slot
    ///
    /// Re-applying the voice a chord already carries is a supported way
    /// to (re)populate the voice's slot table; assigning a different
    /// established voice is a structural violation and fails.
    pub fn set_chord_voice(&mut self, chord: ChordId, voice: VoiceId) -> Result<(), RhythmError> {
        if let Some(current) = self.chord(chord).voice {
            if current != voice {
                return Err(RhythmError::VoiceConflict {
                    chord,
                    current,
                    requested: voice,
                });
            }
        }
        let slot = self
            .chord(chord)
            .slot
            .ok_or(RhythmError::ChordWithoutSlot { chord })?;

        self.chord_mut(chord).voice = Some(voice);
        self.voices_mut()[voice.0 - 1].put_slot_info(
            slot,
            SlotVoice {
                chord,
                status: VoiceStatus::Begin,
            },
        );
        Ok(())
    }

    /// Recompute the slot-indexed view of one voice after start times
    /// have been assigned: a chord still sounding at a later timed slot
    /// occupies that slot with `Continue` status.
    pub fn update_slot_table(&mut self, voice_id: VoiceId) {
        let mut inserts: Vec<(SlotId, SlotVoice)> = Vec::new();
        let mut last_begin: Option<ChordId> = None;

        for slot in self.slots() {
            let Some(start) = slot.start_time() else {
                continue;
            };
            match self.voice(voice_id).slot_info(slot.id()) {
                None => {
                    if let Some(chord) = last_begin {
                        if let Some(end) = self.chord(chord).end_time() {
                            if end > start {
                                inserts.push((
                                    slot.id(),
                                    SlotVoice {
                                        chord,
                                        status: VoiceStatus::Continue,
                                    },
                                ));
                            }
                        }
                    }
                }
                Some(info) if info.status == VoiceStatus::Begin => {
                    last_begin = Some(info.chord);
                }
                Some(_) => {}
            }
        }

        for (slot, info) in inserts {
            self.voices_mut()[voice_id.0 - 1].put_slot_info(slot, info);
        }
    }
}
