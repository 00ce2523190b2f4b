// Start-time assignment: first-writer-wins semantics, beam-group
// propagation, voice slot-table refresh, and the slot geometry queries

use rhythm_core::{
    ChordId, Measure, Point, Rational, StaffId, StemDirection, VoiceId, VoiceStatus,
};

const INTERLINE: u32 = 10;

/// Helper to create a chord with the given duration, head at (x, y)
fn add_chord(
    measure: &mut Measure,
    x: i32,
    y: i32,
    duration: Rational,
) -> ChordId {
    measure.add_chord(
        StaffId(1),
        Point::new(x, y),
        Some(Point::new(x, y)),
        StemDirection::Up,
        duration,
    )
}

#[test]
fn test_beam_group_propagates_start_times() {
    let mut measure = Measure::new(INTERLINE);
    let eighth = Rational::new(1, 8);

    let c1 = add_chord(&mut measure, 100, 50, eighth);
    let c2 = add_chord(&mut measure, 140, 50, eighth);
    let c3 = add_chord(&mut measure, 180, 50, eighth);
    let s1 = measure.new_slot(&[c1]);
    measure.new_slot(&[c2]);
    measure.new_slot(&[c3]);
    measure.new_beam_group(&[c1, c2, c3]);

    measure.set_start_time(s1, Rational::new(1, 4));

    // One explicit call times the whole beamed group
    assert_eq!(measure.chord(c1).start_time, Some(Rational::new(1, 4)));
    assert_eq!(measure.chord(c2).start_time, Some(Rational::new(3, 8)));
    assert_eq!(measure.chord(c3).start_time, Some(Rational::new(1, 2)));
    assert!(measure.diagnostics().is_empty());
}

#[test]
fn test_beam_group_anchors_on_any_member() {
    let mut measure = Measure::new(INTERLINE);
    let eighth = Rational::new(1, 8);

    let c1 = add_chord(&mut measure, 100, 50, eighth);
    let c2 = add_chord(&mut measure, 140, 50, eighth);
    let c3 = add_chord(&mut measure, 180, 50, eighth);
    measure.new_slot(&[c1]);
    let s2 = measure.new_slot(&[c2]);
    measure.new_slot(&[c3]);
    measure.new_beam_group(&[c1, c2, c3]);

    // Timing the middle chord still yields a consistent group
    measure.set_start_time(s2, Rational::new(3, 8));

    assert_eq!(measure.chord(c1).start_time, Some(Rational::new(1, 4)));
    assert_eq!(measure.chord(c3).start_time, Some(Rational::new(1, 2)));
}

#[test]
fn test_inconsistent_beam_times_keep_first_chord_value() {
    let mut measure = Measure::new(INTERLINE);
    let eighth = Rational::new(1, 8);

    let c1 = add_chord(&mut measure, 100, 50, eighth);
    let c2 = add_chord(&mut measure, 140, 50, eighth);
    let c3 = add_chord(&mut measure, 180, 50, eighth);
    let s1 = measure.new_slot(&[c1]);
    measure.new_slot(&[c2]);
    let s3 = measure.new_slot(&[c3]);
    measure.new_beam_group(&[c1, c2, c3]);

    measure.set_start_time(s1, Rational::new(0, 1));
    assert_eq!(measure.chord(c3).start_time, Some(Rational::new(1, 4)));

    // Timing the last slot against the propagated value: the chord
    // keeps its first value and reports the conflict
    measure.set_start_time(s3, Rational::new(3, 8));

    assert_eq!(measure.chord(c3).start_time, Some(Rational::new(1, 4)));
    assert_eq!(measure.diagnostics().len(), 1);
    let mark = measure
        .diagnostics()
        .for_chord(c3)
        .next()
        .expect("mark on the conflicting chord");
    assert_eq!(mark.kind, "start-time-conflict");
}

#[test]
fn test_untimed_beam_group_is_reported() {
    let mut measure = Measure::new(INTERLINE);
    let eighth = Rational::new(1, 8);

    let c1 = add_chord(&mut measure, 100, 50, eighth);
    let c2 = add_chord(&mut measure, 140, 50, eighth);
    measure.new_slot(&[c1]);
    measure.new_slot(&[c2]);
    let group = measure.new_beam_group(&[c1, c2]);

    // No member has a start time yet: nothing to derive from
    measure.compute_beam_start_times(group);

    assert_eq!(measure.chord(c1).start_time, None);
    assert_eq!(measure.chord(c2).start_time, None);
    let mark = measure
        .diagnostics()
        .for_chord(c1)
        .next()
        .expect("mark on the group's first chord");
    assert_eq!(mark.kind, "beam-group-untimed");
}

#[test]
fn test_conflicting_start_time_keeps_first_value() {
    let mut measure = Measure::new(INTERLINE);
    let chord = add_chord(&mut measure, 100, 50, Rational::new(1, 4));
    let slot = measure.new_slot(&[chord]);

    measure.set_start_time(slot, Rational::new(1, 4));
    measure.set_start_time(slot, Rational::new(1, 2));

    assert_eq!(measure.slot(slot).start_time(), Some(Rational::new(1, 4)));
    assert_eq!(measure.chord(chord).start_time, Some(Rational::new(1, 4)));

    // Exactly one diagnostic, attached to the slot's first chord
    assert_eq!(measure.diagnostics().len(), 1);
    let mark = measure
        .diagnostics()
        .for_chord(chord)
        .next()
        .expect("mark on first chord");
    assert_eq!(mark.kind, "start-time-conflict");
}

#[test]
fn test_setting_same_start_time_twice_is_a_noop() {
    let mut measure = Measure::new(INTERLINE);
    let chord = add_chord(&mut measure, 100, 50, Rational::new(1, 4));
    let slot = measure.new_slot(&[chord]);

    measure.set_start_time(slot, Rational::new(1, 4));
    measure.set_start_time(slot, Rational::new(1, 4));

    assert_eq!(measure.slot(slot).start_time(), Some(Rational::new(1, 4)));
    assert!(measure.diagnostics().is_empty());
}

#[test]
fn test_long_chord_marks_voice_as_continuing() {
    let mut measure = Measure::new(INTERLINE);

    // A half-note chord above a quarter-note chord at slot 1
    let long = add_chord(&mut measure, 100, 40, Rational::new(1, 2));
    let short = add_chord(&mut measure, 100, 90, Rational::new(1, 4));
    let s1 = measure.new_slot(&[long, short]);
    measure.build_voices(s1, &[]);
    let long_voice = measure.chord(long).voice.unwrap();

    // Slot 2 a quarter later: only the lower line moves on
    let next = add_chord(&mut measure, 200, 90, Rational::new(1, 4));
    let s2 = measure.new_slot(&[next]);
    measure.build_voices(s2, &[short]);

    measure.set_start_time(s1, Rational::new(0, 1));
    measure.set_start_time(s2, Rational::new(1, 4));

    // The half note is still sounding at slot 2
    let info = measure
        .voice(long_voice)
        .slot_info(s2)
        .expect("long voice occupies slot 2");
    assert_eq!(info.chord, long);
    assert_eq!(info.status, VoiceStatus::Continue);
    assert!(!measure.voice(long_voice).is_free(s2));
}

#[test]
fn test_voice_chords_never_overlap_in_time() {
    let mut measure = Measure::new(INTERLINE);
    let quarter = Rational::new(1, 4);

    let mut slots = Vec::new();
    let mut prev: Option<ChordId> = None;
    for i in 0..4 {
        let chord = add_chord(&mut measure, 100 + 50 * i, 50, quarter);
        let slot = measure.new_slot(&[chord]);
        let endings: Vec<ChordId> = prev.into_iter().collect();
        measure.build_voices(slot, &endings);
        slots.push(slot);
        prev = Some(chord);
    }
    for (i, &slot) in slots.iter().enumerate() {
        measure.set_start_time(slot, Rational::new(i as i32, 4));
    }

    // The whole line is one voice; its chords must be non-overlapping
    // and non-decreasing when ordered by slot
    assert_eq!(measure.voice_count(), 1);
    let voice = measure.voice(VoiceId(1));
    let mut prev_end: Option<Rational> = None;
    for info in voice.slot_table().values() {
        if info.status != VoiceStatus::Begin {
            continue;
        }
        let chord = measure.chord(info.chord);
        let start = chord.start_time.unwrap();
        if let Some(end) = prev_end {
            assert!(start >= end, "voice chords overlap");
        }
        prev_end = chord.end_time();
    }
}

#[test]
fn test_chord_above_and_below_queries() {
    let mut measure = Measure::new(INTERLINE);
    let top = add_chord(&mut measure, 100, 40, Rational::new(1, 4));
    let middle = add_chord(&mut measure, 100, 80, Rational::new(1, 4));
    let bottom = add_chord(&mut measure, 100, 120, Rational::new(1, 4));
    let slot = measure.new_slot(&[bottom, top, middle]);

    let probe = Point::new(100, 85);
    assert_eq!(measure.chord_above(slot, probe), Some(middle));
    assert_eq!(measure.chord_below(slot, probe), Some(bottom));

    assert_eq!(measure.chord_above(slot, Point::new(100, 10)), None);
    assert_eq!(measure.chord_below(slot, Point::new(100, 200)), None);
}

#[test]
fn test_headless_chord_never_matches_queries() {
    let mut measure = Measure::new(INTERLINE);
    let headless = measure.add_chord(
        StaffId(1),
        Point::new(100, 80),
        None,
        StemDirection::None,
        Rational::new(1, 4),
    );
    let slot = measure.new_slot(&[headless]);

    assert_eq!(measure.chord_above(slot, Point::new(100, 200)), None);
    assert_eq!(measure.chord_below(slot, Point::new(100, 10)), None);
    assert!(measure
        .embraced_chords(slot, Point::new(0, 0), Point::new(0, 200))
        .is_empty());
}

#[test]
fn test_embraced_chords_range() {
    let mut measure = Measure::new(INTERLINE);
    let top = add_chord(&mut measure, 100, 40, Rational::new(1, 4));
    let middle = add_chord(&mut measure, 100, 80, Rational::new(1, 4));
    let bottom = add_chord(&mut measure, 100, 120, Rational::new(1, 4));
    let slot = measure.new_slot(&[top, middle, bottom]);

    let embraced = measure.embraced_chords(slot, Point::new(0, 60), Point::new(0, 130));
    assert_eq!(embraced, vec![middle, bottom]);
}

#[test]
fn test_dump_strings() {
    let mut measure = Measure::new(INTERLINE);
    let chord = add_chord(&mut measure, 100, 50, Rational::new(1, 4));
    let slot = measure.new_slot(&[chord]);
    measure.build_voices(slot, &[]);
    measure.set_start_time(slot, Rational::new(1, 4));

    let chords = measure.to_chord_string(measure.slot(slot));
    assert!(chords.starts_with("slot#1"));
    assert!(chords.contains("1/4"));
    assert!(chords.contains("Ch#00"));

    let voices = measure.to_voice_string(measure.slot(slot));
    assert!(voices.contains("V1"));
    assert!(voices.contains("St1"));

    let dump = measure.dump_slots();
    assert_eq!(dump.lines().count(), 2);
}

#[test]
fn test_measure_json_round_trip() {
    let mut measure = Measure::new(INTERLINE);
    let long = add_chord(&mut measure, 100, 40, Rational::new(1, 2));
    let short = add_chord(&mut measure, 100, 90, Rational::new(1, 4));
    let s1 = measure.new_slot(&[long, short]);
    measure.build_voices(s1, &[]);
    let next = add_chord(&mut measure, 200, 90, Rational::new(1, 4));
    let s2 = measure.new_slot(&[next]);
    measure.build_voices(s2, &[short]);
    measure.set_start_time(s1, Rational::new(0, 1));
    measure.set_start_time(s2, Rational::new(1, 4));

    let json = serde_json::to_string(&measure).expect("measure serializes");
    let copy: Measure = serde_json::from_str(&json).expect("measure deserializes");

    // Reconstruction state survives the round trip: rational times,
    // voice assignments and the slot-indexed voice tables
    assert_eq!(copy.slot(s2).start_time(), Some(Rational::new(1, 4)));
    assert_eq!(copy.chord(long).voice, measure.chord(long).voice);
    assert_eq!(copy.voice_count(), measure.voice_count());
    let long_voice = copy.chord(long).voice.unwrap();
    assert_eq!(
        copy.voice(long_voice).slot_info(s2),
        measure.voice(long_voice).slot_info(s2)
    );
}

#[test]
fn test_slot_reference_point_is_mean_of_centers() {
    let mut measure = Measure::new(INTERLINE);
    let a = add_chord(&mut measure, 100, 40, Rational::new(1, 4));
    let b = add_chord(&mut measure, 104, 80, Rational::new(1, 4));
    let slot = measure.new_slot(&[a, b]);

    let point = measure.slot(slot).ref_point();
    assert_eq!(point, Point::new(102, 60));
}
