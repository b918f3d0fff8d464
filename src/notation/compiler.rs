// Copyright (c) 2024 Mike Tsao

//! Turns a tune's sparse event list into a gapless staff.
//!
//! Engravers need a continuous voice: every tick from zero to the end of the
//! timeline has to belong to exactly one note, chord, or rest. The compiler
//! walks a cursor across the timeline, emitting whatever starts at the cursor
//! and covering silence with the fewest rests that fit, largest first.

use crate::{
    composition::{Event, Tune},
    types::{NoteValue, Pitch, Tick, Timeline},
};

/// One renderable thing on the staff: a note, a chord, or a rest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotationUnit {
    /// Where on the timeline the unit begins.
    pub position: Tick,
    /// How long it lasts.
    pub value: NoteValue,
    /// The pitches sounding, lowest first. Empty for a rest.
    pub pitches: Vec<Pitch>,
}
impl NotationUnit {
    /// Creates a rest.
    pub fn rest(position: Tick, value: NoteValue) -> Self {
        Self {
            position,
            value,
            pitches: Vec::default(),
        }
    }

    #[allow(missing_docs)]
    pub fn is_rest(&self) -> bool {
        self.pitches.is_empty()
    }

    #[allow(missing_docs)]
    pub fn is_chord(&self) -> bool {
        self.pitches.len() > 1
    }

    #[allow(missing_docs)]
    pub fn ticks(&self) -> Tick {
        self.value.ticks()
    }
}

/// The compiled, gapless voice, plus the measure layout it was compiled
/// against.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Staff {
    #[allow(missing_docs)]
    pub timeline: Timeline,
    /// In temporal order, back to back.
    pub units: Vec<NotationUnit>,
}
impl Staff {
    /// The sum of every unit's length. For a staff produced by [compile()]
    /// this always equals the timeline's capacity.
    pub fn total_ticks(&self) -> Tick {
        Tick(self.units.iter().map(|u| u.ticks().0).sum())
    }

    #[allow(missing_docs)]
    pub fn measure_count(&self) -> usize {
        self.timeline.measures
    }

    /// How many units are rests.
    pub fn rest_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_rest()).count()
    }
}
impl From<&Tune> for Staff {
    fn from(tune: &Tune) -> Self {
        compile(tune.events(), tune.timeline())
    }
}

/// Compiles `events` (in any order) into a [Staff] covering all of
/// `timeline`.
///
/// Events that can't be engraved are skipped with a warning: lengths that
/// aren't a [NoteValue], positions off the sixteenth grid, anything that runs
/// past the end of the timeline, and anything that starts inside a unit
/// that's already been emitted. At a position where several notes start, one
/// chord is emitted using the shortest member's value; rests at a position
/// that also has notes are ignored.
pub fn compile(events: &[Event], timeline: &Timeline) -> Staff {
    let total = timeline.total_ticks();
    let quantum = timeline.quantum();

    let mut sorted: Vec<&Event> = events
        .iter()
        .filter(|e| {
            let ok = e.note_value().is_some()
                && e.position.is_aligned(quantum)
                && e.position < total
                && timeline.contains(e.position, e.length);
            if !ok {
                log::warn!("Notation: skipping malformed event {e:?}");
            }
            ok
        })
        .collect();
    sorted.sort_by_key(|e| e.position);

    let mut units = Vec::default();
    let mut cursor = Tick::ZERO;
    let mut index = 0;
    while cursor < total {
        while index < sorted.len() && sorted[index].position < cursor {
            log::warn!(
                "Notation: {:?} starts inside an earlier unit; skipping",
                sorted[index]
            );
            index += 1;
        }

        let group_len = sorted[index..]
            .iter()
            .take_while(|e| e.position == cursor)
            .count();
        if group_len > 0 {
            let group = &sorted[index..index + group_len];
            index += group_len;
            let unit = unit_for_group(cursor, group);
            cursor = Tick(cursor.0 + unit.ticks().0);
            units.push(unit);
        } else {
            let boundary = sorted.get(index).map(|e| e.position).unwrap_or(total);
            fill_gap(&mut units, cursor, boundary);
            cursor = boundary;
        }
    }

    Staff {
        timeline: *timeline,
        units,
    }
}

// Every member of `group` starts at `position` and has an enumerated length.
fn unit_for_group(position: Tick, group: &[&Event]) -> NotationUnit {
    let notes: Vec<&Event> = group.iter().copied().filter(|e| e.is_note()).collect();
    let members = if notes.is_empty() { group.to_vec() } else { notes };

    let values: Vec<NoteValue> = members.iter().filter_map(|e| e.note_value()).collect();
    let value = values
        .iter()
        .copied()
        .min_by_key(|v| v.ticks())
        .unwrap_or(NoteValue::Sixteenth);
    if values.iter().any(|v| *v != value) {
        log::debug!("Notation: chord at {position} has mixed lengths; using {value}");
    }

    let mut pitches: Vec<Pitch> = members
        .iter()
        .filter(|e| e.is_note())
        .filter_map(|e| {
            let pitch = e.resolved_pitch();
            if pitch.is_none() {
                log::warn!("Notation: can't resolve pitch of {e:?}");
            }
            pitch
        })
        .collect();
    pitches.sort();
    pitches.dedup();

    NotationUnit {
        position,
        value,
        pitches,
    }
}

/// Covers `start..end` with rests, largest value first.
fn fill_gap(units: &mut Vec<NotationUnit>, start: Tick, end: Tick) {
    let mut cursor = start;
    while cursor < end {
        let remaining = Tick(end.0 - cursor.0);
        let Some(value) = NoteValue::largest_fitting(remaining) else {
            debug_assert!(false, "gap of {remaining} ticks can't be covered by rests");
            log::error!("Notation: {remaining} ticks at {cursor} can't be covered by rests");
            return;
        };
        units.push(NotationUnit::rest(cursor, value));
        cursor = Tick(cursor.0 + value.ticks().0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventUid, PitchName, TimeSignature};
    use more_asserts::assert_le;

    fn note(pitch: Pitch, position: usize, value: NoteValue) -> Event {
        Event::new_note(pitch, Tick(position), value)
    }

    #[test]
    fn empty_tune_is_all_rests() {
        let timeline = Timeline::default();
        let staff = compile(&[], &timeline);
        assert_eq!(staff.total_ticks(), timeline.total_ticks());
        assert_eq!(staff.units.len(), 4, "four whole rests fill four measures");
        assert!(staff
            .units
            .iter()
            .all(|u| u.is_rest() && u.value == NoteValue::Whole));
    }

    #[test]
    fn one_quarter_note_then_rests() {
        let timeline = Timeline::default();
        let staff = compile(&[note(Pitch::C4, 0, NoteValue::Quarter)], &timeline);

        let first = &staff.units[0];
        assert_eq!(first.pitches, vec![Pitch::C4]);
        assert_eq!(first.value, NoteValue::Quarter);

        let rest_ticks: usize = staff.units[1..].iter().map(|u| u.ticks().0).sum();
        assert_eq!(rest_ticks, 1536 - 96);
        assert!(staff.units[1..].iter().all(|u| u.is_rest()));
        let values: Vec<NoteValue> = staff.units[1..].iter().map(|u| u.value).collect();
        assert_eq!(
            values,
            vec![
                NoteValue::Whole,
                NoteValue::Whole,
                NoteValue::Whole,
                NoteValue::Half,
                NoteValue::Quarter
            ],
            "greedy decomposition uses the fewest rests"
        );
    }

    #[test]
    fn gaps_between_notes_are_filled_exactly() {
        let timeline = Timeline::default();
        let events = vec![
            note(Pitch::E4, 168, NoteValue::Sixteenth),
            note(Pitch::C4, 24, NoteValue::Eighth),
        ];
        let staff = compile(&events, &timeline);
        assert_eq!(staff.total_ticks(), timeline.total_ticks());

        assert!(staff.units[0].is_rest());
        assert_eq!(staff.units[0].value, NoteValue::Sixteenth);
        assert_eq!(staff.units[1].pitches, vec![Pitch::C4]);
        // 72..168 = 96 ticks of silence
        assert_eq!(staff.units[2], NotationUnit::rest(Tick(72), NoteValue::Quarter));
        assert_eq!(staff.units[3].pitches, vec![Pitch::E4]);

        let mut expected_position = 0;
        for unit in &staff.units {
            assert_eq!(unit.position.0, expected_position, "units are back to back");
            expected_position += unit.ticks().0;
        }
    }

    #[test]
    fn chords_use_the_shortest_member() {
        let timeline = Timeline::default();
        let events = vec![
            note(Pitch::G4, 0, NoteValue::Half),
            note(Pitch::C4, 0, NoteValue::Quarter),
            note(Pitch::E4, 0, NoteValue::Half),
            Event::new_rest(Tick(0), NoteValue::Whole),
        ];
        let staff = compile(&events, &timeline);
        assert_eq!(staff.units[0].pitches, vec![Pitch::C4, Pitch::E4, Pitch::G4]);
        assert_eq!(staff.units[0].value, NoteValue::Quarter);
        assert!(staff.units[0].is_chord());
        assert_eq!(staff.total_ticks(), timeline.total_ticks());
    }

    #[test]
    fn explicit_rests_are_kept() {
        let timeline = Timeline::default();
        let events = vec![Event::new_rest(Tick(0), NoteValue::Eighth)];
        let staff = compile(&events, &timeline);
        assert_eq!(staff.units[0], NotationUnit::rest(Tick(0), NoteValue::Eighth));
        assert_eq!(staff.total_ticks(), timeline.total_ticks());
    }

    #[test]
    fn malformed_events_never_break_the_staff() {
        let timeline = Timeline::default();
        let mut odd_length = note(Pitch::C4, 0, NoteValue::Quarter);
        odd_length.length = Tick(50);
        let mut off_grid = note(Pitch::D4, 0, NoteValue::Quarter);
        off_grid.position = Tick(10);
        let past_the_end = note(Pitch::E4, 1440, NoteValue::Half);
        let unknown_pitch = Event {
            uid: EventUid(9),
            pitch: Some(PitchName("Q7".to_string())),
            ..note(Pitch::C4, 384, NoteValue::Quarter)
        };
        let overlapped = note(Pitch::F4, 48, NoteValue::Quarter);
        let overlapping = note(Pitch::G4, 0, NoteValue::Quarter);

        let staff = compile(
            &[
                odd_length,
                off_grid,
                past_the_end,
                unknown_pitch,
                overlapped,
                overlapping,
            ],
            &timeline,
        );
        assert_eq!(staff.total_ticks(), timeline.total_ticks());
        assert_eq!(staff.units[0].pitches, vec![Pitch::G4]);
        assert!(
            staff.units.iter().all(|u| !u.pitches.contains(&Pitch::F4)),
            "a note starting inside another unit is skipped"
        );
        let at_384 = staff.units.iter().find(|u| u.position == Tick(384)).unwrap();
        assert!(at_384.is_rest(), "an unresolvable note keeps its time as a rest");
    }

    #[test]
    fn other_time_signatures_fill_exactly() {
        let timeline = Timeline::new_with(3, TimeSignature::THREE_FOUR);
        let staff = compile(&[note(Pitch::A4, 96, NoteValue::Eighth)], &timeline);
        assert_eq!(staff.total_ticks(), Tick(3 * 288));
        for unit in &staff.units {
            assert_le!(unit.position.0 + unit.ticks().0, 3 * 288);
        }
    }
}
