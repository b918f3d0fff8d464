// Copyright (c) 2024 Mike Tsao

use super::Event;
use crate::types::{EventUid, NoteValue, Pitch, PitchName, Tick, Timeline};
use std::collections::HashSet;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

/// Errors that selecting a [Style] can produce.
#[derive(Debug, Error, PartialEq)]
pub enum StyleError {
    /// The name didn't match any known style.
    #[error("Unknown style \"{0}\"")]
    UnknownStyle(String),
}

/// One note of a style's sub-pattern: where it lands relative to the source
/// note, how far it's transposed, and how long it lasts. A `length` of None
/// keeps the source note's length.
#[derive(Clone, Copy, Debug)]
struct Step {
    offset: Tick,
    semitones: i8,
    length: Option<NoteValue>,
}
impl Step {
    const fn new(offset: usize, semitones: i8, length: Option<NoteValue>) -> Self {
        Self {
            offset: Tick(offset),
            semitones,
            length,
        }
    }
}

const SIXTEENTH: usize = Tick::PER_QUARTER / 4;
const QUARTER: usize = Tick::PER_QUARTER;

const ARPEGGIO_MAJOR: [Step; 4] = [
    Step::new(0, 0, Some(NoteValue::Sixteenth)),
    Step::new(SIXTEENTH, 4, Some(NoteValue::Sixteenth)),
    Step::new(SIXTEENTH * 2, 7, Some(NoteValue::Sixteenth)),
    Step::new(SIXTEENTH * 3, 12, Some(NoteValue::Sixteenth)),
];
const ARPEGGIO_MINOR: [Step; 4] = [
    Step::new(0, 0, Some(NoteValue::Sixteenth)),
    Step::new(SIXTEENTH, 3, Some(NoteValue::Sixteenth)),
    Step::new(SIXTEENTH * 2, 7, Some(NoteValue::Sixteenth)),
    Step::new(SIXTEENTH * 3, 12, Some(NoteValue::Sixteenth)),
];
// Oom-pah-pah: the root an octave down on the beat, then the third and fifth
// on each of the next two beats.
const WALTZ_BASS: [Step; 5] = [
    Step::new(0, -12, Some(NoteValue::Quarter)),
    Step::new(QUARTER, 4, Some(NoteValue::Quarter)),
    Step::new(QUARTER, 7, Some(NoteValue::Quarter)),
    Step::new(QUARTER * 2, 4, Some(NoteValue::Quarter)),
    Step::new(QUARTER * 2, 7, Some(NoteValue::Quarter)),
];
const POWER_CHORD: [Step; 3] = [
    Step::new(0, 0, None),
    Step::new(0, 7, None),
    Step::new(0, 12, None),
];
const OCTAVE_UP: [Step; 1] = [Step::new(0, 12, None)];

/// A [Style] regenerates a melody: every note of the base sequence is
/// replaced by a small fixed pattern of notes derived from it.
#[derive(
    Clone, Copy, Debug, Display, EnumCount, EnumIter, EnumString, Eq, IntoStaticStr, PartialEq,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Style {
    /// Root, major third, fifth, octave as rising sixteenths.
    ArpeggioMajor,
    /// Root, minor third, fifth, octave as rising sixteenths.
    ArpeggioMinor,
    /// Root an octave down, then two beats of third-and-fifth.
    WaltzBass,
    /// Root, fifth, and octave struck together.
    PowerChord,
    /// The same line an octave higher.
    OctaveUp,
}
impl Style {
    /// Looks up a style by its kebab-case name.
    pub fn from_name(name: &str) -> Result<Self, StyleError> {
        Self::from_str(name.trim()).map_err(|_| StyleError::UnknownStyle(name.to_string()))
    }

    /// The names of every style, for menus and help text.
    pub fn names() -> Vec<&'static str> {
        Self::iter().map(|s| s.into()).collect()
    }

    fn steps(&self) -> &'static [Step] {
        match self {
            Style::ArpeggioMajor => &ARPEGGIO_MAJOR,
            Style::ArpeggioMinor => &ARPEGGIO_MINOR,
            Style::WaltzBass => &WALTZ_BASS,
            Style::PowerChord => &POWER_CHORD,
            Style::OctaveUp => &OCTAVE_UP,
        }
    }

    /// Produces a brand-new event list from `base`. Rests and notes whose
    /// pitch doesn't resolve are ignored. Generated notes that would leave the
    /// chromatic table or the timeline are dropped, as is any note landing in
    /// a (position, pitch) lane that this call already filled.
    ///
    /// Source notes are visited in temporal order, so the output is the same
    /// no matter what order `base` was built in. Output uids are numbered
    /// from 1.
    pub fn apply(&self, base: &[Event], timeline: &Timeline) -> Vec<Event> {
        let mut sources: Vec<&Event> = base.iter().filter(|e| e.is_note()).collect();
        sources.sort_by_key(|e| e.position);

        let mut taken: HashSet<(Tick, Pitch)> = HashSet::default();
        let mut output = Vec::default();
        for source in sources {
            let Some(root) = source.resolved_pitch() else {
                log::debug!("{self}: skipping unresolvable pitch in {source:?}");
                continue;
            };
            for step in self.steps() {
                let Some(pitch) = root.transposed(step.semitones) else {
                    continue;
                };
                let Some(position) = source.position.0.checked_add(step.offset.0).map(Tick) else {
                    continue;
                };
                let length = step.length.map(|v| v.ticks()).unwrap_or(source.length);
                if !timeline.contains(position, length) || !taken.insert((position, pitch)) {
                    continue;
                }
                output.push(Event {
                    uid: EventUid(output.len() + 1),
                    kind: source.kind,
                    pitch: Some(PitchName::from(pitch)),
                    position,
                    length,
                });
            }
        }
        output
    }
}
