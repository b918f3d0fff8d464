// Copyright (c) 2024 Mike Tsao

use crate::types::{EventUid, NoteValue, Pitch, PitchName, Tick, Timeline};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, IntoStaticStr};

/// Whether an [Event] sounds.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    EnumIter,
    Eq,
    Hash,
    IntoStaticStr,
    PartialEq,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EventKind {
    #[allow(missing_docs)]
    #[default]
    Note,
    #[allow(missing_docs)]
    Rest,
}

/// An [Event] is the atomic unit of a tune: a note or a rest placed on the
/// tick timeline.
///
/// Serialized field names are kept short (`id`/`type`/`pitch`/`pos`/`len`)
/// because seeds carry every event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique among the live events of one tune.
    #[serde(rename = "id", default)]
    pub uid: EventUid,

    #[allow(missing_docs)]
    #[serde(rename = "type")]
    pub kind: EventKind,

    /// Present only for notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<PitchName>,

    /// Offset from the start of the timeline.
    #[serde(rename = "pos")]
    pub position: Tick,

    /// How long the event lasts. Should be one of the [NoteValue] lengths.
    #[serde(rename = "len")]
    pub length: Tick,
}
impl Event {
    /// Creates a note. Its uid is assigned when it's added to a tune.
    pub fn new_note(pitch: Pitch, position: Tick, value: NoteValue) -> Self {
        Self {
            uid: EventUid::default(),
            kind: EventKind::Note,
            pitch: Some(pitch.into()),
            position,
            length: value.ticks(),
        }
    }

    /// Creates a rest. Its uid is assigned when it's added to a tune.
    pub fn new_rest(position: Tick, value: NoteValue) -> Self {
        Self {
            uid: EventUid::default(),
            kind: EventKind::Rest,
            pitch: None,
            position,
            length: value.ticks(),
        }
    }

    /// Returns a copy with the given uid.
    pub fn with_uid(mut self, uid: EventUid) -> Self {
        self.uid = uid;
        self
    }

    #[allow(missing_docs)]
    pub fn is_note(&self) -> bool {
        self.kind == EventKind::Note
    }

    #[allow(missing_docs)]
    pub fn is_rest(&self) -> bool {
        self.kind == EventKind::Rest
    }

    /// The chromatic-table pitch of this event, if it's a note whose pitch
    /// name resolves.
    pub fn resolved_pitch(&self) -> Option<Pitch> {
        if self.is_note() {
            self.pitch.as_ref().and_then(|p| p.resolve())
        } else {
            None
        }
    }

    /// The enumerated value matching `length`, if any.
    pub fn note_value(&self) -> Option<NoteValue> {
        NoteValue::from_ticks(self.length)
    }

    /// The first tick after this event. Saturates at `usize::MAX`.
    pub fn end(&self) -> Tick {
        Tick(self.position.0.saturating_add(self.length.0))
    }

    /// Like [Event::end()], but None if the extent doesn't fit in a `usize`.
    pub fn checked_end(&self) -> Option<Tick> {
        self.position.0.checked_add(self.length.0).map(Tick)
    }

    /// Returns true if this is a note at exactly `position` in `pitch`'s lane.
    pub fn occupies(&self, position: Tick, pitch: &PitchName) -> bool {
        self.is_note() && self.position == position && self.pitch.as_ref() == Some(pitch)
    }

    /// Returns true if `tick` falls inside this event.
    pub fn covers(&self, tick: Tick) -> bool {
        self.position <= tick && tick < self.end()
    }

    /// Checks the invariants that every event placed by hand must satisfy:
    /// notes have a pitch from the chromatic table, rests have none, the
    /// length is enumerated, and the event fits in the timeline.
    pub fn is_well_formed(&self, timeline: &Timeline) -> bool {
        let pitch_ok = match self.kind {
            EventKind::Note => self.resolved_pitch().is_some(),
            EventKind::Rest => self.pitch.is_none(),
        };
        pitch_ok && self.note_value().is_some() && timeline.contains(self.position, self.length)
    }
}
