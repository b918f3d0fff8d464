// Copyright (c) 2024 Mike Tsao

use super::Event;
use crate::{
    types::{EventUid, EventUidFactory, Pitch, PitchName, Tempo, Tick, TimeSignature, Timeline},
    util::ModSerial,
};
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// [Tune] is the aggregate root of the editor. It owns the title, a little
/// metadata, and the list of [Event]s that make up the music.
///
/// Events are stored in the order they were added, NOT in temporal order.
/// Anything that needs them in time order has to sort by position itself;
/// [Tune::sorted_events()] does that with a stable sort.
#[derive(Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case")]
pub struct Tune {
    #[allow(missing_docs)]
    #[derivative(Default(value = "Self::DEFAULT_TITLE.to_string()"))]
    pub title: String,

    /// The key signature, as a note name ("C", "F#").
    #[derivative(Default(value = "\"C\".to_string()"))]
    pub key: String,

    #[allow(missing_docs)]
    #[serde(default)]
    pub tempo: Tempo,

    #[serde(default)]
    timeline: Timeline,

    #[serde(default)]
    events: Vec<Event>,

    #[serde(default)]
    uid_factory: EventUidFactory,

    #[serde(skip)]
    mod_serial: ModSerial,
}
impl Tune {
    #[allow(missing_docs)]
    pub const DEFAULT_TITLE: &'static str = "My First Riff";

    /// Creates an empty [Tune] on the given timeline.
    pub fn new_with(title: &str, timeline: Timeline) -> Self {
        Self {
            title: title.to_string(),
            timeline,
            ..Default::default()
        }
    }

    /// Adds a candidate event. Returns the uid it was given, or None if the
    /// candidate was rejected: a note whose (position, pitch) lane is already
    /// taken, or an event that breaks the timeline's invariants. Rejection is
    /// a logged no-op.
    pub fn add_event(&mut self, candidate: Event) -> Option<EventUid> {
        if let Some(pitch) = candidate.pitch.as_ref().filter(|_| candidate.is_note()) {
            if self.is_lane_occupied(candidate.position, pitch) {
                log::warn!(
                    "A note already occupies {pitch} at tick {}; ignoring",
                    candidate.position
                );
                return None;
            }
        }
        if !candidate.is_well_formed(&self.timeline) {
            log::warn!("Rejecting malformed event {candidate:?}");
            return None;
        }

        let uid = self.uid_factory.mint_next();
        log::debug!("Adding {} {uid} at tick {}", candidate.kind, candidate.position);
        self.events.push(candidate.with_uid(uid));
        self.touch();
        Some(uid)
    }

    /// Removes the first event at exactly `position` matching `pitch` (None
    /// matches rests). Returns what was removed; a miss is a no-op.
    pub fn remove_event_at(&mut self, position: Tick, pitch: Option<&PitchName>) -> Option<Event> {
        let index = self
            .events
            .iter()
            .position(|e| e.position == position && e.pitch.as_ref() == pitch)?;
        let removed = self.events.remove(index);
        self.touch();
        Some(removed)
    }

    /// Removes the event with the given uid.
    pub fn remove_event(&mut self, uid: EventUid) -> Option<Event> {
        let index = self.events.iter().position(|e| e.uid == uid)?;
        let removed = self.events.remove(index);
        self.touch();
        Some(removed)
    }

    /// Removes every event.
    pub fn clear(&mut self) {
        self.events.clear();
        self.touch();
    }

    /// Swaps in a whole new event list. Events aren't validated here, but
    /// uids are: events keep theirs unless it's a repeat or larger than
    /// [EventUid::MAX_VALUE], in which case a fresh one is minted. The uid
    /// factory learns about the survivors so that later additions don't
    /// collide.
    pub fn replace_all(&mut self, events: Vec<Event>) {
        self.events = events;
        self.adopt_uids();
        self.touch();
    }

    /// The events in insertion order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// The event with the given uid, if it's still live.
    pub fn event(&self, uid: EventUid) -> Option<&Event> {
        self.events.iter().find(|e| e.uid == uid)
    }

    /// The events in temporal order. Events that share a position stay in
    /// insertion order.
    pub fn sorted_events(&self) -> Vec<&Event> {
        let mut sorted: Vec<&Event> = self.events.iter().collect();
        sorted.sort_by_key(|e| e.position);
        sorted
    }

    /// Returns true if a note already starts at `position` in `pitch`'s lane.
    pub fn is_lane_occupied(&self, position: Tick, pitch: &PitchName) -> bool {
        self.events.iter().any(|e| e.occupies(position, pitch))
    }

    /// Hit test: the first event in `pitch`'s lane (None for rests) whose
    /// extent covers `tick`.
    pub fn event_at(&self, tick: Tick, pitch: Option<Pitch>) -> Option<&Event> {
        let name = pitch.map(PitchName::from);
        self.events
            .iter()
            .find(|e| e.covers(tick) && e.pitch == name)
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[allow(missing_docs)]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Changes the timeline. Events that no longer fit stay in the model;
    /// the notation compiler skips them.
    pub fn set_timeline(&mut self, timeline: Timeline) {
        if timeline != self.timeline {
            self.timeline = timeline;
            self.touch();
        }
    }

    #[allow(missing_docs)]
    pub fn time_signature(&self) -> TimeSignature {
        self.timeline.time_signature
    }

    #[allow(missing_docs)]
    pub fn set_tempo(&mut self, tempo: Tempo) {
        self.tempo = tempo.clamped();
        self.touch();
    }

    /// Use like this:
    ///
    /// ```no_run
    /// use tunedex::Tune;
    ///
    /// let tune = Tune::default();
    /// let mut tune_serial = 0;
    ///
    /// if tune.has_changed(&mut tune_serial) {
    ///     // Update local data
    /// } else {
    ///     // We're up to date, nothing to do
    /// }
    /// ```
    pub fn has_changed(&self, last_known: &mut usize) -> bool {
        self.mod_serial.catch_up(last_known)
    }

    /// Serializes the whole tune, metadata included.
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads a tune saved by [Tune::to_json()].
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let mut tune: Tune = serde_json::from_str(json)?;
        tune.after_deser();
        Ok(tune)
    }

    fn after_deser(&mut self) {
        self.adopt_uids();
    }

    fn adopt_uids(&mut self) {
        self.events
            .iter()
            .filter(|e| e.uid.0 <= EventUid::MAX_VALUE)
            .for_each(|e| self.uid_factory.notify_externally_minted_uid(e.uid));

        let mut seen: HashSet<EventUid> = HashSet::default();
        for event in self.events.iter_mut() {
            if event.uid.0 > EventUid::MAX_VALUE || !seen.insert(event.uid) {
                let uid = self.uid_factory.mint_next();
                log::warn!("Replacing unusable uid {} with {uid}", event.uid);
                event.uid = uid;
                seen.insert(uid);
            }
        }
    }

    fn touch(&mut self) {
        self.mod_serial.bump();
    }
}
