// Copyright (c) 2024 Mike Tsao

use crate::{
    composition::Tune,
    types::{Pitch, Seconds},
};
use serde::{Deserialize, Serialize};
use synonym::Synonym;

/// Identifies one started playback, so that it can later be stopped and
/// released.
#[derive(Synonym, Serialize, Deserialize)]
pub struct PlaybackHandle(pub usize);

/// One note for the audio collaborator: when it starts relative to the
/// beginning of playback, what it is, and how long it rings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScheduledNote {
    #[allow(missing_docs)]
    pub start: Seconds,
    #[allow(missing_docs)]
    pub pitch: Pitch,
    #[allow(missing_docs)]
    pub duration: Seconds,
}
impl ScheduledNote {
    /// The pitch in Hertz, for synthesizers that don't speak note names.
    pub fn frequency_hz(&self) -> f64 {
        self.pitch.frequency_hz()
    }
}

/// Converts the tune's notes into wall-clock triples at the tune's tempo, in
/// temporal order. Rests are silent and produce nothing; notes whose pitch
/// doesn't resolve are skipped.
pub fn schedule(tune: &Tune) -> Vec<ScheduledNote> {
    tune.sorted_events()
        .into_iter()
        .filter(|e| e.is_note())
        .filter_map(|e| {
            let Some(pitch) = e.resolved_pitch() else {
                log::warn!("Playback: skipping {e:?}; its pitch isn't in the table");
                return None;
            };
            Some(ScheduledNote {
                start: tune.tempo.ticks_to_seconds(e.position),
                pitch,
                duration: tune.tempo.ticks_to_seconds(e.length),
            })
        })
        .collect()
}
