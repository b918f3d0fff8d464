// Copyright (c) 2024 Mike Tsao

//! Common data types used throughout the system.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        EventUid, NoteValue, Pitch, PitchName, Seconds, Tempo, Tick, TimeSignature, Timeline,
    };
}

pub use {
    pitch::{Pitch, PitchName},
    time::{NoteValue, Seconds, Tempo, Tick, TimeSignature, Timeline},
    uid::{EventUid, EventUidFactory, IsUid, UidFactory},
};

mod pitch;
mod time;
mod uid;
