// Copyright (c) 2024 Mike Tsao

#![warn(missing_docs)]
#![deny(unused_variables)]
#![allow(rustdoc::private_intra_doc_links)]

//! Tunedex is the core of a musical sketchpad. It models a short tune as
//! notes and rests on a tick grid, and turns that tune into the things an
//! editor front end needs.
//!
//! * A [Tune] owns the events. Positions and lengths are [Tick](types::Tick)s;
//! lengths come from a small set of [NoteValue](types::NoteValue)s.
//! * An [EditorSession] wraps a tune with the current tool, the pixel/grid
//! mapping, and playback state. Front ends call its methods in response to
//! clicks and buttons, passing in their own
//! [Renderer](traits::Renderer), [AudioScheduler](traits::AudioScheduler),
//! and [FileSink](traits::FileSink).
//! * [notation::compile()] turns a tune into a gapless [Staff](notation::Staff)
//! that engravers can draw directly.
//! * [Style](composition::Style)s regenerate a melody as arpeggios, power
//! chords, and the like.
//! * [codec] reads and writes seeds (shareable tokens), LMMS patterns, and
//! MIDI files.

/// A collection of imports that are useful to users of this crate. `use
/// tunedex::prelude::*;` for easier onboarding.
pub mod prelude {
    pub use super::{
        codec::prelude::*, composition::prelude::*, editor::prelude::*, notation::prelude::*,
        traits::prelude::*, types::prelude::*, util::prelude::*,
    };
}

// Fundamental structures that are important enough to re-export at top level.
pub use version::app_version;
pub use {composition::Tune, editor::EditorSession};

pub mod codec;
pub mod composition;
pub mod editor;
pub mod notation;
pub mod traits;
pub mod types;
pub mod util;

mod version;
