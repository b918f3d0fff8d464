// Copyright (c) 2024 Mike Tsao

//! The musical model: events, the tune that owns them, and the styles that
//! regenerate them.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{Event, EventKind, Style, StyleError, Tune};
}

pub use event::*;
pub use styles::*;
pub use tune::*;

mod event;
mod styles;
mod tune;
