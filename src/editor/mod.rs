// Copyright (c) 2024 Mike Tsao

//! The interactive layer: mapping pointer positions onto the grid, holding
//! the session state that user actions operate on, and deriving playback
//! schedules.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{ClickOutcome, EditorError, EditorSession, GridCell, GridMapper, Tool};
}

pub use mapper::{GridCell, GridMapper, GridMapperBuilder, PixelPoint, PixelRect};
pub use playback::{schedule, PlaybackHandle, ScheduledNote};
pub use session::{ClickOutcome, EditorError, EditorSession, Tool};

mod mapper;
mod playback;
mod session;
