// Copyright (c) 2024 Mike Tsao

//! The traits that define the narrow capabilities the editor core needs from
//! the outside world. Concrete drawing, audio, and file implementations live
//! elsewhere and satisfy these, which lets everything in this crate run
//! headless.

use crate::{editor::PlaybackHandle, editor::ScheduledNote, notation::Staff};

/// Quick import of all important traits.
pub mod prelude {
    pub use super::{AudioScheduler, FileSink, HasSettings, Renderer};
}

/// A [Renderer] knows how to show a compiled [Staff]. The core never looks at
/// what it produces.
pub trait Renderer {
    /// Draws the whole staff, replacing anything drawn before.
    fn draw(&mut self, staff: &Staff);
}

/// An [AudioScheduler] plays a list of timed notes on its own clock.
///
/// All calls are fire-and-forget from the core's point of view, except for
/// [AudioScheduler::ensure_ready()], which the core calls once before the
/// first playback.
pub trait AudioScheduler {
    /// Performs the one-time "engine ready" handshake.
    fn ensure_ready(&mut self) -> anyhow::Result<()>;

    /// Schedules `notes` and starts playing them. Times are relative to the
    /// moment playback starts.
    fn start(&mut self, notes: &[ScheduledNote]) -> anyhow::Result<PlaybackHandle>;

    /// Stops the given playback. Stopping something that already finished is
    /// fine.
    fn stop(&mut self, handle: PlaybackHandle);

    /// Releases whatever the given playback was holding on to. Called after
    /// [AudioScheduler::stop()].
    fn dispose(&mut self, handle: PlaybackHandle);
}

/// A [FileSink] takes a finished payload and puts it somewhere the user can
/// get at it: a download, the clipboard, a file on disk.
pub trait FileSink {
    #[allow(missing_docs)]
    fn write(&mut self, payload: &[u8], file_name: &str, mime_type: &str) -> anyhow::Result<()>;
}

/// Tracks whether a settings struct needs to be written back to disk.
pub trait HasSettings {
    /// Whether the current state of this struct has been saved to disk.
    fn has_been_saved(&self) -> bool;
    /// Call this whenever the struct changes.
    fn needs_save(&mut self);
    /// Call this after a load() or a save().
    fn mark_clean(&mut self);
}
