// Copyright (c) 2024 Mike Tsao

use super::{playback, GridCell, GridMapper, PlaybackHandle};
use crate::{
    codec::{self, midi, xpt, SeedError},
    composition::{Event, Style, StyleError, Tune},
    notation::Staff,
    traits::{AudioScheduler, FileSink, Renderer},
    types::{EventUid, NoteValue, Tempo, Timeline},
    util::EditorSettings,
};
use delegate::delegate;
use thiserror::Error;

/// Everything that can go wrong in response to a user action. None of these
/// change the tune.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A click landed outside the grid.
    #[error("({x}, {y}) is outside the grid")]
    OutsideGrid {
        #[allow(missing_docs)]
        x: f64,
        #[allow(missing_docs)]
        y: f64,
    },

    #[allow(missing_docs)]
    #[error(transparent)]
    UnknownStyle(#[from] StyleError),

    #[allow(missing_docs)]
    #[error("invalid seed: {0}")]
    InvalidSeed(#[from] SeedError),

    /// A collaborator (audio, file sink) failed.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// What a click does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tool {
    /// Places a note of the given value in the clicked lane.
    Note(NoteValue),
    /// Places a rest of the given value at the clicked time.
    Rest(NoteValue),
    /// Removes whatever is under the pointer.
    Eraser,
}
impl Default for Tool {
    fn default() -> Self {
        Self::Note(NoteValue::default())
    }
}

/// The result of a click that landed on the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A new event went into the tune.
    Added(EventUid),
    /// This event came out of the tune.
    Erased(Event),
    /// The tune didn't change: the lane was taken, the event wouldn't fit, or
    /// there was nothing to erase.
    Unchanged,
}

/// [EditorSession] holds the state of one editing session: the tune, the
/// current tool, the viewport mapping, and any playback in progress. Every
/// user action is a method here, and every collaborator is passed in by the
/// caller.
#[derive(Debug)]
pub struct EditorSession {
    tune: Tune,
    tool: Tool,
    mapper: GridMapper,

    staff: Staff,
    staff_serial: usize,

    playback: Option<PlaybackHandle>,
    is_engine_ready: bool,
}
impl Default for EditorSession {
    fn default() -> Self {
        Self::new_with(Tune::default(), GridMapper::default())
    }
}
impl EditorSession {
    #[allow(missing_docs)]
    pub fn new_with(tune: Tune, mapper: GridMapper) -> Self {
        let mut mapper = mapper;
        mapper.set_timeline(*tune.timeline());
        Self {
            tune,
            tool: Tool::default(),
            mapper,
            staff: Staff::default(),
            staff_serial: 0,
            playback: None,
            is_engine_ready: false,
        }
    }

    /// Starts an empty session shaped by `settings`.
    pub fn new_from_settings(settings: &EditorSettings) -> anyhow::Result<Self> {
        let mut tune = Tune::new_with(Tune::DEFAULT_TITLE, settings.timeline());
        tune.set_tempo(settings.tempo());
        let mut r = Self::new_with(tune, settings.mapper()?);
        r.tool = Tool::Note(settings.default_note_value());
        Ok(r)
    }

    delegate! {
        to self.tune {
            /// The events in insertion order.
            pub fn events(&self) -> &[Event];
            #[allow(missing_docs)]
            pub fn is_empty(&self) -> bool;
            #[allow(missing_docs)]
            pub fn len(&self) -> usize;
            #[allow(missing_docs)]
            pub fn timeline(&self) -> &Timeline;
            /// Adds an event directly, bypassing the tool.
            pub fn add_event(&mut self, candidate: Event) -> Option<EventUid>;
        }
    }

    #[allow(missing_docs)]
    pub fn tune(&self) -> &Tune {
        &self.tune
    }

    #[allow(missing_docs)]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    #[allow(missing_docs)]
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    #[allow(missing_docs)]
    pub fn mapper(&self) -> &GridMapper {
        &self.mapper
    }

    #[allow(missing_docs)]
    pub fn set_title(&mut self, title: &str) {
        self.tune.title = title.to_string();
    }

    #[allow(missing_docs)]
    pub fn set_tempo(&mut self, tempo: Tempo) {
        self.tune.set_tempo(tempo);
    }

    /// Resizes the tune and the grid together.
    pub fn set_timeline(&mut self, timeline: Timeline) {
        self.tune.set_timeline(timeline);
        self.mapper.set_timeline(timeline);
    }

    /// Applies the current tool at a viewport pixel.
    pub fn click(&mut self, x: f64, y: f64) -> Result<ClickOutcome, EditorError> {
        let cell = self.cell_at(x, y)?;
        Ok(match self.tool {
            Tool::Note(value) => {
                Self::added(self.tune.add_event(Event::new_note(cell.pitch, cell.tick, value)))
            }
            Tool::Rest(value) => Self::added(self.tune.add_event(Event::new_rest(cell.tick, value))),
            Tool::Eraser => self.erase(cell),
        })
    }

    /// Erases at a viewport pixel, whatever the current tool.
    pub fn double_click(&mut self, x: f64, y: f64) -> Result<ClickOutcome, EditorError> {
        let cell = self.cell_at(x, y)?;
        Ok(self.erase(cell))
    }

    /// Removes the note under `cell`, or failing that, the rest under it.
    pub fn erase(&mut self, cell: GridCell) -> ClickOutcome {
        let target = self
            .tune
            .event_at(cell.tick, Some(cell.pitch))
            .or_else(|| self.tune.event_at(cell.tick, None))
            .map(|e| e.uid);
        let removed = target.and_then(|uid| self.tune.remove_event(uid));
        match removed {
            Some(event) => ClickOutcome::Erased(event),
            None => {
                log::warn!("Nothing to erase at {} in {}", cell.tick, cell.pitch);
                ClickOutcome::Unchanged
            }
        }
    }

    #[allow(missing_docs)]
    pub fn clear(&mut self) {
        self.tune.clear();
    }

    /// Replaces the tune's events with `style` applied to them. An unknown
    /// style leaves the tune alone. Returns the new event count.
    pub fn apply_style(&mut self, style: &str) -> Result<usize, EditorError> {
        let style = Style::from_name(style)?;
        let events = style.apply(self.tune.events(), self.tune.timeline());
        log::info!(
            "Applied {style}: {} events became {}",
            self.tune.len(),
            events.len()
        );
        let count = events.len();
        self.tune.replace_all(events);
        Ok(count)
    }

    /// The shareable seed for the current events.
    pub fn seed(&self) -> Result<String, EditorError> {
        Ok(codec::encode_seed(self.tune.events())?)
    }

    /// Replaces the tune's events with those in `seed`. A bad seed leaves the
    /// tune alone. Returns the new event count.
    pub fn load_seed(&mut self, seed: &str) -> Result<usize, EditorError> {
        let events = codec::decode_seed(seed)?;
        log::info!("Loaded {} events from seed", events.len());
        let count = events.len();
        self.tune.replace_all(events);
        Ok(count)
    }

    /// Hands the LMMS pattern document to `sink`.
    pub fn export_pattern(&self, sink: &mut dyn FileSink) -> Result<(), EditorError> {
        sink.write(
            xpt::to_xpt(&self.tune).as_bytes(),
            &xpt::file_name(&self.tune),
            xpt::XPT_MIME_TYPE,
        )?;
        Ok(())
    }

    /// Hands a Standard MIDI File to `sink`.
    pub fn export_midi(&self, sink: &mut dyn FileSink) -> Result<(), EditorError> {
        sink.write(
            &midi::to_midi_bytes(&self.tune)?,
            &midi::file_name(&self.tune),
            midi::MIDI_MIME_TYPE,
        )?;
        Ok(())
    }

    /// The compiled staff, recompiled only if the tune changed since the
    /// last call.
    pub fn staff(&mut self) -> &Staff {
        if self.tune.has_changed(&mut self.staff_serial) {
            self.staff = Staff::from(&self.tune);
        }
        &self.staff
    }

    /// Draws the staff if the tune changed since the last refresh. Returns
    /// whether it drew.
    pub fn refresh(&mut self, renderer: &mut dyn Renderer) -> bool {
        if self.tune.has_changed(&mut self.staff_serial) {
            self.staff = Staff::from(&self.tune);
            renderer.draw(&self.staff);
            true
        } else {
            false
        }
    }

    /// Draws the staff unconditionally, for a renderer that just arrived.
    pub fn redraw(&mut self, renderer: &mut dyn Renderer) {
        renderer.draw(self.staff());
    }

    /// Plays the tune from the top. Any playback already running is stopped
    /// and released first.
    pub fn play(&mut self, audio: &mut dyn AudioScheduler) -> Result<PlaybackHandle, EditorError> {
        self.stop(audio);
        if !self.is_engine_ready {
            audio.ensure_ready()?;
            self.is_engine_ready = true;
        }
        let notes = playback::schedule(&self.tune);
        let handle = audio.start(&notes)?;
        log::debug!("Started playback {handle} with {} notes", notes.len());
        self.playback = Some(handle);
        Ok(handle)
    }

    /// Stops and releases the current playback. Returns false if nothing was
    /// playing.
    pub fn stop(&mut self, audio: &mut dyn AudioScheduler) -> bool {
        if let Some(handle) = self.playback.take() {
            audio.stop(handle);
            audio.dispose(handle);
            true
        } else {
            false
        }
    }

    #[allow(missing_docs)]
    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    fn cell_at(&self, x: f64, y: f64) -> Result<GridCell, EditorError> {
        self.mapper.to_grid(x, y).ok_or_else(|| {
            log::warn!("Click at ({x}, {y}) is outside the grid");
            EditorError::OutsideGrid { x, y }
        })
    }

    fn added(uid: Option<EventUid>) -> ClickOutcome {
        uid.map(ClickOutcome::Added).unwrap_or(ClickOutcome::Unchanged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        editor::ScheduledNote,
        types::{Pitch, Tick},
    };

    #[derive(Default)]
    struct TestAudio {
        ready_calls: usize,
        started: Vec<(PlaybackHandle, usize)>,
        stopped: Vec<PlaybackHandle>,
        disposed: Vec<PlaybackHandle>,
    }
    impl AudioScheduler for TestAudio {
        fn ensure_ready(&mut self) -> anyhow::Result<()> {
            self.ready_calls += 1;
            Ok(())
        }

        fn start(&mut self, notes: &[ScheduledNote]) -> anyhow::Result<PlaybackHandle> {
            let handle = PlaybackHandle(self.started.len() + 1);
            self.started.push((handle, notes.len()));
            Ok(handle)
        }

        fn stop(&mut self, handle: PlaybackHandle) {
            self.stopped.push(handle);
        }

        fn dispose(&mut self, handle: PlaybackHandle) {
            self.disposed.push(handle);
        }
    }

    #[derive(Default)]
    struct TestRenderer {
        draws: usize,
        last_unit_count: usize,
    }
    impl Renderer for TestRenderer {
        fn draw(&mut self, staff: &Staff) {
            self.draws += 1;
            self.last_unit_count = staff.units.len();
        }
    }

    fn pixel(session: &EditorSession, tick: usize, pitch: Pitch) -> (f64, f64) {
        let p = session.mapper().to_pixel(GridCell {
            tick: Tick(tick),
            pitch,
        });
        (p.x, p.y)
    }

    #[test]
    fn clicking_places_and_erases() {
        let mut s = EditorSession::default();
        let (x, y) = pixel(&s, 96, Pitch::E4);
        assert!(matches!(s.click(x, y), Ok(ClickOutcome::Added(_))));
        assert_eq!(s.click(x, y).unwrap(), ClickOutcome::Unchanged);
        assert_eq!(s.len(), 1);
        assert_eq!(s.events()[0].resolved_pitch(), Some(Pitch::E4));

        // Anywhere inside the note's extent erases it.
        let (x, y) = pixel(&s, 168, Pitch::E4);
        assert!(matches!(s.double_click(x, y), Ok(ClickOutcome::Erased(_))));
        assert!(s.is_empty());
        assert_eq!(s.double_click(x, y).unwrap(), ClickOutcome::Unchanged);
    }

    #[test]
    fn erasing_removes_the_rest_under_the_pointer() {
        let mut s = EditorSession::default();
        s.add_event(Event::new_rest(Tick(0), NoteValue::Sixteenth));
        let long_rest = s.add_event(Event::new_rest(Tick(0), NoteValue::Half)).unwrap();

        let (x, y) = pixel(&s, 120, Pitch::C4);
        match s.double_click(x, y).unwrap() {
            ClickOutcome::Erased(event) => {
                assert_eq!(event.uid, long_rest);
                assert_eq!(event.length, Tick(192));
            }
            other => panic!("expected an erase, got {other:?}"),
        }
        assert_eq!(s.len(), 1);
        assert_eq!(s.events()[0].length, Tick(24));
    }

    #[test]
    fn corrupt_seeds_dont_panic() {
        let mut s = EditorSession::default();
        let seed = format!(
            "td1.{}",
            hex::encode(format!(
                r#"[{{"id":{},"type":"note","pitch":"C4","pos":{},"len":96}},
                   {{"id":{},"type":"note","pitch":"E4","pos":0,"len":96}}]"#,
                u64::MAX,
                u64::MAX,
                u64::MAX
            ))
        );
        assert_eq!(s.load_seed(&seed).unwrap(), 2);
        let uids: std::collections::HashSet<EventUid> = s.events().iter().map(|e| e.uid).collect();
        assert_eq!(uids.len(), 2, "uids are unique after loading");

        assert_eq!(s.apply_style("arpeggio-major").unwrap(), 4);
        assert_eq!(s.staff().total_ticks(), Tick(1536));

        #[derive(Default)]
        struct Collect(Vec<u8>);
        impl FileSink for Collect {
            fn write(&mut self, payload: &[u8], _: &str, _: &str) -> anyhow::Result<()> {
                self.0 = payload.to_vec();
                Ok(())
            }
        }
        s.load_seed(&seed).unwrap();
        let mut sink = Collect::default();
        s.export_midi(&mut sink).unwrap();
        assert_eq!(&sink.0[0..4], b"MThd");
        s.export_pattern(&mut sink).unwrap();
        assert!(s.add_event(Event::new_note(Pitch::G4, Tick(0), NoteValue::Quarter)).is_some());
    }

    #[test]
    fn tools() {
        let mut s = EditorSession::default();
        s.set_tool(Tool::Rest(NoteValue::Half));
        let (x, y) = pixel(&s, 0, Pitch::C3);
        s.click(x, y).unwrap();
        assert!(s.events()[0].is_rest());
        assert_eq!(s.events()[0].length, Tick(192));

        s.set_tool(Tool::Eraser);
        let (x, y) = pixel(&s, 48, Pitch::A4);
        assert!(matches!(s.click(x, y), Ok(ClickOutcome::Erased(_))));
        assert!(s.is_empty());
    }

    #[test]
    fn clicks_outside_change_nothing() {
        let mut s = EditorSession::default();
        assert!(matches!(
            s.click(10.0, 5000.0),
            Err(EditorError::OutsideGrid { .. })
        ));
        assert!(s.is_empty());
    }

    #[test]
    fn notes_that_wont_fit_are_ignored() {
        let mut s = EditorSession::default();
        s.set_tool(Tool::Note(NoteValue::Whole));
        let (x, y) = pixel(&s, 1440, Pitch::C4);
        assert_eq!(s.click(x, y).unwrap(), ClickOutcome::Unchanged);
        assert!(s.is_empty());
    }

    #[test]
    fn styles_and_bad_styles() {
        let mut s = EditorSession::default();
        s.add_event(Event::new_note(Pitch::C4, Tick(0), NoteValue::Quarter));
        assert_eq!(s.apply_style("power-chord").unwrap(), 3);

        let before = s.events().to_vec();
        assert!(matches!(
            s.apply_style("bossa-nova"),
            Err(EditorError::UnknownStyle(_))
        ));
        assert_eq!(s.events(), before.as_slice());
    }

    #[test]
    fn seeds() {
        let mut s = EditorSession::default();
        s.add_event(Event::new_note(Pitch::C4, Tick(0), NoteValue::Quarter));
        s.add_event(Event::new_rest(Tick(96), NoteValue::Eighth));
        let seed = s.seed().unwrap();

        let mut other = EditorSession::default();
        assert_eq!(other.load_seed(&seed).unwrap(), 2);
        assert_eq!(other.events(), s.events());

        let bad = format!("td1.{}", hex::encode("\"not an array\""));
        assert!(matches!(
            other.load_seed(&bad),
            Err(EditorError::InvalidSeed(SeedError::NotASequence))
        ));
        assert_eq!(other.events(), s.events());
    }

    #[test]
    fn staff_is_recompiled_only_on_change() {
        let mut s = EditorSession::default();
        let mut renderer = TestRenderer::default();
        assert!(s.refresh(&mut renderer));
        assert!(!s.refresh(&mut renderer));
        assert_eq!(renderer.last_unit_count, 4);

        s.add_event(Event::new_note(Pitch::C4, Tick(0), NoteValue::Quarter));
        assert!(s.refresh(&mut renderer));
        assert_eq!(renderer.draws, 2);
        assert_eq!(s.staff().total_ticks(), Tick(1536));

        s.redraw(&mut renderer);
        assert_eq!(renderer.draws, 3);
    }

    #[test]
    fn playback_lifecycle() {
        let mut s = EditorSession::default();
        s.add_event(Event::new_note(Pitch::C4, Tick(0), NoteValue::Quarter));
        let mut audio = TestAudio::default();

        let first = s.play(&mut audio).unwrap();
        assert!(s.is_playing());
        let second = s.play(&mut audio).unwrap();
        assert_ne!(first, second);
        assert_eq!(audio.ready_calls, 1, "the handshake happens once");
        assert_eq!(audio.stopped, vec![first], "the old playback stops first");
        assert_eq!(audio.disposed, vec![first]);
        assert_eq!(audio.started, vec![(first, 1), (second, 1)]);

        assert!(s.stop(&mut audio));
        assert!(!s.stop(&mut audio));
        assert!(!s.is_playing());
        assert_eq!(audio.disposed, vec![first, second]);
    }

    #[test]
    fn settings_shape_the_session() {
        let mut settings = EditorSettings::default();
        settings.set_measures(2);
        settings.set_default_note_value(NoteValue::Eighth);
        let s = EditorSession::new_from_settings(&settings).unwrap();
        assert_eq!(s.timeline().total_ticks(), Tick(768));
        assert_eq!(s.mapper().timeline(), s.timeline());
        assert_eq!(s.tool(), Tool::Note(NoteValue::Eighth));
    }
}
