// Copyright (c) 2024 Mike Tsao

use more_asserts::assert_gt;
use tunedex::{editor::ScheduledNote, prelude::*};

/// Keeps everything it's asked to write.
#[derive(Default)]
struct MemorySink {
    files: Vec<(String, String, Vec<u8>)>,
}
impl FileSink for MemorySink {
    fn write(&mut self, payload: &[u8], file_name: &str, mime_type: &str) -> anyhow::Result<()> {
        self.files
            .push((file_name.to_string(), mime_type.to_string(), payload.to_vec()));
        Ok(())
    }
}

/// Refuses everything.
struct FullDisk;
impl FileSink for FullDisk {
    fn write(&mut self, _: &[u8], file_name: &str, _: &str) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("no room for {file_name}"))
    }
}

#[derive(Default)]
struct Speaker {
    schedules: Vec<Vec<ScheduledNote>>,
}
impl AudioScheduler for Speaker {
    fn ensure_ready(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn start(&mut self, notes: &[ScheduledNote]) -> anyhow::Result<tunedex::editor::PlaybackHandle> {
        self.schedules.push(notes.to_vec());
        Ok(tunedex::editor::PlaybackHandle(self.schedules.len()))
    }

    fn stop(&mut self, _: tunedex::editor::PlaybackHandle) {}

    fn dispose(&mut self, _: tunedex::editor::PlaybackHandle) {}
}

fn riff() -> EditorSession {
    let mut session = EditorSession::default();
    session.set_title("Riff");
    session.add_event(Event::new_note(Pitch::C4, Tick(0), NoteValue::Quarter));
    session.add_event(Event::new_rest(Tick(96), NoteValue::Quarter));
    session.add_event(Event::new_note(Pitch::G4, Tick(192), NoteValue::Half));
    session
}

#[test]
fn pattern_export() {
    let session = riff();
    let mut sink = MemorySink::default();
    session.export_pattern(&mut sink).unwrap();

    let (name, mime, payload) = &sink.files[0];
    assert_eq!(name, "Riff.xpt");
    assert_eq!(mime, "application/xml");
    let xml = String::from_utf8(payload.clone()).unwrap();
    assert_eq!(xml.matches("<note ").count(), 2, "rests aren't exported");
    assert!(xml.contains("<note key=\"67\" pan=\"0\" len=\"192\" pos=\"192\" vol=\"100\"/>"));
    assert!(xml.ends_with("</lmms-project>"));
}

#[test]
fn midi_export() {
    let session = riff();
    let mut sink = MemorySink::default();
    session.export_midi(&mut sink).unwrap();

    let (name, mime, payload) = &sink.files[0];
    assert_eq!(name, "Riff.mid");
    assert_eq!(mime, "audio/midi");
    assert_eq!(&payload[0..4], b"MThd");
    let smf = midly::Smf::parse(payload).unwrap();
    assert_eq!(smf.tracks.len(), 1);
}

#[test]
fn sink_failures_are_reported() {
    let session = riff();
    let result = session.export_pattern(&mut FullDisk);
    assert!(matches!(result, Err(EditorError::Other(_))));
    assert_eq!(session.len(), 3);
}

#[test]
fn engraving_and_playback() {
    let mut session = riff();

    let mut renderer = LilyPondRenderer::new_with("Riff", Tempo::default());
    assert!(session.refresh(&mut renderer));
    assert!(renderer.source().contains("c'4 r4 g'2 |"));

    let mut speaker = Speaker::default();
    session.play(&mut speaker).unwrap();
    let notes = &speaker.schedules[0];
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[1].pitch, Pitch::G4);
    assert_gt!(notes[1].start.0, notes[0].start.0);
    assert!(float_cmp::approx_eq!(f64, notes[1].duration.0, 1.0));
}
