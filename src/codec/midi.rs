// Copyright (c) 2024 Mike Tsao

//! Exports a tune as a Standard MIDI File.
//!
//! The output is a single-track (format 0) file whose timing is the tune's
//! own tick grid, so positions and lengths are written through unchanged.

use crate::{
    composition::Tune,
    types::{Pitch, Tick},
};
use anyhow::anyhow;
use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};

/// The MIME type that file sinks should label the file with.
pub const MIDI_MIME_TYPE: &str = "audio/midi";

/// The file's extension.
pub const MIDI_EXTENSION: &str = "mid";

const CHANNEL: u8 = 0;
const VELOCITY: u8 = 100;

// Delta times are 28-bit, so nothing may happen later than this.
const MAX_TICK: usize = 0x0FFF_FFFF;

/// Builds the in-memory file. It borrows the tune's title for the track
/// name.
pub fn to_smf(tune: &Tune) -> Smf<'_> {
    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(Tick::PER_QUARTER as u16)),
    ));

    let mut track: Track<'_> = Vec::default();
    track.push(meta(0, MetaMessage::TrackName(tune.title.as_bytes())));

    let microseconds_per_quarter = (60_000_000.0 / tune.tempo.clamped().0).round() as u32;
    track.push(meta(
        0,
        MetaMessage::Tempo(u24::new(microseconds_per_quarter.min(0x00FF_FFFF))),
    ));

    let time_signature = tune.time_signature();
    track.push(meta(
        0,
        MetaMessage::TimeSignature(
            time_signature.top.min(u8::MAX as usize) as u8,
            time_signature.bottom.trailing_zeros() as u8,
            24,
            8,
        ),
    ));

    // (tick, is_on, key). Offs sort before ons at the same tick so that a
    // repeated key retriggers cleanly.
    let mut messages: Vec<(usize, bool, u8)> = Vec::default();
    for event in tune.events().iter().filter(|e| e.is_note()) {
        let Some(end) = event.checked_end().filter(|end| end.0 <= MAX_TICK) else {
            log::warn!("Leaving out {event:?}: it ends too late for a MIDI file");
            continue;
        };
        let key = event
            .pitch
            .as_ref()
            .map(|p| p.midi_code_or_fallback())
            .unwrap_or(Pitch::FALLBACK_MIDI_CODE);
        messages.push((event.position.0, true, key));
        messages.push((end.0, false, key));
    }
    messages.sort();

    let mut last_tick = 0;
    for (tick, is_on, key) in messages {
        let delta = (tick - last_tick) as u32;
        last_tick = tick;
        let message = if is_on {
            MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(VELOCITY),
            }
        } else {
            MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(0),
            }
        };
        track.push(TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(CHANNEL),
                message,
            },
        });
    }

    let end = tune.timeline().total_ticks().0.min(MAX_TICK).max(last_tick);
    track.push(meta((end - last_tick) as u32, MetaMessage::EndOfTrack));
    smf.tracks.push(track);
    smf
}

/// Serializes the file to bytes.
pub fn to_midi_bytes(tune: &Tune) -> anyhow::Result<Vec<u8>> {
    let mut buf = Vec::default();
    to_smf(tune)
        .write(&mut buf)
        .map_err(|e| anyhow!("writing MIDI: {e}"))?;
    Ok(buf)
}

/// A file name derived from the tune's title.
pub fn file_name(tune: &Tune) -> String {
    format!("{}.{MIDI_EXTENSION}", super::safe_file_stem(&tune.title))
}

fn meta(delta: u32, message: MetaMessage<'_>) -> TrackEvent<'_> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Meta(message),
    }
}
