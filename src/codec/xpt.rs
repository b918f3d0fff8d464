// Copyright (c) 2024 Mike Tsao

//! Exports a tune as an LMMS pattern (`.xpt`) document.

use crate::composition::Tune;
use std::fmt::Write;

/// The MIME type that file sinks should label the document with.
pub const XPT_MIME_TYPE: &str = "application/xml";

/// The document's file extension.
pub const XPT_EXTENSION: &str = "xpt";

const CREATOR: &str = "Tune-Dex Engine";
const VELOCITY: u8 = 100;
const PAN: i8 = 0;

/// Builds the pattern document. Only notes are written, in the order they
/// were added to the tune; the format has no use for rests. A pitch that isn't
/// in the chromatic table is written as Middle C.
pub fn to_xpt(tune: &Tune) -> String {
    let mut xml = String::default();
    let _ = write!(
        xml,
        "<?xml version=\"1.0\"?>\n\
         <!DOCTYPE lmms-project>\n\
         <lmms-project type=\"pattern\" creatorversion=\"1.3.0\" creator=\"{CREATOR}\" version=\"20\">\n  \
         <head/>\n  \
         <pattern type=\"1\" muted=\"0\" steps=\"16\" name=\"{}\" pos=\"0\">\n",
        escape(&tune.title)
    );
    for event in tune.events().iter().filter(|e| e.is_note()) {
        let key = event
            .pitch
            .as_ref()
            .map(|p| p.midi_code_or_fallback())
            .unwrap_or(crate::types::Pitch::FALLBACK_MIDI_CODE);
        let _ = writeln!(
            xml,
            "    <note key=\"{key}\" pan=\"{PAN}\" len=\"{}\" pos=\"{}\" vol=\"{VELOCITY}\"/>",
            event.length, event.position
        );
    }
    xml.push_str("  </pattern>\n</lmms-project>");
    xml
}

/// A file name derived from the tune's title.
pub fn file_name(tune: &Tune) -> String {
    format!("{}.{XPT_EXTENSION}", super::safe_file_stem(&tune.title))
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
