// Copyright (c) 2024 Mike Tsao

use super::{NotationUnit, Staff};
use crate::{
    traits::Renderer,
    types::{NoteValue, Pitch, Tempo, Tick},
};
use std::fmt::Write;

// Indexed by pitch class. Sharps, to match the grid's lane labels.
const LY_PITCH_NAMES: [&str; 12] = [
    "c", "cis", "d", "dis", "e", "f", "fis", "g", "gis", "a", "ais", "b",
];

/// [LilyPondRenderer] engraves a [Staff] as [LilyPond](https://lilypond.org)
/// source text. Units that cross a barline are split there; split notes are
/// tied, split rests aren't.
#[derive(Debug, Default)]
pub struct LilyPondRenderer {
    title: Option<String>,
    tempo: Option<Tempo>,
    source: String,
}
impl Renderer for LilyPondRenderer {
    fn draw(&mut self, staff: &Staff) {
        self.source = self.render(staff);
    }
}
impl LilyPondRenderer {
    #[allow(missing_docs)]
    pub fn new_with(title: &str, tempo: Tempo) -> Self {
        Self {
            title: Some(title.to_string()),
            tempo: Some(tempo),
            source: String::default(),
        }
    }

    /// The text produced by the most recent draw.
    pub fn source(&self) -> &str {
        &self.source
    }

    #[allow(missing_docs)]
    pub fn take_source(&mut self) -> String {
        std::mem::take(&mut self.source)
    }

    fn render(&self, staff: &Staff) -> String {
        let mut ly = String::from("\\version \"2.24.0\"\n\n");
        if let Some(title) = self.title.as_ref() {
            let _ = write!(
                ly,
                "\\header {{\n  title = \"{}\"\n}}\n\n",
                title.replace('\\', "\\\\").replace('"', "\\\"")
            );
        }
        let _ = write!(
            ly,
            "\\score {{\n  \\new Staff \\absolute {{\n    \\time {}\n",
            staff.timeline.time_signature
        );
        if let Some(tempo) = self.tempo {
            let _ = writeln!(ly, "    \\tempo 4 = {}", tempo.0.round() as u32);
        }
        let _ = write!(
            ly,
            "    {}\n  }}\n  \\layout {{ }}\n}}\n",
            Self::music(staff)
        );
        ly
    }

    fn music(staff: &Staff) -> String {
        let measure = staff.timeline.time_signature.measure();
        let mut out = String::default();
        for unit in &staff.units {
            let fragments = split_at_barlines(unit.position, unit.ticks(), measure);
            let mut end = unit.position.0;
            for (i, fragment) in fragments.iter().enumerate() {
                let parts = decompose(*fragment);
                for (j, value) in parts.iter().enumerate() {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    out.push_str(&Self::unit_text(unit, *value));
                    let more = j + 1 < parts.len() || i + 1 < fragments.len();
                    if more && !unit.is_rest() {
                        out.push('~');
                    }
                }
                end += fragment.0;
                if measure.0 != 0 && end % measure.0 == 0 {
                    out.push_str(" |");
                }
            }
        }
        out
    }

    fn unit_text(unit: &NotationUnit, value: NoteValue) -> String {
        let duration = value.denominator();
        match unit.pitches.as_slice() {
            [] => format!("r{duration}"),
            [pitch] => format!("{}{duration}", pitch_text(*pitch)),
            pitches => {
                let chord: Vec<String> = pitches.iter().map(|p| pitch_text(*p)).collect();
                format!("<{}>{duration}", chord.join(" "))
            }
        }
    }
}

/// LilyPond's absolute pitch: `c` with no marks is C3.
fn pitch_text(pitch: Pitch) -> String {
    let code = pitch.midi_code();
    let mut text = LY_PITCH_NAMES[(code % 12) as usize].to_string();
    let octave = (code / 12) as i8 - 4;
    if octave > 0 {
        text.push_str(&"'".repeat(octave as usize));
    } else if octave < 0 {
        text.push_str(&",".repeat(octave.unsigned_abs() as usize));
    }
    text
}

/// Splits `start..start+length` wherever it crosses a multiple of `measure`.
fn split_at_barlines(start: Tick, length: Tick, measure: Tick) -> Vec<Tick> {
    if measure.0 == 0 {
        return vec![length];
    }
    let mut fragments = Vec::default();
    let mut position = start.0;
    let mut remaining = length.0;
    while remaining > 0 {
        let bar_end = (position / measure.0 + 1) * measure.0;
        let fragment = remaining.min(bar_end - position);
        fragments.push(Tick(fragment));
        remaining -= fragment;
        position += fragment;
    }
    fragments
}

/// Greedy, largest first. Fragments are always whole sixteenths, so nothing
/// is left over.
fn decompose(ticks: Tick) -> Vec<NoteValue> {
    let mut parts = Vec::default();
    let mut remaining = ticks;
    while let Some(value) = NoteValue::largest_fitting(remaining) {
        parts.push(value);
        remaining = Tick(remaining.0 - value.ticks().0);
    }
    parts
}
