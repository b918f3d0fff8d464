// Copyright (c) 2024 Mike Tsao

use core::fmt::Display;
use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{EnumCount as EnumCountMacro, EnumIter, FromRepr};
use synonym::Synonym;

/// The fixed chromatic table that the grid's lanes are drawn from: three
/// octaves, C3 through B5. Discriminants are MIDI key codes, with C4 = 60
/// ("Middle C").
#[allow(missing_docs)]
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    EnumCountMacro,
    EnumIter,
    Eq,
    FromRepr,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
#[serde(into = "PitchName", try_from = "PitchName")]
pub enum Pitch {
    C3 = 48,
    Cs3 = 49,
    D3 = 50,
    Ds3 = 51,
    E3 = 52,
    F3 = 53,
    Fs3 = 54,
    G3 = 55,
    Gs3 = 56,
    A3 = 57,
    As3 = 58,
    B3 = 59,
    #[default]
    C4 = 60,
    Cs4 = 61,
    D4 = 62,
    Ds4 = 63,
    E4 = 64,
    F4 = 65,
    Fs4 = 66,
    G4 = 67,
    Gs4 = 68,
    A4 = 69,
    As4 = 70,
    B4 = 71,
    C5 = 72,
    Cs5 = 73,
    D5 = 74,
    Ds5 = 75,
    E5 = 76,
    F5 = 77,
    Fs5 = 78,
    G5 = 79,
    Gs5 = 80,
    A5 = 81,
    As5 = 82,
    B5 = 83,
}
#[allow(missing_docs)]
impl Pitch {
    pub const MIN: Pitch = Self::C3;
    pub const MAX: Pitch = Self::B5;

    /// The code that export formats fall back to when a pitch can't be
    /// resolved.
    pub const FALLBACK_MIDI_CODE: u8 = Self::C4 as u8;

    const NAMES: [&'static str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];

    pub const fn midi_code(&self) -> u8 {
        *self as u8
    }

    /// Position in the table counting up from C3.
    pub const fn chromatic_index(&self) -> usize {
        (*self as u8 - Self::MIN as u8) as usize
    }

    pub fn from_chromatic_index(index: isize) -> Option<Self> {
        if index < 0 || index >= Self::COUNT as isize {
            None
        } else {
            Self::from_repr(Self::MIN as u8 + index as u8)
        }
    }

    /// Moves by `semitones`. Returns None if the result would leave the
    /// table.
    pub fn transposed(&self, semitones: i8) -> Option<Self> {
        Self::from_chromatic_index(self.chromatic_index() as isize + semitones as isize)
    }

    /// Grid lanes run from the top of the grid down, so lane 0 is the highest
    /// pitch.
    pub const fn lane(&self) -> usize {
        Self::COUNT - 1 - self.chromatic_index()
    }

    pub fn from_lane(lane: usize) -> Option<Self> {
        if lane >= Self::COUNT {
            None
        } else {
            Self::from_chromatic_index((Self::COUNT - 1 - lane) as isize)
        }
    }

    pub fn octave(&self) -> i8 {
        (self.midi_code() / 12) as i8 - 1
    }

    /// The pitch class name without octave, such as "F#".
    pub fn class_name(&self) -> &'static str {
        Self::NAMES[(self.midi_code() % 12) as usize]
    }

    /// The name with octave, such as "F#4".
    pub fn name(&self) -> String {
        format!("{}{}", self.class_name(), self.octave())
    }

    /// Looks up a name like "C#4" (or "Db4"). Case-insensitive on the letter.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let split = name.find(|c: char| c.is_ascii_digit() || c == '-')?;
        let (class, octave) = name.split_at(split);
        let octave: i8 = octave.parse().ok()?;
        let mut chars = class.chars();
        let letter = chars.next()?.to_ascii_uppercase();
        let natural: i8 = match letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };
        let accidental: i8 = match chars.as_str() {
            "" => 0,
            "#" | "s" => 1,
            "b" => -1,
            _ => return None,
        };
        let code = (octave as i16 + 1) * 12 + (natural + accidental) as i16;
        if !(0..=u8::MAX as i16).contains(&code) {
            return None;
        }
        Self::from_repr(code as u8)
    }

    pub fn frequency_hz(&self) -> f64 {
        440.0 * 2.0f64.powf((self.midi_code() as f64 - 69.0) / 12.0)
    }

    /// All pitches, top lane first.
    pub fn lanes() -> impl Iterator<Item = Pitch> {
        Self::iter().rev()
    }
}
impl Display for Pitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
impl From<Pitch> for u8 {
    fn from(value: Pitch) -> Self {
        value as u8
    }
}

/// A pitch as it is stored in an event: by name. Names that aren't in the
/// chromatic table can arrive from a seed; they survive in the model and are
/// resolved (or not) by whoever consumes them.
#[derive(Synonym, Serialize, Deserialize)]
pub struct PitchName(pub String);
impl PitchName {
    /// Looks this name up in the chromatic table.
    pub fn resolve(&self) -> Option<Pitch> {
        Pitch::from_name(&self.0)
    }

    /// The MIDI code for this name, or [Pitch::FALLBACK_MIDI_CODE] if the
    /// name isn't in the table.
    pub fn midi_code_or_fallback(&self) -> u8 {
        self.resolve()
            .map(|p| p.midi_code())
            .unwrap_or(Pitch::FALLBACK_MIDI_CODE)
    }
}
impl From<Pitch> for PitchName {
    fn from(value: Pitch) -> Self {
        Self(value.name())
    }
}
impl TryFrom<PitchName> for Pitch {
    type Error = String;

    fn try_from(value: PitchName) -> Result<Self, Self::Error> {
        value
            .resolve()
            .ok_or_else(|| format!("{} isn't in the chromatic table", value.0))
    }
}
