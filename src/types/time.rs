// Copyright (c) 2024 Mike Tsao

//! Handles musical time on the tick grid, and the wall-clock time that
//! playback needs.

use anyhow::{anyhow, Error};
use core::fmt::{self, Display};
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display as StrumDisplay, EnumCount, EnumIter, IntoStaticStr};
use synonym::Synonym;

/// [Tick] is the universal unit of time on the grid. Every position and every
/// length in a tune is a whole number of ticks from the start of the timeline.
#[derive(Synonym, Serialize, Deserialize)]
pub struct Tick(pub usize);
#[allow(missing_docs)]
impl Tick {
    pub const PER_QUARTER: usize = 96;
    pub const PER_WHOLE: usize = Self::PER_QUARTER * 4;

    pub const ZERO: Tick = Tick(0);

    /// The smallest placeable offset or duration: one sixteenth note.
    pub const QUANTUM: Tick = Tick(Self::PER_QUARTER / 4);

    /// Rounds down to the nearest multiple of `quantum`.
    pub const fn snapped(&self, quantum: Tick) -> Tick {
        if quantum.0 == 0 {
            *self
        } else {
            Tick((self.0 / quantum.0) * quantum.0)
        }
    }

    /// Returns true if this tick lies exactly on a `quantum` boundary.
    pub const fn is_aligned(&self, quantum: Tick) -> bool {
        quantum.0 != 0 && self.0 % quantum.0 == 0
    }
}

/// [NoteValue] enumerates the only durations a note or rest may have. The
/// declaration order is largest first, which is the order that gap filling
/// tries them in.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    EnumCount,
    EnumIter,
    Eq,
    Hash,
    IntoStaticStr,
    PartialEq,
    Serialize,
    Deserialize,
    StrumDisplay,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum NoteValue {
    /// semibreve
    Whole,
    /// minim
    Half,
    /// crotchet
    #[default]
    Quarter,
    /// quaver
    Eighth,
    /// semiquaver
    Sixteenth,
}
impl NoteValue {
    /// How many ticks this value lasts.
    pub const fn ticks(&self) -> Tick {
        match self {
            NoteValue::Whole => Tick(Tick::PER_WHOLE),
            NoteValue::Half => Tick(Tick::PER_WHOLE / 2),
            NoteValue::Quarter => Tick(Tick::PER_QUARTER),
            NoteValue::Eighth => Tick(Tick::PER_QUARTER / 2),
            NoteValue::Sixteenth => Tick(Tick::PER_QUARTER / 4),
        }
    }

    /// The value whose length is exactly `ticks`, if there is one.
    pub fn from_ticks(ticks: Tick) -> Option<Self> {
        Self::iter().find(|v| v.ticks() == ticks)
    }

    /// The largest value that fits in `ticks`. None if even a sixteenth is
    /// too long.
    pub fn largest_fitting(ticks: Tick) -> Option<Self> {
        Self::iter().find(|v| v.ticks().0 <= ticks.0)
    }

    /// The reciprocal used by most engraving tools (1 = whole, 4 = quarter).
    pub const fn denominator(&self) -> usize {
        match self {
            NoteValue::Whole => 1,
            NoteValue::Half => 2,
            NoteValue::Quarter => 4,
            NoteValue::Eighth => 8,
            NoteValue::Sixteenth => 16,
        }
    }

    /// Parses a value from its kebab-case name ("quarter") or its
    /// denominator ("4").
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::iter().find(|v| {
            let name: &'static str = v.into();
            name == s || v.denominator().to_string() == s
        })
    }
}

/// [TimeSignature] represents a music [time
/// signature](https://en.wikipedia.org/wiki/Time_signature).
///
/// The top number tells how many beats are in a measure. The bottom number
/// tells the value of a beat. In 4/4, a measure holds four quarter notes,
/// which on this grid is 384 ticks.
#[derive(Clone, Copy, Debug, Derivative, Eq, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case", try_from = "RawTimeSignature")]
pub struct TimeSignature {
    /// The number of beats in a measure.
    #[derivative(Default(value = "4"))]
    pub top: usize,

    /// The value of a beat, expressed as a reciprocal.
    #[derivative(Default(value = "4"))]
    pub bottom: usize,
}
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawTimeSignature {
    top: usize,
    bottom: usize,
}
impl TryFrom<RawTimeSignature> for TimeSignature {
    type Error = Error;

    fn try_from(raw: RawTimeSignature) -> Result<Self, Self::Error> {
        Self::new_with(raw.top, raw.bottom)
    }
}
impl Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{}/{}", self.top, self.bottom))
    }
}
#[allow(missing_docs)]
impl TimeSignature {
    /// C time = common time = 4/4
    pub const COMMON_TIME: Self = TimeSignature { top: 4, bottom: 4 };

    /// Waltz time.
    pub const THREE_FOUR: Self = TimeSignature { top: 3, bottom: 4 };

    pub fn new_with(top: usize, bottom: usize) -> anyhow::Result<Self, Error> {
        if top == 0 {
            Err(anyhow!("Time signature top can't be zero."))
        } else if !matches!(bottom, 1 | 2 | 4 | 8 | 16) {
            Err(anyhow!(
                "Time signature bottom must be 1, 2, 4, 8, or 16 (was {bottom})."
            ))
        } else {
            Ok(Self { top, bottom })
        }
    }

    /// The length of one beat. Zero if `bottom` is zero, which only a
    /// hand-built signature can have.
    pub const fn beat(&self) -> Tick {
        match Tick::PER_WHOLE.checked_div(self.bottom) {
            Some(ticks) => Tick(ticks),
            None => Tick::ZERO,
        }
    }

    /// The length of one measure.
    pub const fn measure(&self) -> Tick {
        Tick(self.beat().0.saturating_mul(self.top))
    }
}

/// A [Timeline] is the fixed-capacity tick span that a tune occupies.
#[derive(Clone, Copy, Debug, Derivative, Eq, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case")]
pub struct Timeline {
    /// How many measures the grid shows.
    #[derivative(Default(value = "4"))]
    pub measures: usize,
    #[allow(missing_docs)]
    pub time_signature: TimeSignature,
}
impl Timeline {
    /// Creates a [Timeline] with the given size.
    pub const fn new_with(measures: usize, time_signature: TimeSignature) -> Self {
        Self {
            measures,
            time_signature,
        }
    }

    /// Total tick capacity: measures times ticks per measure.
    pub const fn total_ticks(&self) -> Tick {
        Tick(self.measures.saturating_mul(self.time_signature.measure().0))
    }

    /// The grid's placement granularity.
    pub const fn quantum(&self) -> Tick {
        Tick::QUANTUM
    }

    /// Returns true if something starting at `position` and lasting `length`
    /// fits inside the timeline.
    pub const fn contains(&self, position: Tick, length: Tick) -> bool {
        match position.0.checked_add(length.0) {
            Some(end) => end <= self.total_ticks().0,
            None => false,
        }
    }
}

/// Beats per minute.
#[derive(Synonym, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
#[synonym(skip(Default, Display))]
#[serde(rename_all = "kebab-case")]
pub struct Tempo(#[derivative(Default(value = "120.0"))] pub f64);
impl Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:0.2} BPM", self.0))
    }
}
impl From<u16> for Tempo {
    fn from(value: u16) -> Self {
        Self(value as f64)
    }
}
impl Tempo {
    /// The largest value we'll allow.
    pub const MAX_VALUE: f64 = 1024.0;

    /// The smallest value we'll allow. Zero would stop time entirely.
    pub const MIN_VALUE: f64 = 1.0;

    /// Beats per second.
    pub fn bps(&self) -> f64 {
        self.0 / 60.0
    }

    /// How long one quarter-note beat lasts.
    pub fn seconds_per_beat(&self) -> Seconds {
        Seconds(1.0 / self.bps())
    }

    /// Converts a tick count into wall-clock time. Tempo is measured in
    /// quarter notes per minute regardless of time signature.
    pub fn ticks_to_seconds(&self, ticks: Tick) -> Seconds {
        Seconds(ticks.0 as f64 / Tick::PER_QUARTER as f64 * self.seconds_per_beat().0)
    }

    /// MIN..=MAX
    pub const fn range() -> core::ops::RangeInclusive<f64> {
        Self::MIN_VALUE..=Self::MAX_VALUE
    }

    /// Clamps to the allowed range.
    pub fn clamped(&self) -> Self {
        Self(self.0.clamp(Self::MIN_VALUE, Self::MAX_VALUE))
    }
}

/// Represents the [seconds](https://en.wikipedia.org/wiki/Second) unit of time.
#[derive(Synonym, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Seconds(pub f64);
impl Seconds {
    /// Zero seconds.
    pub const fn zero() -> Seconds {
        Seconds(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn tempo() {
        let t = Tempo::default();
        assert_eq!(t.0, 120.0);
        assert_eq!(Tempo(5000.0).clamped().0, Tempo::MAX_VALUE);
    }

    #[test]
    fn note_values_are_largest_first() {
        let ticks: Vec<usize> = NoteValue::iter().map(|v| v.ticks().0).collect();
        assert_eq!(ticks, vec![384, 192, 96, 48, 24]);
        assert_eq!(NoteValue::Sixteenth.ticks(), Tick::QUANTUM);
    }

    #[test]
    fn note_value_lookups() {
        assert_eq!(NoteValue::from_ticks(Tick(96)), Some(NoteValue::Quarter));
        assert_eq!(NoteValue::from_ticks(Tick(72)), None, "dotted values aren't enumerated");
        assert_eq!(
            NoteValue::largest_fitting(Tick(300)),
            Some(NoteValue::Half)
        );
        assert_eq!(NoteValue::largest_fitting(Tick(23)), None);
        assert_eq!(NoteValue::parse("eighth"), Some(NoteValue::Eighth));
        assert_eq!(NoteValue::parse("16"), Some(NoteValue::Sixteenth));
        assert_eq!(NoteValue::parse("dotted-half"), None);
    }

    #[test]
    fn valid_time_signatures_can_be_instantiated() {
        let ts = TimeSignature::default();
        assert_eq!(ts.top, 4);
        assert_eq!(ts.bottom, 4);
        assert!(TimeSignature::new_with(ts.top, ts.bottom).is_ok());
        assert_eq!(ts.measure(), Tick(384));
        assert_eq!(TimeSignature::THREE_FOUR.measure(), Tick(288));
    }

    #[test]
    fn time_signature_with_bad_top_is_invalid() {
        assert!(TimeSignature::new_with(0, 4).is_err());
    }

    #[test]
    fn time_signature_with_bottom_not_power_of_two_is_invalid() {
        assert!(TimeSignature::new_with(4, 5).is_err());
        assert!(TimeSignature::new_with(4, 0).is_err());
        assert!(TimeSignature::new_with(4, 32).is_err());
    }

    #[test]
    fn time_signatures_are_validated_when_deserialized() {
        let ts: TimeSignature = serde_json::from_str(r#"{"top": 3, "bottom": 8}"#).unwrap();
        assert_eq!(ts.measure(), Tick(144));
        assert!(serde_json::from_str::<TimeSignature>(r#"{"top": 4, "bottom": 0}"#).is_err());
        assert!(serde_json::from_str::<TimeSignature>(r#"{"top": 0, "bottom": 4}"#).is_err());
        assert!(serde_json::from_str::<Timeline>(
            r#"{"measures": 2, "time-signature": {"top": 4, "bottom": 0}}"#
        )
        .is_err());

        let hand_built = TimeSignature { top: 4, bottom: 0 };
        assert_eq!(hand_built.beat(), Tick::ZERO);
        assert_eq!(hand_built.measure(), Tick::ZERO);
    }

    #[test]
    fn default_timeline_capacity() {
        let timeline = Timeline::default();
        assert_eq!(timeline.total_ticks(), Tick(1536));
        assert!(timeline.contains(Tick(1440), Tick(96)));
        assert!(!timeline.contains(Tick(1464), Tick(96)));
    }

    #[test]
    fn huge_values_dont_overflow() {
        let timeline = Timeline::default();
        assert!(!timeline.contains(Tick(usize::MAX), Tick(96)));
        assert!(!timeline.contains(Tick(96), Tick(usize::MAX)));

        let enormous = Timeline::new_with(usize::MAX, TimeSignature::COMMON_TIME);
        assert_eq!(enormous.total_ticks(), Tick(usize::MAX));
    }

    #[test]
    fn snapping() {
        assert_eq!(Tick(47).snapped(Tick::QUANTUM), Tick(24));
        assert_eq!(Tick(48).snapped(Tick::QUANTUM), Tick(48));
        assert!(Tick(48).is_aligned(Tick::QUANTUM));
        assert!(!Tick(50).is_aligned(Tick::QUANTUM));
    }

    #[test]
    fn ticks_to_seconds() {
        let tempo = Tempo::default();
        assert!(approx_eq!(
            f64,
            tempo.ticks_to_seconds(NoteValue::Quarter.ticks()).0,
            0.5
        ));
        assert!(approx_eq!(
            f64,
            tempo.ticks_to_seconds(Timeline::default().total_ticks()).0,
            8.0
        ));
    }
}
