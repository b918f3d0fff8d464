// Copyright (c) 2024 Mike Tsao

//! Persistent editor preferences. Intended to be serialized.

use crate::{
    editor::{GridMapper, GridMapperBuilder},
    traits::HasSettings,
    types::{NoteValue, Tempo, TimeSignature, Timeline},
};
use anyhow::Context;
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contains the settings that shape a new editing session: the size of the
/// grid, the starting tempo, and the tool's default note value.
#[derive(Clone, Debug, Derivative, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(default, rename_all = "kebab-case")]
pub struct EditorSettings {
    #[derivative(Default(value = "4"))]
    measures: usize,
    time_signature: TimeSignature,
    tempo: Tempo,
    #[derivative(Default(value = "800.0"))]
    viewport_width: f64,
    #[derivative(Default(value = "20.0"))]
    lane_height: f64,
    default_note_value: NoteValue,

    #[serde(skip)]
    has_been_saved: bool,
}
impl HasSettings for EditorSettings {
    fn has_been_saved(&self) -> bool {
        self.has_been_saved
    }

    fn needs_save(&mut self) {
        self.has_been_saved = false;
    }

    fn mark_clean(&mut self) {
        self.has_been_saved = true;
    }
}
impl EditorSettings {
    /// Reads settings from a JSON file. Fields missing from the file take
    /// their default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let mut settings: Self = serde_json::from_str(&json)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        settings.mark_clean();
        Ok(settings)
    }

    /// Like [EditorSettings::load()], but a missing file yields defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::info!("No settings at {}; using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Writes settings to a JSON file.
    pub fn save(&mut self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing settings to {}", path.display()))?;
        self.mark_clean();
        Ok(())
    }

    /// The timeline a new tune should get.
    pub fn timeline(&self) -> Timeline {
        Timeline::new_with(self.measures, self.time_signature)
    }

    /// A mapper sized for the configured viewport.
    pub fn mapper(&self) -> anyhow::Result<GridMapper> {
        GridMapperBuilder::default()
            .viewport_width(self.viewport_width)
            .lane_height(self.lane_height)
            .timeline(self.timeline())
            .build()
            .context("configuring the grid")
    }

    #[allow(missing_docs)]
    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    #[allow(missing_docs)]
    pub fn default_note_value(&self) -> NoteValue {
        self.default_note_value
    }

    #[allow(missing_docs)]
    pub fn set_measures(&mut self, measures: usize) {
        if measures != self.measures {
            self.measures = measures;
            self.needs_save();
        }
    }

    #[allow(missing_docs)]
    pub fn set_time_signature(&mut self, time_signature: TimeSignature) {
        if time_signature != self.time_signature {
            self.time_signature = time_signature;
            self.needs_save();
        }
    }

    #[allow(missing_docs)]
    pub fn set_tempo(&mut self, tempo: Tempo) {
        let tempo = tempo.clamped();
        if tempo != self.tempo {
            self.tempo = tempo;
            self.needs_save();
        }
    }

    #[allow(missing_docs)]
    pub fn set_default_note_value(&mut self, value: NoteValue) {
        if value != self.default_note_value {
            self.default_note_value = value;
            self.needs_save();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults() {
        let settings = EditorSettings::default();
        assert_eq!(settings.timeline(), Timeline::default());
        assert_eq!(settings.tempo(), Tempo::default());
        assert_eq!(settings.default_note_value(), NoteValue::Quarter);
        assert_eq!(settings.mapper().unwrap(), GridMapper::default());
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let settings: EditorSettings =
            serde_json::from_str(r#"{"measures": 8, "default-note-value": "eighth"}"#).unwrap();
        assert_eq!(settings.timeline().total_ticks().0, 8 * 384);
        assert_eq!(settings.default_note_value(), NoteValue::Eighth);
        assert_eq!(settings.tempo(), Tempo::default());
    }

    #[test]
    fn save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = EditorSettings::default();
        settings.set_measures(2);
        settings.set_time_signature(TimeSignature::THREE_FOUR);
        assert!(!settings.has_been_saved());

        settings.save(&path).unwrap();
        assert!(settings.has_been_saved());
        let loaded = EditorSettings::load(&path).unwrap();
        assert_eq!(loaded.timeline().total_ticks().0, 2 * 288);
        assert!(loaded.has_been_saved());
    }

    #[test]
    fn missing_and_broken_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.json");
        assert!(EditorSettings::load(&path).is_err());
        assert_eq!(
            EditorSettings::load_or_default(&path).unwrap(),
            EditorSettings::default()
        );

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(EditorSettings::load(&path).is_err());
    }

    #[test]
    fn bad_time_signatures_are_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"time-signature": {"top": 4, "bottom": 0}}"#).unwrap();
        assert!(EditorSettings::load(&path).is_err());
        assert!(EditorSettings::load_or_default(&path).is_err());
    }

    #[test]
    fn bad_viewports_are_reported() {
        let settings: EditorSettings = serde_json::from_str(r#"{"lane-height": -3.0}"#).unwrap();
        assert!(settings.mapper().is_err());

        let settings: EditorSettings = serde_json::from_str(r#"{"measures": 0}"#).unwrap();
        assert!(settings.mapper().is_err());
    }
}
