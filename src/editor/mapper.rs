// Copyright (c) 2024 Mike Tsao

use crate::{
    composition::Event,
    types::{Pitch, Tick, Timeline},
};
use derivative::Derivative;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::EnumCount;

/// A snapped position on the grid: a quantum-aligned tick in a pitch lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridCell {
    #[allow(missing_docs)]
    pub tick: Tick,
    #[allow(missing_docs)]
    pub pitch: Pitch,
}

/// A point in viewport pixels, origin at the top left.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PixelPoint {
    #[allow(missing_docs)]
    pub x: f64,
    #[allow(missing_docs)]
    pub y: f64,
}

/// An axis-aligned rectangle in viewport pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PixelRect {
    #[allow(missing_docs)]
    pub x: f64,
    #[allow(missing_docs)]
    pub y: f64,
    #[allow(missing_docs)]
    pub width: f64,
    #[allow(missing_docs)]
    pub height: f64,
}

/// [GridMapper] translates between viewport pixels and (tick, pitch) grid
/// cells. Time runs left to right across the full viewport width; pitch lanes
/// run top to bottom from the highest pitch.
#[derive(Builder, Clone, Copy, Debug, Derivative, PartialEq, Serialize, Deserialize)]
#[builder(default, build_fn(validate = "Self::validate"))]
#[derivative(Default)]
#[serde(rename_all = "kebab-case")]
pub struct GridMapper {
    /// The width of the grid, in pixels.
    #[derivative(Default(value = "800.0"))]
    viewport_width: f64,

    /// The height of one pitch lane, in pixels.
    #[derivative(Default(value = "20.0"))]
    lane_height: f64,

    /// The span of time that the width represents.
    timeline: Timeline,
}
impl GridMapperBuilder {
    fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("viewport width", self.viewport_width),
            ("lane height", self.lane_height),
        ] {
            if let Some(value) = value {
                if !(value.is_finite() && value > 0.0) {
                    return Err(format!("{name} must be positive (was {value})"));
                }
            }
        }
        if let Some(timeline) = self.timeline {
            if timeline.total_ticks() == Tick::ZERO {
                return Err("timeline must have at least one tick".to_string());
            }
        }
        Ok(())
    }
}
impl GridMapper {
    #[allow(missing_docs)]
    pub fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    #[allow(missing_docs)]
    pub fn lane_height(&self) -> f64 {
        self.lane_height
    }

    #[allow(missing_docs)]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Keeps the horizontal scale in step with a tune whose timeline changed.
    pub fn set_timeline(&mut self, timeline: Timeline) {
        self.timeline = timeline;
    }

    /// The pixel height of all the lanes together.
    pub fn grid_height(&self) -> f64 {
        self.lane_height * Pitch::COUNT as f64
    }

    fn pixels_per_tick(&self) -> f64 {
        self.viewport_width / self.timeline.total_ticks().0 as f64
    }

    /// Maps a pixel to the grid cell it falls in, snapping the tick down to
    /// the quantum. Returns None for anything outside the grid.
    pub fn to_grid(&self, x: f64, y: f64) -> Option<GridCell> {
        if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 || x >= self.viewport_width {
            return None;
        }
        let pitch = Pitch::from_lane((y / self.lane_height).floor() as usize)?;

        let total = self.timeline.total_ticks();
        let tick = Tick(((x / self.viewport_width) * total.0 as f64).floor() as usize);
        if tick >= total {
            return None;
        }
        Some(GridCell {
            tick: tick.snapped(self.timeline.quantum()),
            pitch,
        })
    }

    /// The pixel at the center of `cell`'s quantum-wide box. Feeding it back
    /// into [GridMapper::to_grid()] yields `cell` again.
    pub fn to_pixel(&self, cell: GridCell) -> PixelPoint {
        let rect = self.cell_rect(cell);
        PixelPoint {
            x: rect.x + rect.width / 2.0,
            y: rect.y + rect.height / 2.0,
        }
    }

    /// The box, one quantum wide and one lane tall, that `cell` owns.
    pub fn cell_rect(&self, cell: GridCell) -> PixelRect {
        self.span_rect(cell.tick, self.timeline.quantum(), cell.pitch)
    }

    /// Where to draw `event`. Rests don't live in a lane, so they span the
    /// whole grid height.
    pub fn event_rect(&self, event: &Event) -> PixelRect {
        match event.resolved_pitch() {
            Some(pitch) => self.span_rect(event.position, event.length, pitch),
            None => PixelRect {
                x: event.position.0 as f64 * self.pixels_per_tick(),
                y: 0.0,
                width: event.length.0 as f64 * self.pixels_per_tick(),
                height: self.grid_height(),
            },
        }
    }

    fn span_rect(&self, start: Tick, length: Tick, pitch: Pitch) -> PixelRect {
        PixelRect {
            x: start.0 as f64 * self.pixels_per_tick(),
            y: pitch.lane() as f64 * self.lane_height,
            width: length.0 as f64 * self.pixels_per_tick(),
            height: self.lane_height,
        }
    }
}
