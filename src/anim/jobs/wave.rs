use std::f32::consts::TAU;

use bevy::math::Vec2;

use crate::anim::job::AnimationJob;
use crate::config::WaveConfig;
use crate::grid::Grid;
use crate::hex::TileId;

/// Phase offset of a tile `distance` away from the wave origin.
///
/// Distances that differ by a whole number of wavelengths share an offset.
pub fn phase_offset(distance: f32, wavelength: f32) -> f32 {
    if wavelength <= 0.0 {
        return 0.0;
    }
    distance.rem_euclid(wavelength) / wavelength * TAU
}

/// Per-tile phase offsets and outward directions from a fixed origin,
/// indexed by tile id
#[derive(Debug, Clone, Default)]
pub struct WaveField {
    offsets: Vec<f32>,
    directions: Vec<Vec2>,
    /// Grid generation the field was computed for
    generation: u64,
}

impl WaveField {
    pub fn compute(grid: &Grid, origin: Vec2, wavelength: f32) -> Self {
        let mut offsets = Vec::with_capacity(grid.tile_count());
        let mut directions = Vec::with_capacity(grid.tile_count());
        for index in 0..grid.tile_count() {
            let Some(tile) = grid.tile(TileId(index)) else {
                continue;
            };
            let delta = tile.original_anchor - origin;
            offsets.push(phase_offset(delta.length(), wavelength));
            directions.push(delta.normalize_or_zero());
        }
        Self {
            offsets,
            directions,
            generation: grid.generation(),
        }
    }

    pub fn offset(&self, tile: TileId) -> f32 {
        self.offsets.get(tile.index()).copied().unwrap_or(0.0)
    }

    pub fn direction(&self, tile: TileId) -> Vec2 {
        self.directions.get(tile.index()).copied().unwrap_or(Vec2::ZERO)
    }

    /// Whether the field was computed for the tiles `grid` holds now
    pub fn covers(&self, grid: &Grid) -> bool {
        self.generation == grid.generation() && self.offsets.len() == grid.tile_count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveTarget {
    /// Oscillate hue and lightness
    Color,
    /// Push anchors in and out along the line from the origin
    Displacement,
}

/// Travelling wave over every tile; never completes on its own
#[derive(Debug, Clone)]
pub struct WaveJob {
    target: WaveTarget,
    origin: Vec2,
    config: WaveConfig,
    field: WaveField,
    start_time: f32,
    complete: bool,
}

impl WaveJob {
    pub fn new(target: WaveTarget, origin: Vec2, config: WaveConfig) -> Self {
        Self {
            target,
            origin,
            config,
            field: WaveField::default(),
            start_time: 0.0,
            complete: false,
        }
    }

    pub fn field(&self) -> &WaveField {
        &self.field
    }

    /// Global phase at `time`, in radians
    fn progress(&self, time: f32) -> f32 {
        if self.config.period <= 0.0 {
            return 0.0;
        }
        ((time - self.start_time) / self.config.period).rem_euclid(1.0) * TAU
    }
}

impl AnimationJob for WaveJob {
    fn init(&mut self, grid: &Grid) {
        self.field = WaveField::compute(grid, self.origin, self.config.wavelength);
    }

    fn start(&mut self, time: f32, _grid: &mut Grid) {
        self.start_time = time;
        self.complete = false;
    }

    fn update(&mut self, time: f32, _dt: f32, grid: &mut Grid) {
        if !self.field.covers(grid) {
            log::debug!("Tile set changed, recomputing wave field");
            self.init(grid);
        }

        let progress = self.progress(time);
        let config = self.config;
        let field = &self.field;
        for tile in grid.active_tiles_mut() {
            let wave = (progress - field.offset(tile.id)).sin();
            match self.target {
                WaveTarget::Color => {
                    tile.color.hue = (tile.color.hue + config.hue_amplitude * wave).rem_euclid(360.0);
                    tile.color.lightness =
                        (tile.color.lightness + config.lightness_amplitude * wave).clamp(0.0, 1.0);
                }
                WaveTarget::Displacement => {
                    tile.current_anchor +=
                        field.direction(tile.id) * config.displacement_amplitude * wave;
                }
            }
        }
    }

    fn cancel(&mut self, _grid: &mut Grid) {
        self.complete = true;
    }

    fn refresh(&mut self, grid: &Grid) -> bool {
        self.init(grid);
        true
    }

    fn is_complete(&self) -> bool {
        self.complete
    }
}
