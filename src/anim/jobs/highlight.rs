use std::f32::consts::PI;

use crate::anim::easing::ease_out_quad;
use crate::anim::job::AnimationJob;
use crate::config::HighlightConfig;
use crate::grid::Grid;
use crate::hex::TileId;

/// Annulus of extra lightness radiating out from one tile.
///
/// Completes after the configured duration or once the annulus has passed
/// the farthest tile, whichever comes first.
#[derive(Debug, Clone)]
pub struct HighlightJob {
    origin: TileId,
    config: HighlightConfig,
    distances: Vec<(TileId, f32)>,
    max_distance: f32,
    start_time: f32,
    elapsed: f32,
    complete: bool,
}

impl HighlightJob {
    pub fn new(origin: TileId, config: HighlightConfig) -> Self {
        Self {
            origin,
            config,
            distances: Vec::new(),
            max_distance: 0.0,
            start_time: 0.0,
            elapsed: 0.0,
            complete: false,
        }
    }

    pub fn origin(&self) -> TileId {
        self.origin
    }

    /// Current `(inner, outer)` radii of the annulus
    pub fn window(&self) -> (f32, f32) {
        let outer = self.config.speed * self.elapsed;
        (outer - self.config.width, outer)
    }
}

impl AnimationJob for HighlightJob {
    fn init(&mut self, grid: &Grid) {
        self.distances.clear();
        self.max_distance = 0.0;

        let Some(center) = grid.tile(self.origin).map(|t| t.position()) else {
            log::warn!("Highlight origin {} is not in the grid", self.origin);
            return;
        };
        for &id in grid.all_tiles() {
            if let Some(tile) = grid.tile(id) {
                let distance = tile.position().distance(center);
                self.max_distance = self.max_distance.max(distance);
                self.distances.push((id, distance));
            }
        }
    }

    fn start(&mut self, time: f32, _grid: &mut Grid) {
        self.start_time = time;
        self.elapsed = 0.0;
        self.complete = false;
    }

    fn update(&mut self, time: f32, _dt: f32, grid: &mut Grid) {
        self.elapsed = time - self.start_time;
        let (inner, outer) = self.window();
        if self.distances.is_empty()
            || self.elapsed >= self.config.duration
            || inner > self.max_distance
        {
            self.complete = true;
            return;
        }

        let fade = 1.0 - ease_out_quad(self.elapsed / self.config.duration);
        let width = self.config.width.max(f32::EPSILON);
        for &(id, distance) in &self.distances {
            if distance < inner || distance > outer {
                continue;
            }
            let Some(tile) = grid.tile_mut(id) else {
                continue;
            };
            let penetration = ((outer - distance) / width).clamp(0.0, 1.0);
            let boost = self.config.lightness * (penetration * PI).sin() * fade;
            tile.color.lightness = (tile.color.lightness + boost).min(1.0);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::jobs::tests::small_grid;

    fn config() -> HighlightConfig {
        HighlightConfig {
            speed: 500.0,
            width: 100.0,
            duration: 10.0,
            lightness: 0.3,
        }
    }

    #[test]
    fn test_annulus_brightens_tiles_in_window() {
        let mut grid = small_grid();
        let origin = grid.all_tiles()[grid.all_tiles().len() / 2];
        let mut job = HighlightJob::new(origin, config());
        job.init(&grid);
        job.start(0.0, &mut grid);

        job.update(0.2, 0.2, &mut grid);
        let (inner, outer) = job.window();
        assert!(inner.abs() < 1e-3 && (outer - 100.0).abs() < 1e-3);

        let center = grid.tile(origin).unwrap().position();
        for &id in grid.all_tiles() {
            let tile = grid.tile(id).unwrap();
            let distance = tile.position().distance(center);
            if distance > 10.0 && distance < 90.0 {
                assert!(tile.color.lightness > tile.original_color.lightness);
            }
            if distance > 100.0 {
                assert_eq!(tile.color.lightness, tile.original_color.lightness);
            }
        }
        assert!(!job.is_complete());
    }

    #[test]
    fn test_completes_once_past_farthest_tile() {
        let mut grid = small_grid();
        let origin = grid.all_tiles()[0];
        let mut job = HighlightJob::new(origin, config());
        job.init(&grid);
        job.start(1.0, &mut grid);

        job.update(1.5, 0.5, &mut grid);
        assert!(!job.is_complete());

        // Well before the duration, but the inner radius is past every tile.
        job.update(9.0, 0.5, &mut grid);
        assert!(job.is_complete());
    }

    #[test]
    fn test_completes_after_duration() {
        let mut grid = small_grid();
        let origin = grid.all_tiles()[0];
        let mut job = HighlightJob::new(
            origin,
            HighlightConfig {
                duration: 0.1,
                ..config()
            },
        );
        job.init(&grid);
        job.start(0.0, &mut grid);
        job.update(0.1, 0.1, &mut grid);
        assert!(job.is_complete());
    }
}
