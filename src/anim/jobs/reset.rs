use crate::anim::job::AnimationJob;
use crate::grid::Grid;

/// Re-baselines every tile's working colour each frame, so perturbing jobs
/// registered after it start from the original colour
#[derive(Debug, Clone)]
pub struct ColorResetJob {
    /// Lightness added to highlighted tiles
    highlight_lightness: f32,
    complete: bool,
}

impl ColorResetJob {
    pub fn new(highlight_lightness: f32) -> Self {
        Self {
            highlight_lightness,
            complete: false,
        }
    }
}

impl AnimationJob for ColorResetJob {
    fn init(&mut self, _grid: &Grid) {}

    fn start(&mut self, _time: f32, _grid: &mut Grid) {
        self.complete = false;
    }

    fn update(&mut self, _time: f32, _dt: f32, grid: &mut Grid) {
        for tile in grid.active_tiles_mut() {
            tile.color = tile.original_color;
            if tile.is_highlighted {
                tile.color.lightness = (tile.color.lightness + self.highlight_lightness).min(1.0);
            }
        }
    }

    fn cancel(&mut self, _grid: &mut Grid) {
        self.complete = true;
    }

    fn is_complete(&self) -> bool {
        self.complete
    }
}

/// Puts every anchor back to original + pan + sector offset each frame
#[derive(Debug, Clone, Default)]
pub struct DisplacementResetJob {
    complete: bool,
}

impl AnimationJob for DisplacementResetJob {
    fn init(&mut self, _grid: &Grid) {}

    fn start(&mut self, _time: f32, _grid: &mut Grid) {
        self.complete = false;
    }

    fn update(&mut self, _time: f32, _dt: f32, grid: &mut Grid) {
        grid.reset_anchors();
    }

    fn cancel(&mut self, _grid: &mut Grid) {
        self.complete = true;
    }

    fn is_complete(&self) -> bool {
        self.complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::jobs::tests::small_grid;
    use bevy::math::Vec2;

    #[test]
    fn test_color_reset_restores_and_highlights() {
        let mut grid = small_grid();
        let (a, b) = (grid.all_tiles()[5], grid.all_tiles()[6]);
        let original = grid.tile(a).unwrap().original_color;

        grid.tile_mut(a).unwrap().color.hue = 300.0;
        grid.tile_mut(b).unwrap().set_highlighted(true);

        let mut job = ColorResetJob::new(0.1);
        job.update(0.0, 0.016, &mut grid);

        assert_eq!(grid.tile(a).unwrap().color, original);
        let highlighted = grid.tile(b).unwrap();
        assert!((highlighted.color.lightness - (highlighted.original_color.lightness + 0.1)).abs() < 1e-6);
    }

    #[test]
    fn test_displacement_reset_restores_anchor() {
        let mut grid = small_grid();
        grid.set_pan_offset(Vec2::new(4.0, 0.0));
        let id = grid.all_tiles()[3];
        grid.tile_mut(id).unwrap().current_anchor += Vec2::new(50.0, 50.0);

        let mut job = DisplacementResetJob::default();
        job.update(0.0, 0.016, &mut grid);

        let tile = grid.tile(id).unwrap();
        assert_eq!(tile.current_anchor, tile.original_anchor + Vec2::new(4.0, 0.0));
    }
}
