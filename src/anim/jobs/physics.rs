use crate::anim::job::AnimationJob;
use crate::anim::surface::RenderSurface;
use crate::grid::Grid;

/// Steps the spring network every frame and draws every visible tile
#[derive(Debug, Clone, Default)]
pub struct PhysicsJob {
    complete: bool,
}

impl AnimationJob for PhysicsJob {
    fn init(&mut self, _grid: &Grid) {}

    fn start(&mut self, _time: f32, _grid: &mut Grid) {
        self.complete = false;
    }

    fn update(&mut self, _time: f32, dt: f32, grid: &mut Grid) {
        if dt > 0.0 {
            grid.step(dt);
        }
    }

    fn draw(&self, grid: &Grid, surface: &mut dyn RenderSurface) {
        for &id in grid.all_tiles() {
            if let Some(tile) = grid.tile(id).filter(|t| !t.is_hidden) {
                surface.draw_tile(tile);
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
