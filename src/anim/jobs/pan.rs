use bevy::math::Vec2;

use crate::anim::easing::ease_out_cubic;
use crate::anim::job::AnimationJob;
use crate::grid::Grid;

/// Slides the grid's pan offset to `target`
#[derive(Debug, Clone)]
pub struct PanJob {
    target: Vec2,
    duration: f32,
    from: Vec2,
    start_time: f32,
    complete: bool,
}

impl PanJob {
    pub fn new(target: Vec2, duration: f32) -> Self {
        Self {
            target,
            duration,
            from: Vec2::ZERO,
            start_time: 0.0,
            complete: false,
        }
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }
}

impl AnimationJob for PanJob {
    fn init(&mut self, _grid: &Grid) {}

    fn start(&mut self, time: f32, grid: &mut Grid) {
        self.from = grid.pan_offset();
        self.start_time = time;
        self.complete = false;
    }

    fn update(&mut self, time: f32, _dt: f32, grid: &mut Grid) {
        let progress = if self.duration > 0.0 {
            ((time - self.start_time) / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        grid.set_pan_offset(self.from.lerp(self.target, ease_out_cubic(progress)));
        if progress >= 1.0 {
            self.complete = true;
        }
    }

    fn cancel(&mut self, grid: &mut Grid) {
        grid.set_pan_offset(self.target);
        self.complete = true;
    }

    fn is_complete(&self) -> bool {
        self.complete
    }
}
