use bevy::math::Vec2;

use crate::anim::easing::ease_in_out_cubic;
use crate::anim::job::AnimationJob;
use crate::grid::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DilationMode {
    /// Push every sector out by its displacement
    Open,
    /// Bring the sectors back and collapse the expansion
    Close,
}

/// Eases the expanded sectors between their rest position and their full
/// displacement
#[derive(Debug, Clone)]
pub struct DilationJob {
    mode: DilationMode,
    duration: f32,
    displacements: Vec<Vec2>,
    start_time: f32,
    complete: bool,
}

impl DilationJob {
    pub fn new(mode: DilationMode, duration: f32) -> Self {
        Self {
            mode,
            duration,
            displacements: Vec::new(),
            start_time: 0.0,
            complete: false,
        }
    }

    pub fn mode(&self) -> DilationMode {
        self.mode
    }

    fn final_offset(&self, displacement: Vec2) -> Vec2 {
        match self.mode {
            DilationMode::Open => displacement,
            DilationMode::Close => Vec2::ZERO,
        }
    }

    fn set_offsets(&self, grid: &mut Grid, offset: impl Fn(Vec2) -> Vec2) {
        for (index, &displacement) in self.displacements.iter().enumerate() {
            if let Err(err) = grid.set_sector_offset(index, offset(displacement)) {
                log::warn!("Dilation could not move sector {}: {}", index, err);
            }
        }
    }

    fn finish(&mut self, grid: &mut Grid) {
        self.complete = true;
        if self.mode == DilationMode::Close && grid.is_expanded() {
            if let Err(err) = grid.collapse() {
                log::warn!("Dilation could not collapse the grid: {}", err);
            }
        }
    }
}

impl AnimationJob for DilationJob {
    fn init(&mut self, grid: &Grid) {
        self.displacements = grid.sectors().iter().map(|s| s.displacement).collect();
    }

    fn start(&mut self, time: f32, grid: &mut Grid) {
        self.start_time = time;
        self.complete = false;
        if self.displacements.is_empty() {
            log::warn!("Sector dilation started on a grid with no sectors");
            self.complete = true;
            return;
        }
        self.set_offsets(grid, |d| self.final_offset(d));
    }

    fn update(&mut self, time: f32, _dt: f32, grid: &mut Grid) {
        if self.complete {
            return;
        }
        let progress = if self.duration > 0.0 {
            (time - self.start_time) / self.duration
        } else {
            1.0
        };
        if progress >= 1.0 {
            self.set_offsets(grid, |d| self.final_offset(d));
            self.finish(grid);
            return;
        }

        let sign = match self.mode {
            DilationMode::Open => -1.0,
            DilationMode::Close => 1.0,
        };
        let remaining = ease_in_out_cubic(1.0 - progress);
        self.set_offsets(grid, |d| self.final_offset(d) + sign * d * remaining);
    }

    fn cancel(&mut self, grid: &mut Grid) {
        if self.complete {
            return;
        }
        self.set_offsets(grid, |d| self.final_offset(d));
        self.finish(grid);
    }

    fn is_complete(&self) -> bool {
        self.complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::jobs::tests::{expanded_grid, small_grid};

    #[test]
    fn test_open_eases_to_displacement() {
        let mut grid = expanded_grid();
        let mut job = DilationJob::new(DilationMode::Open, 1.0);
        job.init(&grid);
        job.start(0.0, &mut grid);

        // Starting point is the rest position.
        job.update(0.0, 0.0, &mut grid);
        for sector in grid.sectors() {
            assert!(sector.offset.length() < 1e-4);
        }

        job.update(0.5, 0.5, &mut grid);
        for sector in grid.sectors() {
            let expected = sector.displacement * 0.5;
            assert!(sector.offset.distance(expected) < 1e-3);
        }

        job.update(1.0, 0.5, &mut grid);
        assert!(job.is_complete());
        for sector in grid.sectors() {
            assert!(sector.offset.distance(sector.displacement) < 1e-4);
        }
        assert!(grid.is_expanded());
    }

    #[test]
    fn test_close_collapses_on_completion() {
        let mut grid = expanded_grid();
        for i in 0..6 {
            let d = grid.sectors()[i].displacement;
            grid.set_sector_offset(i, d).unwrap();
        }

        let mut job = DilationJob::new(DilationMode::Close, 0.5);
        job.init(&grid);
        job.start(2.0, &mut grid);
        job.update(2.25, 0.25, &mut grid);
        assert!(grid.is_expanded());
        assert!(!job.is_complete());

        job.update(2.5, 0.25, &mut grid);
        assert!(job.is_complete());
        assert!(!grid.is_expanded());
        assert_eq!(grid.tile_count(), grid.original_tile_count());
    }

    #[test]
    fn test_cancel_snaps_to_final_state() {
        let mut grid = expanded_grid();
        let mut open = DilationJob::new(DilationMode::Open, 1.0);
        open.init(&grid);
        open.start(0.0, &mut grid);
        open.update(0.1, 0.1, &mut grid);
        open.cancel(&mut grid);
        assert!(open.is_complete());
        for sector in grid.sectors() {
            assert!(sector.offset.distance(sector.displacement) < 1e-4);
        }

        let mut close = DilationJob::new(DilationMode::Close, 1.0);
        close.init(&grid);
        close.start(0.0, &mut grid);
        close.cancel(&mut grid);
        assert!(!grid.is_expanded());
    }

    #[test]
    fn test_no_sectors_completes_immediately() {
        let mut grid = small_grid();
        let mut job = DilationJob::new(DilationMode::Open, 1.0);
        job.init(&grid);
        job.start(0.0, &mut grid);
        assert!(job.is_complete());
    }
}
