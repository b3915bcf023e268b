use bevy::math::Vec2;

use super::clock::Clock;
use super::job::{AnimationJob, Job, JobEvent, JobId, JobKey, JobKind};
use super::jobs::DilationMode;
use super::surface::RenderSurface;
use crate::config::AnimationConfig;
use crate::grid::{Grid, GridError};
use crate::hex::TileId;

#[derive(Debug)]
struct Entry {
    id: JobId,
    key: JobKey,
    job: Job,
}

impl Entry {
    fn event(&self, cancelled: bool) -> JobEvent {
        JobEvent {
            id: self.id,
            kind: self.key.kind,
            target: self.job.target(),
            cancelled,
        }
    }
}

/// Frame-driven scheduler for animation jobs.
///
/// Runs only while it holds at least one job: the first registration takes
/// the clock's current time as the previous frame, and the tick that
/// retires the last job goes idle. Jobs update in registration order, each
/// one seeing whatever the jobs before it wrote this frame, then completed
/// jobs are retired and the survivors draw in the same order.
#[derive(Debug)]
pub struct Animator<C: Clock> {
    clock: C,
    config: AnimationConfig,
    jobs: Vec<Entry>,
    events: Vec<JobEvent>,
    next_id: u64,
    last_frame: Option<f32>,
    frame_delta: f32,
}

impl<C: Clock> Animator<C> {
    pub fn new(clock: C, config: AnimationConfig) -> Self {
        Self {
            clock,
            config,
            jobs: Vec::new(),
            events: Vec::new(),
            next_id: 0,
            last_frame: None,
            frame_delta: 0.0,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.last_frame.is_some()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Time step handed to jobs on the last tick
    pub fn frame_delta(&self) -> f32 {
        self.frame_delta
    }

    /// Kinds of the registered jobs, in update order
    pub fn kinds(&self) -> impl Iterator<Item = JobKind> + '_ {
        self.jobs.iter().map(|e| e.key.kind)
    }

    pub fn contains_kind(&self, kind: JobKind) -> bool {
        self.jobs.iter().any(|e| e.key.kind == kind)
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|e| e.id == id).map(|e| &e.job)
    }

    /// Id of the registered job with `key`
    pub fn find(&self, key: JobKey) -> Option<JobId> {
        self.jobs.iter().find(|e| e.key == key).map(|e| e.id)
    }

    /// Register and start `job` at the end of the update order, replacing
    /// any job already registered under the same key
    pub fn start(&mut self, mut job: Job, grid: &mut Grid) -> JobId {
        let key = job.key();
        if let Some(pos) = self.jobs.iter().position(|e| e.key == key) {
            let old = self.jobs.remove(pos);
            self.retire(old, grid);
        }

        let now = self.clock.now();
        self.wake(now);
        job.init(grid);
        job.start(now, grid);

        let id = JobId(self.next_id);
        self.next_id += 1;
        self.jobs.push(Entry { id, key, job });

        log::debug!("Started {} job {:?}", key.kind, id);
        id
    }

    /// Start a registered job over from the current time.
    ///
    /// Jobs that can refresh in place keep running without an event; the
    /// rest are cancelled and initialised again.
    pub fn restart(&mut self, id: JobId, grid: &mut Grid) -> bool {
        let now = self.clock.now();
        let Some(pos) = self.jobs.iter().position(|e| e.id == id) else {
            return false;
        };
        self.wake(now);

        let entry = &mut self.jobs[pos];
        if entry.job.is_complete() {
            self.events.push(entry.event(false));
            entry.job.init(grid);
        } else if !entry.job.refresh(grid) {
            entry.job.cancel(grid);
            self.events.push(entry.event(true));
            entry.job.init(grid);
        }
        entry.job.start(now, grid);
        true
    }

    pub fn cancel(&mut self, id: JobId, grid: &mut Grid) -> bool {
        let Some(pos) = self.jobs.iter().position(|e| e.id == id) else {
            return false;
        };
        let entry = self.jobs.remove(pos);
        self.retire(entry, grid);
        true
    }

    /// Cancel every job of `kind`, returning how many there were
    pub fn cancel_kind(&mut self, kind: JobKind, grid: &mut Grid) -> usize {
        let mut cancelled = 0;
        while let Some(pos) = self.jobs.iter().position(|e| e.key.kind == kind) {
            let entry = self.jobs.remove(pos);
            self.retire(entry, grid);
            cancelled += 1;
        }
        cancelled
    }

    pub fn cancel_all(&mut self, grid: &mut Grid) {
        for entry in std::mem::take(&mut self.jobs) {
            self.retire(entry, grid);
        }
        self.last_frame = None;
    }

    /// Advance every job to the clock's current time, retire the completed
    /// ones and draw the rest
    pub fn tick(&mut self, grid: &mut Grid, surface: &mut dyn RenderSurface) {
        let Some(last) = self.last_frame else {
            return;
        };
        let now = self.clock.now();
        let dt = (now - last).clamp(0.0, self.config.max_frame_delta.max(0.0));
        self.last_frame = Some(now);
        self.frame_delta = dt;

        for entry in &mut self.jobs {
            if !entry.job.is_complete() {
                entry.job.update(now, dt, grid);
            }
        }

        let events = &mut self.events;
        self.jobs.retain(|entry| {
            if entry.job.is_complete() {
                log::debug!("{} job {:?} complete", entry.key.kind, entry.id);
                events.push(entry.event(false));
                false
            } else {
                true
            }
        });

        for entry in &self.jobs {
            entry.job.draw(grid, surface);
        }

        if self.jobs.is_empty() {
            log::debug!("No jobs left, animator idle");
            self.last_frame = None;
        }
    }

    /// Completion and cancellation events since the last drain
    pub fn drain_events(&mut self) -> Vec<JobEvent> {
        std::mem::take(&mut self.events)
    }

    /// Colour reset, displacement reset and physics: the jobs every grid
    /// runs for its whole life
    pub fn install_default_jobs(&mut self, grid: &mut Grid) {
        let highlight_lightness = grid.tiling().highlight_lightness;
        self.start(Job::color_reset(highlight_lightness), grid);
        self.start(Job::displacement_reset(), grid);
        self.start(Job::physics(), grid);
    }

    /// Expand the grid around `base`, pan it to the middle of the container
    /// and open the sectors
    pub fn expand_around(&mut self, grid: &mut Grid, base: TileId) -> Result<(), GridError> {
        self.cancel_kind(JobKind::SectorDilation, grid);
        if grid.is_expanded() {
            grid.collapse()?;
        }

        let target = grid.centering_pan(base).ok_or(GridError::UnknownTile(base))?;
        grid.expand(base)?;

        self.start(Job::pan(target, self.config.pan_duration), grid);
        self.start(
            Job::sector_dilation(DilationMode::Open, self.config.dilation_duration),
            grid,
        );
        Ok(())
    }

    /// Close the sectors and pan back; the grid collapses once the sectors
    /// are home
    pub fn collapse_expansion(&mut self, grid: &mut Grid) -> Result<(), GridError> {
        if !grid.is_expanded() {
            return Err(GridError::NotExpanded);
        }
        self.start(
            Job::sector_dilation(DilationMode::Close, self.config.dilation_duration),
            grid,
        );
        self.start(Job::pan(Vec2::ZERO, self.config.pan_duration), grid);
        Ok(())
    }

    fn wake(&mut self, now: f32) {
        if self.last_frame.is_none() {
            log::debug!("Animator running");
            self.last_frame = Some(now);
        }
    }

    fn retire(&mut self, mut entry: Entry, grid: &mut Grid) {
        let cancelled = !entry.job.is_complete();
        if cancelled {
            entry.job.cancel(grid);
        }
        self.events.push(entry.event(cancelled));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::clock::ManualClock;
    use crate::anim::jobs::tests::{middle_tile, small_grid};
    use crate::anim::surface::{NullSurface, RecordingSurface};
    use crate::config::{HighlightConfig, LineConfig, WaveConfig};
    use crate::hex::Direction;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn animator() -> Animator<ManualClock> {
        Animator::new(ManualClock::new(0.0), AnimationConfig::default())
    }

    fn run_for(animator: &mut Animator<ManualClock>, grid: &mut Grid, seconds: f32) {
        let frames = (seconds / 0.02).ceil() as usize;
        for _ in 0..frames {
            animator.clock_mut().advance(0.02);
            animator.tick(grid, &mut NullSurface);
        }
    }

    fn colors_at_rest(grid: &Grid) -> bool {
        grid.all_tiles().iter().all(|id| {
            let tile = grid.tile(*id).unwrap();
            tile.color == tile.original_color
        })
    }

    #[test]
    fn test_jobs_run_in_registration_order() {
        let mut grid = small_grid();
        let mut animator = animator();
        animator.start(Job::highlight(middle_tile(&grid), HighlightConfig::default()), &mut grid);
        animator.start(Job::color_wave(Vec2::ZERO, WaveConfig::default()), &mut grid);
        animator.start(Job::color_reset(0.2), &mut grid);

        let kinds: Vec<_> = animator.kinds().collect();
        assert_eq!(
            kinds,
            vec![JobKind::HighlightRadiate, JobKind::ColorWave, JobKind::ColorReset]
        );

        // The reset runs last and wipes what the wave and highlight wrote.
        animator.clock_mut().advance(0.02);
        animator.tick(&mut grid, &mut NullSurface);
        assert!(colors_at_rest(&grid));
    }

    #[test]
    fn test_reset_registered_first_lets_effects_show() {
        let mut grid = small_grid();
        let mut animator = animator();
        animator.install_default_jobs(&mut grid);
        animator.start(Job::color_wave(Vec2::ZERO, WaveConfig::default()), &mut grid);

        let kinds: Vec<_> = animator.kinds().collect();
        assert_eq!(
            kinds,
            vec![
                JobKind::ColorReset,
                JobKind::DisplacementReset,
                JobKind::Physics,
                JobKind::ColorWave,
            ]
        );

        animator.clock_mut().advance(0.02);
        animator.tick(&mut grid, &mut NullSurface);
        assert!(!colors_at_rest(&grid));
    }

    #[test]
    fn test_replacing_a_job_moves_it_to_the_end() {
        let mut grid = small_grid();
        let mut animator = animator();
        animator.install_default_jobs(&mut grid);
        animator.start(Job::displacement_wave(Vec2::ZERO, WaveConfig::default()), &mut grid);
        animator.start(Job::physics(), &mut grid);

        let kinds: Vec<_> = animator.kinds().collect();
        assert_eq!(kinds.last(), Some(&JobKind::Physics));
        assert_eq!(kinds.iter().filter(|k| **k == JobKind::Physics).count(), 1);
    }

    #[test]
    fn test_frame_delta_is_clamped() {
        let mut grid = small_grid();
        let mut animator = animator();
        animator.install_default_jobs(&mut grid);

        animator.clock_mut().advance(0.01);
        animator.tick(&mut grid, &mut NullSurface);
        assert!((animator.frame_delta() - 0.01).abs() < 1e-6);

        animator.clock_mut().advance(5.0);
        animator.tick(&mut grid, &mut NullSurface);
        assert_eq!(animator.frame_delta(), animator.config().max_frame_delta);

        // Clock going backwards never yields a negative step.
        animator.clock_mut().set(1.0);
        animator.tick(&mut grid, &mut NullSurface);
        assert_eq!(animator.frame_delta(), 0.0);
    }

    #[test]
    fn test_starts_lazily_and_goes_idle() {
        let mut grid = small_grid();
        let mut animator = animator();
        assert!(!animator.is_running());
        animator.tick(&mut grid, &mut NullSurface);
        assert!(animator.drain_events().is_empty());

        let id = animator.start(Job::pan(Vec2::new(5.0, 0.0), 0.1), &mut grid);
        assert!(animator.is_running());
        assert!(!animator.job(id).unwrap().is_complete());

        run_for(&mut animator, &mut grid, 0.2);
        assert!(!animator.is_running());
        assert!(animator.is_empty());

        let events = animator.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, id);
        assert!(!events[0].cancelled);
        assert!(animator.drain_events().is_empty());
    }

    #[test]
    fn test_persistent_kind_keeps_one_instance() {
        let mut grid = small_grid();
        let mut animator = animator();
        let first = animator.start(Job::color_wave(Vec2::ZERO, WaveConfig::default()), &mut grid);
        let second = animator.start(Job::color_wave(Vec2::ONE, WaveConfig::default()), &mut grid);

        assert_ne!(first, second);
        assert_eq!(animator.len(), 1);
        assert!(animator.job(first).is_none());

        let events = animator.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, first);
        assert!(events[0].cancelled);
    }

    #[test]
    fn test_transient_kind_is_keyed_by_tile() {
        let mut grid = small_grid();
        let mut animator = animator();
        let a = grid.all_tiles()[10];
        let b = grid.all_tiles()[20];

        animator.start(Job::highlight(a, HighlightConfig::default()), &mut grid);
        animator.start(Job::highlight(b, HighlightConfig::default()), &mut grid);
        assert_eq!(animator.len(), 2);
        assert!(animator.drain_events().is_empty());

        animator.start(Job::highlight(a, HighlightConfig::default()), &mut grid);
        assert_eq!(animator.len(), 2);
        let events = animator.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].target, Some(a));
        assert!(events[0].cancelled);
    }

    #[test]
    fn test_cancel_publishes_once_and_releases_line() {
        let mut grid = small_grid();
        let mut animator = animator();
        let mut rng = StdRng::seed_from_u64(8);
        let tile = grid.tile_at(0, 3).unwrap();
        let job = Job::line(&grid, tile, Direction::SouthEast, 4, LineConfig::default(), &mut rng)
            .unwrap();
        let id = animator.start(job, &mut grid);

        run_for(&mut animator, &mut grid, 0.1);
        match animator.job(id) {
            Some(Job::LineDraw(line)) => assert!(!line.path().is_empty()),
            other => panic!("unexpected job {:?}", other.map(Job::kind)),
        }

        assert!(animator.cancel(id, &mut grid));
        assert!(!animator.cancel(id, &mut grid));
        assert!(animator.job(id).is_none());

        let events = animator.drain_events();
        assert_eq!(events.len(), 1);
        assert!(events[0].cancelled);
        assert_eq!(events[0].kind, JobKind::LineDraw);
        assert_eq!(events[0].target, Some(tile));
    }

    #[test]
    fn test_restart_refreshes_without_event() {
        let mut grid = small_grid();
        let mut animator = animator();
        let wave = animator.start(Job::color_wave(Vec2::ZERO, WaveConfig::default()), &mut grid);
        let pan = animator.start(Job::pan(Vec2::new(10.0, 0.0), 1.0), &mut grid);

        run_for(&mut animator, &mut grid, 0.1);
        assert!(animator.restart(wave, &mut grid));
        assert!(animator.drain_events().is_empty());

        assert!(animator.restart(pan, &mut grid));
        let events = animator.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, pan);
        assert!(events[0].cancelled);
        assert!(!animator.job(pan).unwrap().is_complete());
    }

    #[test]
    fn test_tick_draws_tiles() {
        let mut grid = small_grid();
        let mut animator = animator();
        animator.install_default_jobs(&mut grid);

        let mut surface = RecordingSurface::default();
        animator.clock_mut().advance(0.016);
        animator.tick(&mut grid, &mut surface);
        assert_eq!(surface.tiles.len(), grid.all_tiles().len());
    }

    #[test]
    fn test_expand_and_collapse_round_trip() {
        let mut grid = small_grid();
        let mut animator = animator();
        animator.install_default_jobs(&mut grid);
        let base = middle_tile(&grid);
        let target = grid.centering_pan(base).unwrap();

        animator.expand_around(&mut grid, base).unwrap();
        assert!(grid.is_expanded());
        assert!(animator.contains_kind(JobKind::SectorDilation));
        assert!(animator.contains_kind(JobKind::Pan));

        run_for(&mut animator, &mut grid, 2.0);
        assert!(!animator.contains_kind(JobKind::SectorDilation));
        assert!(grid.pan_offset().distance(target) < 1e-3);
        for sector in grid.sectors() {
            assert!(sector.offset.distance(sector.displacement) < 1e-3);
        }

        animator.collapse_expansion(&mut grid).unwrap();
        assert!(grid.is_expanded());
        run_for(&mut animator, &mut grid, 2.0);
        assert!(!grid.is_expanded());
        assert!(grid.pan_offset().length() < 1e-3);
        assert_eq!(grid.tile_count(), grid.original_tile_count());

        assert_eq!(
            animator.collapse_expansion(&mut grid),
            Err(GridError::NotExpanded)
        );
    }

    #[test]
    fn test_expand_rejects_border_tile() {
        let mut grid = small_grid();
        let mut animator = animator();
        let corner = grid.tile_at(0, 0).unwrap();

        let result = animator.expand_around(&mut grid, corner);
        assert!(matches!(result, Err(GridError::BaseTileNotInterior { .. })));
        assert!(!grid.is_expanded());
        assert!(!animator.contains_kind(JobKind::Pan));
    }

    #[test]
    fn test_expanding_elsewhere_replaces_expansion() {
        let mut grid = small_grid();
        let mut animator = animator();
        let base = middle_tile(&grid);
        animator.expand_around(&mut grid, base).unwrap();
        run_for(&mut animator, &mut grid, 0.1);

        let other = grid.tile_at(3, 4).unwrap();
        animator.expand_around(&mut grid, other).unwrap();
        assert_eq!(grid.expanded_tile(), Some(other));

        let events = animator.drain_events();
        assert!(events.iter().any(|e| e.kind == JobKind::SectorDilation && e.cancelled));
    }
}
