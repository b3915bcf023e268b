use std::fmt;

use bevy::math::Vec2;
use rand::Rng;

use super::jobs::{
    ColorResetJob, DilationJob, DilationMode, DisplacementResetJob, HighlightJob, LineJob,
    LineJobError, PanJob, PhysicsJob, WaveJob, WaveTarget,
};
use super::surface::RenderSurface;
use crate::config::{HighlightConfig, LineConfig, WaveConfig};
use crate::grid::Grid;
use crate::hex::{Direction, TileId};

/// Lifecycle shared by every animation job.
///
/// `update` is the only place a job mutates the grid on its own initiative;
/// `cancel` may also write, to leave things in their final state.
pub trait AnimationJob {
    /// One-time precomputation; may be called again before a restart
    fn init(&mut self, grid: &Grid);

    /// Clear the completion flag and take `time` as the baseline
    fn start(&mut self, time: f32, grid: &mut Grid);

    fn update(&mut self, time: f32, dt: f32, grid: &mut Grid);

    /// Push current state to the surface
    fn draw(&self, _grid: &Grid, _surface: &mut dyn RenderSurface) {}

    /// Complete immediately, releasing anything the job created
    fn cancel(&mut self, grid: &mut Grid);

    /// Re-initialise in place for a restart; `false` means the job has
    /// nothing cheaper than cancel + init
    fn refresh(&mut self, _grid: &Grid) -> bool {
        false
    }

    fn is_complete(&self) -> bool;
}

/// Every kind of job the scheduler knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobKind {
    ColorReset,
    DisplacementReset,
    ColorWave,
    DisplacementWave,
    HighlightRadiate,
    LineDraw,
    SectorDilation,
    Pan,
    Physics,
}

impl JobKind {
    /// At most one instance of a persistent kind runs per grid; transient
    /// kinds run one instance per target tile
    pub fn is_persistent(self) -> bool {
        !matches!(self, JobKind::HighlightRadiate | JobKind::LineDraw)
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobKind::ColorReset => "color reset",
            JobKind::DisplacementReset => "displacement reset",
            JobKind::ColorWave => "color wave",
            JobKind::DisplacementWave => "displacement wave",
            JobKind::HighlightRadiate => "highlight radiate",
            JobKind::LineDraw => "line draw",
            JobKind::SectorDilation => "sector dilation",
            JobKind::Pan => "pan",
            JobKind::Physics => "physics",
        };
        write!(f, "{}", name)
    }
}

/// Identity a job is registered under: the kind alone for persistent kinds,
/// the kind and its target tile for transient ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobKey {
    pub kind: JobKind,
    pub target: Option<TileId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

/// Published exactly once per job run, when it completes or is cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobEvent {
    pub id: JobId,
    pub kind: JobKind,
    pub target: Option<TileId>,
    pub cancelled: bool,
}

/// Closed set of job variants
#[derive(Debug, Clone)]
pub enum Job {
    Physics(PhysicsJob),
    ColorReset(ColorResetJob),
    DisplacementReset(DisplacementResetJob),
    ColorWave(WaveJob),
    DisplacementWave(WaveJob),
    HighlightRadiate(HighlightJob),
    LineDraw(LineJob),
    SectorDilation(DilationJob),
    Pan(PanJob),
}

impl Job {
    pub fn physics() -> Self {
        Job::Physics(PhysicsJob::default())
    }

    /// Restores every tile's working colour, brightening highlighted tiles
    /// by `highlight_lightness`
    pub fn color_reset(highlight_lightness: f32) -> Self {
        Job::ColorReset(ColorResetJob::new(highlight_lightness))
    }

    pub fn displacement_reset() -> Self {
        Job::DisplacementReset(DisplacementResetJob::default())
    }

    pub fn color_wave(origin: Vec2, config: WaveConfig) -> Self {
        Job::ColorWave(WaveJob::new(WaveTarget::Color, origin, config))
    }

    pub fn displacement_wave(origin: Vec2, config: WaveConfig) -> Self {
        Job::DisplacementWave(WaveJob::new(WaveTarget::Displacement, origin, config))
    }

    pub fn highlight(tile: TileId, config: HighlightConfig) -> Self {
        Job::HighlightRadiate(HighlightJob::new(tile, config))
    }

    /// Line starting at `corner` of border tile `tile`, heading `heading`
    pub fn line(
        grid: &Grid,
        tile: TileId,
        heading: Direction,
        corner: usize,
        config: LineConfig,
        rng: &mut impl Rng,
    ) -> Result<Self, LineJobError> {
        Ok(Job::LineDraw(LineJob::new(grid, tile, heading, corner, config, rng)?))
    }

    pub fn sector_dilation(mode: DilationMode, duration: f32) -> Self {
        Job::SectorDilation(DilationJob::new(mode, duration))
    }

    pub fn pan(target: Vec2, duration: f32) -> Self {
        Job::Pan(PanJob::new(target, duration))
    }

    pub fn kind(&self) -> JobKind {
        match self {
            Job::Physics(_) => JobKind::Physics,
            Job::ColorReset(_) => JobKind::ColorReset,
            Job::DisplacementReset(_) => JobKind::DisplacementReset,
            Job::ColorWave(_) => JobKind::ColorWave,
            Job::DisplacementWave(_) => JobKind::DisplacementWave,
            Job::HighlightRadiate(_) => JobKind::HighlightRadiate,
            Job::LineDraw(_) => JobKind::LineDraw,
            Job::SectorDilation(_) => JobKind::SectorDilation,
            Job::Pan(_) => JobKind::Pan,
        }
    }

    pub fn target(&self) -> Option<TileId> {
        match self {
            Job::HighlightRadiate(job) => Some(job.origin()),
            Job::LineDraw(job) => Some(job.start_tile()),
            _ => None,
        }
    }

    pub fn key(&self) -> JobKey {
        let kind = self.kind();
        JobKey {
            kind,
            target: if kind.is_persistent() { None } else { self.target() },
        }
    }

    fn inner(&self) -> &dyn AnimationJob {
        match self {
            Job::Physics(job) => job,
            Job::ColorReset(job) => job,
            Job::DisplacementReset(job) => job,
            Job::ColorWave(job) | Job::DisplacementWave(job) => job,
            Job::HighlightRadiate(job) => job,
            Job::LineDraw(job) => job,
            Job::SectorDilation(job) => job,
            Job::Pan(job) => job,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn AnimationJob {
        match self {
            Job::Physics(job) => job,
            Job::ColorReset(job) => job,
            Job::DisplacementReset(job) => job,
            Job::ColorWave(job) | Job::DisplacementWave(job) => job,
            Job::HighlightRadiate(job) => job,
            Job::LineDraw(job) => job,
            Job::SectorDilation(job) => job,
            Job::Pan(job) => job,
        }
    }
}

impl AnimationJob for Job {
    fn init(&mut self, grid: &Grid) {
        self.inner_mut().init(grid)
    }

    fn start(&mut self, time: f32, grid: &mut Grid) {
        self.inner_mut().start(time, grid)
    }

    fn update(&mut self, time: f32, dt: f32, grid: &mut Grid) {
        self.inner_mut().update(time, dt, grid)
    }

    fn draw(&self, grid: &Grid, surface: &mut dyn RenderSurface) {
        self.inner().draw(grid, surface)
    }

    fn cancel(&mut self, grid: &mut Grid) {
        self.inner_mut().cancel(grid)
    }

    fn refresh(&mut self, grid: &Grid) -> bool {
        self.inner_mut().refresh(grid)
    }

    fn is_complete(&self) -> bool {
        self.inner().is_complete()
    }
}
