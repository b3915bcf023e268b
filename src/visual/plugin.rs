use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use hexfold::anim::jobs::LineJob;
use hexfold::anim::{Animator, Job, JobKind, ManualClock};
use hexfold::config::{HexConfig, presets};
use hexfold::grid::Grid;
use hexfold::hex::TileId;

use crate::camera::{MainCamera, Viewport};
use crate::input::{GridPointer, PointerAction};
use crate::visual::surface::GizmoSurface;

/// Content items laid out down the middle of the grid
const DEMO_CONTENT_COUNT: usize = 12;

/// Seconds between ambient border lines
const LINE_INTERVAL: f32 = 1.5;

const GIZMO_LINE_WIDTH: f32 = 2.0;

pub struct HexGridPlugin;

impl Plugin for HexGridPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerState>()
            .add_systems(Startup, configure_gizmos)
            .add_systems(
                Update,
                (
                    setup_scene.run_if(not(resource_exists::<HexScene>)),
                    (
                        resize_grid,
                        sync_clock,
                        handle_pointer_input,
                        handle_keys,
                        spawn_ambient_lines,
                        tick_animations,
                    )
                        .chain()
                        .run_if(resource_exists::<HexScene>),
                )
                    .chain(),
            );
    }
}

/// The grid and everything animating it
#[derive(Resource)]
pub struct HexScene {
    pub config: HexConfig,
    pub grid: Grid,
    pub animator: Animator<ManualClock>,
    pub rng: StdRng,
    next_line_at: f32,
}

#[derive(Resource, Default)]
pub struct PointerState {
    pub hovered_tile: Option<TileId>,
}

fn configure_gizmos(mut config_store: ResMut<GizmoConfigStore>) {
    let (config, _) = config_store.config_mut::<DefaultGizmoConfigGroup>();
    config.line.width = GIZMO_LINE_WIDTH;
}

/// Jobs that run for the grid's whole life
fn start_ambient_jobs(animator: &mut Animator<ManualClock>, grid: &mut Grid, config: &HexConfig) {
    animator.install_default_jobs(grid);
    let center = grid.layout().container * 0.5;
    animator.start(Job::color_wave(center, config.animation.wave), grid);
}

/// Build the grid once the window size is known
fn setup_scene(mut commands: Commands, viewport: Res<Viewport>, time: Res<Time>) {
    if viewport.size.min_element() <= 0.0 {
        return;
    }

    let config = HexConfig::embedded();
    let mut rng = StdRng::from_os_rng();
    let mut grid = Grid::new(&config, viewport.size, DEMO_CONTENT_COUNT, &mut rng);
    let mut animator = Animator::new(
        ManualClock::new(time.elapsed_secs()),
        config.animation.clone(),
    );
    start_ambient_jobs(&mut animator, &mut grid, &config);

    info!(
        "Hex grid ready: {} tiles, {} holding content",
        grid.tile_count(),
        grid.content_tiles().len()
    );
    commands.insert_resource(HexScene {
        config,
        grid,
        animator,
        rng,
        next_line_at: time.elapsed_secs() + LINE_INTERVAL,
    });
}

/// Rebuild the tessellation when the window changes size
fn resize_grid(viewport: Res<Viewport>, mut scene: ResMut<HexScene>) {
    if !viewport.is_changed() || viewport.size.min_element() <= 0.0 {
        return;
    }
    let HexScene {
        config,
        grid,
        animator,
        ..
    } = &mut *scene;
    if grid.layout().container == viewport.size {
        return;
    }

    animator.cancel_all(grid);
    grid.resize(viewport.size);
    start_ambient_jobs(animator, grid, config);
    info!("Rebuilt grid for {}x{}", viewport.size.x, viewport.size.y);
}

fn sync_clock(time: Res<Time>, mut scene: ResMut<HexScene>) {
    scene.animator.clock_mut().set(time.elapsed_secs());
}

/// Click toggles an expansion; clicks and drags radiate a highlight from
/// each new tile under the pointer
fn handle_pointer_input(
    mut pointers: MessageReader<GridPointer>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    viewport: Res<Viewport>,
    mut scene: ResMut<HexScene>,
    mut pointer: ResMut<PointerState>,
) {
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    let HexScene {
        config,
        grid,
        animator,
        ..
    } = &mut *scene;

    for pointer_event in pointers.read() {
        let Some(point) = pointer_event.grid_point(camera, camera_transform, &viewport) else {
            continue;
        };
        let Some(tile) = grid.nearest_tile(point) else {
            continue;
        };

        match pointer_event.action {
            PointerAction::Press => {
                if grid.is_expanded() {
                    match animator.collapse_expansion(grid) {
                        Ok(()) => info!("Collapsing expansion"),
                        Err(err) => warn!("Cannot collapse: {}", err),
                    }
                } else {
                    match animator.expand_around(grid, tile) {
                        Ok(()) => info!("Expanding around tile {}", tile),
                        Err(err) => warn!("Cannot expand: {}", err),
                    }
                }
                set_hovered(grid, &mut pointer, tile);
                animator.start(Job::highlight(tile, config.animation.highlight), grid);
            }
            PointerAction::Drag => {
                if pointer.hovered_tile != Some(tile) {
                    set_hovered(grid, &mut pointer, tile);
                    animator.start(Job::highlight(tile, config.animation.highlight), grid);
                }
            }
        }
    }
}

fn set_hovered(grid: &mut Grid, pointer: &mut PointerState, tile: TileId) {
    if let Some(previous) = pointer.hovered_tile.and_then(|id| grid.tile_mut(id)) {
        previous.set_highlighted(false);
    }
    if let Some(current) = grid.tile_mut(tile) {
        current.set_highlighted(true);
    }
    pointer.hovered_tile = Some(tile);
}

/// L: line, W: toggle displacement wave, 1-3: physics presets, Esc: collapse
fn handle_keys(keys: Res<ButtonInput<KeyCode>>, mut scene: ResMut<HexScene>) {
    let HexScene {
        config,
        grid,
        animator,
        rng,
        ..
    } = &mut *scene;

    if keys.just_pressed(KeyCode::KeyL) {
        match LineJob::random(grid, config.animation.line, rng) {
            Some(line) => {
                animator.start(Job::LineDraw(line), grid);
            }
            None => warn!("No border tile can start a line"),
        }
    }

    if keys.just_pressed(KeyCode::KeyW) {
        if animator.contains_kind(JobKind::DisplacementWave) {
            animator.cancel_kind(JobKind::DisplacementWave, grid);
            info!("Displacement wave off");
        } else {
            let center = grid.layout().container * 0.5;
            animator.start(Job::displacement_wave(center, config.animation.wave), grid);
            // Physics has to step after anything that moves anchors.
            animator.start(Job::physics(), grid);
            info!("Displacement wave on");
        }
    }

    let preset = if keys.just_pressed(KeyCode::Digit1) {
        Some(("gentle", presets::GENTLE))
    } else if keys.just_pressed(KeyCode::Digit2) {
        Some(("bouncy", presets::BOUNCY))
    } else if keys.just_pressed(KeyCode::Digit3) {
        Some(("sluggish", presets::SLUGGISH))
    } else {
        None
    };
    if let Some((name, physics)) = preset {
        grid.set_physics(physics);
        info!("Physics preset: {}", name);
    }

    if keys.just_pressed(KeyCode::Escape) && grid.is_expanded() {
        if let Err(err) = animator.collapse_expansion(grid) {
            warn!("Cannot collapse: {}", err);
        }
    }
}

fn spawn_ambient_lines(time: Res<Time>, mut scene: ResMut<HexScene>) {
    if time.elapsed_secs() < scene.next_line_at {
        return;
    }
    scene.next_line_at = time.elapsed_secs() + LINE_INTERVAL;

    let HexScene {
        config,
        grid,
        animator,
        rng,
        ..
    } = &mut *scene;
    if let Some(line) = LineJob::random(grid, config.animation.line, rng) {
        animator.start(Job::LineDraw(line), grid);
    }
}

fn tick_animations(mut scene: ResMut<HexScene>, mut gizmos: Gizmos, viewport: Res<Viewport>) {
    let HexScene { grid, animator, .. } = &mut *scene;
    let mut surface = GizmoSurface::new(&mut gizmos, *viewport);
    animator.tick(grid, &mut surface);

    for event in animator.drain_events() {
        debug!(
            "{} job {:?} {}",
            event.kind,
            event.id,
            if event.cancelled { "cancelled" } else { "finished" }
        );
    }
}
