use bevy::camera::ScalingMode;
use bevy::prelude::*;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Viewport>()
            .add_systems(Startup, setup_camera)
            .add_systems(PreUpdate, update_viewport);
    }
}

/// Logical size of the primary window; one world unit is one pixel
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct Viewport {
    pub size: Vec2,
}

impl Viewport {
    /// Grid space (origin top-left, y down) to the XZ plane
    pub fn to_world(&self, point: Vec2) -> Vec3 {
        Vec3::new(point.x - self.size.x * 0.5, 0.0, point.y - self.size.y * 0.5)
    }

    /// Point on the XZ plane back to grid space
    pub fn to_grid(&self, world: Vec3) -> Vec2 {
        Vec2::new(world.x + self.size.x * 0.5, world.z + self.size.y * 0.5)
    }
}

#[derive(Component)]
pub struct MainCamera;

/// Top-down orthographic camera over the XZ plane.
///
/// ```text
///   ----+---→ X (right on screen)
///       |
///       ↓ Z (down on screen)
/// ```
///
/// Screen up is -Z so grid rows run down the screen in the same direction
/// they run in grid space.
fn setup_camera(mut commands: Commands) {
    let projection = Projection::Orthographic(OrthographicProjection {
        scaling_mode: ScalingMode::WindowSize,
        near: 0.0,
        far: 1000.0,
        ..OrthographicProjection::default_3d()
    });
    commands.spawn((
        Camera3d::default(),
        projection,
        Transform::from_xyz(0.0, 10.0, 0.0).looking_at(Vec3::ZERO, Vec3::NEG_Z),
        MainCamera,
    ));
}

/// Track the window size
fn update_viewport(mut viewport: ResMut<Viewport>, windows: Query<&Window>) {
    if let Ok(window) = windows.single() {
        let size = Vec2::new(window.width(), window.height());

        if size.distance(viewport.size) > 0.5 {
            viewport.size = size;
            info!("Viewport resized to {}x{}", size.x, size.y);
        }
    }
}
