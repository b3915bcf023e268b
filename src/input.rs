use bevy::input::touch::{TouchInput, TouchPhase};
use bevy::prelude::*;
use bevy::window::CursorMoved;

use crate::camera::Viewport;

/// Turns mouse and touch input into grid pointer messages
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerTracker>()
            .add_message::<GridPointer>()
            .add_systems(Update, (follow_cursor, emit_grid_pointers).chain());
    }
}

/// A press or drag of the pointer that steers the grid
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct GridPointer {
    /// Logical window coordinates
    pub screen: Vec2,
    pub action: PointerAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Press,
    /// Moved while held down
    Drag,
}

impl GridPointer {
    /// Where the pointer lands in grid space, by casting through the camera
    /// onto the y = 0 plane
    pub fn grid_point(
        &self,
        camera: &Camera,
        camera_transform: &GlobalTransform,
        viewport: &Viewport,
    ) -> Option<Vec2> {
        let ray = camera.viewport_to_world(camera_transform, self.screen).ok()?;
        let distance = ray.intersect_plane(Vec3::ZERO, InfinitePlane3d::new(Vec3::Y))?;
        Some(viewport.to_grid(ray.get_point(distance)))
    }
}

/// Last cursor position and the one touch that is allowed to steer
#[derive(Resource, Default, Debug)]
struct PointerTracker {
    cursor: Option<Vec2>,
    primary_touch: Option<u64>,
}

impl PointerTracker {
    /// Action for a touch event; only the first finger down drives the grid
    /// until it lifts
    fn touch_action(&mut self, id: u64, phase: TouchPhase) -> Option<PointerAction> {
        match phase {
            TouchPhase::Started if self.primary_touch.is_none() => {
                self.primary_touch = Some(id);
                Some(PointerAction::Press)
            }
            TouchPhase::Moved if self.primary_touch == Some(id) => Some(PointerAction::Drag),
            TouchPhase::Ended | TouchPhase::Canceled if self.primary_touch == Some(id) => {
                self.primary_touch = None;
                None
            }
            _ => None,
        }
    }
}

fn follow_cursor(mut moves: MessageReader<CursorMoved>, mut tracker: ResMut<PointerTracker>) {
    if let Some(last) = moves.read().last() {
        tracker.cursor = Some(last.position);
    }
}

fn emit_grid_pointers(
    buttons: Res<ButtonInput<MouseButton>>,
    mut touches: MessageReader<TouchInput>,
    mut tracker: ResMut<PointerTracker>,
    mut out: MessageWriter<GridPointer>,
) {
    let mouse_action = if buttons.just_pressed(MouseButton::Left) {
        Some(PointerAction::Press)
    } else if buttons.pressed(MouseButton::Left) {
        Some(PointerAction::Drag)
    } else {
        None
    };
    if let (Some(action), Some(screen)) = (mouse_action, tracker.cursor) {
        out.write(GridPointer { screen, action });
    }

    for touch in touches.read() {
        if let Some(action) = tracker.touch_action(touch.id, touch.phase) {
            out.write(GridPointer {
                screen: touch.position,
                action,
            });
        }
    }
}
