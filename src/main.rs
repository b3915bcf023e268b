use bevy::prelude::*;

mod camera;
mod input;
mod visual;

use bevy::window::WindowResolution;
use camera::CameraPlugin;
use input::InputPlugin;

use crate::visual::plugin::HexGridPlugin;

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Hexfold".into(),
            resolution: WindowResolution::new(1280, 800),
            resizable: true,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(ClearColor(Color::srgb(0.04, 0.05, 0.07)))
    .add_plugins(CameraPlugin)
    .add_plugins(InputPlugin)
    .add_plugins(HexGridPlugin);

    app.run();
}
