//! A minimal example showing the steps needed to get started with the plugin.

use bevy::prelude::*;
use bevy_damped_cam::prelude::*;

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            DefaultDampedCamPlugins, // Step 1: Add camera controller plugins
        ))
        .add_systems(Startup, (setup_camera, setup_scene))
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 6.0, 16.0).looking_at(Vec3::ZERO, Vec3::Y),
        DampedCam::default(),     // Step 2: add the controller to any cameras
        InputSurface::default(), // Step 3: let pointer, touch, and keys drive it
    ));
}

//
// --- The below code is not important for the example ---
//

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(20.0, 20.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.5, 0.3))),
    ));
    for (i, color) in [Color::srgb(0.8, 0.2, 0.2), Color::srgb(0.2, 0.2, 0.8)]
        .into_iter()
        .enumerate()
    {
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(2.0, 2.0, 2.0))),
            MeshMaterial3d(materials.add(color)),
            Transform::from_xyz(i as f32 * 4.0 - 2.0, 1.0, 0.0),
        ));
    }
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let text = "Left Mouse - Orbit\n\
        Ctrl + Left Mouse - Look around\n\
        Right Mouse - Pan\n\
        Scroll - Zoom to pointer";
    commands.spawn((
        Text::new(text),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        Node {
            margin: UiRect::all(Val::Px(20.0)),
            ..Default::default()
        },
    ));
}
