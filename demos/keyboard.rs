//! Keyboard navigation, limits, and the programmatic API: reset, look-to, and moving the origin.

use std::f32::consts::PI;

use bevy::prelude::*;
use bevy_damped_cam::{extensions::look_to::LookToTrigger, prelude::*};

fn main() {
    App::new()
        .add_plugins((DefaultPlugins, DefaultDampedCamPlugins))
        .add_systems(Startup, (setup_camera, setup_scene))
        .add_systems(Update, (shortcuts, show_state))
        .run();
}

fn setup_camera(mut commands: Commands) {
    let position = Vec3::new(0.0, 4.0, 12.0);
    let controller = DampedCam::looking_at(position, Vec3::ZERO)
        .with_limits(OrbitLimits {
            min_distance: 2.0,
            max_distance: 60.0,
            // Never go below the ground plane.
            max_polar: PI / 2.0 - 0.05,
            ..default()
        })
        .with_damping(Damping {
            factor: 0.08,
            dragging_factor: 0.25,
        })
        .with_min_distance_to_target(1.5);

    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(position).looking_at(Vec3::ZERO, Vec3::Y),
        controller,
        InputSurface::default(),
    ));
}

fn shortcuts(
    keys: Res<ButtonInput<KeyCode>>,
    mut cameras: Query<(Entity, &mut DampedCam, &mut InputSurface)>,
    mut look_to: EventWriter<LookToTrigger>,
) {
    for (entity, mut controller, mut surface) in &mut cameras {
        if keys.just_pressed(KeyCode::KeyI) {
            if surface.is_attached() {
                surface.dispose(&mut controller);
            } else {
                surface.attach();
            }
        }
        if keys.just_pressed(KeyCode::KeyR) {
            controller.reset(true);
        }
        if keys.just_pressed(KeyCode::KeyO) {
            controller.save_state();
        }
        if keys.just_pressed(KeyCode::KeyT) {
            controller.set_camera_position(Vec3::new(0.0, 20.0, 0.1), Vec3::ZERO, true);
        }
        for (key, facing) in [
            (KeyCode::Digit1, Dir3::NEG_Z),
            (KeyCode::Digit2, Dir3::X),
            (KeyCode::Digit3, Dir3::NEG_X),
        ] {
            if keys.just_pressed(key) {
                look_to.write(LookToTrigger::new(entity, facing));
            }
        }
    }
}

fn show_state(cameras: Query<&DampedCam>, mut text: Query<&mut Text>) {
    let (Ok(controller), Ok(mut text)) = (cameras.single(), text.single_mut()) else {
        return;
    };
    let pose = controller.pose();
    text.0 = format!(
        "W/S - Dolly   A/D - Strafe   Arrows - Look   Shift - Faster\n\
        R - Reset   O - Save origin   T - Top view   1/2/3 - Look to   I - Toggle input\n\n\
        State: {:?}\nDistance: {:.2}\nTarget: {:.2}",
        controller.state(),
        pose.current.radius,
        pose.target,
    );
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(40.0, 40.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.3, 0.35))),
    ));
    let cube = meshes.add(Cuboid::new(1.0, 1.0, 1.0));
    for x in -4..=4 {
        for z in -4..=4 {
            let hue = (x + z + 8) as f32 * 20.0;
            commands.spawn((
                Mesh3d(cube.clone()),
                MeshMaterial3d(materials.add(Color::hsl(hue, 0.6, 0.5))),
                Transform::from_xyz(x as f32 * 3.0, 0.5, z as f32 * 3.0),
            ));
        }
    }
    commands.spawn((
        DirectionalLight::default(),
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        Text::default(),
        Node {
            margin: UiRect::all(Val::Px(20.0)),
            ..default()
        },
    ));
}
