//! A `bevy_damped_cam` extension that orbits the camera about its focus target until it is
//! looking in the specified direction.
//!
//! The motion goes through [`DampedCam::rotate_to`], so a transitional look-to is eased by the
//! controller's own damping, and it respects the camera's [`OrbitLimits`](crate::prelude::OrbitLimits).

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_math::Dir3;
use bevy_window::RequestRedraw;

use crate::{
    controller::geometry::{wrap_angle_near, Spherical},
    prelude::*,
};

/// See the [module](self) docs.
pub struct LookToPlugin;

impl Plugin for LookToPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<LookToTrigger>().add_systems(
            PreUpdate,
            LookToTrigger::receive.before(DampedCam::update_camera_positions),
        );
    }
}

/// Send this event to orbit a camera until it faces the given direction.
#[derive(Debug, Clone, Event)]
pub struct LookToTrigger {
    /// The camera to update.
    pub camera: Entity,
    /// The new direction to face.
    pub facing: Dir3,
    /// Ease into the new orientation instead of jumping to it.
    pub transitional: bool,
}

impl LookToTrigger {
    /// Orbit toward `facing` over the camera's damping.
    pub fn new(camera: Entity, facing: Dir3) -> Self {
        Self {
            camera,
            facing,
            transitional: true,
        }
    }

    /// Apply this look-to to `controller`.
    pub fn apply(&self, controller: &mut DampedCam) {
        let facing = Spherical::from_offset(-*self.facing);
        // Take the short way around from wherever the camera has wound to.
        let azimuth = wrap_angle_near(facing.azimuth, controller.pose().goal.azimuth);
        controller.rotate_to(azimuth, facing.polar, self.transitional);
    }

    fn receive(
        mut events: EventReader<Self>,
        mut cameras: Query<&mut DampedCam>,
        mut redraw: EventWriter<RequestRedraw>,
    ) {
        for event in events.read() {
            let Ok(mut controller) = cameras.get_mut(event.camera) else {
                debug!("Ignoring look-to for {}, it has no DampedCam", event.camera);
                continue;
            };
            event.apply(&mut controller);
            redraw.write(RequestRedraw);
        }
    }
}
