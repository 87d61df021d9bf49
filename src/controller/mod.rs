//! The camera controller: pose, damping, zoom, and the [`DampedCam`] component that ties them
//! together.

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;

pub mod component;
pub mod damping;
pub mod geometry;
pub mod motion;
pub mod pose;
pub mod zoom;

use component::DampedCam;

/// Adds the systems that initialize and advance every [`DampedCam`].
pub struct DampedCamControllerPlugin;

impl Plugin for DampedCamControllerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            PreUpdate,
            (DampedCam::initialize, DampedCam::update_camera_positions).chain(),
        )
        .register_type::<DampedCam>()
        .register_type::<component::SavedOrigin>()
        .register_type::<component::Sensitivity>()
        .register_type::<component::MinDistanceToTarget>()
        .register_type::<damping::Damping>()
        .register_type::<pose::OrbitLimits>()
        .register_type::<pose::OrbitPose>()
        .register_type::<zoom::ZoomSettings>()
        .register_type::<motion::CameraState>();
    }
}
