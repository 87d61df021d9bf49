//! A damped orbit, pan, and dolly camera controller for Bevy.
//!
//! The camera orbits a focus target. Input moves a goal pose, and every frame the rendered pose
//! eases a fraction of the way toward it, so motion stays smooth whatever the input device.
//!
//! ## Features
//!
//! - Orbit, pan, and dolly with mouse, touch, and keyboard
//! - Zoom toward the point under the pointer
//! - Distance and angle limits
//! - Frame rate independent damping, with a separate damping factor while dragging
//! - First person look around with a modifier key held
//! - A minimum distance to the focus target, so you can keep zooming through it
//! - Settled cameras stop requesting redraws, for low power apps
//!
//! ## Getting Started
//!
//! Add [`DefaultDampedCamPlugins`] to your app, then add a [`DampedCam`](prelude::DampedCam) and
//! an [`InputSurface`](prelude::InputSurface) to your camera:
//!
//! ```no_run
//! use bevy::prelude::*;
//! use bevy_damped_cam::prelude::*;
//!
//! fn setup(mut commands: Commands) {
//!     commands.spawn((
//!         Camera3d::default(),
//!         Transform::from_xyz(0.0, 5.0, 20.0).looking_at(Vec3::ZERO, Vec3::Y),
//!         DampedCam::default(),
//!         InputSurface::default(),
//!     ));
//! }
//! ```
//!
//! The controller can also be driven without Bevy input at all: build [`input::InputEvent`]s
//! yourself and pass them to [`input::handle_input`], then call
//! [`DampedCam::tick`](prelude::DampedCam::tick) once per frame.

pub mod controller;
pub mod extensions;
pub mod input;

/// Common imports.
pub mod prelude {
    pub use crate::{
        controller::{
            component::{DampedCam, MinDistanceToTarget, SavedOrigin, Sensitivity},
            damping::Damping,
            geometry::{PointerRay, Spherical},
            motion::CameraState,
            pose::{OrbitLimits, OrbitPose},
            zoom::{ZoomDirection, ZoomSettings},
        },
        input::{InputEvent, InputSurface, KeyboardNavigation, NavigationKeys},
        DefaultDampedCamPlugins,
    };
}

/// Adds the camera controller, its input handling, and the default extensions.
pub struct DefaultDampedCamPlugins;

impl bevy_app::PluginGroup for DefaultDampedCamPlugins {
    #[allow(clippy::let_and_return)]
    fn build(self) -> bevy_app::PluginGroupBuilder {
        let group = bevy_app::PluginGroupBuilder::start::<Self>()
            .add(controller::DampedCamControllerPlugin)
            .add(input::DampedCamInputPlugin)
            .add(extensions::look_to::LookToPlugin);

        #[cfg(feature = "extension_target_indicator")]
        let group = group.add(extensions::target_indicator::TargetIndicatorPlugin);

        group
    }
}
