//! A `bevy_damped_cam` extension that draws an indicator in the scene at the focus target while
//! the camera is orbiting or panning, so users can see what point they are moving around.

use bevy_app::prelude::*;
use bevy_color::Color;
use bevy_ecs::prelude::*;
use bevy_gizmos::prelude::*;
use bevy_math::Isometry3d;
use bevy_reflect::prelude::*;
use bevy_render::camera::Projection;
use bevy_transform::{prelude::*, TransformSystem};

use crate::prelude::*;

/// See the [module](self) docs.
pub struct TargetIndicatorPlugin;

impl Plugin for TargetIndicatorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            PostUpdate,
            draw_target.after(TransformSystem::TransformPropagate),
        )
        .register_type::<TargetIndicator>();
    }
}

/// Optional. Configures whether or not a [`DampedCam`] should show the target indicator while
/// orbiting or panning. The indicator is enabled if this component is not present.
#[derive(Debug, Component, Reflect)]
pub struct TargetIndicator {
    /// Should the indicator be visible on this camera?
    pub enabled: bool,
}

impl Default for TargetIndicator {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Radius of the indicator for a target `distance` away, so it covers the same share of the
/// screen at any distance.
pub fn indicator_scale(distance: f32, fov: f32) -> f32 {
    distance * fov * 0.01
}

/// Is the camera moving around its focus target in `state`?
pub fn shows_indicator(state: CameraState) -> bool {
    state.is_orbiting() || state.is_panning()
}

/// Use gizmos to draw the focus target in world space.
pub fn draw_target(
    cameras: Query<(
        &DampedCam,
        &Projection,
        &GlobalTransform,
        Option<&TargetIndicator>,
    )>,
    mut gizmos: Gizmos,
) {
    for (controller, projection, cam_transform, _) in cameras
        .iter()
        .filter(|(.., indicator)| indicator.is_none_or(|i| i.enabled))
    {
        if !shows_indicator(controller.state()) {
            continue;
        }
        let Projection::Perspective(perspective) = projection else {
            continue;
        };
        let target = controller.pose().target;
        let eye = cam_transform.translation();
        let scale = indicator_scale(eye.distance(target), perspective.fov);

        // Pull the indicator toward the camera so it doesn't clip surfaces at the target.
        let center = target + (eye - target).normalize_or_zero() * scale;
        let color = Color::WHITE;
        let arm_length = 0.4;

        gizmos.circle(
            Isometry3d::new(center, cam_transform.rotation()),
            scale,
            color,
        );
        let offset = 1.5 * scale;
        for direction in [
            cam_transform.left(),
            cam_transform.right(),
            cam_transform.up(),
            cam_transform.down(),
        ] {
            gizmos.ray(
                center + *direction * offset,
                *direction * offset * arm_length,
                color,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shown_while_orbiting_or_panning() {
        assert!(shows_indicator(CameraState::Rotate));
        assert!(shows_indicator(CameraState::TouchPan));
        assert!(!shows_indicator(CameraState::Idle));
        assert!(!shows_indicator(CameraState::RotateFirstPerson));
        assert!(!shows_indicator(CameraState::KeyboardNavigate));
    }

    #[test]
    fn scale_grows_with_distance() {
        let near = indicator_scale(10.0, 0.8);
        let far = indicator_scale(20.0, 0.8);
        assert!((far - 2.0 * near).abs() < 1e-6);
        assert!((near - 0.08).abs() < 1e-6);
    }
}
