//! The dual current/goal pose of the camera around its focus target, and the limits it is held
//! to.

use std::f32::consts::{PI, TAU};

use bevy_math::Vec3;
use bevy_reflect::prelude::*;

use super::geometry::{wrap_angle_near, Spherical};

/// Distance and angle bounds of the orbit.
///
/// Bounds are not validated. If a minimum exceeds its maximum, the resulting motion is
/// unspecified, but never panics.
#[derive(Debug, Clone, Reflect)]
pub struct OrbitLimits {
    /// Closest the camera may get to the focus target, in world units.
    pub min_distance: f32,
    /// Farthest the camera may get from the focus target, in world units.
    pub max_distance: f32,
    /// Lower polar bound in radians. Zero is looking straight down.
    pub min_polar: f32,
    /// Upper polar bound in radians. Pi is looking straight up.
    pub max_polar: f32,
    /// Lower azimuth bound in radians.
    pub min_azimuth: f32,
    /// Upper azimuth bound in radians.
    pub max_azimuth: f32,
}

impl Default for OrbitLimits {
    fn default() -> Self {
        Self {
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar: 0.0,
            max_polar: PI,
            min_azimuth: f32::NEG_INFINITY,
            max_azimuth: f32::INFINITY,
        }
    }
}

impl OrbitLimits {
    /// Bound the distance to the focus target.
    pub fn clamp_distance(&self, distance: f32) -> f32 {
        distance.min(self.max_distance).max(self.min_distance)
    }

    /// Bound the polar angle.
    pub fn clamp_polar(&self, polar: f32) -> f32 {
        polar.min(self.max_polar).max(self.min_polar)
    }

    /// Bound the azimuth angle.
    pub fn clamp_azimuth(&self, azimuth: f32) -> f32 {
        azimuth.min(self.max_azimuth).max(self.min_azimuth)
    }

    /// Bound both angles of `spherical`, leaving its radius alone.
    pub fn clamp_angles(&self, spherical: Spherical) -> Spherical {
        let mut clamped = Spherical {
            polar: self.clamp_polar(spherical.polar),
            azimuth: self.clamp_azimuth(spherical.azimuth),
            ..spherical
        };
        clamped.make_safe();
        clamped
    }

    /// Is the azimuth free to wrap around?
    pub fn is_azimuth_unbounded(&self) -> bool {
        self.min_azimuth == f32::NEG_INFINITY && self.max_azimuth == f32::INFINITY
    }
}

/// Where the camera is drawn this frame, and where input wants it to end up.
///
/// Input mutates the goal. The integrator eases the current state toward it once per frame.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct OrbitPose {
    /// The rendered spherical offset from `target`.
    pub current: Spherical,
    /// The spherical offset input is moving toward.
    pub goal: Spherical,
    /// The rendered focus point.
    pub target: Vec3,
    /// The focus point input is moving toward.
    pub goal_target: Vec3,
}

impl Default for OrbitPose {
    fn default() -> Self {
        Self::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO)
    }
}

impl OrbitPose {
    /// A settled pose with the camera at `position`, focused on `target`.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let spherical = Spherical::from_offset(position - target);
        Self {
            current: spherical,
            goal: spherical,
            target,
            goal_target: target,
        }
    }

    /// The camera position implied by the current state.
    pub fn camera_position(&self) -> Vec3 {
        self.target + self.current.to_offset()
    }

    /// Replace both current and goal with the camera at `position` focused on `target`.
    pub fn sync(&mut self, position: Vec3, target: Vec3) {
        *self = Self::looking_at(position, target);
    }

    /// Jump the current state to the goal.
    pub fn snap_to_goal(&mut self) {
        self.current = self.goal;
        self.target = self.goal_target;
    }

    /// Is every axis of the current state within `epsilon` of the goal?
    pub fn is_settled(&self, epsilon: f32) -> bool {
        let target_delta = (self.goal_target - self.target).abs();
        (self.goal.radius - self.current.radius).abs() <= epsilon
            && (self.goal.polar - self.current.polar).abs() <= epsilon
            && (self.goal.azimuth - self.current.azimuth).abs() <= epsilon
            && target_delta.max_element() <= epsilon
    }

    /// Keep both poses off the poles, and the goal azimuth within a turn of the current one so
    /// easing never spins the long way around.
    pub fn make_safe(&mut self, limits: &OrbitLimits) {
        self.current.make_safe();
        self.goal.make_safe();
        if limits.is_azimuth_unbounded()
            && (self.goal.azimuth - self.current.azimuth).abs() > TAU
        {
            self.goal.azimuth = wrap_angle_near(self.goal.azimuth, self.current.azimuth);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_follow_limits() {
        let limits = OrbitLimits {
            min_distance: 1.0,
            max_distance: 10.0,
            min_polar: 0.1,
            max_polar: 3.0,
            min_azimuth: -1.0,
            max_azimuth: 1.0,
        };
        assert_eq!(limits.clamp_distance(50.0), 10.0);
        assert_eq!(limits.clamp_distance(-5.0), 1.0);
        assert_eq!(limits.clamp_polar(10.0), 3.0);
        assert_eq!(limits.clamp_azimuth(-7.0), -1.0);
        assert!(!limits.is_azimuth_unbounded());
    }

    #[test]
    fn inverted_bounds_do_not_panic() {
        let limits = OrbitLimits {
            min_distance: 10.0,
            max_distance: 1.0,
            ..Default::default()
        };
        let _ = limits.clamp_distance(5.0);
    }

    #[test]
    fn looking_at_is_settled() {
        let pose = OrbitPose::looking_at(Vec3::new(4.0, 3.0, 0.0), Vec3::ONE);
        assert!(pose.is_settled(0.0));
        assert!(pose
            .camera_position()
            .abs_diff_eq(Vec3::new(4.0, 3.0, 0.0), 1e-5));
    }

    #[test]
    fn make_safe_unwinds_a_distant_goal_azimuth() {
        let mut pose = OrbitPose::default();
        pose.current.azimuth = 0.2;
        pose.goal.azimuth = 0.3 + 3.0 * TAU;
        pose.make_safe(&OrbitLimits::default());
        assert!((pose.goal.azimuth - 0.3).abs() < 1e-4);
    }
}
