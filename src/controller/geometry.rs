//! Geometry helpers shared by the motion algorithms: spherical coordinates, pointer rays, and
//! plane intersections.

use std::f32::consts::{PI, TAU};

use bevy_math::{
    primitives::{InfinitePlane3d, Segment3d},
    Dir3, Ray3d, Vec2, Vec3,
};
use bevy_reflect::prelude::*;
use bevy_render::camera::PerspectiveProjection;
use bevy_transform::prelude::*;

/// Smallest distance the polar angle is allowed to get to either pole.
pub const POLAR_EPSILON: f32 = 1e-6;

/// A point on a sphere around the focus target, Y-up.
///
/// The polar angle is measured from the +Y axis, the azimuth around Y starting at +Z.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Spherical {
    /// Distance from the focus target.
    pub radius: f32,
    /// Angle from the +Y axis, in radians.
    pub polar: f32,
    /// Angle around the Y axis, in radians. Zero points down +Z.
    pub azimuth: f32,
}

impl Default for Spherical {
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }
}

impl Spherical {
    /// Create a spherical coordinate from its components.
    pub const fn new(radius: f32, polar: f32, azimuth: f32) -> Self {
        Self {
            radius,
            polar,
            azimuth,
        }
    }

    /// Convert a cartesian offset from the focus target into spherical coordinates.
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self::new(0.0, 0.0, 0.0);
        }
        Self {
            radius,
            polar: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            azimuth: offset.x.atan2(offset.z),
        }
    }

    /// The cartesian offset from the focus target described by these coordinates.
    pub fn to_offset(&self) -> Vec3 {
        let sin_polar_radius = self.polar.sin() * self.radius;
        Vec3::new(
            sin_polar_radius * self.azimuth.sin(),
            self.polar.cos() * self.radius,
            sin_polar_radius * self.azimuth.cos(),
        )
    }

    /// Keep the polar angle off the poles, where the camera's up vector becomes undefined.
    pub fn make_safe(&mut self) {
        self.polar = self.polar.max(POLAR_EPSILON).min(PI - POLAR_EPSILON);
    }
}

/// Returns the angle equivalent to `angle` that lies within half a turn of `reference`.
pub fn wrap_angle_near(angle: f32, reference: f32) -> f32 {
    let turns = ((reference - angle) / TAU).round();
    angle + turns * TAU
}

/// Convert a logical viewport position (origin top left, y down) into normalized device
/// coordinates (origin at the center, y up).
pub fn viewport_to_ndc(position: Vec2, viewport_size: Vec2) -> Vec2 {
    Vec2::new(
        position.x / viewport_size.x * 2.0 - 1.0,
        -(position.y / viewport_size.y) * 2.0 + 1.0,
    )
}

/// World space distance from the center of the screen to its top edge, at `distance` in front
/// of the camera.
pub fn half_height_at_distance(distance: f32, perspective: &PerspectiveProjection) -> f32 {
    distance * (perspective.fov * 0.5).tan()
}

/// A ray cast from the camera through a point on the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerRay {
    /// The ray through the pointer, starting at the camera position.
    pub ray: Ray3d,
    /// The direction the camera was facing when the ray was cast.
    pub view_direction: Dir3,
}

impl PointerRay {
    /// Cast a ray from the camera through the normalized device coordinate `ndc`.
    ///
    /// Returns `None` if the projection is degenerate.
    pub fn from_ndc(
        ndc: Vec2,
        transform: &Transform,
        perspective: &PerspectiveProjection,
    ) -> Option<Self> {
        let tan_half_fov = (perspective.fov * 0.5).tan();
        let view_space = Vec3::new(
            ndc.x * tan_half_fov * perspective.aspect_ratio,
            ndc.y * tan_half_fov,
            -1.0,
        );
        let direction = Dir3::new(transform.rotation * view_space).ok()?;
        Some(Self {
            ray: Ray3d::new(transform.translation, direction),
            view_direction: transform.forward(),
        })
    }
}

/// Intersect a segment with the plane that has the given normal and passes through
/// `plane_point`.
///
/// Returns `None` if the segment is parallel to the plane, has no length, or ends before
/// reaching it.
pub fn intersect_plane_segment(
    plane: InfinitePlane3d,
    plane_point: Vec3,
    segment: Segment3d,
) -> Option<Vec3> {
    let start = segment.point1();
    let ray = Ray3d::new(start, Dir3::new(segment.point2() - start).ok()?);
    let distance = ray.intersect_plane(plane_point, plane)?;
    (distance <= segment.length()).then(|| ray.get_point(distance))
}
