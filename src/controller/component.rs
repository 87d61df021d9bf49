//! The primary [`Component`] of the controller, [`DampedCam`].

use std::{f32::consts::TAU, time::Duration};

use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_math::{
    primitives::{InfinitePlane3d, Segment3d},
    Dir3, Vec3,
};
use bevy_reflect::prelude::*;
use bevy_time::prelude::*;
use bevy_transform::prelude::*;
use bevy_window::RequestRedraw;

use crate::input::KeyboardNavigation;

use super::{
    damping::{ease, Damping, SETTLE_EPSILON},
    geometry::{intersect_plane_segment, wrap_angle_near, PointerRay, Spherical},
    motion::{CameraState, Interaction},
    pose::{OrbitLimits, OrbitPose},
    zoom::{zoom_step, ZoomDirection, ZoomSettings},
};

/// Relative slack allowed below [`MinDistanceToTarget::distance`] before the target is pushed.
/// Without it, a corrected pose that lands a rounding error short would be corrected again
/// every frame.
const MIN_DISTANCE_TOLERANCE: f32 = 1e-5;

/// Tracks all state of a camera's controller: its goal and current pose, its input state, and
/// its settings.
///
/// # Moving the Camera
///
/// [`DampedCamInputPlugin`](crate::input::DampedCamInputPlugin) feeds pointer, touch, and
/// keyboard input to any camera that also has an [`InputSurface`](crate::input::InputSurface).
/// Without one, the camera only moves when you call the motion methods yourself:
///
/// - [`DampedCam::rotate`], [`DampedCam::rotate_to`] orbit around the focus target.
/// - [`DampedCam::dolly`], [`DampedCam::dolly_to`], [`DampedCam::dolly_in`],
///   [`DampedCam::dolly_out`] change the distance to the focus target, optionally keeping the
///   point under the pointer in place.
/// - [`DampedCam::pan`], [`DampedCam::move_to`] move the focus target.
/// - [`DampedCam::reset`] returns to the saved origin.
///
/// Motions with `transitional` set are eased in by [`DampedCam::tick`]. Without it, the camera
/// jumps on the next tick.
#[derive(Debug, Clone, Reflect, Component)]
pub struct DampedCam {
    /// When false, input handlers ignore every event. Programmatic motion is unaffected.
    ///
    /// Releases are ignored too, so a drag or held key that is active when the controller is
    /// disabled survives until it is re-enabled and released, along with the dragging damping
    /// factor. Call [`InputSurface::dispose`](crate::input::InputSurface::dispose) or
    /// [`end_drag`](crate::input::end_drag) to end a drag right away.
    pub enabled: bool,
    /// Distance and angle bounds of the orbit.
    pub limits: OrbitLimits,
    /// How quickly the rendered pose catches up to the goal.
    pub damping: Damping,
    /// Zoom speed and step bounds.
    pub zoom: ZoomSettings,
    /// Pan and look sensitivity of pointer input.
    pub sensitivity: Sensitivity,
    /// Keyboard navigation bindings and speeds.
    pub keyboard: KeyboardNavigation,
    /// Keeps the focus target from ending up behind or too close to the camera.
    pub min_distance_to_target: MinDistanceToTarget,
    pose: OrbitPose,
    origin: SavedOrigin,
    #[reflect(ignore)]
    pub(crate) interaction: Interaction,
    #[reflect(ignore)]
    needs_update: bool,
}

impl Default for DampedCam {
    fn default() -> Self {
        let pose = OrbitPose::default();
        DampedCam {
            enabled: true,
            limits: Default::default(),
            damping: Default::default(),
            zoom: Default::default(),
            sensitivity: Default::default(),
            keyboard: Default::default(),
            min_distance_to_target: Default::default(),
            origin: SavedOrigin::capture(&pose),
            pose,
            interaction: Default::default(),
            needs_update: true,
        }
    }
}

impl DampedCam {
    /// Create a controller with the camera at `position`, focused on `target`. This is also the
    /// origin [`DampedCam::reset`] returns to.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let pose = OrbitPose::looking_at(position, target);
        Self {
            origin: SavedOrigin::capture(&pose),
            pose,
            ..Default::default()
        }
    }

    /// Set the orbit bounds.
    pub fn with_limits(self, limits: OrbitLimits) -> Self {
        Self { limits, ..self }
    }

    /// Set the damping factors.
    pub fn with_damping(self, damping: Damping) -> Self {
        Self { damping, ..self }
    }

    /// Set the minimum distance to the focus target, enabling the constraint.
    pub fn with_min_distance_to_target(self, distance: f32) -> Self {
        Self {
            min_distance_to_target: MinDistanceToTarget {
                enabled: true,
                distance,
            },
            ..self
        }
    }

    /// The current and goal pose.
    pub fn pose(&self) -> &OrbitPose {
        &self.pose
    }

    /// The pose [`DampedCam::reset`] returns to.
    pub fn origin(&self) -> &SavedOrigin {
        &self.origin
    }

    /// The active interaction mode.
    pub fn state(&self) -> CameraState {
        self.interaction.state
    }

    /// Is a pointer or touch drag in progress?
    pub fn is_dragging(&self) -> bool {
        self.interaction.is_dragging()
    }

    /// Re-derive the pose from the camera's transform, keeping the current focus target, and
    /// make it the reset origin.
    pub fn sync_from_transform(&mut self, transform: &Transform) {
        self.pose.sync(transform.translation, self.pose.target);
        self.origin = SavedOrigin::capture(&self.pose);
        self.needs_update = true;
    }

    /// Orbit by the given angles in radians, relative to the goal.
    pub fn rotate(&mut self, azimuth_delta: f32, polar_delta: f32, transitional: bool) {
        self.rotate_to(
            self.pose.goal.azimuth + azimuth_delta,
            self.pose.goal.polar + polar_delta,
            transitional,
        );
    }

    /// Orbit to the given angles in radians. Orbiting never moves the focus target, so any
    /// pending target motion is dropped.
    pub fn rotate_to(&mut self, azimuth: f32, polar: f32, transitional: bool) {
        let pose = &mut self.pose;
        pose.goal.azimuth = self.limits.clamp_azimuth(azimuth);
        pose.goal.polar = self.limits.clamp_polar(polar);
        pose.goal.make_safe();
        pose.goal_target = pose.target;

        if !transitional {
            pose.current.azimuth = pose.goal.azimuth;
            pose.current.polar = pose.goal.polar;
        }
        self.needs_update = true;
    }

    /// Change the distance to the focus target by `delta` world units, relative to the current
    /// distance.
    ///
    /// See [`DampedCam::dolly_to`] for the meaning of `pointer`.
    pub fn dolly(&mut self, delta: f32, transitional: bool, pointer: Option<PointerRay>) {
        self.dolly_to(self.pose.current.radius + delta, transitional, pointer);
    }

    /// Set the distance to the focus target, bounded by the orbit limits.
    ///
    /// With a `pointer` ray, the focus target is shifted so the world point under the pointer
    /// stays where it is on screen. Without one, the focus target is left alone.
    pub fn dolly_to(&mut self, distance: f32, transitional: bool, pointer: Option<PointerRay>) {
        let radius = self.pose.current.radius;
        let new_radius = self.limits.clamp_distance(distance);

        if let Some(pointer) = pointer {
            match self.anchored_target(pointer, radius - new_radius) {
                Some(target) => self.pose.goal_target = target,
                None => trace!("Zoom anchor is degenerate, dollying toward the focus target"),
            }
        }
        self.pose.goal.radius = new_radius;

        if !transitional {
            self.pose.current.radius = new_radius;
            self.pose.target = self.pose.goal_target;
        }
        self.needs_update = true;
    }

    /// Move the camera `camera_travel` along the pointer ray, and find where its view axis now
    /// crosses the plane facing the camera through the old focus target.
    fn anchored_target(&self, pointer: PointerRay, camera_travel: f32) -> Option<Vec3> {
        let camera = pointer.ray.get_point(camera_travel);
        let view = pointer.view_direction;
        let depth = (self.pose.target - camera).dot(*view);
        // Twice the depth, so the segment always reaches the plane when it is not parallel.
        let segment = Segment3d::new(camera, camera + *view * depth * 2.0);
        intersect_plane_segment(
            InfinitePlane3d { normal: view },
            self.pose.target,
            segment,
        )
    }

    /// The signed change in radius for a zoom of `units`, from the current radius.
    pub fn zoom_distance(&self, direction: ZoomDirection, units: f32) -> f32 {
        zoom_step(
            &self.zoom,
            direction,
            self.pose.current.radius,
            units,
            self.min_distance_to_target.distance,
        )
    }

    /// Zoom in by `units`, easing toward the new distance.
    pub fn dolly_in(&mut self, units: f32, pointer: Option<PointerRay>) {
        let delta = self.zoom_distance(ZoomDirection::In, units);
        self.dolly(delta, true, pointer);
    }

    /// Zoom out by `units`, easing toward the new distance.
    pub fn dolly_out(&mut self, units: f32, pointer: Option<PointerRay>) {
        let delta = self.zoom_distance(ZoomDirection::Out, units);
        self.dolly(delta, true, pointer);
    }

    /// Zoom for input that arrives as a continuous stream, once per frame or per drag event.
    ///
    /// Every event retargets from the current radius, so the step is divided by the active
    /// damping factor: the camera then covers one full step per event whatever the damping.
    pub(crate) fn dolly_continuous(
        &mut self,
        direction: ZoomDirection,
        units: f32,
        pointer: Option<PointerRay>,
    ) {
        let mut delta = self.zoom_distance(direction, units);
        if self.damping.factor > 0.0 {
            delta /= self.damping.factor;
        }
        self.dolly(delta, true, pointer);
    }

    /// Move the focus target along the camera's right and up axes, in world units. Positive `y`
    /// moves the target down the screen.
    pub fn pan(&mut self, x: f32, y: f32, transitional: bool, transform: &Transform) {
        let offset = *transform.right() * x - *transform.up() * y;
        self.pose.goal_target += offset;

        if !transitional {
            self.pose.target = self.pose.goal_target;
        }
        self.needs_update = true;
    }

    /// Move the focus target to `point`.
    pub fn move_to(&mut self, point: Vec3, transitional: bool) {
        self.pose.goal_target = point;

        if !transitional {
            self.pose.target = self.pose.goal_target;
        }
        self.needs_update = true;
    }

    /// Turn the camera in place by pixel deltas, like looking around in a first person game,
    /// then refocus on the point straight ahead at the previous distance.
    ///
    /// The view is held to the orbit's angle limits, so the camera may stop turning at a bound.
    /// This changes `transform` immediately, and replaces both the current and the goal pose.
    pub fn rotate_first_person(&mut self, delta_x: f32, delta_y: f32, transform: &mut Transform) {
        let distance = self.pose.target.distance(transform.translation);
        transform.rotate_local_y(delta_x * self.sensitivity.rotation_speed);
        transform.rotate_local_x(delta_y * self.sensitivity.rotation_speed);
        // Remove any roll picked up by the pitch.
        let forward = transform.forward();
        transform.look_to(forward, Dir3::Y);

        let ahead = transform.translation + *transform.forward() * distance;
        let mut spherical = Spherical::from_offset(transform.translation - ahead);
        spherical.azimuth = wrap_angle_near(spherical.azimuth, self.pose.current.azimuth);
        let spherical = self.limits.clamp_angles(spherical);

        // The camera stays put, the target moves to wherever the bounded view points.
        let target = transform.translation - spherical.to_offset();
        transform.look_at(target, Dir3::Y);
        self.pose = OrbitPose {
            current: spherical,
            goal: spherical,
            target,
            goal_target: target,
        };
        self.needs_update = true;
    }

    /// Return to the saved origin. Both azimuths are unwound first, so the camera never spins
    /// around several turns on its way back.
    pub fn reset(&mut self, transitional: bool) {
        debug!("Resetting camera to {:?}", self.origin);
        let pose = &mut self.pose;
        pose.goal_target = self.origin.target;
        pose.goal = Spherical::from_offset(self.origin.offset);
        pose.current.azimuth %= TAU;
        pose.goal.azimuth = wrap_angle_near(pose.goal.azimuth % TAU, pose.current.azimuth);

        if !transitional {
            pose.snap_to_goal();
        }
        self.needs_update = true;
    }

    /// Make the current pose the origin [`DampedCam::reset`] returns to.
    pub fn save_state(&mut self) {
        self.origin = SavedOrigin::capture(&self.pose);
    }

    /// Make the camera at `position` focused on `target` the reset origin, and reset to it.
    pub fn set_camera_position(&mut self, position: Vec3, target: Vec3, transitional: bool) {
        self.origin = SavedOrigin {
            target,
            offset: position - target,
        };
        self.reset(transitional);
    }

    /// Advance the current pose toward the goal and write the result to `transform`.
    ///
    /// With `elapsed`, damping is scaled to the frame time. Returns true if the camera moved, or
    /// if a motion method was called since the last tick, so hosts can skip rendering once the
    /// camera has settled.
    pub fn tick(&mut self, transform: &mut Transform, elapsed: Option<Duration>) -> bool {
        let before = (self.pose.current, self.pose.target);

        if self.pose.is_settled(SETTLE_EPSILON) {
            self.pose.snap_to_goal();
        } else {
            let t = self.damping.blend_factor(elapsed);
            let pose = &mut self.pose;
            pose.current.radius = ease(pose.current.radius, pose.goal.radius, t);
            pose.current.polar = ease(pose.current.polar, pose.goal.polar, t);
            pose.current.azimuth = ease(pose.current.azimuth, pose.goal.azimuth, t);
            pose.target = pose.target.lerp(pose.goal_target, t);
        }

        self.pose.make_safe(&self.limits);
        transform.translation = self.pose.camera_position();
        transform.look_at(self.pose.target, Dir3::Y);
        self.enforce_min_distance(transform);

        let changed = before != (self.pose.current, self.pose.target);
        std::mem::take(&mut self.needs_update) || changed
    }

    /// If the focus target is closer than [`MinDistanceToTarget::distance`], push it forward
    /// along the view direction and resynchronize both poses. Returns true if it was pushed.
    fn enforce_min_distance(&mut self, transform: &Transform) -> bool {
        let MinDistanceToTarget { enabled, distance } = self.min_distance_to_target;
        let tolerance = MIN_DISTANCE_TOLERANCE * distance.max(1.0);
        if !enabled || transform.translation.distance(self.pose.target) >= distance - tolerance {
            return false;
        }

        let target = transform.translation + *transform.forward() * distance;
        trace!("Focus target within {distance} of the camera, pushing it to {target}");
        let azimuth = self.pose.current.azimuth;
        self.pose.sync(transform.translation, target);
        let mut spherical = self.pose.current;
        spherical.azimuth = wrap_angle_near(spherical.azimuth, azimuth);
        let spherical = self.limits.clamp_angles(spherical);
        self.pose.current = spherical;
        self.pose.goal = spherical;
        true
    }

    /// Sync newly added controllers with the starting transform of their camera.
    pub fn initialize(mut cameras: Query<(&mut DampedCam, &Transform), Added<DampedCam>>) {
        for (mut controller, transform) in &mut cameras {
            controller.sync_from_transform(transform);
        }
    }

    /// Advance every controller and update its camera transform. Called once per frame.
    pub fn update_camera_positions(
        mut cameras: Query<(&mut DampedCam, &mut Transform)>,
        mut redraw: EventWriter<RequestRedraw>,
        time: Res<Time>,
    ) {
        for (mut controller, mut transform) in &mut cameras {
            // The transform is rewritten every tick, only flag it when the camera moved.
            if controller.tick(transform.bypass_change_detection(), Some(time.delta())) {
                transform.set_changed();
                redraw.write(RequestRedraw);
            }
        }
    }
}

/// The camera pose [`DampedCam::reset`] returns to.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct SavedOrigin {
    /// Focus target to return to.
    pub target: Vec3,
    /// Camera position to return to, relative to `target`.
    pub offset: Vec3,
}

impl SavedOrigin {
    /// Capture the current state of `pose`.
    pub fn capture(pose: &OrbitPose) -> Self {
        Self {
            target: pose.target,
            offset: pose.current.to_offset(),
        }
    }
}

/// The sensitivity of the camera controller to pointer inputs.
#[derive(Debug, Clone, Copy, Reflect)]
pub struct Sensitivity {
    /// Multiplier on pan distance.
    pub pan_speed: f32,
    /// The largest distance, in world units, a single pan event may move the focus target along
    /// each axis.
    pub max_pan_step: f32,
    /// First person look rotation, in radians per pixel.
    pub rotation_speed: f32,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self {
            pan_speed: 1.0,
            max_pan_step: 1.0,
            rotation_speed: 0.005,
        }
    }
}

/// Keeps a lower bound on the distance from the camera to the focus target, by moving the
/// target rather than the camera.
#[derive(Debug, Clone, Copy, Reflect)]
pub struct MinDistanceToTarget {
    /// Should the bound be enforced?
    pub enabled: bool,
    /// The bound, in world units. Also the closest approach that zoom steps are sized for.
    pub distance: f32,
}

impl Default for MinDistanceToTarget {
    fn default() -> Self {
        Self {
            enabled: true,
            distance: 3.0,
        }
    }
}
