//! Provides [`ZoomSettings`] and the conversion from zoom units to a radius change.

use bevy_reflect::Reflect;

/// Base of the multiplicative zoom scale. One unit at zoom speed `1.0` shrinks the distance to
/// the focus target by 3%.
pub const ZOOM_SPEED_BASE: f32 = 0.97;

/// Scale zooming speed, and bound the size of a single zoom step.
#[derive(Debug, Clone, Reflect)]
pub struct ZoomSettings {
    /// Exponent applied to [`ZOOM_SPEED_BASE`] per zoom unit. Larger values zoom faster.
    pub zoom_speed: f32,
    /// The largest change in distance a single zoom step may make, in world units.
    ///
    /// `None` leaves steps unbounded.
    pub max_zoom_distance: Option<f32>,
    /// The largest number of zoom units a single wheel event may contribute. Bounds the spikes
    /// some devices produce on fast flicks.
    pub max_wheel_units: f32,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            zoom_speed: 1.0,
            max_zoom_distance: None,
            max_wheel_units: 10.0,
        }
    }
}

/// Which way a zoom step moves the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum ZoomDirection {
    /// Toward the focus target.
    In,
    /// Away from the focus target.
    Out,
}

/// The signed change in radius for zooming `units` from `radius`.
///
/// Zooming in scales the radius by `ZOOM_SPEED_BASE^(zoom_speed * units)` and zooming out
/// divides by the same amount, so one step in followed by one step out returns to the starting
/// radius. Steps never get smaller than the step that would carry the camera across
/// `min_approach`, which keeps zooming responsive close to the target.
pub fn zoom_step(
    settings: &ZoomSettings,
    direction: ZoomDirection,
    radius: f32,
    units: f32,
    min_approach: f32,
) -> f32 {
    let scale = ZOOM_SPEED_BASE.powf(settings.zoom_speed * units);
    let min_step = min_approach / scale - min_approach;
    let step = match direction {
        ZoomDirection::In => (radius * scale - radius).min(-min_step),
        ZoomDirection::Out => (radius / scale - radius).max(min_step),
    };
    match settings.max_zoom_distance {
        Some(max) => step.min(max).max(-max),
        None => step,
    }
}
