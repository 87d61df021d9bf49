//! Provides [`Damping`] settings and the per-axis easing used by the integrator.

use std::time::Duration;

use bevy_reflect::prelude::*;

/// Once every axis of the current pose is this close to the goal, it snaps to the goal.
pub const SETTLE_EPSILON: f32 = 0.001;

/// The frame interval, in seconds, at which a damping factor is applied exactly once per frame.
pub const REFERENCE_FRAME_INTERVAL: f32 = 0.016;

/// How quickly the rendered pose catches up to the goal pose.
///
/// Each factor is the fraction of the remaining distance covered per reference frame. A factor
/// of `1.0` disables easing.
#[derive(Debug, Clone, Reflect)]
pub struct Damping {
    /// Blend fraction while no drag is active.
    pub factor: f32,
    /// Blend fraction substituted for `factor` while a pointer or touch drag is active.
    pub dragging_factor: f32,
}

impl Default for Damping {
    fn default() -> Self {
        Self {
            factor: 0.05,
            dragging_factor: 0.1,
        }
    }
}

impl Damping {
    /// No easing: the current pose reaches the goal on the next tick.
    pub fn none() -> Self {
        Self {
            factor: 1.0,
            dragging_factor: 1.0,
        }
    }

    /// The fraction to blend by this tick.
    ///
    /// Without an elapsed time the factor is applied as a fixed per-tick fraction. With one, it
    /// is scaled by how long the frame took relative to [`REFERENCE_FRAME_INTERVAL`], so the
    /// easing speed does not depend on frame rate. The result never exceeds `1.0`, so a long
    /// frame cannot overshoot the goal.
    pub fn blend_factor(&self, elapsed: Option<Duration>) -> f32 {
        match elapsed {
            None => self.factor,
            Some(elapsed) => {
                (self.factor * elapsed.as_secs_f32() / REFERENCE_FRAME_INTERVAL).min(1.0)
            }
        }
    }
}

/// Move `current` toward `goal` by the fraction `t`.
#[inline]
pub fn ease(current: f32, goal: f32, t: f32) -> f32 {
    current + (goal - current) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_fraction_without_elapsed_time() {
        let damping = Damping::default();
        assert_eq!(damping.blend_factor(None), 0.05);
    }

    #[test]
    fn elapsed_time_scales_the_fraction() {
        let damping = Damping::default();
        let one_frame = damping.blend_factor(Some(Duration::from_millis(16)));
        let two_frames = damping.blend_factor(Some(Duration::from_millis(32)));
        assert!((one_frame - 0.05).abs() < 1e-6);
        assert!((two_frames - 0.1).abs() < 1e-6);
    }

    #[test]
    fn long_frames_never_overshoot() {
        let damping = Damping::none();
        assert_eq!(damping.blend_factor(Some(Duration::from_secs(2))), 1.0);
    }

    #[test]
    fn ease_moves_by_fraction() {
        assert_eq!(ease(0.0, 10.0, 0.25), 2.5);
        assert_eq!(ease(4.0, 4.0, 0.5), 4.0);
    }
}
