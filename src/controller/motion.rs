//! Interaction modes of the controller and the bookkeeping of an active drag.

use bevy_input::{keyboard::KeyCode, ButtonInput};
use bevy_math::Vec2;
use bevy_reflect::prelude::*;

/// The motion mode input is currently driving.
///
/// Only one mode is active at a time. Wheel input dollies without leaving the current mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect)]
pub enum CameraState {
    /// No motion is being driven by held input.
    #[default]
    Idle,
    /// Primary button drag orbits around the focus target.
    Rotate,
    /// Middle button drag. Reserved: wheel and pinch are the supported dolly inputs.
    Dolly,
    /// Secondary button drag pans the focus target.
    Pan,
    /// One finger drag orbits.
    TouchRotate,
    /// Two finger pinch dollies toward the midpoint of the fingers.
    TouchDolly,
    /// Three finger drag pans.
    TouchPan,
    /// Primary button drag with a modifier held rotates the view in place.
    RotateFirstPerson,
    /// Navigation keys are held.
    KeyboardNavigate,
}

impl CameraState {
    /// Is this a mode driven by pointer or touch drags?
    pub fn is_drag(&self) -> bool {
        !matches!(self, Self::Idle | Self::KeyboardNavigate)
    }

    /// Does this mode orbit the focus target?
    pub fn is_orbiting(&self) -> bool {
        matches!(self, Self::Rotate | Self::TouchRotate)
    }

    /// Does this mode move the focus target across the screen?
    pub fn is_panning(&self) -> bool {
        matches!(self, Self::Pan | Self::TouchPan)
    }
}

/// Bookkeeping for a pointer or touch drag, from the press that starts it to the release that
/// ends it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    /// Position of the pointer, or of the first touch, at the last processed event.
    pub last_position: Vec2,
    /// Distance between the first two touches at the last processed pinch event.
    pub pinch_distance: f32,
    /// The damping factor in effect before the drag started, restored when it ends.
    pub saved_damping: f32,
}

/// The controller's input state machine.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    /// The active mode.
    pub state: CameraState,
    /// Present from drag start to drag end.
    pub drag: Option<DragSession>,
    /// Keys pressed and not yet released, as seen by this controller.
    pub held_keys: ButtonInput<KeyCode>,
}

impl Interaction {
    /// Is a pointer or touch drag in progress?
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }
}
