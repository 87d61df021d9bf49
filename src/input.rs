//! Translates pointer, touch, and keyboard input into [`DampedCam`] motion.
//!
//! The state machine lives in [`handle_input`] and [`poll_keyboard`], which take the controller
//! explicitly and consume already decoded [`InputEvent`]s. [`DampedCamInputPlugin`] decodes Bevy
//! input into those events for every camera with an [`InputSurface`].

use std::f32::consts::TAU;

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_input::{
    keyboard::{KeyCode, KeyboardInput},
    mouse::{MouseButton, MouseButtonInput, MouseScrollUnit, MouseWheel},
    touch::{TouchInput, TouchPhase, Touches},
    ButtonInput, ButtonState, InputSystem,
};
use bevy_log::prelude::*;
use bevy_math::{Rect, Vec2};
use bevy_reflect::prelude::*;
use bevy_render::camera::{Camera, PerspectiveProjection, Projection};
use bevy_transform::prelude::*;
use bevy_window::{CursorMoved, Window};

use crate::controller::{
    component::DampedCam,
    geometry::{half_height_at_distance, viewport_to_ndc, PointerRay},
    motion::{CameraState, DragSession},
    zoom::ZoomDirection,
};

/// Zoom units contributed by one line of a line-based scroll wheel.
pub const UNITS_PER_LINE: f32 = 3.0;

/// Pixels of a pixel-based scroll (trackpads) that make one zoom unit.
pub const PIXELS_PER_UNIT: f32 = 40.0;

/// See the [module](self) docs.
pub struct DampedCamInputPlugin;

impl Plugin for DampedCamInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            PreUpdate,
            forward_input_events
                .after(InputSystem)
                .after(DampedCam::initialize)
                .before(DampedCam::update_camera_positions),
        )
        .register_type::<InputSurface>()
        .register_type::<KeyboardNavigation>();
    }
}

/// A decoded input event. Positions are logical pixels relative to the top left corner of the
/// camera's viewport.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A mouse button was pressed over the viewport.
    PointerDown {
        /// The pressed button.
        button: MouseButton,
        /// Where the pointer was.
        position: Vec2,
    },
    /// The pointer moved.
    PointerMove {
        /// Where the pointer is now.
        position: Vec2,
    },
    /// A mouse button was released.
    PointerUp,
    /// A finger touched the viewport. Lists every active touch, oldest first.
    TouchStart {
        /// Positions of every active touch.
        touches: Vec<Vec2>,
    },
    /// Fingers moved. Lists every active touch, oldest first.
    TouchMove {
        /// Positions of every active touch.
        touches: Vec<Vec2>,
    },
    /// A finger was lifted.
    TouchEnd,
    /// The scroll wheel turned over the viewport.
    Wheel {
        /// Zoom units, positive toward the scene.
        units: f32,
        /// Where the pointer was.
        position: Vec2,
    },
    /// The host asked to open a context menu. Consumed, so secondary button drags can pan.
    ContextMenu,
    /// A key was pressed.
    KeyDown(KeyCode),
    /// A key was released.
    KeyUp(KeyCode),
}

impl InputEvent {
    /// Is this event only delivered while a drag holds the pointer captured?
    pub fn is_drag_continuation(&self) -> bool {
        matches!(
            self,
            Self::PointerMove { .. } | Self::PointerUp | Self::TouchMove { .. } | Self::TouchEnd
        )
    }

    /// The pointer position that decides whether this event landed on the viewport.
    pub fn position(&self) -> Option<Vec2> {
        match self {
            Self::PointerDown { position, .. }
            | Self::PointerMove { position }
            | Self::Wheel { position, .. } => Some(*position),
            Self::TouchStart { touches } | Self::TouchMove { touches } => touches.first().copied(),
            _ => None,
        }
    }

    /// Shift every position so it is relative to `origin`.
    pub fn relative_to(&self, origin: Vec2) -> Self {
        let mut event = self.clone();
        match &mut event {
            Self::PointerDown { position, .. }
            | Self::PointerMove { position }
            | Self::Wheel { position, .. } => *position -= origin,
            Self::TouchStart { touches } | Self::TouchMove { touches } => {
                touches.iter_mut().for_each(|touch| *touch -= origin)
            }
            _ => (),
        }
        event
    }
}

/// The camera and viewport input is being applied to.
pub struct InputContext<'a> {
    /// The camera's transform. First person look rotates it directly.
    pub transform: &'a mut Transform,
    /// The camera's projection, used to turn pixels into world distances and rays.
    pub perspective: &'a PerspectiveProjection,
    /// Size of the viewport in logical pixels.
    pub viewport_size: Vec2,
}

impl InputContext<'_> {
    fn pointer_ray(&self, position: Vec2) -> Option<PointerRay> {
        let ndc = viewport_to_ndc(position, self.viewport_size);
        PointerRay::from_ndc(ndc, self.transform, self.perspective)
    }

    /// World units per pixel at the focus target, measured against half the viewport height.
    fn pan_scale(&self, controller: &DampedCam) -> f32 {
        let distance = self.transform.translation.distance(controller.pose().target);
        half_height_at_distance(distance, self.perspective) / self.viewport_size.y
    }
}

/// Key bindings for keyboard navigation.
#[derive(Debug, Clone, Reflect)]
pub struct NavigationKeys {
    /// Dolly toward the focus target.
    pub forward: KeyCode,
    /// Dolly away from the focus target.
    pub back: KeyCode,
    /// Strafe left.
    pub left: KeyCode,
    /// Strafe right.
    pub right: KeyCode,
    /// Turn the view left in place.
    pub look_left: KeyCode,
    /// Turn the view right in place.
    pub look_right: KeyCode,
    /// Tilt the view up in place.
    pub look_up: KeyCode,
    /// Tilt the view down in place.
    pub look_down: KeyCode,
    /// Held to move faster.
    pub fast: [KeyCode; 2],
    /// Held while pressing the primary button to look around instead of orbiting.
    pub first_person: [KeyCode; 4],
}

impl Default for NavigationKeys {
    fn default() -> Self {
        Self {
            forward: KeyCode::KeyW,
            back: KeyCode::KeyS,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
            look_left: KeyCode::ArrowLeft,
            look_right: KeyCode::ArrowRight,
            look_up: KeyCode::ArrowUp,
            look_down: KeyCode::ArrowDown,
            fast: [KeyCode::ShiftLeft, KeyCode::ShiftRight],
            first_person: [
                KeyCode::ShiftLeft,
                KeyCode::ShiftRight,
                KeyCode::ControlLeft,
                KeyCode::ControlRight,
            ],
        }
    }
}

impl NavigationKeys {
    fn navigation(&self) -> [KeyCode; 8] {
        [
            self.forward,
            self.back,
            self.left,
            self.right,
            self.look_left,
            self.look_right,
            self.look_up,
            self.look_down,
        ]
    }

    /// Does `key` drive keyboard navigation?
    pub fn is_navigation(&self, key: KeyCode) -> bool {
        self.navigation().contains(&key)
    }

    /// Is any navigation key held?
    pub fn any_navigation_held(&self, held: &ButtonInput<KeyCode>) -> bool {
        held.any_pressed(self.navigation())
    }
}

/// Keyboard navigation settings.
///
/// Steps are applied every frame while their key is held.
#[derive(Debug, Clone, Reflect)]
pub struct KeyboardNavigation {
    /// Should navigation keys move the camera?
    pub enabled: bool,
    /// Multiplier on strafe distance, on top of [`Sensitivity::pan_speed`].
    ///
    /// [`Sensitivity::pan_speed`]: crate::controller::component::Sensitivity::pan_speed
    pub pan_speed: f32,
    /// Zoom units per frame.
    pub dolly_units: f32,
    /// Zoom units per frame while a fast key is held.
    pub fast_dolly_units: f32,
    /// Strafe pixels per frame.
    pub pan_step: f32,
    /// Strafe pixels per frame while a fast key is held.
    pub fast_pan_step: f32,
    /// Look pixels per frame. Tilting uses half of this.
    pub rotate_step: f32,
    /// Look pixels per frame while a fast key is held.
    pub fast_rotate_step: f32,
    /// Key bindings.
    pub keys: NavigationKeys,
}

impl Default for KeyboardNavigation {
    fn default() -> Self {
        Self {
            enabled: true,
            pan_speed: 20.0,
            dolly_units: 0.5,
            fast_dolly_units: 2.0,
            pan_step: 1.0,
            fast_pan_step: 5.0,
            rotate_step: 5.0,
            fast_rotate_step: 10.0,
            keys: Default::default(),
        }
    }
}

/// Stands in for the host element input listeners are attached to.
///
/// Presses, touches, and wheel events are only accepted over the camera's viewport. Once a drag
/// starts, the surface captures the pointer, so moves and releases are delivered wherever they
/// happen until the drag ends.
#[derive(Debug, Clone, Component, Reflect)]
pub struct InputSurface {
    attached: bool,
    captured: bool,
}

impl Default for InputSurface {
    fn default() -> Self {
        Self {
            attached: true,
            captured: false,
        }
    }
}

impl InputSurface {
    /// Is the surface listening for input?
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Is the pointer captured by an active drag?
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Start listening for input again after [`InputSurface::dispose`].
    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Receive drag continuation events from anywhere. Does nothing if already captured or
    /// detached.
    pub fn capture(&mut self) {
        if self.attached && !self.captured {
            trace!("Capturing pointer");
            self.captured = true;
        }
    }

    /// Stop receiving drag continuation events.
    pub fn release(&mut self) {
        if self.captured {
            trace!("Releasing pointer");
            self.captured = false;
        }
    }

    /// Stop listening for input, ending any drag in progress. Safe to call more than once.
    pub fn dispose(&mut self, controller: &mut DampedCam) {
        self.release();
        self.attached = false;
        end_drag(controller);
    }

    /// Would this surface deliver `event`? `over_viewport` says if the event's position is over
    /// the camera's viewport.
    pub fn accepts(&self, event: &InputEvent, over_viewport: bool) -> bool {
        if !self.attached {
            return false;
        }
        match event {
            _ if event.is_drag_continuation() => self.captured,
            InputEvent::KeyDown(_) | InputEvent::KeyUp(_) => true,
            _ => over_viewport,
        }
    }

    /// Deliver `event` to `controller` if this surface accepts it, then capture or release the
    /// pointer to match the controller's drag state. Returns true if the event was consumed.
    pub fn dispatch(
        &mut self,
        controller: &mut DampedCam,
        event: &InputEvent,
        over_viewport: bool,
        context: &mut InputContext,
    ) -> bool {
        if !self.accepts(event, over_viewport) {
            return false;
        }
        let consumed = handle_input(controller, event, context);
        if controller.is_dragging() {
            self.capture();
        } else {
            self.release();
        }
        consumed
    }
}

/// Feed one event through the controller's state machine. Returns true if the event was
/// consumed, false if the controller is disabled or the event does not apply.
pub fn handle_input(
    controller: &mut DampedCam,
    event: &InputEvent,
    context: &mut InputContext,
) -> bool {
    if !controller.enabled {
        return false;
    }
    if !(context.viewport_size.x > 0.0 && context.viewport_size.y > 0.0) {
        warn_once!("Ignoring camera input for a viewport without area");
        return false;
    }

    match event {
        InputEvent::PointerDown { button, position } => {
            on_pointer_down(controller, *button, *position)
        }
        InputEvent::PointerMove { position } => on_pointer_move(controller, *position, context),
        InputEvent::PointerUp | InputEvent::TouchEnd => end_drag(controller),
        InputEvent::TouchStart { touches } => on_touch_start(controller, touches),
        InputEvent::TouchMove { touches } => on_touch_move(controller, touches, context),
        InputEvent::Wheel { units, position } => {
            on_wheel(controller, *units, *position, context)
        }
        InputEvent::ContextMenu => true,
        InputEvent::KeyDown(key) => on_key_down(controller, *key, context),
        InputEvent::KeyUp(key) => on_key_up(controller, *key),
    }
}

fn on_pointer_down(controller: &mut DampedCam, button: MouseButton, position: Vec2) -> bool {
    let first_person = controller
        .interaction
        .held_keys
        .any_pressed(controller.keyboard.keys.first_person);
    let state = match button {
        MouseButton::Left if first_person => CameraState::RotateFirstPerson,
        MouseButton::Left => CameraState::Rotate,
        MouseButton::Middle => CameraState::Dolly,
        MouseButton::Right => CameraState::Pan,
        _ => return false,
    };
    controller.interaction.state = state;
    if !controller.is_dragging() {
        start_drag(controller, position, 0.0);
    }
    true
}

fn on_touch_start(controller: &mut DampedCam, touches: &[Vec2]) -> bool {
    let Some(&first) = touches.first() else {
        return false;
    };
    let state = match touches.len() {
        1 => CameraState::TouchRotate,
        2 => CameraState::TouchDolly,
        3 => CameraState::TouchPan,
        _ => return false,
    };
    controller.interaction.state = state;

    let pinch = pinch_distance(touches);
    match controller.interaction.drag.as_mut() {
        Some(drag) if state == CameraState::TouchDolly => drag.pinch_distance = pinch,
        Some(_) => (),
        None => start_drag(controller, first, pinch),
    }
    true
}

fn pinch_distance(touches: &[Vec2]) -> f32 {
    match touches {
        [first, second, ..] => first.distance(*second),
        _ => 0.0,
    }
}

fn start_drag(controller: &mut DampedCam, position: Vec2, pinch_distance: f32) {
    let saved_damping = controller.damping.factor;
    controller.damping.factor = controller.damping.dragging_factor;
    controller.interaction.drag = Some(DragSession {
        last_position: position,
        pinch_distance,
        saved_damping,
    });
    debug!("Started {:?} drag", controller.interaction.state);
}

/// End the drag in progress, if any, and return to [`CameraState::Idle`].
pub fn end_drag(controller: &mut DampedCam) -> bool {
    let Some(drag) = controller.interaction.drag.take() else {
        return false;
    };
    controller.damping.factor = drag.saved_damping;
    debug!("Ended {:?} drag", controller.interaction.state);
    controller.interaction.state = CameraState::Idle;
    true
}

/// Record the new drag position and return how far the pointer moved since the last event,
/// from the new position to the old one.
fn advance_drag(controller: &mut DampedCam, position: Vec2) -> Option<Vec2> {
    let drag = controller.interaction.drag.as_mut()?;
    let delta = drag.last_position - position;
    drag.last_position = position;
    Some(delta)
}

fn on_pointer_move(controller: &mut DampedCam, position: Vec2, context: &mut InputContext) -> bool {
    let Some(delta) = advance_drag(controller, position) else {
        return false;
    };
    apply_drag(controller, delta, context);
    true
}

fn on_touch_move(controller: &mut DampedCam, touches: &[Vec2], context: &mut InputContext) -> bool {
    let Some(&first) = touches.first() else {
        return false;
    };
    let Some(delta) = advance_drag(controller, first) else {
        return false;
    };
    if controller.state() != CameraState::TouchDolly {
        apply_drag(controller, delta, context);
        return true;
    }

    let [first, second, ..] = touches else {
        return true;
    };
    let distance = first.distance(*second);
    let Some(drag) = controller.interaction.drag.as_mut() else {
        return true;
    };
    let pinch_delta = drag.pinch_distance - distance;
    drag.pinch_distance = distance;

    let pointer = context.pointer_ray((*first + *second) / 2.0);
    if pinch_delta > 0.0 {
        controller.dolly_continuous(ZoomDirection::Out, 1.0, pointer);
    } else if pinch_delta < 0.0 {
        controller.dolly_continuous(ZoomDirection::In, 1.0, pointer);
    }
    true
}

fn apply_drag(controller: &mut DampedCam, delta: Vec2, context: &mut InputContext) {
    match controller.state() {
        CameraState::Rotate | CameraState::TouchRotate => {
            let rotation = TAU * delta / context.viewport_size;
            controller.rotate(rotation.x, rotation.y, true);
        }
        CameraState::Pan | CameraState::TouchPan => {
            let max = Vec2::splat(controller.sensitivity.max_pan_step);
            let pan = (controller.sensitivity.pan_speed * delta * context.pan_scale(controller))
                .min(max)
                .max(-max);
            controller.pan(pan.x, pan.y, true, context.transform);
        }
        CameraState::RotateFirstPerson => {
            controller.rotate_first_person(delta.x, delta.y, context.transform);
        }
        // Middle button dolly is reserved. Pinch is handled with the touch positions.
        CameraState::Dolly | CameraState::TouchDolly => (),
        CameraState::Idle | CameraState::KeyboardNavigate => (),
    }
}

fn on_wheel(controller: &mut DampedCam, units: f32, position: Vec2, context: &InputContext) -> bool {
    let max = controller.zoom.max_wheel_units;
    let units = units.min(max).max(-max);
    let pointer = context.pointer_ray(position);
    if units > 0.0 {
        controller.dolly_in(units, pointer);
    } else if units < 0.0 {
        controller.dolly_out(-units, pointer);
    }
    true
}

fn on_key_down(controller: &mut DampedCam, key: KeyCode, context: &mut InputContext) -> bool {
    controller.interaction.held_keys.press(key);
    if controller.keyboard.keys.is_navigation(key) {
        poll_keyboard(controller, context);
    }
    true
}

fn on_key_up(controller: &mut DampedCam, key: KeyCode) -> bool {
    controller.interaction.held_keys.release(key);
    if controller.state() == CameraState::KeyboardNavigate
        && !controller
            .keyboard
            .keys
            .any_navigation_held(&controller.interaction.held_keys)
    {
        controller.interaction.state = CameraState::Idle;
    }
    true
}

/// Apply one frame of keyboard navigation for every held navigation key. Call once per frame so
/// held keys move the camera smoothly, independent of the OS key repeat rate.
///
/// Returns true if any navigation key is held.
pub fn poll_keyboard(controller: &mut DampedCam, context: &mut InputContext) -> bool {
    if !controller.enabled || !controller.keyboard.enabled {
        return false;
    }
    let held = &controller.interaction.held_keys;
    let keys = &controller.keyboard.keys;
    let pressed = [
        held.pressed(keys.forward),
        held.pressed(keys.back),
        held.pressed(keys.left),
        held.pressed(keys.right),
        held.pressed(keys.look_left),
        held.pressed(keys.look_right),
        held.pressed(keys.look_up),
        held.pressed(keys.look_down),
    ];
    let fast = held.any_pressed(keys.fast);
    let [forward, back, left, right, look_left, look_right, look_up, look_down] = pressed;

    let settings = &controller.keyboard;
    let (dolly_units, pan_step, rotate_step) = if fast {
        (
            settings.fast_dolly_units,
            settings.fast_pan_step,
            settings.fast_rotate_step,
        )
    } else {
        (settings.dolly_units, settings.pan_step, settings.rotate_step)
    };

    if forward {
        controller.dolly_continuous(ZoomDirection::In, dolly_units, None);
    }
    if back {
        controller.dolly_continuous(ZoomDirection::Out, dolly_units, None);
    }
    if left {
        keyboard_pan(controller, -pan_step, context);
    }
    if right {
        keyboard_pan(controller, pan_step, context);
    }
    if look_left {
        controller.rotate_first_person(rotate_step, 0.0, context.transform);
    }
    if look_right {
        controller.rotate_first_person(-rotate_step, 0.0, context.transform);
    }
    if look_up {
        controller.rotate_first_person(0.0, rotate_step * 0.5, context.transform);
    }
    if look_down {
        controller.rotate_first_person(0.0, -rotate_step * 0.5, context.transform);
    }

    let navigating = pressed.contains(&true);
    let state = &mut controller.interaction.state;
    if navigating && !state.is_drag() {
        *state = CameraState::KeyboardNavigate;
    } else if !navigating && *state == CameraState::KeyboardNavigate {
        *state = CameraState::Idle;
    }
    navigating
}

fn keyboard_pan(controller: &mut DampedCam, step: f32, context: &InputContext) {
    let scale = context.pan_scale(controller);
    let x = controller.sensitivity.pan_speed * step * controller.keyboard.pan_speed * scale;
    controller.pan(x, 0.0, true, context.transform);
}

/// Decode this frame's Bevy input into [`InputEvent`]s and deliver them to every camera with an
/// [`InputSurface`], then apply held navigation keys.
pub fn forward_input_events(
    mut mouse_buttons: EventReader<MouseButtonInput>,
    mut cursor_moves: EventReader<CursorMoved>,
    mut wheels: EventReader<MouseWheel>,
    mut touch_events: EventReader<TouchInput>,
    mut keys: EventReader<KeyboardInput>,
    touches: Res<Touches>,
    windows: Query<&Window>,
    mut cameras: Query<(
        &mut DampedCam,
        &mut InputSurface,
        &mut Transform,
        &Camera,
        &Projection,
    )>,
) {
    let active_touches = || {
        let mut active: Vec<_> = touches.iter().collect();
        active.sort_by_key(|touch| touch.id());
        active.iter().map(|touch| touch.position()).collect::<Vec<_>>()
    };

    // Modifiers first, so a press in the same frame sees them. Releases last, so a press and
    // release in the same frame still produce a drag.
    let mut events = Vec::new();
    let mut releases = Vec::new();

    for key in keys.read() {
        if key.repeat {
            continue;
        }
        events.push(match key.state {
            ButtonState::Pressed => InputEvent::KeyDown(key.key_code),
            ButtonState::Released => InputEvent::KeyUp(key.key_code),
        });
    }
    for press in mouse_buttons.read() {
        match press.state {
            ButtonState::Pressed => {
                let Some(position) = windows
                    .get(press.window)
                    .ok()
                    .and_then(Window::cursor_position)
                else {
                    continue;
                };
                events.push(InputEvent::PointerDown {
                    button: press.button,
                    position,
                });
            }
            ButtonState::Released => releases.push(InputEvent::PointerUp),
        }
    }
    let mut touch_moved = false;
    for touch in touch_events.read() {
        match touch.phase {
            TouchPhase::Started => events.push(InputEvent::TouchStart {
                touches: active_touches(),
            }),
            TouchPhase::Moved => touch_moved = true,
            TouchPhase::Ended | TouchPhase::Canceled => releases.push(InputEvent::TouchEnd),
        }
    }
    if touch_moved {
        events.push(InputEvent::TouchMove {
            touches: active_touches(),
        });
    }
    if let Some(moved) = cursor_moves.read().last() {
        events.push(InputEvent::PointerMove {
            position: moved.position,
        });
    }
    for wheel in wheels.read() {
        let units = match wheel.unit {
            MouseScrollUnit::Line => wheel.y * UNITS_PER_LINE,
            MouseScrollUnit::Pixel => wheel.y / PIXELS_PER_UNIT,
        };
        let Some(position) = windows
            .get(wheel.window)
            .ok()
            .and_then(Window::cursor_position)
        else {
            continue;
        };
        events.push(InputEvent::Wheel { units, position });
    }
    events.append(&mut releases);

    for (mut controller, mut surface, mut transform, camera, projection) in &mut cameras {
        let Projection::Perspective(perspective) = projection else {
            warn_once!("DampedCam only supports perspective projections");
            continue;
        };
        let Some(viewport) = camera.logical_viewport_rect() else {
            continue;
        };
        // Only flagged as changed once the controller ticks and the camera actually moves.
        let mut context = InputContext {
            transform: transform.bypass_change_detection(),
            perspective,
            viewport_size: viewport.size(),
        };
        deliver_frame(&mut controller, &mut surface, &events, viewport, &mut context);
    }
}

/// Deliver one frame of window-space events to a camera whose viewport is `viewport`, then step
/// held navigation keys.
///
/// A navigation key pressed this frame already stepped when its [`InputEvent::KeyDown`] was
/// handled, so the per-frame step is skipped for that frame.
pub fn deliver_frame(
    controller: &mut DampedCam,
    surface: &mut InputSurface,
    events: &[InputEvent],
    viewport: Rect,
    context: &mut InputContext,
) {
    let mut stepped = false;
    for event in events {
        let over_viewport = over_viewport(event, viewport);
        let event = event.relative_to(viewport.min);
        let consumed = surface.dispatch(controller, &event, over_viewport, context);
        stepped |= consumed
            && matches!(
                event,
                InputEvent::KeyDown(key) if controller.keyboard.keys.is_navigation(key)
            );
    }
    if surface.is_attached() && !stepped {
        poll_keyboard(controller, context);
    }
}

fn over_viewport(event: &InputEvent, viewport: Rect) -> bool {
    event
        .position()
        .map_or(true, |position| viewport.contains(position))
}

#[cfg(test)]
mod tests {
    use bevy_math::Vec3;

    use super::*;

    fn camera() -> (DampedCam, Transform, PerspectiveProjection) {
        let position = Vec3::new(0.0, 0.0, 50.0);
        (
            DampedCam::looking_at(position, Vec3::ZERO),
            Transform::from_translation(position).looking_at(Vec3::ZERO, Vec3::Y),
            PerspectiveProjection::default(),
        )
    }

    fn send(
        controller: &mut DampedCam,
        transform: &mut Transform,
        perspective: &PerspectiveProjection,
        event: InputEvent,
    ) -> bool {
        let mut context = InputContext {
            transform,
            perspective,
            viewport_size: Vec2::new(800.0, 600.0),
        };
        handle_input(controller, &event, &mut context)
    }

    #[test]
    fn buttons_select_modes() {
        let (mut controller, mut transform, perspective) = camera();
        for (button, state) in [
            (MouseButton::Left, CameraState::Rotate),
            (MouseButton::Middle, CameraState::Dolly),
            (MouseButton::Right, CameraState::Pan),
        ] {
            let down = InputEvent::PointerDown {
                button,
                position: Vec2::ZERO,
            };
            send(&mut controller, &mut transform, &perspective, down);
            assert_eq!(controller.state(), state);
            send(&mut controller, &mut transform, &perspective, InputEvent::PointerUp);
            assert_eq!(controller.state(), CameraState::Idle);
        }
    }

    #[test]
    fn modifier_selects_first_person() {
        let (mut controller, mut transform, perspective) = camera();
        send(
            &mut controller,
            &mut transform,
            &perspective,
            InputEvent::KeyDown(KeyCode::ControlLeft),
        );
        send(
            &mut controller,
            &mut transform,
            &perspective,
            InputEvent::PointerDown {
                button: MouseButton::Left,
                position: Vec2::ZERO,
            },
        );
        assert_eq!(controller.state(), CameraState::RotateFirstPerson);
    }

    #[test]
    fn drag_swaps_damping_and_restores_it() {
        let (mut controller, mut transform, perspective) = camera();
        controller.damping.factor = 0.2;
        controller.damping.dragging_factor = 0.7;
        send(
            &mut controller,
            &mut transform,
            &perspective,
            InputEvent::PointerDown {
                button: MouseButton::Left,
                position: Vec2::new(10.0, 10.0),
            },
        );
        assert_eq!(controller.damping.factor, 0.7);
        send(&mut controller, &mut transform, &perspective, InputEvent::PointerUp);
        assert_eq!(controller.damping.factor, 0.2);
    }

    #[test]
    fn second_press_does_not_restart_drag() {
        let (mut controller, mut transform, perspective) = camera();
        let start = Vec2::new(100.0, 100.0);
        send(
            &mut controller,
            &mut transform,
            &perspective,
            InputEvent::PointerDown {
                button: MouseButton::Left,
                position: start,
            },
        );
        let session = controller.interaction.drag.unwrap();
        send(
            &mut controller,
            &mut transform,
            &perspective,
            InputEvent::PointerDown {
                button: MouseButton::Right,
                position: Vec2::new(300.0, 300.0),
            },
        );
        assert_eq!(controller.state(), CameraState::Pan);
        assert_eq!(controller.interaction.drag, Some(session));
        // The pre-drag damping survives instead of being replaced by the dragging one.
        send(&mut controller, &mut transform, &perspective, InputEvent::PointerUp);
        assert_eq!(controller.damping.factor, 0.05);
    }

    #[test]
    fn rotate_drag_across_half_the_viewport_turns_half_a_circle() {
        let (mut controller, mut transform, perspective) = camera();
        send(
            &mut controller,
            &mut transform,
            &perspective,
            InputEvent::PointerDown {
                button: MouseButton::Left,
                position: Vec2::new(800.0, 300.0),
            },
        );
        send(
            &mut controller,
            &mut transform,
            &perspective,
            InputEvent::PointerMove {
                position: Vec2::new(400.0, 300.0),
            },
        );
        let pose = controller.pose();
        assert!((pose.goal.azimuth - (pose.current.azimuth + TAU / 2.0)).abs() < 1e-4);
    }

    #[test]
    fn pan_drag_is_clamped_per_event() {
        let (mut controller, mut transform, perspective) = camera();
        send(
            &mut controller,
            &mut transform,
            &perspective,
            InputEvent::PointerDown {
                button: MouseButton::Right,
                position: Vec2::new(600.0, 300.0),
            },
        );
        send(
            &mut controller,
            &mut transform,
            &perspective,
            InputEvent::PointerMove {
                position: Vec2::new(0.0, 300.0),
            },
        );
        let goal_target = controller.pose().goal_target;
        assert!((goal_target.x - 1.0).abs() < 1e-5, "{goal_target}");
        assert_eq!(controller.pose().goal.radius, controller.pose().current.radius);
    }

    #[test]
    fn touch_counts_select_modes() {
        let (mut controller, mut transform, perspective) = camera();
        for (count, state) in [
            (1, CameraState::TouchRotate),
            (2, CameraState::TouchDolly),
            (3, CameraState::TouchPan),
        ] {
            let touches = (0..count).map(|i| Vec2::splat(100.0 * i as f32)).collect();
            send(
                &mut controller,
                &mut transform,
                &perspective,
                InputEvent::TouchStart { touches },
            );
            assert_eq!(controller.state(), state);
            send(&mut controller, &mut transform, &perspective, InputEvent::TouchEnd);
        }
    }

    #[test]
    fn spreading_fingers_dollies_in() {
        let (mut controller, mut transform, perspective) = camera();
        let touches = vec![Vec2::new(350.0, 300.0), Vec2::new(450.0, 300.0)];
        send(
            &mut controller,
            &mut transform,
            &perspective,
            InputEvent::TouchStart { touches },
        );
        assert_eq!(controller.interaction.drag.unwrap().pinch_distance, 100.0);
        let touches = vec![Vec2::new(300.0, 300.0), Vec2::new(500.0, 300.0)];
        send(
            &mut controller,
            &mut transform,
            &perspective,
            InputEvent::TouchMove { touches },
        );
        assert!(controller.pose().goal.radius < 50.0);
        assert_eq!(controller.interaction.drag.unwrap().pinch_distance, 200.0);
    }

    #[test]
    fn wheel_zooms_without_changing_state() {
        let (mut controller, mut transform, perspective) = camera();
        send(
            &mut controller,
            &mut transform,
            &perspective,
            InputEvent::Wheel {
                units: 3.0,
                position: Vec2::new(400.0, 300.0),
            },
        );
        assert!(controller.pose().goal.radius < 50.0);
        assert_eq!(controller.state(), CameraState::Idle);

        let (mut controller, mut transform, _) = camera();
        send(
            &mut controller,
            &mut transform,
            &perspective,
            InputEvent::Wheel {
                units: -3.0,
                position: Vec2::new(400.0, 300.0),
            },
        );
        assert!(controller.pose().goal.radius > 50.0);
    }

    #[test]
    fn wheel_units_are_capped() {
        let (mut capped, mut transform, perspective) = camera();
        capped.zoom.max_wheel_units = 2.0;
        send(
            &mut capped,
            &mut transform,
            &perspective,
            InputEvent::Wheel {
                units: 500.0,
                position: Vec2::new(400.0, 300.0),
            },
        );
        let (mut reference, _, _) = camera();
        reference.dolly_in(2.0, None);
        assert!((capped.pose().goal.radius - reference.pose().goal.radius).abs() < 1e-3);
    }

    #[test]
    fn pressed_key_steps_once_on_its_first_frame() {
        let (mut reference, mut reference_transform, perspective) = camera();
        send(
            &mut reference,
            &mut reference_transform,
            &perspective,
            InputEvent::KeyDown(KeyCode::KeyD),
        );
        let one_step = reference.pose().goal_target.x;
        assert!(one_step > 0.0);

        let (mut controller, mut transform, _) = camera();
        let mut surface = InputSurface::default();
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let mut context = InputContext {
            transform: &mut transform,
            perspective: &perspective,
            viewport_size: viewport.size(),
        };
        let press = [InputEvent::KeyDown(KeyCode::KeyD)];
        deliver_frame(&mut controller, &mut surface, &press, viewport, &mut context);
        let first_frame = controller.pose().goal_target.x;
        assert!((first_frame - one_step).abs() < 1e-5, "{first_frame} != {one_step}");

        deliver_frame(&mut controller, &mut surface, &[], viewport, &mut context);
        let second_frame = controller.pose().goal_target.x - first_frame;
        assert!((second_frame - one_step).abs() < 1e-4, "{second_frame} != {one_step}");
        assert_eq!(controller.state(), CameraState::KeyboardNavigate);
    }

    #[test]
    fn modifier_press_still_steps_held_keys() {
        let (mut controller, mut transform, perspective) = camera();
        let mut surface = InputSurface::default();
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let mut context = InputContext {
            transform: &mut transform,
            perspective: &perspective,
            viewport_size: viewport.size(),
        };
        let press = [InputEvent::KeyDown(KeyCode::KeyD)];
        deliver_frame(&mut controller, &mut surface, &press, viewport, &mut context);
        let before = controller.pose().goal_target.x;
        let shift = [InputEvent::KeyDown(KeyCode::ShiftLeft)];
        deliver_frame(&mut controller, &mut surface, &shift, viewport, &mut context);
        assert!(controller.pose().goal_target.x > before);
    }

    #[test]
    fn held_key_navigates_until_released() {
        let (mut controller, mut transform, perspective) = camera();
        send(
            &mut controller,
            &mut transform,
            &perspective,
            InputEvent::KeyDown(KeyCode::KeyW),
        );
        assert_eq!(controller.state(), CameraState::KeyboardNavigate);
        let after_press = controller.pose().goal.radius;
        assert!(after_press < 50.0);

        controller.tick(&mut transform, None);
        let mut context = InputContext {
            transform: &mut transform,
            perspective: &perspective,
            viewport_size: Vec2::new(800.0, 600.0),
        };
        assert!(poll_keyboard(&mut controller, &mut context));
        assert!(controller.pose().current.radius < 50.0);

        send(
            &mut controller,
            &mut transform,
            &perspective,
            InputEvent::KeyUp(KeyCode::KeyW),
        );
        assert_eq!(controller.state(), CameraState::Idle);
    }

    #[test]
    fn strafe_keys_pan_sideways() {
        let (mut controller, mut transform, perspective) = camera();
        send(
            &mut controller,
            &mut transform,
            &perspective,
            InputEvent::KeyDown(KeyCode::KeyD),
        );
        let goal_target = controller.pose().goal_target;
        assert!(goal_target.x > 0.0);
        assert!(goal_target.y.abs() < 1e-5);
    }

    #[test]
    fn disabled_keyboard_is_ignored() {
        let (mut controller, mut transform, perspective) = camera();
        controller.keyboard.enabled = false;
        send(
            &mut controller,
            &mut transform,
            &perspective,
            InputEvent::KeyDown(KeyCode::KeyW),
        );
        assert_eq!(controller.pose().goal.radius, 50.0);
        assert_eq!(controller.state(), CameraState::Idle);
    }

    #[test]
    fn disabling_mid_drag_keeps_the_session_until_it_ends() {
        let (mut controller, mut transform, perspective) = camera();
        send(
            &mut controller,
            &mut transform,
            &perspective,
            InputEvent::PointerDown {
                button: MouseButton::Left,
                position: Vec2::ZERO,
            },
        );
        controller.enabled = false;
        let released = send(&mut controller, &mut transform, &perspective, InputEvent::PointerUp);
        assert!(!released);
        assert!(controller.is_dragging());
        assert_eq!(controller.damping.factor, controller.damping.dragging_factor);

        assert!(end_drag(&mut controller));
        assert!(!controller.is_dragging());
        assert_eq!(controller.damping.factor, 0.05);
    }

    #[test]
    fn disabled_controller_consumes_nothing() {
        let (mut controller, mut transform, perspective) = camera();
        controller.enabled = false;
        let consumed = send(
            &mut controller,
            &mut transform,
            &perspective,
            InputEvent::ContextMenu,
        );
        assert!(!consumed);
    }

    #[test]
    fn surface_captures_for_the_drag() {
        let (mut controller, mut transform, perspective) = camera();
        let mut surface = InputSurface::default();
        let mut context = InputContext {
            transform: &mut transform,
            perspective: &perspective,
            viewport_size: Vec2::new(800.0, 600.0),
        };
        let down = InputEvent::PointerDown {
            button: MouseButton::Left,
            position: Vec2::new(10.0, 10.0),
        };
        let moved = InputEvent::PointerMove {
            position: Vec2::new(-50.0, 10.0),
        };

        assert!(!surface.dispatch(&mut controller, &moved, false, &mut context));
        assert!(!surface.dispatch(&mut controller, &down, false, &mut context));
        assert!(surface.dispatch(&mut controller, &down, true, &mut context));
        assert!(surface.is_captured());
        // Outside the viewport, but captured.
        assert!(surface.dispatch(&mut controller, &moved, false, &mut context));
        assert!(surface.dispatch(&mut controller, &InputEvent::PointerUp, false, &mut context));
        assert!(!surface.is_captured());
    }

    #[test]
    fn dispose_mid_drag_releases_everything() {
        let (mut controller, mut transform, perspective) = camera();
        let mut surface = InputSurface::default();
        let mut context = InputContext {
            transform: &mut transform,
            perspective: &perspective,
            viewport_size: Vec2::new(800.0, 600.0),
        };
        let down = InputEvent::PointerDown {
            button: MouseButton::Right,
            position: Vec2::new(10.0, 10.0),
        };
        surface.dispatch(&mut controller, &down, true, &mut context);
        assert!(controller.is_dragging());

        surface.dispose(&mut controller);
        surface.dispose(&mut controller);
        assert!(!surface.is_attached());
        assert!(!surface.is_captured());
        assert!(!controller.is_dragging());
        assert_eq!(controller.state(), CameraState::Idle);
        assert_eq!(controller.damping.factor, 0.05);
        assert!(!surface.dispatch(&mut controller, &down, true, &mut context));

        surface.attach();
        assert!(surface.dispatch(&mut controller, &down, true, &mut context));
        assert!(surface.is_captured());
    }

    #[test]
    fn events_shift_into_viewport_space() {
        let event = InputEvent::TouchMove {
            touches: vec![Vec2::new(110.0, 60.0), Vec2::new(120.0, 70.0)],
        };
        let shifted = event.relative_to(Vec2::new(100.0, 50.0));
        assert_eq!(
            shifted,
            InputEvent::TouchMove {
                touches: vec![Vec2::new(10.0, 10.0), Vec2::new(20.0, 20.0)]
            }
        );
        assert_eq!(shifted.position(), Some(Vec2::new(10.0, 10.0)));
        assert_eq!(InputEvent::PointerUp.position(), None);
    }
}
