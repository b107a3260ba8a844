//! Keyboard input mapped to application events

use macroquad::prelude::{is_key_down, is_key_pressed, KeyCode};

/// Forward/backward speed in units per second
pub const MOVE_SPEED: f32 = 5.0;
/// Strafe and vertical speed in units per second
pub const STRAFE_SPEED: f32 = 3.0;
/// Yaw/pitch speed in radians per second
pub const TURN_SPEED: f32 = 1.0;

/// One thing the user asked for this frame. Movement amounts are already
/// scaled by the frame's delta time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    ToggleVertices,
    ToggleWireframe,
    ToggleFilled,
    ToggleTextured,
    ToggleGrid,
    ToggleCulling,
    MoveForward(f32),
    MoveRight(f32),
    MoveUp(f32),
    Yaw(f32),
    Pitch(f32),
    Quit,
}

/// Read the keyboard. Toggles fire once per press, movement every frame
/// the key is held.
pub fn poll_input(delta_time: f32) -> Vec<InputEvent> {
    let mut events = Vec::new();

    let toggles = [
        (KeyCode::Key1, InputEvent::ToggleVertices),
        (KeyCode::Key2, InputEvent::ToggleWireframe),
        (KeyCode::Key3, InputEvent::ToggleFilled),
        (KeyCode::Key4, InputEvent::ToggleTextured),
        (KeyCode::G, InputEvent::ToggleGrid),
        (KeyCode::Enter, InputEvent::ToggleCulling),
        (KeyCode::Escape, InputEvent::Quit),
    ];
    for (key, event) in toggles {
        if is_key_pressed(key) {
            events.push(event);
        }
    }

    let held = [
        (KeyCode::W, InputEvent::MoveForward(MOVE_SPEED * delta_time)),
        (KeyCode::S, InputEvent::MoveForward(-MOVE_SPEED * delta_time)),
        (KeyCode::D, InputEvent::MoveRight(STRAFE_SPEED * delta_time)),
        (KeyCode::A, InputEvent::MoveRight(-STRAFE_SPEED * delta_time)),
        (KeyCode::Space, InputEvent::MoveUp(STRAFE_SPEED * delta_time)),
        (KeyCode::LeftShift, InputEvent::MoveUp(-STRAFE_SPEED * delta_time)),
        (KeyCode::Right, InputEvent::Yaw(TURN_SPEED * delta_time)),
        (KeyCode::Left, InputEvent::Yaw(-TURN_SPEED * delta_time)),
        (KeyCode::Down, InputEvent::Pitch(TURN_SPEED * delta_time)),
        (KeyCode::Up, InputEvent::Pitch(-TURN_SPEED * delta_time)),
    ];
    for (key, event) in held {
        if is_key_down(key) {
            events.push(event);
        }
    }

    events
}
