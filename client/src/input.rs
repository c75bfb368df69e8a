//! Turns mouse and keyboard input into participant actions

use crate::toolbar::{Toolbar, ToolbarAction, ToolbarClick};
use macroquad::prelude::*;
use shared::{Gesture, Packet, DSP_SPRITE_SIZE, GAME_HEIGHT, GAME_WIDTH};

const GESTURE_KEYS: [KeyCode; 5] = [
    KeyCode::Key1,
    KeyCode::Key2,
    KeyCode::Key3,
    KeyCode::Key4,
    KeyCode::Key5,
];

/// Collects one action per frame from the mouse, the toolbar and the
/// gesture shortcuts.
pub struct InputManager {
    // Previous frame key states for edge detection
    prev_gesture_keys: [bool; 5],
    prev_escape: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            prev_gesture_keys: [false; 5],
            prev_escape: false,
        }
    }

    /// Samples this frame's input and returns the action to send, if any.
    pub fn update(&mut self, toolbar: &mut Toolbar) -> Option<Packet> {
        let escape = is_key_down(KeyCode::Escape);
        if escape && !self.prev_escape {
            toolbar.close();
        }
        self.prev_escape = escape;

        let mut action = None;
        for (i, key) in GESTURE_KEYS.iter().enumerate() {
            let down = is_key_down(*key);
            if down && !self.prev_gesture_keys[i] {
                action = gesture_shortcut(i);
            }
            self.prev_gesture_keys[i] = down;
        }

        if is_mouse_button_pressed(MouseButton::Left) {
            let (x, y) = mouse_position();
            action = handle_click(toolbar, vec2(x, y)).or(action);
        }

        action
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Routes a click to the toolbar first, then to the scene.
pub fn handle_click(toolbar: &mut Toolbar, point: Vec2) -> Option<Packet> {
    match toolbar.click(point) {
        ToolbarClick::Ignored => {
            let (x, y) = target_for_click(point);
            Some(Packet::SetTarget { x, y })
        }
        ToolbarClick::Handled => None,
        ToolbarClick::Selected(ToolbarAction::Chat(message)) => Some(Packet::SendChat { message }),
        ToolbarClick::Selected(ToolbarAction::Gesture(gesture)) => {
            Some(Packet::SetGesture { gesture })
        }
    }
}

/// Target that puts the centre of the avatar under the cursor, kept inside
/// the scene.
pub fn target_for_click(point: Vec2) -> (f32, f32) {
    let half = DSP_SPRITE_SIZE / 2.0;
    (
        (point.x - half).clamp(0.0, GAME_WIDTH - DSP_SPRITE_SIZE),
        (point.y - half).clamp(0.0, GAME_HEIGHT - DSP_SPRITE_SIZE),
    )
}

/// Gesture bound to the number key at `index` (0 for the `1` key).
pub fn gesture_shortcut(index: usize) -> Option<Packet> {
    Gesture::SELECTABLE
        .get(index)
        .map(|gesture| Packet::SetGesture { gesture: *gesture })
}
