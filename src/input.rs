//! Keyboard and mouse state for the viewer.
//!
//! Tracks instantaneous events (pressed this frame) and continuous state
//! (held), plus the pointer in pixels and NDC for hover picking and camera
//! drags.
//!
//! ```ignore
//! if input.key_pressed(KeyCode::Space) {
//!     scene.toggle_mode();
//! }
//! if input.mouse_held(MouseButton::Left) {
//!     let d = input.mouse_delta();
//!     scene.camera_mut().drag(d.x, d.y);
//! }
//! ```

use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Map a winit button. Back, forward and extra buttons are not tracked.
    pub fn from_winit(btn: WinitMouseButton) -> Option<Self> {
        match btn {
            WinitMouseButton::Left => Some(MouseButton::Left),
            WinitMouseButton::Right => Some(MouseButton::Right),
            WinitMouseButton::Middle => Some(MouseButton::Middle),
            WinitMouseButton::Back | WinitMouseButton::Forward | WinitMouseButton::Other(_) => None,
        }
    }
}

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Toggle formed/chaos.
    Space,
    /// Fire the focus trigger.
    F,
    /// Pause the clock.
    P,
    /// Quit.
    Escape,
    Other(u32),
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::Space => KeyCode::Space,
            WinitKeyCode::KeyF => KeyCode::F,
            WinitKeyCode::KeyP => KeyCode::P,
            WinitKeyCode::Escape => KeyCode::Escape,
            _ => KeyCode::Other(key as u32),
        }
    }
}

/// Input state tracking for keyboard and mouse.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,

    mouse_held: HashSet<MouseButton>,
    mouse_pressed: HashSet<MouseButton>,

    mouse_position: Vec2,
    mouse_ndc: Vec2,
    mouse_delta: Vec2,
    /// Whether the cursor is over the window.
    cursor_inside: bool,

    scroll_delta: f32,

    window_size: (u32, u32),
}

impl Input {
    pub fn new() -> Self {
        Self {
            window_size: (800, 600),
            ..Default::default()
        }
    }

    // ========== Key Queries ==========

    /// Key went down this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    // ========== Mouse Queries ==========

    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse_pressed.contains(&button)
    }

    pub fn mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held.contains(&button)
    }

    /// Cursor position in window pixels.
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Cursor position in NDC. Origin at the window center, y up.
    pub fn mouse_ndc(&self) -> Vec2 {
        self.mouse_ndc
    }

    /// Pointer in NDC, or `None` while the cursor is outside the window.
    pub fn pointer(&self) -> Option<Vec2> {
        self.cursor_inside.then_some(self.mouse_ndc)
    }

    /// Cursor movement since the last frame, in pixels.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Wheel movement this frame, positive away from the user.
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    pub fn aspect(&self) -> f32 {
        let (w, h) = self.window_size;
        w.max(1) as f32 / h.max(1) as f32
    }

    // ========== Event Processing ==========

    /// Clear per-frame state. Call after the frame consumed it.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.mouse_pressed.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
        self.update_ndc();
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.process_key(KeyCode::from(code), event.state);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(button) = MouseButton::from_winit(*button) {
                    self.process_button(button, *state);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.process_cursor(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => self.cursor_inside = false,
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll_delta += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
            }
            _ => {}
        }
    }

    fn process_key(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                // Ignore key repeat.
                if self.keys_held.insert(key) {
                    self.keys_pressed.insert(key);
                }
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }

    fn process_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.mouse_pressed.insert(button);
                self.mouse_held.insert(button);
            }
            ElementState::Released => {
                self.mouse_held.remove(&button);
            }
        }
    }

    fn process_cursor(&mut self, position: Vec2) {
        if self.cursor_inside {
            self.mouse_delta += position - self.mouse_position;
        }
        self.cursor_inside = true;
        self.mouse_position = position;
        self.update_ndc();
    }

    fn update_ndc(&mut self) {
        let (w, h) = self.window_size;
        if w > 0 && h > 0 {
            self.mouse_ndc = Vec2::new(
                (self.mouse_position.x / w as f32) * 2.0 - 1.0,
                1.0 - (self.mouse_position.y / h as f32) * 2.0,
            );
        }
    }
}
