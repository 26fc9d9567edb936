//! Input Module - input sequences and crossterm conversion
//!
//! An [`InputEvent`] bundles one action with optional mouse position and
//! modifier state, the way a host's event loop usually reports them.
//! [`Environment::input`] applies modifiers first, then the mouse position,
//! then the action.
//!
//! # API
//!
//! - `Environment::input` - Apply an input sequence
//! - `convert_event` - Convert a crossterm event to an InputEvent
//! - `route_crossterm` - Convert and apply, handling resize and typed text
//!
//! # Example
//!
//! ```
//! use spark_frames::{Environment, InputAction, InputEvent, MouseButton};
//!
//! let mut env = Environment::new();
//! env.input(&InputEvent::new(InputAction::MouseDown(MouseButton::Left)).with_mouse(4.0, 2.0));
//! ```

use crossterm::event::{
    Event as CrosstermEvent,
    KeyCode, KeyEventKind, KeyModifiers,
    MouseButton as CrosstermMouseButton,
    MouseEventKind,
};

use super::keyboard::{Key, Modifiers};
use super::mouse::MouseButton;
use crate::environment::Environment;
use crate::types::Point;

// =============================================================================
// INPUT EVENT
// =============================================================================

/// What an input sequence does.
#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    /// Only position and/or modifiers change.
    None,
    KeyDown(Key),
    KeyUp(Key),
    KeyRepeat(Key),
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    MouseWheel(i32),
    Type(String),
}

/// Mouse position attached to an input sequence.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MousePosition {
    /// Not reported, keep the previous position.
    #[default]
    Unknown,
    /// The mouse is outside the scene.
    Invalid,
    At(Point),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub action: InputAction,
    pub mouse: MousePosition,
    pub modifiers: Option<Modifiers>,
}

impl InputEvent {
    pub fn new(action: InputAction) -> Self {
        Self {
            action,
            mouse: MousePosition::Unknown,
            modifiers: None,
        }
    }

    /// A pure mouse move.
    pub fn mouse_move(x: f32, y: f32) -> Self {
        Self::new(InputAction::None).with_mouse(x, y)
    }

    pub fn with_mouse(mut self, x: f32, y: f32) -> Self {
        self.mouse = MousePosition::At(Point::new(x, y));
        self
    }

    pub fn with_mouse_invalid(mut self) -> Self {
        self.mouse = MousePosition::Invalid;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = Some(modifiers);
        self
    }
}

impl Environment {
    /// Apply an input sequence. Returns true if the action reached a node.
    pub fn input(&mut self, event: &InputEvent) -> bool {
        if let Some(modifiers) = event.modifiers {
            self.modifiers = modifiers;
        }

        match event.mouse {
            MousePosition::Unknown => {}
            MousePosition::Invalid => self.mouse_clear(),
            MousePosition::At(point) => self.mouse_move(point.x, point.y),
        }

        match &event.action {
            InputAction::None => false,
            InputAction::KeyDown(key) => self.key_down(*key),
            InputAction::KeyUp(key) => self.key_up(*key),
            InputAction::KeyRepeat(key) => self.key_repeat(*key),
            InputAction::MouseDown(button) => self.mouse_down(*button),
            InputAction::MouseUp(button) => self.mouse_up(*button),
            InputAction::MouseWheel(delta) => self.mouse_wheel(*delta),
            InputAction::Type(text) => self.key_type(text),
        }
    }
}

// =============================================================================
// CROSSTERM CONVERSION
// =============================================================================

/// Convert a crossterm event. Returns `None` for events with no input
/// meaning (resize, focus, paste).
pub fn convert_event(event: &CrosstermEvent) -> Option<InputEvent> {
    match event {
        CrosstermEvent::Key(key) => {
            let code = convert_key_code(key.code);
            let action = match key.kind {
                KeyEventKind::Press => InputAction::KeyDown(code),
                KeyEventKind::Repeat => InputAction::KeyRepeat(code),
                KeyEventKind::Release => InputAction::KeyUp(code),
            };
            Some(InputEvent::new(action).with_modifiers(convert_modifiers(key.modifiers)))
        }
        CrosstermEvent::Mouse(mouse) => {
            let action = match mouse.kind {
                MouseEventKind::Down(button) => InputAction::MouseDown(convert_mouse_button(button)),
                MouseEventKind::Up(button) => InputAction::MouseUp(convert_mouse_button(button)),
                MouseEventKind::ScrollUp => InputAction::MouseWheel(1),
                MouseEventKind::ScrollDown => InputAction::MouseWheel(-1),
                MouseEventKind::Moved
                | MouseEventKind::Drag(_)
                | MouseEventKind::ScrollLeft
                | MouseEventKind::ScrollRight => InputAction::None,
            };
            Some(
                InputEvent::new(action)
                    .with_mouse(mouse.column as f32, mouse.row as f32)
                    .with_modifiers(convert_modifiers(mouse.modifiers)),
            )
        }
        _ => None,
    }
}

/// Convert and apply a crossterm event.
///
/// Resizes go to the root. A printable key press also sends its character
/// as typed text. Returns true if something reached a node.
pub fn route_crossterm(env: &mut Environment, event: &CrosstermEvent) -> bool {
    if let CrosstermEvent::Resize(width, height) = event {
        env.resize_root(*width as f32, *height as f32);
        return false;
    }

    let Some(input) = convert_event(event) else {
        return false;
    };
    let mut consumed = env.input(&input);

    if let CrosstermEvent::Key(key) = event {
        let plain = !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        if let (KeyEventKind::Press, KeyCode::Char(c), true) = (key.kind, key.code, plain) {
            consumed |= env.key_type(&c.to_string());
        }
    }
    consumed
}

fn convert_key_code(code: KeyCode) -> Key {
    match code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Return,
        KeyCode::Tab | KeyCode::BackTab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Insert => Key::Insert,
        KeyCode::Esc => Key::Escape,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::F(n) => Key::Function(n),
        _ => Key::Unknown,
    }
}

fn convert_mouse_button(button: CrosstermMouseButton) -> MouseButton {
    match button {
        CrosstermMouseButton::Left => MouseButton::Left,
        CrosstermMouseButton::Right => MouseButton::Right,
        CrosstermMouseButton::Middle => MouseButton::Middle,
    }
}

fn convert_modifiers(mods: KeyModifiers) -> Modifiers {
    Modifiers {
        ctrl: mods.contains(KeyModifiers::CONTROL),
        alt: mods.contains(KeyModifiers::ALT),
        shift: mods.contains(KeyModifiers::SHIFT),
        meta: mods.contains(KeyModifiers::META) || mods.contains(KeyModifiers::SUPER),
    }
}
