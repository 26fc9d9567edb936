//! Keyboard Module - key events routed to the focused node
//!
//! Keys never hit-test: every key event goes to the focused node, or is
//! dropped if nothing has focus. Modifier state is kept on the environment
//! and stamped onto each [`KeyEvent`].

use std::fmt;

use super::events::Event;
use crate::environment::Environment;

// =============================================================================
// TYPES
// =============================================================================

/// Modifier keys state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn ctrl() -> Self {
        Self { ctrl: true, ..Self::default() }
    }

    pub fn alt() -> Self {
        Self { alt: true, ..Self::default() }
    }

    pub fn shift() -> Self {
        Self { shift: true, ..Self::default() }
    }
}

/// Physical key identity, independent of the text it types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Return,
    Tab,
    Backspace,
    Delete,
    Insert,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Function(u8),
    Unknown,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{c}"),
            Key::Function(n) => write!(f, "F{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Key plus the modifiers held when it was reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

impl Environment {
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub fn is_shift(&self) -> bool {
        self.modifiers.shift
    }

    pub fn is_ctrl(&self) -> bool {
        self.modifiers.ctrl
    }

    pub fn is_alt(&self) -> bool {
        self.modifiers.alt
    }

    /// Send `KeyDown` to the focused node. Returns true if a node had focus.
    pub fn key_down(&mut self, key: Key) -> bool {
        let event = KeyEvent::with_modifiers(key, self.modifiers);
        self.send_to_focus(Event::KeyDown(event))
    }

    pub fn key_up(&mut self, key: Key) -> bool {
        let event = KeyEvent::with_modifiers(key, self.modifiers);
        self.send_to_focus(Event::KeyUp(event))
    }

    pub fn key_repeat(&mut self, key: Key) -> bool {
        let event = KeyEvent::with_modifiers(key, self.modifiers);
        self.send_to_focus(Event::KeyRepeat(event))
    }

    /// Send typed text to the focused node.
    pub fn key_type(&mut self, text: &str) -> bool {
        self.send_to_focus(Event::KeyType(text.to_string()))
    }

    fn send_to_focus(&mut self, event: Event) -> bool {
        let Some(focus) = self.focus else {
            return false;
        };
        self.trigger(focus, &event);
        true
    }
}
