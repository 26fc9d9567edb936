//! Mouse Module - hover tracking, button capture and dispatch
//!
//! The environment keeps three weak references for the mouse:
//!
//! - `hover` - the node under the cursor, found by hit-testing
//! - `captured[button]` - the node a held button went down on
//! - `mouse` - the last position inside the scene
//!
//! Any handler may destroy any node, so every step re-reads these fields
//! instead of holding a handle across a callback.
//!
//! # Event order
//!
//! ```text
//! move:  MouseOut(old) -> MouseMove(hover) -> MouseMoveOutside(captured) -> MouseOver(new)
//! up:    MouseUp(hover) -> MouseClick(hover, if captured) -> MouseUpOutside(captured, if not hover)
//! ```

use std::fmt;

use super::events::Event;
use crate::engine::NodeId;
use crate::environment::Environment;
use crate::types::Point;

// =============================================================================
// TYPES
// =============================================================================

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u8),
}

impl MouseButton {
    /// Button from its numeric index: 0 left, 1 right, 2 middle.
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => MouseButton::Left,
            1 => MouseButton::Right,
            2 => MouseButton::Middle,
            n => MouseButton::Other(n),
        }
    }

    pub fn index(self) -> u8 {
        match self {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
            MouseButton::Other(n) => n,
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MouseButton::Left => f.write_str("left"),
            MouseButton::Right => f.write_str("right"),
            MouseButton::Middle => f.write_str("middle"),
            MouseButton::Other(n) => write!(f, "button {n}"),
        }
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

impl Environment {
    /// Node currently under the mouse.
    pub fn hovered(&self) -> Option<NodeId> {
        self.hover
    }

    /// Node a held button went down on.
    pub fn captured(&self, button: MouseButton) -> Option<NodeId> {
        self.captured.get(&button).copied()
    }

    /// Move the mouse to `(x, y)`, updating hover and notifying nodes.
    pub fn mouse_move(&mut self, x: f32, y: f32) {
        let position = Point::new(x, y);
        let updated = self.node_under(x, y);
        self.mouse = Some(position);

        let mut entered = false;
        if updated != self.hover {
            // hover is replaced before MouseOut so a handler destroying the
            // new node clears it
            let last = self.hover;
            self.hover = updated;
            if let Some(last) = last {
                self.trigger(last, &Event::MouseOut);
            }
            entered = true;
        }

        if let Some(over) = self.hover {
            self.trigger(over, &Event::MouseMove { position });
        }

        let buttons: Vec<_> = self.captured.keys().copied().collect();
        for button in buttons {
            let Some(down) = self.captured(button) else { continue };
            if Some(down) != self.hover {
                self.trigger(down, &Event::MouseMoveOutside { position });
            }
        }

        if entered {
            if let Some(over) = self.hover {
                self.trigger(over, &Event::MouseOver);
            }
        }
    }

    /// The mouse left the scene.
    pub fn mouse_clear(&mut self) {
        self.mouse = None;
        if let Some(last) = self.hover.take() {
            self.trigger(last, &Event::MouseOut);
        }
    }

    /// Press a button over the hovered node. Returns true if a node was
    /// under the mouse.
    pub fn mouse_down(&mut self, button: MouseButton) -> bool {
        if self.captured.contains_key(&button) {
            self.config.logger.log_error(&format!(
                "Received a mouse down for the {button} button while it is already down, \
                 sending a mouse up first to keep events ordered"
            ));
            self.mouse_up(button);
        }

        let Some(over) = self.hover else {
            return false;
        };
        self.captured.insert(button, over);
        self.trigger(over, &Event::MouseDown { button });
        true
    }

    /// Release a button. Returns true if a node was under the mouse.
    pub fn mouse_up(&mut self, button: MouseButton) -> bool {
        let consumed = self.hover.is_some();

        if let Some(over) = self.hover {
            self.trigger(over, &Event::MouseUp { button });
        }
        if let Some(over) = self.hover {
            if self.captured(button) == Some(over) {
                self.trigger(over, &Event::MouseClick { button });
            }
        }
        if let Some(down) = self.captured(button) {
            if Some(down) != self.hover {
                self.trigger(down, &Event::MouseUpOutside { button });
            }
        }

        self.captured.remove(&button);
        consumed
    }

    /// Scroll over the hovered node. Positive is away from the user.
    pub fn mouse_wheel(&mut self, delta: i32) -> bool {
        let Some(over) = self.hover else {
            return false;
        };
        self.trigger(over, &Event::MouseWheel { delta });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::engine::InputMode;
    use crate::logger::MemoryLogger;
    use crate::state::events::EventKind;
    use crate::types::Anchor;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    fn setup() -> (Environment, MemoryLogger) {
        let logger = MemoryLogger::new();
        let env = Environment::with_config(
            Configuration::new()
                .with_logger(logger.clone())
                .with_root_size(100.0, 100.0),
        );
        (env, logger)
    }

    fn button(env: &mut Environment, name: &str, x: f32, log: &Log) -> NodeId {
        let root = env.root();
        let node = env.create_frame(root, name).unwrap();
        env.set_point(node, Anchor::TopLeft, root, Anchor::TopLeft, x, 0.0).unwrap();
        env.set_size(node, 10.0, 10.0).unwrap();
        env.set_input_mode(node, InputMode::All).unwrap();

        for kind in [
            EventKind::MouseOver,
            EventKind::MouseMove,
            EventKind::MouseMoveOutside,
            EventKind::MouseOut,
            EventKind::MouseDown,
            EventKind::MouseUp,
            EventKind::MouseUpOutside,
            EventKind::MouseClick,
            EventKind::MouseWheel,
        ] {
            let log = log.clone();
            let name = name.to_string();
            env.on(node, kind, move |_, _, _| log.borrow_mut().push(format!("{name}:{kind:?}")))
                .unwrap();
        }
        node
    }

    #[test]
    fn test_button_index_round_trip() {
        assert_eq!(MouseButton::from_index(0), MouseButton::Left);
        assert_eq!(MouseButton::from_index(2), MouseButton::Middle);
        assert_eq!(MouseButton::from_index(7).index(), 7);
    }

    #[test]
    fn test_move_sequence() {
        let (mut env, _) = setup();
        let log = Log::default();
        let a = button(&mut env, "a", 0.0, &log);
        let b = button(&mut env, "b", 20.0, &log);

        env.mouse_move(5.0, 5.0);
        assert_eq!(env.hovered(), Some(a));
        env.mouse_move(25.0, 5.0);
        assert_eq!(env.hovered(), Some(b));

        assert_eq!(
            *log.borrow(),
            vec!["a:MouseMove", "a:MouseOver", "a:MouseOut", "b:MouseMove", "b:MouseOver"]
        );
    }

    #[test]
    fn test_click_sequence() {
        let (mut env, _) = setup();
        let log = Log::default();
        let a = button(&mut env, "a", 0.0, &log);

        env.mouse_move(5.0, 5.0);
        log.borrow_mut().clear();

        assert!(env.mouse_down(MouseButton::Left));
        assert_eq!(env.captured(MouseButton::Left), Some(a));
        assert!(env.mouse_up(MouseButton::Left));
        assert_eq!(env.captured(MouseButton::Left), None);

        assert_eq!(*log.borrow(), vec!["a:MouseDown", "a:MouseUp", "a:MouseClick"]);
    }

    #[test]
    fn test_release_outside() {
        let (mut env, _) = setup();
        let log = Log::default();
        button(&mut env, "a", 0.0, &log);
        button(&mut env, "b", 20.0, &log);

        env.mouse_move(5.0, 5.0);
        env.mouse_down(MouseButton::Left);
        log.borrow_mut().clear();

        env.mouse_move(25.0, 5.0);
        env.mouse_up(MouseButton::Left);

        assert_eq!(
            *log.borrow(),
            vec![
                "a:MouseOut",
                "b:MouseMove",
                "a:MouseMoveOutside",
                "b:MouseOver",
                "b:MouseUp",
                "a:MouseUpOutside",
            ]
        );
    }

    #[test]
    fn test_double_down_fabricates_up() {
        let (mut env, logger) = setup();
        let log = Log::default();
        button(&mut env, "a", 0.0, &log);

        env.mouse_move(5.0, 5.0);
        log.borrow_mut().clear();
        env.mouse_down(MouseButton::Right);
        env.mouse_down(MouseButton::Right);

        assert_eq!(
            *log.borrow(),
            vec!["a:MouseDown", "a:MouseUp", "a:MouseClick", "a:MouseDown"]
        );
        assert_eq!(logger.count_errors_containing("already down"), 1);
    }

    #[test]
    fn test_down_over_nothing() {
        let (mut env, _) = setup();
        env.mouse_move(90.0, 90.0);
        assert!(!env.mouse_down(MouseButton::Left));
        assert_eq!(env.captured(MouseButton::Left), None);
        assert!(!env.mouse_wheel(1));
    }

    #[test]
    fn test_wheel_goes_to_hover() {
        let (mut env, _) = setup();
        let log = Log::default();
        button(&mut env, "a", 0.0, &log);
        env.mouse_move(1.0, 1.0);
        log.borrow_mut().clear();

        assert!(env.mouse_wheel(-1));
        assert_eq!(*log.borrow(), vec!["a:MouseWheel"]);
    }

    #[test]
    fn test_mouse_out_handler_destroying_new_hover() {
        let (mut env, _) = setup();
        let log = Log::default();
        let a = button(&mut env, "a", 0.0, &log);
        let b = button(&mut env, "b", 20.0, &log);
        env.on(a, EventKind::MouseOut, move |env, _, _| {
            let _ = env.obliterate(b);
        })
        .unwrap();

        env.mouse_move(5.0, 5.0);
        env.mouse_move(25.0, 5.0);

        assert!(!env.contains(b));
        assert_eq!(env.hovered(), None);
        assert!(!log.borrow().iter().any(|entry| entry.starts_with("b:")));
    }

    #[test]
    fn test_destroying_hovered_and_captured_clears_references() {
        let (mut env, _) = setup();
        let log = Log::default();
        let a = button(&mut env, "a", 0.0, &log);

        env.mouse_move(5.0, 5.0);
        env.mouse_down(MouseButton::Left);
        env.obliterate(a).unwrap();

        assert_eq!(env.hovered(), None);
        assert_eq!(env.captured(MouseButton::Left), None);
        assert!(!env.mouse_up(MouseButton::Left));
    }

    #[test]
    fn test_mouse_clear_sends_out() {
        let (mut env, _) = setup();
        let log = Log::default();
        button(&mut env, "a", 0.0, &log);
        env.mouse_move(5.0, 5.0);
        log.borrow_mut().clear();

        env.mouse_clear();
        assert_eq!(env.hovered(), None);
        assert_eq!(env.mouse_position(), None);
        assert_eq!(*log.borrow(), vec!["a:MouseOut"]);
    }
}
