//! Events Module - per-node event handlers
//!
//! Handlers are attached to a node for one [`EventKind`] and receive the
//! environment mutably, so they may create, move or obliterate nodes.
//! Dispatch snapshots the handler list and re-checks, before every call,
//! that the node is still alive and the handler still attached.
//!
//! # Example
//!
//! ```
//! use spark_frames::{Environment, Event, EventKind};
//!
//! let mut env = Environment::new();
//! let root = env.root();
//! let button = env.create_frame(root, "button").unwrap();
//!
//! let handler = env
//!     .on(button, EventKind::MouseClick, |env, node, _event| {
//!         let _ = env.obliterate(node);
//!     })
//!     .unwrap();
//! env.detach(handler);
//! ```

use std::collections::HashMap;
use std::rc::Rc;

use super::keyboard::KeyEvent;
use super::mouse::MouseButton;
use crate::engine::NodeId;
use crate::environment::Environment;
use crate::error::Result;
use crate::types::Point;

// =============================================================================
// TYPES
// =============================================================================

/// Something that happened to a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Resolved top-left changed (or was resolved for the first time).
    Move,
    /// Resolved size changed (or was resolved for the first time).
    Size,
    /// Mouse entered the node.
    MouseOver,
    MouseMove { position: Point },
    /// Mouse moved while a button pressed on this node is held elsewhere.
    MouseMoveOutside { position: Point },
    /// Mouse left the node.
    MouseOut,
    MouseDown { button: MouseButton },
    MouseUp { button: MouseButton },
    /// Button released elsewhere after being pressed on this node.
    MouseUpOutside { button: MouseButton },
    /// Button pressed and released on this node.
    MouseClick { button: MouseButton },
    MouseWheel { delta: i32 },
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    KeyRepeat(KeyEvent),
    KeyType(String),
    /// `Raw` node reached during a render walk.
    Render,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Move => EventKind::Move,
            Event::Size => EventKind::Size,
            Event::MouseOver => EventKind::MouseOver,
            Event::MouseMove { .. } => EventKind::MouseMove,
            Event::MouseMoveOutside { .. } => EventKind::MouseMoveOutside,
            Event::MouseOut => EventKind::MouseOut,
            Event::MouseDown { .. } => EventKind::MouseDown,
            Event::MouseUp { .. } => EventKind::MouseUp,
            Event::MouseUpOutside { .. } => EventKind::MouseUpOutside,
            Event::MouseClick { .. } => EventKind::MouseClick,
            Event::MouseWheel { .. } => EventKind::MouseWheel,
            Event::KeyDown(_) => EventKind::KeyDown,
            Event::KeyUp(_) => EventKind::KeyUp,
            Event::KeyRepeat(_) => EventKind::KeyRepeat,
            Event::KeyType(_) => EventKind::KeyType,
            Event::Render => EventKind::Render,
        }
    }
}

/// Event discriminant used to attach handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Move,
    Size,
    MouseOver,
    MouseMove,
    MouseMoveOutside,
    MouseOut,
    MouseDown,
    MouseUp,
    MouseUpOutside,
    MouseClick,
    MouseWheel,
    KeyDown,
    KeyUp,
    KeyRepeat,
    KeyType,
    Render,
}

/// Handler for node events.
///
/// `Rc` so dispatch can clone the list and release the registry before
/// calling into user code.
pub type Handler = Rc<dyn Fn(&mut Environment, NodeId, &Event)>;

/// Returned by [`Environment::on`], used to detach the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

struct Registration {
    id: HandlerId,
    kind: EventKind,
    handler: Handler,
}

#[derive(Default)]
pub struct HandlerRegistry {
    by_node: HashMap<NodeId, Vec<Registration>>,
    owners: HashMap<HandlerId, NodeId>,
    next_id: u64,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn register(&mut self, node: NodeId, kind: EventKind, handler: Handler) -> HandlerId {
        let id = self.next_id();
        self.by_node
            .entry(node)
            .or_default()
            .push(Registration { id, kind, handler });
        self.owners.insert(id, node);
        id
    }

    pub fn unregister(&mut self, id: HandlerId) -> bool {
        let Some(node) = self.owners.remove(&id) else {
            return false;
        };
        if let Some(list) = self.by_node.get_mut(&node) {
            list.retain(|r| r.id != id);
            if list.is_empty() {
                self.by_node.remove(&node);
            }
        }
        true
    }

    pub fn is_registered(&self, id: HandlerId) -> bool {
        self.owners.contains_key(&id)
    }

    /// Snapshot of the handlers for one node and kind, in attach order.
    pub fn handlers_for(&self, node: NodeId, kind: EventKind) -> Vec<(HandlerId, Handler)> {
        self.by_node
            .get(&node)
            .map(|list| {
                list.iter()
                    .filter(|r| r.kind == kind)
                    .map(|r| (r.id, r.handler.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn count(&self, node: NodeId) -> usize {
        self.by_node.get(&node).map_or(0, Vec::len)
    }

    /// Drop every handler attached to a node.
    pub fn remove_node(&mut self, node: NodeId) {
        if let Some(list) = self.by_node.remove(&node) {
            for registration in list {
                self.owners.remove(&registration.id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.by_node.clear();
        self.owners.clear();
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

impl Environment {
    /// Attach a handler to `node` for events of `kind`.
    pub fn on<F>(&mut self, node: NodeId, kind: EventKind, handler: F) -> Result<HandlerId>
    where
        F: Fn(&mut Environment, NodeId, &Event) + 'static,
    {
        self.check(node)?;
        Ok(self.handlers.register(node, kind, Rc::new(handler)))
    }

    /// Detach a handler. Returns false if it was already gone.
    pub fn detach(&mut self, handler: HandlerId) -> bool {
        self.handlers.unregister(handler)
    }

    pub fn handler_count(&self, node: NodeId) -> usize {
        self.handlers.count(node)
    }

    /// Deliver `event` to the handlers of `node`. Returns true if at least
    /// one handler ran.
    ///
    /// Stops as soon as the node dies; skips handlers detached by an earlier
    /// handler in the same dispatch.
    pub fn trigger(&mut self, node: NodeId, event: &Event) -> bool {
        let handlers = self.handlers.handlers_for(node, event.kind());
        let mut handled = false;
        for (id, handler) in handlers {
            if !self.contains(node) {
                break;
            }
            if !self.handlers.is_registered(id) {
                continue;
            }
            handler(self, node, event);
            handled = true;
        }
        handled
    }
}
