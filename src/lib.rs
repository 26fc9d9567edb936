//! # spark-frames
//!
//! Retained-mode anchor layout for Rust.
//!
//! ## Architecture
//!
//! Nodes live in a generational arena owned by an [`Environment`]. Each node
//! places itself by pinning its edges (left, center, right, top, middle,
//! bottom) to edges of other nodes, plus an optional size override. Nothing
//! is computed eagerly: mutations invalidate cached edges and queue the node,
//! and the next read or render resolves what is needed.
//!
//! ```text
//! set_point / set_size -> invalidate dependents -> queue
//! resolve_pending      -> drain queue -> Move/Size events -> render / hit-test
//! ```
//!
//! Dependency cycles are detected on a resolution stack, logged once with
//! the full loop, and resolved to a fallback value instead of recursing.
//!
//! ## Modules
//!
//! - [`types`] - Point, Rect, Axis, Edge, Anchor, Color
//! - [`engine`] - Node arena, pins, invalidation queue, resolver
//! - [`environment`] - Tree mutation, constraints, render walk, hit-testing
//! - [`state`] - Events, mouse, keyboard, focus, input conversion
//! - [`renderer`] - Vertex sink trait, null and recording backends
//! - [`config`] - Logger, renderer and sizing defaults
//! - [`logger`] - Diagnostic sinks

pub mod config;
pub mod engine;
pub mod environment;
pub mod error;
pub mod logger;
pub mod renderer;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::{Configuration, DEFAULT_MAX_EVENT_PASSES, DEFAULT_NODE_SIZE};
pub use environment::{Environment, ROOT_NAME};
pub use error::{FrameError, Result};
pub use logger::{Logger, MemoryLogger, TracingLogger};

pub use engine::{InputMode, LayoutNode, NodeId, NodeKind, Pin, ResolveStats};

pub use renderer::{NullRenderer, RecordedFrame, RecordedQuad, RecordingRenderer, Renderer, Vertex};

pub use state::{
    events::{Event, EventKind, HandlerId},
    input::{InputAction, InputEvent, MousePosition, convert_event, route_crossterm},
    keyboard::{Key, KeyEvent, Modifiers},
    mouse::MouseButton,
};
