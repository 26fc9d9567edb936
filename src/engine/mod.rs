//! Layout engine - node storage, invalidation and resolution.
//!
//! The engine manages the core data structures:
//! - Arena: generational node handles and storage
//! - LayoutNode: pins, size overrides, cached bounds, presentation state
//! - InvalidationQueue: FIFO of dirty nodes awaiting resolution
//! - Resolver: evaluates pins with cycle detection on a dependency stack
//!
//! # Architecture
//!
//! Nodes are NOT owned objects. They are slots in an arena, addressed by
//! generational handles:
//!
//! ```text
//! #0v0: Root  (parent=None, X: size 800, Y: size 600)
//! #1v0: panel (parent=#0,   X: LEFT -> Root.LEFT +10, size 100)
//! #2v0: label (parent=#1,   X: LEFT -> panel.RIGHT, ...)
//! ```
//!
//! Parent, child, pin and dependent links are all handles, so a destroyed
//! node can never be dereferenced through a stale link.

mod arena;
mod node;
mod queue;
mod resolve;

pub use arena::{Arena, NodeId};
pub use node::{AxisState, InputMode, LayoutNode, NodeFlags, NodeKind, Pin};
pub use queue::InvalidationQueue;
pub use resolve::{CYCLE_FALLBACK, DependencyStack, ResolveStats, Resolver, StackEntry};
