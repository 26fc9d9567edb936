//! Environment - the hosting context.
//!
//! Owns the root node, the node arena, the invalidation queue and the
//! dependency stack, plus the weak input references (focus, hover, per-button
//! capture). Everything that mutates the tree goes through here so dirty
//! tracking stays consistent.
//!
//! # Example
//!
//! ```
//! use spark_frames::{Anchor, Configuration, Environment, Rect};
//!
//! let mut env = Environment::with_config(Configuration::new().with_root_size(800.0, 600.0));
//! let root = env.root();
//! let panel = env.create_frame(root, "panel").unwrap();
//! env.set_point(panel, Anchor::TopLeft, root, Anchor::TopLeft, 10.0, 10.0).unwrap();
//! env.set_size(panel, 100.0, 50.0).unwrap();
//!
//! env.resolve_pending();
//! assert_eq!(env.bounds(panel).unwrap(), Rect::new(10.0, 10.0, 110.0, 60.0));
//! ```

mod constraints;
mod render;
mod tree;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::Configuration;
use crate::engine::{
    Arena, DependencyStack, InvalidationQueue, LayoutNode, NodeId, NodeKind, ResolveStats, Resolver,
};
use crate::error::{FrameError, Result};
use crate::logger::Logger;
use crate::renderer::Renderer;
use crate::state::events::{Event, HandlerRegistry};
use crate::state::keyboard::Modifiers;
use crate::state::mouse::MouseButton;
use crate::types::{Axis, Point, Rect};

/// Name given to every environment's root node.
pub const ROOT_NAME: &str = "Root";

static NEXT_ENVIRONMENT: AtomicU32 = AtomicU32::new(1);

pub struct Environment {
    id: u32,
    pub(crate) config: Configuration,
    pub(crate) arena: Arena,
    root: NodeId,
    pub(crate) queue: InvalidationQueue,
    pub(crate) stack: DependencyStack,
    pub(crate) stats: ResolveStats,
    pub(crate) handlers: HandlerRegistry,
    pub(crate) focus: Option<NodeId>,
    pub(crate) hover: Option<NodeId>,
    pub(crate) captured: BTreeMap<MouseButton, NodeId>,
    pub(crate) mouse: Option<Point>,
    pub(crate) modifiers: Modifiers,
    pin_seq: u64,
    order_seq: u64,
    resolving: bool,
    /// Nodes popped from the queue since events were last computed.
    touched: Vec<NodeId>,
    pub(crate) tearing_down: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self::with_config(Configuration::default())
    }

    pub fn with_config(config: Configuration) -> Self {
        let id = NEXT_ENVIRONMENT.fetch_add(1, Ordering::Relaxed);
        let mut arena = Arena::new(id);

        let mut root_node = LayoutNode::new(ROOT_NAME, NodeKind::Frame, None);
        for axis in Axis::ALL {
            root_node.axis_mut(axis).size = Some(config.root_size.get(axis));
        }
        let root = arena.insert(root_node);

        let mut env = Self {
            id,
            config,
            arena,
            root,
            queue: InvalidationQueue::new(),
            stack: DependencyStack::new(),
            stats: ResolveStats::default(),
            handlers: HandlerRegistry::new(),
            focus: None,
            hover: None,
            captured: BTreeMap::new(),
            mouse: None,
            modifiers: Modifiers::default(),
            pin_seq: 0,
            order_seq: 0,
            resolving: false,
            touched: Vec::new(),
            tearing_down: false,
        };
        env.queue.enqueue(root);
        env
    }

    /// Process-unique id of this environment.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Read-only view of a node, `None` once it has been obliterated.
    pub fn node(&self, id: NodeId) -> Option<&LayoutNode> {
        self.arena.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id)
    }

    /// Number of live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn logger(&self) -> &dyn Logger {
        self.config.logger.as_ref()
    }

    /// The renderer backend, for `Raw` render handlers that emit geometry.
    pub fn renderer_mut(&mut self) -> &mut dyn Renderer {
        self.config.renderer.as_mut()
    }

    pub fn stats(&self) -> ResolveStats {
        self.stats
    }

    /// Number of nodes awaiting resolution.
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    pub fn is_pending(&self, id: NodeId) -> bool {
        self.queue.contains(id)
    }

    /// Last mouse position received, if it is inside the scene.
    pub fn mouse_position(&self) -> Option<Point> {
        self.mouse
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Log an error and return it.
    pub(crate) fn reject<T>(&self, error: FrameError) -> Result<T> {
        self.config.logger.log_error(&error.to_string());
        Err(error)
    }

    /// Ok if `id` is a live node of this environment.
    pub(crate) fn check(&self, id: NodeId) -> Result<()> {
        if id.environment() != self.id {
            return self.reject(FrameError::ForeignEnvironment(id));
        }
        if !self.arena.contains(id) {
            return self.reject(FrameError::DeadNode(id));
        }
        Ok(())
    }

    pub(crate) fn next_pin_seq(&mut self) -> u64 {
        self.pin_seq += 1;
        self.pin_seq
    }

    pub(crate) fn next_order(&mut self) -> u64 {
        self.order_seq += 1;
        self.order_seq
    }

    pub(crate) fn resolver(&mut self) -> Resolver<'_> {
        Resolver {
            arena: &mut self.arena,
            stack: &mut self.stack,
            logger: self.config.logger.as_ref(),
            defaults: self.config.default_size,
            stats: &mut self.stats,
        }
    }

    // =========================================================================
    // Draining
    // =========================================================================

    /// Resolve every queued node, then deliver `Move`/`Size` events.
    ///
    /// Handlers may dirty more nodes, so this repeats until nothing changes
    /// or the configured pass limit is hit. Called implicitly by `render`
    /// and `node_under`. From inside a handler it only drains the queue;
    /// the outer call delivers the events.
    pub fn resolve_pending(&mut self) {
        if self.resolving {
            self.drain_queue();
            return;
        }

        let _span = tracing::debug_span!("resolve_pending", env = self.id).entered();
        self.resolving = true;

        let mut passes = 0;
        loop {
            self.drain_queue();
            let touched = std::mem::take(&mut self.touched);
            let events = self.geometry_events(&touched);
            if events.is_empty() {
                break;
            }

            passes += 1;
            if passes > self.config.max_event_passes {
                self.config.logger.log_error(&format!(
                    "Layout did not settle after {} event passes, {} nodes still pending",
                    self.config.max_event_passes,
                    self.queue.len(),
                ));
                break;
            }

            for (id, event) in events {
                self.trigger(id, &event);
            }
        }

        self.resolving = false;
    }

    /// Pop and resolve until the queue is empty.
    fn drain_queue(&mut self) {
        while let Some(id) = self.queue.dequeue() {
            self.resolver().resolve_node(id);
            self.touched.push(id);
        }
        debug_assert!(self.stack.is_empty());
    }

    /// Compare freshly resolved bounds with the last announced ones.
    fn geometry_events(&mut self, touched: &[NodeId]) -> Vec<(NodeId, Event)> {
        let mut events = Vec::new();
        for &id in touched {
            let Some(node) = self.arena.get_mut(id) else {
                continue;
            };
            let Some(bounds) = node.cached_bounds() else {
                continue;
            };
            let previous = node.reported.replace(bounds);
            let moved = previous.is_none_or(|old: Rect| old.start != bounds.start);
            let sized = previous.is_none_or(|old: Rect| old.size() != bounds.size());
            if moved {
                events.push((id, Event::Move));
            }
            if sized {
                events.push((id, Event::Size));
            }
        }
        events
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        self.tearing_down = true;
        let children = self
            .arena
            .get(self.root)
            .map(|root| root.children.clone())
            .unwrap_or_default();
        for child in children {
            self.destroy_subtree(child, child);
        }
        self.queue.clear();
        self.handlers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::MemoryLogger;

    #[test]
    fn test_new_environment_has_root() {
        let env = Environment::new();
        let root = env.root();
        assert!(env.contains(root));
        assert_eq!(env.node(root).unwrap().name(), ROOT_NAME);
        assert_eq!(env.node_count(), 1);
        assert!(env.is_pending(root));
    }

    #[test]
    fn test_environment_ids_are_unique() {
        let a = Environment::new();
        let b = Environment::new();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_resolve_pending_empties_queue() {
        let mut env = Environment::with_config(Configuration::new().with_root_size(800.0, 600.0));
        env.resolve_pending();
        assert_eq!(env.pending_count(), 0);
        assert_eq!(env.bounds(env.root()).unwrap(), Rect::new(0.0, 0.0, 800.0, 600.0));
    }

    #[test]
    fn test_check_rejects_foreign_handle() {
        let logger = MemoryLogger::new();
        let mut other = Environment::new();
        let foreign = other.create_frame(other.root(), "foreign").unwrap();

        let env = Environment::with_config(Configuration::new().with_logger(logger.clone()));
        assert_eq!(env.check(foreign), Err(FrameError::ForeignEnvironment(foreign)));
        assert_eq!(logger.errors().len(), 1);
    }

    #[test]
    fn test_event_passes_are_capped() {
        let logger = MemoryLogger::new();
        let mut env = Environment::with_config(
            Configuration::new()
                .with_logger(logger.clone())
                .with_max_event_passes(3),
        );
        let root = env.root();
        let node = env.create_frame(root, "grower").unwrap();
        env.on(node, crate::state::events::EventKind::Size, |env, id, _| {
            let width = env.width(id).unwrap_or(0.0);
            let _ = env.set_width(id, width + 1.0);
        })
        .unwrap();

        env.resolve_pending();
        assert_eq!(logger.count_errors_containing("did not settle"), 1);
    }
}
