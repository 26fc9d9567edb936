//! Tree mutation: creation, obliteration, reparenting, ordering and the
//! presentation attributes that do not feed the solver.

use std::collections::HashSet;

use super::Environment;
use crate::engine::{InputMode, LayoutNode, NodeFlags, NodeId, NodeKind};
use crate::error::{FrameError, Result};
use crate::types::{Axis, Color, Edge};

impl Environment {
    // =========================================================================
    // Creation
    // =========================================================================

    /// Create a node of `kind` as the last child of `parent` (within its
    /// strata and layer).
    pub fn create(&mut self, parent: NodeId, kind: NodeKind, name: &str) -> Result<NodeId> {
        self.check(parent)?;

        let mut node = LayoutNode::new(name, kind, Some(parent));
        node.order = self.next_order();
        let id = self.arena.insert(node);
        self.attach_child(parent, id);

        for axis in Axis::ALL {
            self.invalidate(id, axis);
        }
        Ok(id)
    }

    pub fn create_frame(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        self.create(parent, NodeKind::Frame, name)
    }

    pub fn create_raw(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        self.create(parent, NodeKind::Raw, name)
    }

    pub fn create_mask(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        self.create(parent, NodeKind::Mask, name)
    }

    // =========================================================================
    // Destruction
    // =========================================================================

    /// Destroy a node and its whole subtree.
    ///
    /// Pins held by surviving nodes that target a destroyed node are frozen
    /// at the value they last resolved to (logged), or dropped if they never
    /// resolved. Focus, hover and capture references are cleared.
    pub fn obliterate(&mut self, id: NodeId) -> Result<()> {
        if id == self.root() {
            return self.reject(FrameError::RootImmutable);
        }
        self.check(id)?;

        let _span = tracing::debug_span!("obliterate", node = %id).entered();
        if let Some(parent) = self.arena.get(id).and_then(|node| node.parent) {
            self.detach_child(parent, id);
        }
        self.destroy_subtree(id, id);
        Ok(())
    }

    /// Children first, then the node itself. Does not touch the parent.
    ///
    /// `scope` is the top of the subtree being destroyed; pins between nodes
    /// inside it are not frozen.
    pub(crate) fn destroy_subtree(&mut self, id: NodeId, scope: NodeId) {
        // pre-order, destroyed in reverse so every node goes before its parent
        let mut order = Vec::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.arena.get(next) {
                pending.extend(node.children.iter().copied());
                order.push(next);
            }
        }
        for node in order.into_iter().rev() {
            self.destroy_node(node, scope);
        }
    }

    fn destroy_node(&mut self, id: NodeId, scope: NodeId) {
        if !self.tearing_down {
            for axis in Axis::ALL {
                self.release_pins(id, axis);
                self.release_dependents(id, axis, scope);
            }
        }

        let dirty = self.arena.get(id).is_some_and(LayoutNode::is_dirty);
        if !self.queue.remove(id) && dirty && !self.tearing_down {
            self.config.logger.log_error(&format!(
                "Internal problem: dirty node {} was not in the invalidation queue",
                self.arena.name_full(id),
            ));
        }

        self.handlers.remove_node(id);
        self.forget_input_references(id);
        self.arena.remove(id);
    }

    /// Unregister `id` from the dependents of everything it pins to.
    fn release_pins(&mut self, id: NodeId, axis: Axis) {
        let targets: Vec<NodeId> = match self.arena.get(id) {
            Some(node) => node
                .axis(axis)
                .pins
                .iter()
                .flatten()
                .filter_map(|pin| pin.target_node())
                .collect(),
            None => return,
        };
        for target in targets {
            if let Some(node) = self.arena.get_mut(target) {
                node.axis_mut(axis).remove_dependent(id);
            }
        }
    }

    /// Freeze or drop pins on other nodes that target `id`.
    fn release_dependents(&mut self, id: NodeId, axis: Axis, scope: NodeId) {
        let (dependents, cached) = match self.arena.get(id) {
            Some(node) => {
                let state = node.axis(axis);
                let unique: HashSet<NodeId> = state.dependents.iter().copied().collect();
                let cached = Edge::ALL.map(|edge| state.cached(edge));
                (unique, cached)
            }
            None => return,
        };

        for dependent in dependents {
            if dependent == id || self.arena.is_ancestor_or_self(scope, dependent) {
                continue;
            }
            let dependent_name = self.arena.name_full(dependent);
            let target_name = self.arena.name_full(id);
            let Some(node) = self.arena.get_mut(dependent) else {
                continue;
            };

            let mut dropped = false;
            let mut messages = Vec::new();
            let state = node.axis_mut(axis);
            for edge in Edge::ALL {
                let slot = &mut state.pins[edge.index()];
                let Some(pin) = slot.as_mut() else { continue };
                let Some((target, point)) = pin.target else { continue };
                if target != id {
                    continue;
                }

                match cached[point.index()] {
                    Some(value) => {
                        pin.target = None;
                        pin.offset += value;
                        messages.push(format!(
                            "Pin target destroyed: {} {} -> {} {}, pin frozen at {}",
                            dependent_name,
                            edge.name(axis),
                            target_name,
                            point.name(axis),
                            pin.offset,
                        ));
                    }
                    None => {
                        *slot = None;
                        dropped = true;
                        messages.push(format!(
                            "Pin target destroyed: {} {} -> {} {}, pin dropped",
                            dependent_name,
                            edge.name(axis),
                            target_name,
                            point.name(axis),
                        ));
                    }
                }
            }

            for message in messages {
                self.config.logger.log_error(&message);
            }
            if dropped {
                self.invalidate(dependent, axis);
            }
        }
    }

    fn forget_input_references(&mut self, id: NodeId) {
        if self.focus == Some(id) {
            self.focus = None;
        }
        if self.hover == Some(id) {
            self.hover = None;
        }
        self.captured.retain(|_, captured| *captured != id);
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Move `id` under `parent`, keeping its subtree.
    pub fn set_parent(&mut self, id: NodeId, parent: NodeId) -> Result<()> {
        if id == self.root() {
            return self.reject(FrameError::RootImmutable);
        }
        self.check(id)?;
        self.check(parent)?;
        if id == parent {
            return self.reject(FrameError::SelfParent(id));
        }
        if self.arena.is_ancestor_or_self(id, parent) {
            return self.reject(FrameError::ParentCycle { node: id, parent });
        }

        let old_parent = self.arena.get(id).and_then(|node| node.parent);
        if old_parent == Some(parent) {
            return Ok(());
        }
        if let Some(old) = old_parent {
            self.detach_child(old, id);
        }
        if let Some(node) = self.arena.get_mut(id) {
            node.parent = Some(parent);
        }
        self.attach_child(parent, id);

        for axis in Axis::ALL {
            self.invalidate(id, axis);
        }
        Ok(())
    }

    /// Insert `child` into `parent`'s children at its sorted position.
    fn attach_child(&mut self, parent: NodeId, child: NodeId) {
        let Some(key) = self.arena.get(child).map(LayoutNode::sort_key) else {
            return;
        };
        let Some(siblings) = self.arena.get(parent).map(|node| &node.children) else {
            return;
        };
        let arena = &self.arena;
        let position = siblings.partition_point(|&sibling| {
            arena
                .get(sibling)
                .is_some_and(|node| node.sort_key() <= key)
        });
        if let Some(node) = self.arena.get_mut(parent) {
            node.children.insert(position, child);
        }
    }

    fn detach_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.arena.get_mut(parent) {
            node.children.retain(|&c| c != child);
        }
    }

    fn resort(&mut self, id: NodeId) {
        if let Some(parent) = self.arena.get(id).and_then(|node| node.parent) {
            self.detach_child(parent, id);
            self.attach_child(parent, id);
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|node| node.parent)
    }

    /// Children of `id` in render order, empty for dead nodes.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.arena
            .get(id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    // =========================================================================
    // Names
    // =========================================================================

    pub fn set_name(&mut self, id: NodeId, name: &str) -> Result<()> {
        self.check(id)?;
        if let Some(node) = self.arena.get_mut(id) {
            node.name = name.to_string();
        }
        Ok(())
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.arena.get(id).map(LayoutNode::name)
    }

    /// Dotted path of names from the root, e.g. `Root.panel.button`.
    pub fn name_full(&self, id: NodeId) -> Result<String> {
        self.check(id)?;
        Ok(self.arena.name_full(id))
    }

    /// First direct child of `parent` named `name`.
    pub fn child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        let node = self.arena.get(parent)?;
        node.children
            .iter()
            .copied()
            .find(|&child| self.arena.get(child).is_some_and(|c| c.name == name))
    }

    // =========================================================================
    // Presentation
    // =========================================================================

    /// Minor ordering key among siblings of the same strata.
    pub fn set_layer(&mut self, id: NodeId, layer: i32) -> Result<()> {
        self.check(id)?;
        if let Some(node) = self.arena.get_mut(id) {
            node.layer = layer;
        }
        self.resort(id);
        Ok(())
    }

    /// Major ordering key among siblings.
    pub fn set_strata(&mut self, id: NodeId, strata: i32) -> Result<()> {
        self.check(id)?;
        if let Some(node) = self.arena.get_mut(id) {
            node.strata = strata;
        }
        self.resort(id);
        Ok(())
    }

    /// Hidden nodes are skipped by render and hit-testing but still resolve.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<()> {
        self.check(id)?;
        if let Some(node) = self.arena.get_mut(id) {
            node.flags.set(NodeFlags::VISIBLE, visible);
        }
        Ok(())
    }

    pub fn set_alpha(&mut self, id: NodeId, alpha: f32) -> Result<()> {
        self.check(id)?;
        if let Some(node) = self.arena.get_mut(id) {
            node.alpha = alpha.clamp(0.0, 1.0);
        }
        Ok(())
    }

    pub fn set_input_mode(&mut self, id: NodeId, mode: InputMode) -> Result<()> {
        self.check(id)?;
        if let Some(node) = self.arena.get_mut(id) {
            node.input_mode = mode;
        }
        Ok(())
    }

    pub fn set_background(&mut self, id: NodeId, color: Option<Color>) -> Result<()> {
        self.check(id)?;
        if let Some(node) = self.arena.get_mut(id) {
            node.background = color;
        }
        Ok(())
    }
}
