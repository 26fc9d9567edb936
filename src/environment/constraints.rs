//! Constraint mutation and resolved-value readers.
//!
//! Every mutation here invalidates the affected axis of the node and,
//! transitively, every node whose pins read from it. Readers resolve on
//! demand and never wait for a full drain.

use std::collections::HashSet;

use super::Environment;
use crate::engine::{NodeId, Pin};
use crate::error::Result;
use crate::types::{Anchor, Axis, Edge, Rect};

impl Environment {
    // =========================================================================
    // Invalidation
    // =========================================================================

    /// Drop cached values of `id` on `axis` and of everything that depends
    /// on them, queueing each affected node once.
    pub(crate) fn invalidate(&mut self, id: NodeId, axis: Axis) {
        let mut pending = vec![id];
        let mut seen = HashSet::new();

        while let Some(node_id) = pending.pop() {
            if !seen.insert(node_id) {
                continue;
            }
            let Some(node) = self.arena.get_mut(node_id) else {
                continue;
            };
            let state = node.axis_mut(axis);
            state.clear_cache();
            pending.extend(state.dependents.iter().copied());
            self.queue.enqueue(node_id);
        }
    }

    /// Force re-resolution of both axes of a node and its dependents.
    pub fn mark_dirty(&mut self, id: NodeId) -> Result<()> {
        self.check(id)?;
        for axis in Axis::ALL {
            self.invalidate(id, axis);
        }
        Ok(())
    }

    // =========================================================================
    // Pins
    // =========================================================================

    /// Pin `point` of `id` on `axis` to `target_point` of `target`, plus
    /// `offset`. Replaces any pin already on that point.
    pub fn set_pin(
        &mut self,
        id: NodeId,
        axis: Axis,
        point: Edge,
        target: NodeId,
        target_point: Edge,
        offset: f32,
    ) -> Result<()> {
        self.check(id)?;
        self.check(target)?;
        self.store_pin(id, axis, point, Some((target, target_point)), offset);
        Ok(())
    }

    /// Pin `point` of `id` on `axis` to an absolute coordinate.
    pub fn set_pin_absolute(&mut self, id: NodeId, axis: Axis, point: Edge, value: f32) -> Result<()> {
        self.check(id)?;
        self.store_pin(id, axis, point, None, value);
        Ok(())
    }

    fn store_pin(
        &mut self,
        id: NodeId,
        axis: Axis,
        point: Edge,
        target: Option<(NodeId, Edge)>,
        offset: f32,
    ) {
        let ignored_before = self.arena.get(id).and_then(|node| node.axis(axis).ignored_pin());
        self.unlink_pin(id, axis, point);

        let seq = self.next_pin_seq();
        let Some(node) = self.arena.get_mut(id) else {
            return;
        };
        let state = node.axis_mut(axis);
        state.pins[point.index()] = Some(Pin { target, offset, seq });
        // only when a different pin drops out of resolution
        let ignored_after = state.ignored_pin();
        let over_constrained = ignored_after.is_some() && ignored_after != ignored_before;

        if let Some(target_node) = target.and_then(|(target, _)| self.arena.get_mut(target)) {
            target_node.axis_mut(axis).dependents.push(id);
        }

        if over_constrained {
            self.config.logger.log_debug(&format!(
                "{} has three pins on axis {}, the oldest is ignored",
                self.arena.name_full(id),
                axis,
            ));
        }
        self.invalidate(id, axis);
    }

    /// Remove the pin on `point` (if any) and its dependent link.
    fn unlink_pin(&mut self, id: NodeId, axis: Axis, point: Edge) -> bool {
        let Some(node) = self.arena.get_mut(id) else {
            return false;
        };
        let Some(old) = node.axis_mut(axis).pins[point.index()].take() else {
            return false;
        };
        if let Some(target_node) = old.target_node().and_then(|target| self.arena.get_mut(target)) {
            target_node.axis_mut(axis).remove_dependent(id);
        }
        true
    }

    /// Remove a pin. The point then derives from what remains on the axis.
    pub fn clear_pin(&mut self, id: NodeId, axis: Axis, point: Edge) -> Result<()> {
        self.check(id)?;
        if self.unlink_pin(id, axis, point) {
            self.invalidate(id, axis);
        }
        Ok(())
    }

    /// Pin a nine-point anchor on both axes.
    pub fn set_point(
        &mut self,
        id: NodeId,
        anchor: Anchor,
        target: NodeId,
        target_anchor: Anchor,
        offset_x: f32,
        offset_y: f32,
    ) -> Result<()> {
        self.check(id)?;
        self.check(target)?;
        for (axis, offset) in [(Axis::X, offset_x), (Axis::Y, offset_y)] {
            self.store_pin(
                id,
                axis,
                anchor.edge(axis),
                Some((target, target_anchor.edge(axis))),
                offset,
            );
        }
        Ok(())
    }

    /// Make `id` cover `target` exactly.
    pub fn set_all_points(&mut self, id: NodeId, target: NodeId) -> Result<()> {
        self.set_point(id, Anchor::TopLeft, target, Anchor::TopLeft, 0.0, 0.0)?;
        self.set_point(id, Anchor::BottomRight, target, Anchor::BottomRight, 0.0, 0.0)
    }

    /// Remove every pin on one axis.
    pub fn clear_pins(&mut self, id: NodeId, axis: Axis) -> Result<()> {
        self.check(id)?;
        let mut changed = false;
        for point in Edge::ALL {
            changed |= self.unlink_pin(id, axis, point);
        }
        if changed {
            self.invalidate(id, axis);
        }
        Ok(())
    }

    /// Remove every pin on both axes.
    pub fn clear_all_pins(&mut self, id: NodeId) -> Result<()> {
        for axis in Axis::ALL {
            self.clear_pins(id, axis)?;
        }
        Ok(())
    }

    /// Remove pins and the size override on one axis.
    pub fn clear_axis(&mut self, id: NodeId, axis: Axis) -> Result<()> {
        self.clear_pins(id, axis)?;
        self.store_size(id, axis, None);
        Ok(())
    }

    /// Remove all pins and size overrides.
    pub fn clear_constraints(&mut self, id: NodeId) -> Result<()> {
        for axis in Axis::ALL {
            self.clear_axis(id, axis)?;
        }
        Ok(())
    }

    // =========================================================================
    // Sizes
    // =========================================================================

    fn store_size(&mut self, id: NodeId, axis: Axis, size: Option<f32>) {
        let Some(node) = self.arena.get_mut(id) else {
            return;
        };
        let state = node.axis_mut(axis);
        if state.size != size {
            state.size = size;
            self.invalidate(id, axis);
        }
    }

    pub fn set_width(&mut self, id: NodeId, width: f32) -> Result<()> {
        self.check(id)?;
        self.store_size(id, Axis::X, Some(width));
        Ok(())
    }

    pub fn set_height(&mut self, id: NodeId, height: f32) -> Result<()> {
        self.check(id)?;
        self.store_size(id, Axis::Y, Some(height));
        Ok(())
    }

    pub fn set_size(&mut self, id: NodeId, width: f32, height: f32) -> Result<()> {
        self.set_width(id, width)?;
        self.set_height(id, height)
    }

    pub fn clear_width(&mut self, id: NodeId) -> Result<()> {
        self.check(id)?;
        self.store_size(id, Axis::X, None);
        Ok(())
    }

    pub fn clear_height(&mut self, id: NodeId) -> Result<()> {
        self.check(id)?;
        self.store_size(id, Axis::Y, None);
        Ok(())
    }

    /// Resize the root node. Everything pinned to it follows.
    pub fn resize_root(&mut self, width: f32, height: f32) {
        let root = self.root();
        self.store_size(root, Axis::X, Some(width));
        self.store_size(root, Axis::Y, Some(height));
    }

    // =========================================================================
    // Readers
    // =========================================================================

    /// Resolved coordinate of `point` on `axis`, resolving on demand.
    pub fn point(&mut self, id: NodeId, axis: Axis, point: Edge) -> Result<f32> {
        self.check(id)?;
        Ok(self.resolver().point(id, axis, point))
    }

    pub fn left(&mut self, id: NodeId) -> Result<f32> {
        self.point(id, Axis::X, Edge::Start)
    }

    pub fn right(&mut self, id: NodeId) -> Result<f32> {
        self.point(id, Axis::X, Edge::End)
    }

    pub fn top(&mut self, id: NodeId) -> Result<f32> {
        self.point(id, Axis::Y, Edge::Start)
    }

    pub fn bottom(&mut self, id: NodeId) -> Result<f32> {
        self.point(id, Axis::Y, Edge::End)
    }

    pub fn center_x(&mut self, id: NodeId) -> Result<f32> {
        self.point(id, Axis::X, Edge::Center)
    }

    pub fn center_y(&mut self, id: NodeId) -> Result<f32> {
        self.point(id, Axis::Y, Edge::Center)
    }

    /// Resolved width, negative when the pins contradict each other.
    pub fn width(&mut self, id: NodeId) -> Result<f32> {
        Ok(self.right(id)? - self.left(id)?)
    }

    pub fn height(&mut self, id: NodeId) -> Result<f32> {
        Ok(self.bottom(id)? - self.top(id)?)
    }

    pub fn bounds(&mut self, id: NodeId) -> Result<Rect> {
        Ok(Rect::new(
            self.left(id)?,
            self.top(id)?,
            self.right(id)?,
            self.bottom(id)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Configuration;
    use crate::environment::Environment;
    use crate::error::FrameError;
    use crate::logger::MemoryLogger;
    use crate::types::{Anchor, Axis, Edge, Rect};

    fn setup() -> (Environment, MemoryLogger) {
        let logger = MemoryLogger::new();
        let env = Environment::with_config(
            Configuration::new()
                .with_logger(logger.clone())
                .with_root_size(800.0, 600.0),
        );
        (env, logger)
    }

    #[test]
    fn test_left_pin_plus_width() {
        let (mut env, _) = setup();
        let root = env.root();
        let node = env.create_frame(root, "node").unwrap();
        env.set_pin(node, Axis::X, Edge::Start, root, Edge::Start, 25.0).unwrap();
        env.set_width(node, 100.0).unwrap();

        assert_eq!(env.left(node).unwrap(), 25.0);
        assert_eq!(env.right(node).unwrap(), 125.0);
        assert_eq!(env.center_x(node).unwrap(), 75.0);
    }

    #[test]
    fn test_clear_pin_derives_from_remaining() {
        let (mut env, _) = setup();
        let root = env.root();
        let node = env.create_frame(root, "node").unwrap();
        env.set_pin(node, Axis::X, Edge::Start, root, Edge::Start, 10.0).unwrap();
        env.set_pin(node, Axis::X, Edge::End, root, Edge::End, -10.0).unwrap();
        env.set_width(node, 30.0).unwrap();
        assert_eq!(env.width(node).unwrap(), 780.0);

        env.clear_pin(node, Axis::X, Edge::Start).unwrap();
        assert_eq!(env.right(node).unwrap(), 790.0);
        assert_eq!(env.left(node).unwrap(), 760.0);
    }

    #[test]
    fn test_three_pins_newest_two_win() {
        let (mut env, logger) = setup();
        let root = env.root();
        let node = env.create_frame(root, "node").unwrap();
        env.set_pin_absolute(node, Axis::X, Edge::Start, 0.0).unwrap();
        env.set_pin_absolute(node, Axis::X, Edge::End, 100.0).unwrap();
        env.set_pin_absolute(node, Axis::X, Edge::Center, 200.0).unwrap();

        // Start is the oldest and is ignored: center 200, end 100
        assert_eq!(env.left(node).unwrap(), 300.0);
        assert_eq!(env.right(node).unwrap(), 100.0);
        assert_eq!(logger.debugs().len(), 1);

        // Re-setting start makes end the oldest
        env.set_pin_absolute(node, Axis::X, Edge::Start, 180.0).unwrap();
        assert_eq!(env.left(node).unwrap(), 180.0);
        assert_eq!(env.right(node).unwrap(), 220.0);
    }

    #[test]
    fn test_set_point_and_all_points() {
        let (mut env, _) = setup();
        let root = env.root();
        let fill = env.create_frame(root, "fill").unwrap();
        env.set_all_points(fill, root).unwrap();
        assert_eq!(env.bounds(fill).unwrap(), Rect::new(0.0, 0.0, 800.0, 600.0));

        let centered = env.create_frame(root, "centered").unwrap();
        env.set_point(centered, Anchor::Center, root, Anchor::Center, 0.0, 0.0).unwrap();
        env.set_size(centered, 100.0, 50.0).unwrap();
        assert_eq!(env.bounds(centered).unwrap(), Rect::new(350.0, 275.0, 450.0, 325.0));
    }

    #[test]
    fn test_resize_root_propagates() {
        let (mut env, _) = setup();
        let root = env.root();
        let corner = env.create_frame(root, "corner").unwrap();
        env.set_point(corner, Anchor::BottomRight, root, Anchor::BottomRight, 0.0, 0.0).unwrap();
        env.resolve_pending();
        assert_eq!(env.right(corner).unwrap(), 800.0);

        env.resize_root(1024.0, 768.0);
        assert!(env.is_pending(corner));
        assert_eq!(env.bounds(corner).unwrap(), Rect::new(984.0, 728.0, 1024.0, 768.0));
    }

    #[test]
    fn test_clear_constraints_restores_defaults() {
        let (mut env, _) = setup();
        let root = env.root();
        let node = env.create_frame(root, "node").unwrap();
        env.set_point(node, Anchor::TopLeft, root, Anchor::TopLeft, 5.0, 5.0).unwrap();
        env.set_size(node, 10.0, 10.0).unwrap();
        env.clear_constraints(node).unwrap();

        assert_eq!(env.bounds(node).unwrap(), Rect::new(0.0, 0.0, 40.0, 40.0));
        let state = env.node(node).unwrap().axis(Axis::X);
        assert_eq!(state.pin_count(), 0);
        assert_eq!(state.size_override(), None);
    }

    #[test]
    fn test_pin_to_dead_target_rejected() {
        let (mut env, logger) = setup();
        let root = env.root();
        let a = env.create_frame(root, "a").unwrap();
        let b = env.create_frame(root, "b").unwrap();
        env.obliterate(a).unwrap();

        let result = env.set_pin(b, Axis::X, Edge::Start, a, Edge::End, 0.0);
        assert_eq!(result, Err(FrameError::DeadNode(a)));
        assert!(env.node(b).unwrap().pin(Axis::X, Edge::Start).is_none());
        assert_eq!(logger.errors().len(), 1);
    }

    #[test]
    fn test_pin_to_foreign_target_rejected() {
        let (mut env, _) = setup();
        let mut other = Environment::new();
        let foreign = other.create_frame(other.root(), "foreign").unwrap();
        let root = env.root();
        let node = env.create_frame(root, "node").unwrap();

        let result = env.set_pin(node, Axis::Y, Edge::Start, foreign, Edge::Start, 0.0);
        assert_eq!(result, Err(FrameError::ForeignEnvironment(foreign)));
    }

    #[test]
    fn test_replacing_pin_moves_dependent_link() {
        let (mut env, _) = setup();
        let root = env.root();
        let a = env.create_frame(root, "a").unwrap();
        let b = env.create_frame(root, "b").unwrap();
        let c = env.create_frame(root, "c").unwrap();

        env.set_pin(c, Axis::X, Edge::Start, a, Edge::End, 0.0).unwrap();
        env.set_pin(c, Axis::X, Edge::Start, b, Edge::End, 0.0).unwrap();

        assert!(env.node(a).unwrap().axis(Axis::X).dependents.is_empty());
        assert_eq!(env.node(b).unwrap().axis(Axis::X).dependents, vec![c]);
    }

    #[test]
    fn test_contradiction_yields_negative_width() {
        let (mut env, logger) = setup();
        let root = env.root();
        let node = env.create_frame(root, "node").unwrap();
        env.set_pin_absolute(node, Axis::X, Edge::Start, 300.0).unwrap();
        env.set_pin_absolute(node, Axis::X, Edge::End, 100.0).unwrap();

        assert_eq!(env.width(node).unwrap(), -200.0);
        assert_eq!(logger.count_errors_containing("contradiction"), 1);
    }

    #[test]
    fn test_three_pin_notice_only_when_ignored_pin_changes() {
        let (mut env, logger) = setup();
        let root = env.root();
        let node = env.create_frame(root, "node").unwrap();
        let notices = |logger: &MemoryLogger| {
            logger.debugs().iter().filter(|line| line.contains("three pins")).count()
        };

        env.set_pin_absolute(node, Axis::X, Edge::Start, 0.0).unwrap();
        env.set_pin_absolute(node, Axis::X, Edge::Center, 50.0).unwrap();
        assert_eq!(notices(&logger), 0);
        env.set_pin_absolute(node, Axis::X, Edge::End, 100.0).unwrap();
        assert_eq!(notices(&logger), 1);

        // start stays the ignored pin
        for offset in [110.0, 120.0, 130.0] {
            env.set_pin_absolute(node, Axis::X, Edge::End, offset).unwrap();
            env.set_pin_absolute(node, Axis::X, Edge::Center, 60.0).unwrap();
        }
        assert_eq!(notices(&logger), 1);

        // renewing start drops end out instead
        env.set_pin_absolute(node, Axis::X, Edge::Start, 0.0).unwrap();
        assert_eq!(notices(&logger), 2);
        assert_eq!(env.node(node).unwrap().axis(Axis::X).ignored_pin(), Some(Edge::End));
    }
}
