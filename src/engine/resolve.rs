//! Resolution engine.
//!
//! Computes a node's start/end on one axis from its pins, caching every
//! result. Pin targets that are not cached yet are pushed onto an explicit
//! [`DependencyStack`] of `(node, axis, point)` entries and resolved first,
//! so chain length never touches the native call stack. Finding an entry
//! that is already in progress means the pins form a cycle, which is
//! reported once and broken with a fallback of `0.0`.
//!
//! Evaluation of a point, given the participating pins on its axis:
//!
//! ```text
//! own pin participates  -> target point + offset
//! two pins              -> linear interpolation between the two
//! one pin               -> pin + (fraction - pin fraction) * size
//! no pins               -> fraction * size
//! ```
//!
//! `size` is the axis size override, else the kind default. Center is always
//! computed from start and end and never cached.

use std::collections::HashMap;

use super::arena::{Arena, NodeId};
use super::node::{NodeFlags, Pin};
use crate::logger::Logger;
use crate::types::{Axis, Edge, Point};

/// Value substituted for a point that depends on itself.
pub const CYCLE_FALLBACK: f32 = 0.0;

// =============================================================================
// Dependency stack
// =============================================================================

/// One in-progress evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StackEntry {
    pub node: NodeId,
    pub axis: Axis,
    pub point: Edge,
}

/// Evaluations currently in progress, innermost last. Empty outside
/// resolution.
#[derive(Debug, Default)]
pub struct DependencyStack {
    entries: Vec<StackEntry>,
    /// Depth of each entry, for O(1) membership.
    depth: HashMap<StackEntry, usize>,
}

impl DependencyStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: StackEntry) {
        self.depth.insert(entry, self.entries.len());
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<StackEntry> {
        let entry = self.entries.pop()?;
        self.depth.remove(&entry);
        Some(entry)
    }

    pub fn top(&self) -> Option<StackEntry> {
        self.entries.last().copied()
    }

    pub fn position(&self, entry: &StackEntry) -> Option<usize> {
        self.depth.get(entry).copied()
    }

    /// Entries from `start` to the top of the stack.
    pub fn frames_from(&self, start: usize) -> &[StackEntry] {
        &self.entries[start.min(self.entries.len())..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.depth.clear();
    }
}

/// Counters for instrumentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolveStats {
    /// Point evaluations that missed the cache.
    pub evaluations: u64,
    /// Dependency cycles broken.
    pub cycles: u64,
}

// =============================================================================
// Resolver
// =============================================================================

/// Borrowed view of an environment's resolution state for one query.
pub struct Resolver<'a> {
    pub(crate) arena: &'a mut Arena,
    pub(crate) stack: &'a mut DependencyStack,
    pub(crate) logger: &'a dyn Logger,
    pub(crate) defaults: Point,
    pub(crate) stats: &'a mut ResolveStats,
}

impl Resolver<'_> {
    /// Resolved coordinate of a point. Dead nodes read as `0.0`.
    pub fn point(&mut self, node: NodeId, axis: Axis, point: Edge) -> f32 {
        match point {
            Edge::Center => {
                let start = self.edge(node, axis, Edge::Start);
                let end = self.edge(node, axis, Edge::End);
                (start + end) * 0.5
            }
            _ => self.edge(node, axis, point),
        }
    }

    /// Resolve both axes of a node completely.
    pub fn resolve_node(&mut self, node: NodeId) {
        for axis in Axis::ALL {
            self.edge(node, axis, Edge::Start);
            self.edge(node, axis, Edge::End);
        }
    }

    /// Resolve a start or end point, working through uncached pin targets
    /// on the dependency stack until the requested entry is done.
    fn edge(&mut self, node: NodeId, axis: Axis, point: Edge) -> f32 {
        if let Some(value) = self.known(node, axis, point) {
            return value;
        }

        let base = self.stack.len();
        // per frame: dependencies replaced by the cycle fallback
        let mut broken: Vec<Vec<StackEntry>> = Vec::new();
        self.begin(StackEntry { node, axis, point });
        broken.push(Vec::new());

        let mut value = CYCLE_FALLBACK;
        while self.stack.len() > base {
            let Some(top) = self.stack.top() else { break };
            let Some(frame) = broken.last_mut() else { break };

            match self.pending_dependency(top, frame) {
                Some(dependency) => match self.stack.position(&dependency) {
                    Some(start) => {
                        self.report_cycle(start, dependency.axis);
                        frame.push(dependency);
                    }
                    None => {
                        self.begin(dependency);
                        broken.push(Vec::new());
                    }
                },
                None => {
                    value = self.evaluate(top, frame);
                    self.stack.pop();
                    broken.pop();
                    if let Some(layout) = self.arena.get_mut(top.node) {
                        layout.axis_mut(top.axis).store(top.point, value);
                    }
                    self.check_contradiction(top.node, top.axis);
                }
            }
        }
        value
    }

    fn begin(&mut self, entry: StackEntry) {
        self.stats.evaluations += 1;
        self.stack.push(entry);
    }

    /// Cached value of a start/end point. Dead nodes are known to be `0.0`.
    fn known(&self, node: NodeId, axis: Axis, point: Edge) -> Option<f32> {
        match self.arena.get(node) {
            Some(layout) => layout.axis(axis).cached(point),
            None => Some(0.0),
        }
    }

    /// Pins that feed `entry`: its own pin if it participates, else every
    /// participating pin.
    fn feeding_pins(&self, entry: StackEntry) -> Vec<(Edge, Pin)> {
        let Some(layout) = self.arena.get(entry.node) else {
            return Vec::new();
        };
        let pins = layout.axis(entry.axis).participating();
        if let Some(own) = pins.iter().find(|(edge, _)| *edge == entry.point).copied() {
            return vec![own];
        }
        pins
    }

    /// First start/end point `entry` needs that is neither cached nor
    /// already broken by a cycle.
    fn pending_dependency(&self, entry: StackEntry, broken: &[StackEntry]) -> Option<StackEntry> {
        let axis = entry.axis;
        self.feeding_pins(entry)
            .into_iter()
            .filter_map(|(_, pin)| pin.target)
            .flat_map(move |(target, point)| {
                let points = match point {
                    Edge::Center => [Some(Edge::Start), Some(Edge::End)],
                    edge => [Some(edge), None],
                };
                points
                    .into_iter()
                    .flatten()
                    .map(move |point| StackEntry { node: target, axis, point })
            })
            .find(|dep| {
                !broken.contains(dep) && self.known(dep.node, dep.axis, dep.point).is_none()
            })
    }

    /// Compute `entry` once all its dependencies are cached or broken.
    fn evaluate(&self, entry: StackEntry, broken: &[StackEntry]) -> f32 {
        let Some(layout) = self.arena.get(entry.node) else {
            return 0.0;
        };
        let axis = entry.axis;
        let state = layout.axis(axis);
        let pins = state.participating();
        let size = state
            .size_override()
            .unwrap_or_else(|| layout.kind().default_size(axis, self.defaults));
        let fraction = entry.point.fraction();

        if let Some((_, pin)) = pins.iter().find(|(edge, _)| *edge == entry.point) {
            return self.pin_value(*pin, axis, broken);
        }

        match pins.as_slice() {
            [] => fraction * size,
            [(edge, pin)] => self.pin_value(*pin, axis, broken) + (fraction - edge.fraction()) * size,
            [(first_edge, first), (second_edge, second), ..] => {
                let a = self.pin_value(*first, axis, broken);
                let b = self.pin_value(*second, axis, broken);
                let span = second_edge.fraction() - first_edge.fraction();
                a + (fraction - first_edge.fraction()) / span * (b - a)
            }
        }
    }

    fn pin_value(&self, pin: Pin, axis: Axis, broken: &[StackEntry]) -> f32 {
        let Some((target, point)) = pin.target else {
            return pin.offset;
        };
        let read = |point: Edge| {
            let entry = StackEntry { node: target, axis, point };
            if broken.contains(&entry) {
                return CYCLE_FALLBACK;
            }
            self.known(target, axis, point).unwrap_or(CYCLE_FALLBACK)
        };
        let value = match point {
            Edge::Center => (read(Edge::Start) + read(Edge::End)) * 0.5,
            edge => read(edge),
        };
        value + pin.offset
    }

    fn check_contradiction(&mut self, node: NodeId, axis: Axis) {
        let Some(layout) = self.arena.get(node) else {
            return;
        };
        let state = layout.axis(axis);
        let (Some(start), Some(end)) = (state.start, state.end) else {
            return;
        };

        let flag = NodeFlags::contradiction(axis);
        let inverted = end < start;
        let reported = layout.flags.contains(flag);

        if inverted && !reported {
            let message = format!(
                "Layout contradiction on {}, axis {}: {} {} is past {} {}",
                self.arena.name_full(node),
                axis,
                Edge::Start.name(axis),
                start,
                Edge::End.name(axis),
                end,
            );
            self.logger.log_error(&message);
        }
        if inverted != reported {
            if let Some(layout) = self.arena.get_mut(node) {
                layout.flags.set(flag, inverted);
            }
        }
    }

    fn report_cycle(&mut self, start: usize, axis: Axis) {
        self.stats.cycles += 1;

        let mut message = format!("Layout loop dependency detected, axis {axis}:");
        for frame in self.stack.frames_from(start) {
            message.push_str(&format!(
                "\n  {} ({})",
                self.arena.name_full(frame.node),
                frame.point.name(frame.axis),
            ));
        }
        self.logger.log_error(&message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::node::{LayoutNode, NodeKind};
    use crate::logger::MemoryLogger;

    struct Fixture {
        arena: Arena,
        stack: DependencyStack,
        logger: MemoryLogger,
        stats: ResolveStats,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                arena: Arena::new(0),
                stack: DependencyStack::new(),
                logger: MemoryLogger::new(),
                stats: ResolveStats::default(),
            }
        }

        fn add(&mut self, name: &str) -> NodeId {
            self.arena.insert(LayoutNode::new(name, NodeKind::Frame, None))
        }

        fn pin(&mut self, node: NodeId, axis: Axis, edge: Edge, target: Option<(NodeId, Edge)>, offset: f32, seq: u64) {
            let layout = self.arena.get_mut(node).unwrap();
            layout.axis_mut(axis).pins[edge.index()] = Some(Pin { target, offset, seq });
        }

        fn size(&mut self, node: NodeId, axis: Axis, size: f32) {
            self.arena.get_mut(node).unwrap().axis_mut(axis).size = Some(size);
        }

        fn point(&mut self, node: NodeId, axis: Axis, edge: Edge) -> f32 {
            let mut resolver = Resolver {
                arena: &mut self.arena,
                stack: &mut self.stack,
                logger: &self.logger,
                defaults: Point::new(40.0, 40.0),
                stats: &mut self.stats,
            };
            resolver.point(node, axis, edge)
        }
    }

    #[test]
    fn test_unpinned_uses_default_size() {
        let mut fx = Fixture::new();
        let a = fx.add("a");
        assert_eq!(fx.point(a, Axis::X, Edge::Start), 0.0);
        assert_eq!(fx.point(a, Axis::X, Edge::End), 40.0);
        assert_eq!(fx.point(a, Axis::X, Edge::Center), 20.0);
    }

    #[test]
    fn test_single_pin_plus_size() {
        let mut fx = Fixture::new();
        let a = fx.add("a");
        fx.pin(a, Axis::X, Edge::End, None, 100.0, 1);
        fx.size(a, Axis::X, 30.0);

        assert_eq!(fx.point(a, Axis::X, Edge::Start), 70.0);
        assert_eq!(fx.point(a, Axis::X, Edge::Center), 85.0);
    }

    #[test]
    fn test_center_pin_spreads_size() {
        let mut fx = Fixture::new();
        let a = fx.add("a");
        fx.pin(a, Axis::Y, Edge::Center, None, 50.0, 1);
        fx.size(a, Axis::Y, 20.0);

        assert_eq!(fx.point(a, Axis::Y, Edge::Start), 40.0);
        assert_eq!(fx.point(a, Axis::Y, Edge::End), 60.0);
    }

    #[test]
    fn test_two_pins_interpolate_and_ignore_size() {
        let mut fx = Fixture::new();
        let a = fx.add("a");
        fx.pin(a, Axis::X, Edge::Center, None, 50.0, 1);
        fx.pin(a, Axis::X, Edge::End, None, 80.0, 2);
        fx.size(a, Axis::X, 1000.0);

        assert_eq!(fx.point(a, Axis::X, Edge::Start), 20.0);
        assert_eq!(fx.point(a, Axis::X, Edge::End), 80.0);
    }

    #[test]
    fn test_pin_to_other_node() {
        let mut fx = Fixture::new();
        let a = fx.add("a");
        let b = fx.add("b");
        fx.pin(a, Axis::X, Edge::Start, None, 10.0, 1);
        fx.size(a, Axis::X, 100.0);
        fx.pin(b, Axis::X, Edge::Start, Some((a, Edge::End)), 5.0, 2);

        assert_eq!(fx.point(b, Axis::X, Edge::Start), 115.0);
        assert_eq!(fx.point(b, Axis::X, Edge::End), 155.0);
        assert!(fx.stack.is_empty());
    }

    #[test]
    fn test_cached_read_does_not_evaluate() {
        let mut fx = Fixture::new();
        let a = fx.add("a");
        fx.point(a, Axis::X, Edge::Start);
        let evaluations = fx.stats.evaluations;

        fx.point(a, Axis::X, Edge::Start);
        assert_eq!(fx.stats.evaluations, evaluations);
    }

    #[test]
    fn test_cycle_reports_once_with_both_names() {
        let mut fx = Fixture::new();
        let a = fx.add("alpha");
        let b = fx.add("beta");
        fx.pin(a, Axis::X, Edge::Start, Some((b, Edge::Start)), 0.0, 1);
        fx.pin(b, Axis::X, Edge::Start, Some((a, Edge::Start)), 0.0, 2);

        let left_a = fx.point(a, Axis::X, Edge::Start);
        let left_b = fx.point(b, Axis::X, Edge::Start);

        assert!(left_a.is_finite());
        assert!(left_b.is_finite());
        assert_eq!(fx.stats.cycles, 1);

        let errors = fx.logger.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Layout loop dependency detected, axis X:"));
        assert!(errors[0].contains("alpha (LEFT)"));
        assert!(errors[0].contains("beta (LEFT)"));
        assert!(fx.stack.is_empty());
    }

    #[test]
    fn test_contradiction_logged_once() {
        let mut fx = Fixture::new();
        let a = fx.add("a");
        fx.pin(a, Axis::X, Edge::Start, None, 100.0, 1);
        fx.pin(a, Axis::X, Edge::End, None, 20.0, 2);

        assert_eq!(fx.point(a, Axis::X, Edge::Start), 100.0);
        assert_eq!(fx.point(a, Axis::X, Edge::End), 20.0);
        assert_eq!(fx.logger.count_errors_containing("contradiction"), 1);

        fx.arena.get_mut(a).unwrap().axis_mut(Axis::X).clear_cache();
        fx.point(a, Axis::X, Edge::End);
        assert_eq!(fx.logger.count_errors_containing("contradiction"), 1);
    }

    #[test]
    fn test_dead_node_reads_zero() {
        let mut fx = Fixture::new();
        let a = fx.add("a");
        fx.arena.remove(a);
        assert_eq!(fx.point(a, Axis::X, Edge::End), 0.0);
    }

    fn chain(fx: &mut Fixture, len: usize) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = Vec::with_capacity(len);
        for i in 0..len {
            let node = fx.add(&format!("n{i}"));
            if let Some(&prev) = nodes.last() {
                fx.pin(node, Axis::X, Edge::Start, Some((prev, Edge::End)), 0.0, i as u64);
            }
            fx.size(node, Axis::X, 1.0);
            nodes.push(node);
        }
        nodes
    }

    #[test]
    fn test_long_chain_resolves_without_recursion() {
        let mut fx = Fixture::new();
        let nodes = chain(&mut fx, 10_000);

        assert_eq!(fx.point(nodes[9_999], Axis::X, Edge::Start), 9_999.0);
        assert_eq!(fx.point(nodes[5_000], Axis::X, Edge::End), 5_001.0);
        assert!(fx.stack.is_empty());
        assert!(fx.logger.errors().is_empty());
    }

    #[test]
    fn test_long_loop_reported_once() {
        let mut fx = Fixture::new();
        let nodes = chain(&mut fx, 10_000);
        fx.pin(nodes[0], Axis::X, Edge::Start, Some((nodes[9_999], Edge::End)), 0.0, 10_000);

        let left = fx.point(nodes[9_999], Axis::X, Edge::Start);

        assert!(left.is_finite());
        assert_eq!(fx.stats.cycles, 1);
        assert_eq!(fx.logger.count_errors_containing("Layout loop dependency detected"), 1);
        assert!(fx.stack.is_empty());
    }

    #[test]
    fn test_dependency_stack_tracks_depth() {
        let mut stack = DependencyStack::new();
        let mut arena = Arena::new(0);
        let a = arena.insert(LayoutNode::new("a", NodeKind::Frame, None));
        let start = StackEntry { node: a, axis: Axis::X, point: Edge::Start };
        let end = StackEntry { node: a, axis: Axis::X, point: Edge::End };

        stack.push(start);
        stack.push(end);
        assert_eq!(stack.position(&start), Some(0));
        assert_eq!(stack.position(&end), Some(1));
        assert_eq!(stack.frames_from(1), &[end]);

        assert_eq!(stack.pop(), Some(end));
        assert_eq!(stack.position(&end), None);
        assert_eq!(stack.top(), Some(start));

        stack.clear();
        assert!(stack.is_empty());
        assert_eq!(stack.position(&start), None);
    }
}
