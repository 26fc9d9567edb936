//! LayoutNode - one element of the tree.
//!
//! A node carries three kinds of state:
//!
//! - **Constraints**: up to one [`Pin`] per point per axis, plus an optional
//!   size override per axis.
//! - **Cache**: resolved start/end per axis, each present or absent. An axis
//!   with an absent point is dirty. Center is never cached.
//! - **Presentation**: visibility, alpha, layer/strata, input mode, background.
//!   Invisible nodes still take part in constraints.
//!
//! Nodes are plain data. All mutation goes through
//! [`Environment`](crate::Environment) so dirty tracking is never bypassed.

use super::arena::NodeId;
use crate::types::{Axis, Color, Edge, Point, Rect};

// =============================================================================
// Kind
// =============================================================================

/// Closed set of node kinds, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    /// Plain rectangle, optionally filled with a background color.
    #[default]
    Frame,
    /// Draws nothing itself, fires a `Render` event during the render walk.
    Raw,
    /// Like a frame, but clips its children to its bounds.
    Mask,
}

impl NodeKind {
    /// Size used on an axis whose constraints leave the size open.
    pub fn default_size(self, axis: Axis, defaults: Point) -> f32 {
        match self {
            NodeKind::Frame | NodeKind::Mask => defaults.get(axis),
            NodeKind::Raw => 0.0,
        }
    }

    /// Whether the render walk draws a background quad for this kind.
    pub fn renders_background(self) -> bool {
        matches!(self, NodeKind::Frame | NodeKind::Mask)
    }

    pub fn clips_children(self) -> bool {
        matches!(self, NodeKind::Mask)
    }
}

// =============================================================================
// Flags
// =============================================================================

bitflags::bitflags! {
    /// Per-node boolean state packed into one byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u8 {
        const NONE = 0;
        const VISIBLE = 1 << 0;
        /// An inverted X result was already reported for this node.
        const CONTRADICTION_X = 1 << 1;
        /// An inverted Y result was already reported for this node.
        const CONTRADICTION_Y = 1 << 2;
    }
}

impl NodeFlags {
    pub(crate) fn contradiction(axis: Axis) -> Self {
        match axis {
            Axis::X => NodeFlags::CONTRADICTION_X,
            Axis::Y => NodeFlags::CONTRADICTION_Y,
        }
    }
}

/// Whether a node takes part in mouse hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputMode {
    #[default]
    None,
    All,
}

// =============================================================================
// Pin
// =============================================================================

/// One constraint on one point of one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pin {
    /// Target node and point. `None` pins to the absolute coordinate `offset`.
    pub target: Option<(NodeId, Edge)>,
    pub offset: f32,
    /// Set order, newer pins win when an axis is over-constrained.
    pub(crate) seq: u64,
}

impl Pin {
    pub fn target_node(&self) -> Option<NodeId> {
        self.target.map(|(node, _)| node)
    }

    pub fn is_absolute(&self) -> bool {
        self.target.is_none()
    }
}

// =============================================================================
// Axis state
// =============================================================================

/// Constraints and cache for one axis of one node.
#[derive(Debug, Clone, Default)]
pub struct AxisState {
    pub(crate) pins: [Option<Pin>; 3],
    pub(crate) size: Option<f32>,
    pub(crate) start: Option<f32>,
    pub(crate) end: Option<f32>,
    /// Nodes holding a pin that targets this node on this axis, one entry
    /// per pin.
    pub(crate) dependents: Vec<NodeId>,
}

impl AxisState {
    pub fn pin(&self, edge: Edge) -> Option<&Pin> {
        self.pins[edge.index()].as_ref()
    }

    pub fn pin_count(&self) -> usize {
        self.pins.iter().flatten().count()
    }

    /// Pins taking part in resolution: the two most recently set, ordered by
    /// point (start before center before end).
    pub fn participating(&self) -> Vec<(Edge, Pin)> {
        let mut pins: Vec<(Edge, Pin)> = Edge::ALL
            .iter()
            .filter_map(|&edge| self.pins[edge.index()].map(|pin| (edge, pin)))
            .collect();

        if pins.len() > 2 {
            pins.sort_by(|a, b| b.1.seq.cmp(&a.1.seq));
            pins.truncate(2);
            pins.sort_by_key(|(edge, _)| edge.index());
        }
        pins
    }

    /// Point whose pin is ignored because three are set, if any.
    pub fn ignored_pin(&self) -> Option<Edge> {
        if self.pin_count() < 3 {
            return None;
        }
        Edge::ALL
            .iter()
            .copied()
            .filter_map(|edge| self.pins[edge.index()].map(|pin| (edge, pin.seq)))
            .min_by_key(|&(_, seq)| seq)
            .map(|(edge, _)| edge)
    }

    pub fn size_override(&self) -> Option<f32> {
        self.size
    }

    pub(crate) fn cached(&self, edge: Edge) -> Option<f32> {
        match edge {
            Edge::Start => self.start,
            Edge::End => self.end,
            Edge::Center => match (self.start, self.end) {
                (Some(start), Some(end)) => Some((start + end) * 0.5),
                _ => None,
            },
        }
    }

    pub(crate) fn store(&mut self, edge: Edge, value: f32) {
        match edge {
            Edge::Start => self.start = Some(value),
            Edge::End => self.end = Some(value),
            Edge::Center => {}
        }
    }

    /// Drop cached values. Returns true if anything was cached.
    pub(crate) fn clear_cache(&mut self) -> bool {
        let had = self.start.is_some() || self.end.is_some();
        self.start = None;
        self.end = None;
        had
    }

    pub fn is_dirty(&self) -> bool {
        self.start.is_none() || self.end.is_none()
    }

    pub(crate) fn remove_dependent(&mut self, node: NodeId) {
        if let Some(pos) = self.dependents.iter().position(|&d| d == node) {
            self.dependents.swap_remove(pos);
        }
    }
}

// =============================================================================
// LayoutNode
// =============================================================================

#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    /// Sorted by (strata, layer, order).
    pub(crate) children: Vec<NodeId>,
    pub(crate) flags: NodeFlags,
    pub(crate) alpha: f32,
    pub(crate) layer: i32,
    pub(crate) strata: i32,
    /// Insertion stamp, breaks ties between equal strata and layer.
    pub(crate) order: u64,
    pub(crate) input_mode: InputMode,
    pub(crate) background: Option<Color>,
    pub(crate) axes: [AxisState; 2],
    /// Bounds last announced through Move/Size events.
    pub(crate) reported: Option<Rect>,
}

impl LayoutNode {
    pub fn new(name: &str, kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            parent,
            children: Vec::new(),
            flags: NodeFlags::VISIBLE,
            alpha: 1.0,
            layer: 0,
            strata: 0,
            order: 0,
            input_mode: InputMode::None,
            background: None,
            axes: [AxisState::default(), AxisState::default()],
            reported: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in render order (back to front).
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(NodeFlags::VISIBLE)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn layer(&self) -> i32 {
        self.layer
    }

    pub fn strata(&self) -> i32 {
        self.strata
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn axis(&self, axis: Axis) -> &AxisState {
        &self.axes[axis.index()]
    }

    pub(crate) fn axis_mut(&mut self, axis: Axis) -> &mut AxisState {
        &mut self.axes[axis.index()]
    }

    pub fn pin(&self, axis: Axis, edge: Edge) -> Option<&Pin> {
        self.axis(axis).pin(edge)
    }

    /// True while any point on either axis awaits resolution.
    pub fn is_dirty(&self) -> bool {
        self.axes.iter().any(AxisState::is_dirty)
    }

    /// Cached bounds, if both axes are resolved.
    pub fn cached_bounds(&self) -> Option<Rect> {
        let x = &self.axes[0];
        let y = &self.axes[1];
        Some(Rect::new(x.start?, y.start?, x.end?, y.end?))
    }

    pub(crate) fn sort_key(&self) -> (i32, i32, u64) {
        (self.strata, self.layer, self.order)
    }
}
