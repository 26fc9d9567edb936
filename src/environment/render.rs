//! Render walk, hit-testing and layout dumps.
//!
//! All three read only resolved bounds, so each drains the invalidation
//! queue first.

use super::Environment;
use crate::engine::{InputMode, LayoutNode, NodeId};
use crate::error::Result;
use crate::renderer::{QUAD_VERTICES, write_cropped_rect};
use crate::state::events::Event;
use crate::types::{Axis, Color, Edge, Point, Rect};

/// One step of a flattened render walk.
#[derive(Debug, Clone, PartialEq)]
enum RenderOp {
    Quad { rect: Rect, color: Color, clip: Rect },
    PushScissor(Rect),
    PopScissor,
    Raw(NodeId),
}

/// Pending step of the render walk.
enum Walk {
    Enter { id: NodeId, clip: Rect, alpha: f32 },
    Leave,
}

/// Pending step of a hit test.
enum HitStep {
    Enter { id: NodeId, clip: Rect },
    Accept { id: NodeId, clip: Rect, bounds: Rect },
}

/// Clip used when a walk has no enclosing mask.
const UNBOUNDED: Rect = Rect::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::INFINITY, f32::INFINITY);

impl Environment {
    // =========================================================================
    // Render
    // =========================================================================

    /// Drain, then feed the subtree at `root` (default: the environment
    /// root) to the renderer, back to front.
    ///
    /// Quads are cropped to the root bounds and to every enclosing mask.
    /// `Raw` nodes receive a `Render` event at their place in the order.
    pub fn render(&mut self, root: Option<NodeId>) -> Result<()> {
        let start = root.unwrap_or(self.root());
        self.check(start)?;

        let _span = tracing::debug_span!("render", env = self.id()).entered();
        self.resolve_pending();
        // a Move/Size handler may have destroyed it
        self.check(start)?;

        let screen = self
            .arena
            .get(self.root())
            .and_then(LayoutNode::cached_bounds)
            .unwrap_or_default();

        let mut ops = Vec::new();
        self.collect_render_ops(start, screen, &mut ops);

        self.config
            .renderer
            .begin(screen.width() as i32, screen.height() as i32);
        for op in ops {
            match op {
                RenderOp::Quad { rect, color, clip } => {
                    let renderer = self.config.renderer.as_mut();
                    let vertices = renderer.request(QUAD_VERTICES);
                    let count = if write_cropped_rect(vertices, rect, color, clip) {
                        QUAD_VERTICES
                    } else {
                        0
                    };
                    renderer.commit(count);
                }
                RenderOp::PushScissor(rect) => self.config.renderer.push_scissor(rect),
                RenderOp::PopScissor => self.config.renderer.pop_scissor(),
                RenderOp::Raw(id) => {
                    if self.contains(id) {
                        self.trigger(id, &Event::Render);
                    }
                }
            }
        }
        self.config.renderer.end();
        Ok(())
    }

    fn collect_render_ops(&self, start: NodeId, clip: Rect, ops: &mut Vec<RenderOp>) {
        let mut work = vec![Walk::Enter { id: start, clip, alpha: 1.0 }];

        while let Some(step) = work.pop() {
            let (id, clip, alpha) = match step {
                Walk::Enter { id, clip, alpha } => (id, clip, alpha),
                Walk::Leave => {
                    ops.push(RenderOp::PopScissor);
                    continue;
                }
            };
            let Some(node) = self.arena.get(id) else { continue };
            if !node.is_visible() {
                continue;
            }
            let Some(bounds) = node.cached_bounds() else { continue };
            let alpha = alpha * node.alpha();

            if node.kind().renders_background() {
                if let Some(color) = node.background() {
                    let color = color.fade(alpha);
                    if !color.is_transparent() {
                        ops.push(RenderOp::Quad { rect: bounds, color, clip });
                    }
                }
            } else {
                ops.push(RenderOp::Raw(id));
            }

            let clips = node.kind().clips_children();
            let child_clip = if clips { clip.intersect(&bounds) } else { clip };
            if clips {
                ops.push(RenderOp::PushScissor(bounds));
                work.push(Walk::Leave);
            }
            // reversed so the first child is walked first
            for &child in node.children().iter().rev() {
                work.push(Walk::Enter { id: child, clip: child_clip, alpha });
            }
        }
    }

    // =========================================================================
    // Hit testing
    // =========================================================================

    /// Deepest visible, input-enabled node containing the point.
    ///
    /// Later siblings (front of the render order) win on overlap. Masks hide
    /// the parts of their children outside their bounds.
    pub fn node_under(&mut self, x: f32, y: f32) -> Option<NodeId> {
        self.resolve_pending();
        self.hit_test(self.root(), Point::new(x, y))
    }

    fn hit_test(&self, start: NodeId, point: Point) -> Option<NodeId> {
        let mut work = vec![HitStep::Enter { id: start, clip: UNBOUNDED }];

        while let Some(step) = work.pop() {
            match step {
                HitStep::Enter { id, clip } => {
                    let Some(node) = self.arena.get(id) else { continue };
                    if !node.is_visible() {
                        continue;
                    }
                    let Some(bounds) = node.cached_bounds() else { continue };

                    // the node itself is tried after all of its children
                    work.push(HitStep::Accept { id, clip, bounds });
                    let child_clip = if node.kind().clips_children() {
                        clip.intersect(&bounds)
                    } else {
                        clip
                    };
                    if child_clip.contains(point) {
                        // last child on top of the stack, front-most first
                        for &child in node.children() {
                            work.push(HitStep::Enter { id: child, clip: child_clip });
                        }
                    }
                }
                HitStep::Accept { id, clip, bounds } => {
                    let accepts = self
                        .arena
                        .get(id)
                        .is_some_and(|node| node.input_mode() == InputMode::All);
                    if accepts && clip.contains(point) && bounds.contains(point) {
                        return Some(id);
                    }
                }
            }
        }
        None
    }

    /// Whether `id` would receive a mouse event at this point.
    pub fn probe_as_mouse(&mut self, id: NodeId, x: f32, y: f32) -> bool {
        self.contains(id) && self.node_under(x, y) == Some(id)
    }

    // =========================================================================
    // Debugging
    // =========================================================================

    /// Describe a node's pins, sizes and resolved bounds. The text is also
    /// logged at debug level.
    pub fn debug_layout_dump(&mut self, id: NodeId) -> Result<String> {
        self.check(id)?;
        let bounds = self.bounds(id)?;

        let kind = self.arena.get(id).map(LayoutNode::kind).unwrap_or_default();
        let mut out = format!("{} ({kind:?})", self.arena.name_full(id));
        for axis in Axis::ALL {
            let Some(node) = self.arena.get(id) else { break };
            let state = node.axis(axis);
            for point in Edge::ALL {
                let Some(pin) = state.pin(point) else { continue };
                let target = match pin.target {
                    Some((target, target_point)) => format!(
                        "{} {}",
                        self.arena.name_full(target),
                        target_point.name(axis)
                    ),
                    None => "absolute".to_string(),
                };
                out.push_str(&format!(
                    "\n  {} -> {} {:+}",
                    point.name(axis),
                    target,
                    pin.offset
                ));
            }
            if let Some(size) = state.size_override() {
                out.push_str(&format!("\n  size {axis} = {size}"));
            }
        }
        out.push_str(&format!(
            "\n  bounds ({}, {}) - ({}, {})",
            bounds.left(),
            bounds.top(),
            bounds.right(),
            bounds.bottom()
        ));

        self.config.logger.log_debug(&out);
        Ok(out)
    }
}
