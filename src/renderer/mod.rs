//! Renderer boundary.
//!
//! The environment walks the resolved tree once per render pass and feeds a
//! [`Renderer`] through a fixed sequence:
//!
//! ```text
//! begin(width, height)
//!   request(n) -> write vertices -> commit(count)   (per element)
//!   push_scissor(rect) ... pop_scissor()            (per mask)
//! end()
//! ```
//!
//! Backends own GPU resources and batching. The core only supplies resolved
//! rectangles, colors and texture coordinates.
//!
//! - [`NullRenderer`] - discards everything (the default)
//! - [`RecordingRenderer`] - keeps every committed quad for inspection

mod recording;

pub use recording::{RecordedFrame, RecordedQuad, RecordingRenderer};

use crate::types::{Color, Point, Rect};

/// Number of vertices a quad occupies in a request.
pub const QUAD_VERTICES: usize = 4;

/// One vertex of a quad: screen position, texture coordinate, color.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub position: Point,
    pub tex: Point,
    pub color: Color,
}

/// A vertex-stream backend.
pub trait Renderer {
    /// Start a pass over a `width` x `height` surface.
    fn begin(&mut self, width: i32, height: i32);

    /// Borrow space for `vertices` vertices. Must be followed by `commit`.
    fn request(&mut self, vertices: usize) -> &mut [Vertex];

    /// Hand back the last request, `count` vertices of it were written.
    fn commit(&mut self, count: usize);

    /// Clip subsequent geometry to `rect` (intersected with the current clip).
    fn push_scissor(&mut self, rect: Rect);

    fn pop_scissor(&mut self);

    /// Finish the pass.
    fn end(&mut self);
}

// =============================================================================
// Quad helpers
// =============================================================================

/// Write a solid quad for `screen` cropped to `bounds`.
///
/// Returns false (and writes nothing) if the cropped quad is empty.
pub fn write_cropped_rect(vertices: &mut [Vertex], screen: Rect, color: Color, bounds: Rect) -> bool {
    write_cropped_tex_rect(vertices, screen, Rect::default(), color, bounds)
}

/// Write a textured quad for `screen` cropped to `bounds`.
///
/// Texture coordinates are interpolated so the visible part of the texture
/// stays where it was before cropping.
pub fn write_cropped_tex_rect(
    vertices: &mut [Vertex],
    screen: Rect,
    tex: Rect,
    color: Color,
    bounds: Rect,
) -> bool {
    if vertices.len() < QUAD_VERTICES {
        return false;
    }

    let cropped = screen.intersect(&bounds);
    if cropped.is_empty() {
        return false;
    }

    let lerp = |value: f32, from_start: f32, from_end: f32, to_start: f32, to_end: f32| {
        let span = from_end - from_start;
        if span == 0.0 {
            to_start
        } else {
            to_start + (value - from_start) / span * (to_end - to_start)
        }
    };

    let tex_start = Point::new(
        lerp(cropped.left(), screen.left(), screen.right(), tex.left(), tex.right()),
        lerp(cropped.top(), screen.top(), screen.bottom(), tex.top(), tex.bottom()),
    );
    let tex_end = Point::new(
        lerp(cropped.right(), screen.left(), screen.right(), tex.left(), tex.right()),
        lerp(cropped.bottom(), screen.top(), screen.bottom(), tex.top(), tex.bottom()),
    );

    let corners = [
        (Point::new(cropped.left(), cropped.top()), Point::new(tex_start.x, tex_start.y)),
        (Point::new(cropped.right(), cropped.top()), Point::new(tex_end.x, tex_start.y)),
        (Point::new(cropped.right(), cropped.bottom()), Point::new(tex_end.x, tex_end.y)),
        (Point::new(cropped.left(), cropped.bottom()), Point::new(tex_start.x, tex_end.y)),
    ];

    for (vertex, (position, tex)) in vertices.iter_mut().zip(corners) {
        *vertex = Vertex { position, tex, color };
    }
    true
}

// =============================================================================
// Null renderer
// =============================================================================

/// Accepts the full call sequence and draws nothing.
#[derive(Debug, Default)]
pub struct NullRenderer {
    scratch: Vec<Vertex>,
    scissor_depth: usize,
}

impl NullRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for NullRenderer {
    fn begin(&mut self, _width: i32, _height: i32) {
        self.scissor_depth = 0;
    }

    fn request(&mut self, vertices: usize) -> &mut [Vertex] {
        self.scratch.clear();
        self.scratch.resize(vertices, Vertex::default());
        &mut self.scratch
    }

    fn commit(&mut self, _count: usize) {}

    fn push_scissor(&mut self, _rect: Rect) {
        self.scissor_depth += 1;
    }

    fn pop_scissor(&mut self) {
        self.scissor_depth = self.scissor_depth.saturating_sub(1);
    }

    fn end(&mut self) {}
}
