//! Recording renderer.
//!
//! Keeps every committed quad (with the clip that was active) so tests and
//! tools can inspect exactly what a render pass produced.

use std::cell::RefCell;
use std::rc::Rc;

use super::{QUAD_VERTICES, Renderer, Vertex};
use crate::types::{Color, Rect};

/// A quad as committed by the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuad {
    pub rect: Rect,
    pub color: Color,
    pub scissor: Option<Rect>,
}

/// Everything committed between one `begin` and `end`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedFrame {
    pub width: i32,
    pub height: i32,
    pub quads: Vec<RecordedQuad>,
    pub finished: bool,
}

/// Renderer that records instead of drawing.
///
/// Clones share the recorded frames, keep one clone as a handle and give the
/// other to the configuration.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    frames: Rc<RefCell<Vec<RecordedFrame>>>,
    scratch: Vec<Vertex>,
    scissors: Vec<Rect>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<RecordedFrame> {
        self.frames.borrow().clone()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn last_frame(&self) -> Option<RecordedFrame> {
        self.frames.borrow().last().cloned()
    }
}

impl Renderer for RecordingRenderer {
    fn begin(&mut self, width: i32, height: i32) {
        self.scissors.clear();
        self.frames.borrow_mut().push(RecordedFrame {
            width,
            height,
            ..RecordedFrame::default()
        });
    }

    fn request(&mut self, vertices: usize) -> &mut [Vertex] {
        self.scratch.clear();
        self.scratch.resize(vertices, Vertex::default());
        &mut self.scratch
    }

    fn commit(&mut self, count: usize) {
        let count = count.min(self.scratch.len());
        let scissor = self.scissors.last().copied();
        let mut frames = self.frames.borrow_mut();
        let Some(frame) = frames.last_mut() else {
            return;
        };

        for quad in self.scratch[..count].chunks_exact(QUAD_VERTICES) {
            frame.quads.push(RecordedQuad {
                rect: Rect::from_points(quad[0].position, quad[2].position),
                color: quad[0].color,
                scissor,
            });
        }
    }

    fn push_scissor(&mut self, rect: Rect) {
        let clipped = match self.scissors.last() {
            Some(current) => current.intersect(&rect),
            None => rect,
        };
        self.scissors.push(clipped);
    }

    fn pop_scissor(&mut self) {
        self.scissors.pop();
    }

    fn end(&mut self) {
        if let Some(frame) = self.frames.borrow_mut().last_mut() {
            frame.finished = true;
        }
    }
}
