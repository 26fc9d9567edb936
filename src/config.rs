//! Environment configuration.
//!
//! Everything pluggable about an [`Environment`](crate::Environment) lives
//! here: the logger sink, the renderer backend, and the sizing defaults used
//! when a node's constraints do not determine its size.

use crate::logger::{Logger, TracingLogger};
use crate::renderer::{NullRenderer, Renderer};
use crate::types::Point;

/// Size used on an axis with fewer than two pins and no size override.
pub const DEFAULT_NODE_SIZE: f32 = 40.0;

/// Upper bound on drain/event rounds in a single resolve, guards against
/// handlers that resize nodes forever.
pub const DEFAULT_MAX_EVENT_PASSES: usize = 64;

pub struct Configuration {
    pub(crate) logger: Box<dyn Logger>,
    pub(crate) renderer: Box<dyn Renderer>,
    pub(crate) default_size: Point,
    pub(crate) root_size: Point,
    pub(crate) max_event_passes: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            logger: Box::new(TracingLogger),
            renderer: Box::new(NullRenderer::new()),
            default_size: Point::new(DEFAULT_NODE_SIZE, DEFAULT_NODE_SIZE),
            root_size: Point::ZERO,
            max_event_passes: DEFAULT_MAX_EVENT_PASSES,
        }
    }
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the logger sink.
    pub fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Box::new(logger);
        self
    }

    /// Replace the renderer backend.
    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Default width/height for nodes whose constraints leave size open.
    pub fn with_default_size(mut self, width: f32, height: f32) -> Self {
        self.default_size = Point::new(width, height);
        self
    }

    /// Initial root size. Change later with `Environment::resize_root`.
    pub fn with_root_size(mut self, width: f32, height: f32) -> Self {
        self.root_size = Point::new(width, height);
        self
    }

    pub fn with_max_event_passes(mut self, passes: usize) -> Self {
        self.max_event_passes = passes.max(1);
        self
    }

    pub fn default_size(&self) -> Point {
        self.default_size
    }
}
