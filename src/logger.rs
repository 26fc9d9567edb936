//! Logger boundary.
//!
//! Every recoverable problem the engine runs into (dependency cycles,
//! contradictory pins, dropped pins, references to dead nodes) is reported
//! here. Logging is fire-and-forget; nothing crosses this boundary as a panic.
//!
//! - [`TracingLogger`] - default sink, forwards to `tracing`
//! - [`MemoryLogger`] - records messages behind a shared handle

use std::cell::RefCell;
use std::rc::Rc;

/// Two-level diagnostic sink.
pub trait Logger {
    fn log_error(&self, message: &str);
    fn log_debug(&self, message: &str);
}

// =============================================================================
// Tracing sink
// =============================================================================

/// Forwards diagnostics to the `tracing` subscriber installed by the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log_error(&self, message: &str) {
        tracing::error!(target: "spark_frames", "{message}");
    }

    fn log_debug(&self, message: &str) {
        tracing::debug!(target: "spark_frames", "{message}");
    }
}

// =============================================================================
// Memory sink
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Debug,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Records every message in order.
///
/// Cloning shares the underlying buffer, so keep one clone and hand the other
/// to [`Configuration::with_logger`](crate::config::Configuration::with_logger).
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    entries: Rc<RefCell<Vec<LogEntry>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded entries.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().clone()
    }

    /// Messages logged at error level.
    pub fn errors(&self) -> Vec<String> {
        self.messages(LogLevel::Error)
    }

    /// Messages logged at debug level.
    pub fn debugs(&self) -> Vec<String> {
        self.messages(LogLevel::Debug)
    }

    /// Number of error messages containing `needle`.
    pub fn count_errors_containing(&self, needle: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.level == LogLevel::Error && e.message.contains(needle))
            .count()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.clone())
            .collect()
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.entries.borrow_mut().push(LogEntry {
            level,
            message: message.to_string(),
        });
    }
}

impl Logger for MemoryLogger {
    fn log_error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }

    fn log_debug(&self, message: &str) {
        self.push(LogLevel::Debug, message);
    }
}
