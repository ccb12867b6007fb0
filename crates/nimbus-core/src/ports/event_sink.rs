//! Event sink port (driven/secondary port)
//!
//! Components that report per-event lines (the change logger) hold an
//! [`EventSink`] instead of writing to a process-wide logger directly. The
//! binary wires in [`TracingSink`]; tests use [`MemorySink`].

use std::sync::Mutex;

use tracing::info;

/// Receives one formatted line per reported event
pub trait EventSink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Sink that logs each line at INFO level through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, line: &str) {
        info!("{}", line);
    }
}

/// Sink that keeps every line in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the lines emitted so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}
