//! Sink for the runtime's error log.
//!
//! When error logging is enabled, every genuine captured error produces one
//! line of the form `"<SEVERITY_NAME>: <message> in <file> on line <line>"`.
//! The line can go to:
//! - Tracing: a `warn` event on the `errtrap::error_log` target (default)
//! - Buffer: kept in memory for assertions
//! - Silent: discarded
//!
//! Enum dispatch keeps the hook free of trait-object indirection.

use parking_lot::Mutex;

/// Error log that keeps lines in memory.
#[derive(Debug, Default)]
pub struct BufferErrorLog {
    lines: Mutex<Vec<String>>,
}

impl BufferErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

/// Error log destination.
#[derive(Debug, Default)]
pub enum ErrorLog {
    /// Emits a tracing event per line.
    #[default]
    Tracing,
    /// Captures lines in memory.
    Buffer(BufferErrorLog),
    /// Drops every line.
    Silent,
}

impl ErrorLog {
    /// A fresh in-memory log.
    pub fn buffer() -> Self {
        ErrorLog::Buffer(BufferErrorLog::new())
    }

    pub fn write(&self, line: &str) {
        match self {
            Self::Tracing => tracing::warn!(target: "errtrap::error_log", "{line}"),
            Self::Buffer(log) => log.write(line),
            Self::Silent => {}
        }
    }

    /// Captured lines. Empty unless this is a buffer.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Buffer(log) => log.lines(),
            Self::Tracing | Self::Silent => Vec::new(),
        }
    }

    pub fn clear(&self) {
        if let Self::Buffer(log) = self {
            log.clear();
        }
    }
}

#[cfg(test)]
mod tests;
