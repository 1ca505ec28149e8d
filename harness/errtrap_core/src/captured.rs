//! The error record produced each time the capture hook fires.

use std::fmt;
use std::panic::Location;

use crate::Severity;

/// One fired runtime error.
///
/// Ephemeral: created by the hook (or by the fatal-failure mapping) and
/// consumed by a single reconciliation step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedError {
    pub severity: Severity,
    pub message: String,
    pub file: String,
    pub line: u32,
}

impl CapturedError {
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        file: impl Into<String>,
        line: u32,
    ) -> Self {
        CapturedError {
            severity,
            message: message.into(),
            file: file.into(),
            line,
        }
    }

    /// Build a record located at a source location.
    pub fn at(severity: Severity, message: impl Into<String>, location: &Location<'_>) -> Self {
        Self::new(severity, message, location.file(), location.line())
    }

    /// The error-log line: `"<NAME>: <message> in <file> on line <line>"`.
    pub fn log_line(&self, severity_name: &str) -> String {
        format!(
            "{severity_name}: {} in {} on line {}",
            self.message, self.file, self.line
        )
    }
}

impl fmt::Display for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} in {} on line {}",
            self.severity, self.message, self.file, self.line
        )
    }
}
