//! The test-context capability that receives every report.
//!
//! The surrounding framework implements [`TestContext`] on whatever owns a
//! running test's assertion bookkeeping. [`RecordingContext`] is a complete
//! implementation that keeps every call, used by embedders without their own
//! bookkeeping and by the engine's tests.

use parking_lot::Mutex;

use crate::matcher::{Matcher, Observed};
use crate::template::render;

/// Reporting capability of the currently executing test.
///
/// Both methods are fire-and-forget. Message arguments are percent templates
/// (literal `%` doubled); render them with [`crate::template::render`].
pub trait TestContext: Send + Sync {
    /// Report an error no expectation accounted for.
    fn error(&self, severity: &str, message: &str, file: &str, line: u32);

    /// Evaluate `matcher` against `observed` and record a pass or failure.
    ///
    /// `template` has one `%s` slot for the matcher's overlay. Returns whether
    /// the assertion passed.
    fn assert(&self, matcher: &dyn Matcher, observed: Observed<'_>, template: &str) -> bool;
}

/// One call received by a [`RecordingContext`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedCall {
    /// `error(...)`, with the raw (escaped) arguments.
    Error {
        severity: String,
        message: String,
        file: String,
        line: u32,
    },
    /// `assert(...)`, with the outcome and rendered text.
    Assert {
        observed: Option<String>,
        template: String,
        passed: bool,
        text: String,
    },
}

impl RecordedCall {
    pub fn is_error(&self) -> bool {
        matches!(self, RecordedCall::Error { .. })
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, RecordedCall::Assert { passed: true, .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RecordedCall::Assert { passed: false, .. })
    }

    /// Display text of this call, fully rendered.
    pub fn text(&self) -> String {
        match self {
            RecordedCall::Error {
                severity,
                message,
                file,
                line,
            } => format!(
                "Unexpected error [{}] severity [{severity}] in [{file}] line [{line}]",
                render(message, &[])
            ),
            RecordedCall::Assert { text, .. } => text.clone(),
        }
    }
}

/// Test context that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingContext {
    name: String,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingContext {
    pub fn new(name: impl Into<String>) -> Self {
        RecordingContext {
            name: name.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn error_count(&self) -> usize {
        self.calls.lock().iter().filter(|c| c.is_error()).count()
    }

    pub fn pass_count(&self) -> usize {
        self.calls.lock().iter().filter(|c| c.is_pass()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.calls.lock().iter().filter(|c| c.is_failure()).count()
    }

    /// Whether nothing but passes was recorded.
    pub fn is_clean(&self) -> bool {
        self.calls.lock().iter().all(RecordedCall::is_pass)
    }

    /// Rendered text of every call, in order.
    pub fn transcript(&self) -> Vec<String> {
        self.calls.lock().iter().map(RecordedCall::text).collect()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl TestContext for RecordingContext {
    fn error(&self, severity: &str, message: &str, file: &str, line: u32) {
        self.calls.lock().push(RecordedCall::Error {
            severity: severity.to_string(),
            message: message.to_string(),
            file: file.to_string(),
            line,
        });
    }

    fn assert(&self, matcher: &dyn Matcher, observed: Observed<'_>, template: &str) -> bool {
        let passed = matcher.matches(observed);
        let overlay = matcher.overlay(observed);
        self.calls.lock().push(RecordedCall::Assert {
            observed: observed.message().map(str::to_string),
            template: template.to_string(),
            passed,
            // The overlay quotes escaped messages; unescape it before filling the slot.
            text: render(template, &[&render(&overlay, &[])]),
        });
        passed
    }
}

#[cfg(test)]
mod tests;
