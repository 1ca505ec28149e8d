//! Execution context: the error-reporting registry code under test raises into.
//!
//! The context owns an explicit handler stack instead of a process-wide hook.
//! Code under test receives `&mut ExecutionContext` and reports runtime errors
//! through [`ExecutionContext::raise`] (or [`ExecutionContext::trigger`], which
//! records the caller's location). The active handler is the top of the stack;
//! with no handler, or when the handler defers, the runtime's default handling
//! writes to the error log.
//!
//! # Handler Lifecycle
//!
//! ```text
//! let previous = cx.install(handler);   // push, remember what was active
//! ...                                   // raised errors reach `handler`
//! cx.restore(previous);                 // active handler is `previous` again
//! ```
//!
//! Prefer the scoped forms ([`crate::ErrorInterceptor::run`],
//! [`ExecutionContext::suspend_active`]) which restore on every exit path.

use std::ops::{Deref, DerefMut};
use std::panic::Location;
use std::sync::Arc;

use errtrap_core::{CapturedError, Severity, SeverityClassifier, SeverityMask, TrapError};

use crate::config::TrapConfig;
use crate::error_log::ErrorLog;

/// What a handler tells the runtime after processing an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// The handler is authoritative; default handling is skipped.
    Handled,
    /// Run the runtime's default handling as well.
    Default,
}

/// A capture hook.
pub trait ErrorHandler {
    fn handle(
        &self,
        cx: &mut ExecutionContext,
        error: &CapturedError,
    ) -> Result<Disposition, TrapError>;
}

impl<F> ErrorHandler for F
where
    F: Fn(&mut ExecutionContext, &CapturedError) -> Result<Disposition, TrapError>,
{
    fn handle(
        &self,
        cx: &mut ExecutionContext,
        error: &CapturedError,
    ) -> Result<Disposition, TrapError> {
        self(cx, error)
    }
}

/// Shared handle to an installed hook.
pub type Handler = Arc<dyn ErrorHandler>;

/// Token returned by [`ExecutionContext::install`].
///
/// Records the handler that was active before, and the stack depth to return
/// to on restore.
#[derive(Clone)]
pub struct PreviousHandler {
    depth: usize,
    handler: Option<Handler>,
}

impl PreviousHandler {
    /// The handler that was active before the install.
    pub fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Error-reporting state for one thread of test execution.
pub struct ExecutionContext {
    handlers: Vec<Handler>,
    reporting_mask: SeverityMask,
    log_errors: bool,
    classifier: SeverityClassifier,
    error_log: ErrorLog,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::from_config(&TrapConfig::default())
    }
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context from loaded configuration.
    pub fn from_config(config: &TrapConfig) -> Self {
        ExecutionContext {
            handlers: Vec::new(),
            reporting_mask: config.reporting_mask,
            log_errors: config.log_errors,
            classifier: SeverityClassifier::for_generation(config.generation),
            error_log: ErrorLog::default(),
        }
    }

    /// Replace the error log destination.
    #[must_use]
    pub fn with_error_log(mut self, error_log: ErrorLog) -> Self {
        self.error_log = error_log;
        self
    }

    pub fn reporting_mask(&self) -> SeverityMask {
        self.reporting_mask
    }

    pub fn set_reporting_mask(&mut self, mask: SeverityMask) {
        self.reporting_mask = mask;
    }

    pub fn log_errors(&self) -> bool {
        self.log_errors
    }

    pub fn set_log_errors(&mut self, enabled: bool) {
        self.log_errors = enabled;
    }

    pub fn classifier(&self) -> &SeverityClassifier {
        &self.classifier
    }

    pub fn error_log(&self) -> &ErrorLog {
        &self.error_log
    }

    // Handler stack

    /// Make `handler` the active hook, returning what was active before.
    pub fn install(&mut self, handler: Handler) -> PreviousHandler {
        let previous = PreviousHandler {
            depth: self.handlers.len(),
            handler: self.handlers.last().cloned(),
        };
        tracing::trace!(depth = previous.depth, "installing error handler");
        self.handlers.push(handler);
        previous
    }

    /// Reinstate the handler that was active when `previous` was issued.
    ///
    /// Drops anything installed since, including handlers left behind by code
    /// that never restored its own. If the stack was already unwound below the
    /// token's depth, the recorded handler is pushed back so it is active again.
    pub fn restore(&mut self, previous: PreviousHandler) {
        tracing::trace!(depth = previous.depth, "restoring error handler");
        self.handlers.truncate(previous.depth);
        if self.handlers.len() == previous.depth {
            return;
        }
        tracing::warn!(
            depth = self.handlers.len(),
            expected = previous.depth,
            "handler stack unwound below restore point"
        );
        let handler = previous
            .handler
            .filter(|handler| !self.is_active(handler));
        if let Some(handler) = handler {
            self.handlers.push(handler);
        }
    }

    pub fn active_handler(&self) -> Option<&Handler> {
        self.handlers.last()
    }

    /// Whether `handler` is the active hook.
    pub fn is_active(&self, handler: &Handler) -> bool {
        self.active_handler()
            .is_some_and(|active| Arc::ptr_eq(active, handler))
    }

    pub fn handler_depth(&self) -> usize {
        self.handlers.len()
    }

    /// Take the active hook off the stack until the guard drops.
    ///
    /// Errors raised meanwhile reach the handler below it, or the default
    /// handling.
    pub fn suspend(&mut self) -> SuspendedHandler<'_> {
        let handler = self.handlers.pop();
        SuspendedHandler { cx: self, handler }
    }

    /// Run `f` with the active hook suspended.
    pub fn suspend_active<R>(&mut self, f: impl FnOnce(&mut ExecutionContext) -> R) -> R {
        let mut suspended = self.suspend();
        f(&mut *suspended)
    }

    // Raising errors

    /// Report a runtime error at an explicit location.
    pub fn raise(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
        file: impl Into<String>,
        line: u32,
    ) -> Result<Disposition, TrapError> {
        let error = CapturedError::new(severity, message, file, line);
        self.dispatch(&error)
    }

    /// Report a runtime error located at the caller.
    #[track_caller]
    pub fn trigger(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
    ) -> Result<Disposition, TrapError> {
        let error = CapturedError::at(severity, message, Location::caller());
        self.dispatch(&error)
    }

    /// Route `error` to the active hook, then to default handling if needed.
    pub fn dispatch(&mut self, error: &CapturedError) -> Result<Disposition, TrapError> {
        let disposition = match self.active_handler().cloned() {
            Some(handler) => handler.handle(self, error)?,
            None => Disposition::Default,
        };
        if disposition == Disposition::Default {
            self.default_handling(error)?;
        }
        Ok(disposition)
    }

    fn default_handling(&self, error: &CapturedError) -> Result<(), TrapError> {
        if !self.reporting_mask.admits(error.severity) {
            return Ok(());
        }
        tracing::debug!(severity = %error.severity, message = %error.message, "unhandled runtime error");
        if self.log_errors {
            let name = self.classifier.name_of(error.severity)?;
            self.error_log.write(&error.log_line(name));
        }
        Ok(())
    }
}

/// RAII guard that puts a suspended hook back on drop.
///
/// Derefs to the context so the suspended section can keep raising errors.
pub struct SuspendedHandler<'cx> {
    cx: &'cx mut ExecutionContext,
    handler: Option<Handler>,
}

impl Drop for SuspendedHandler<'_> {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            self.cx.handlers.push(handler);
        }
    }
}

impl Deref for SuspendedHandler<'_> {
    type Target = ExecutionContext;

    fn deref(&self) -> &Self::Target {
        self.cx
    }
}

impl DerefMut for SuspendedHandler<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.cx
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
