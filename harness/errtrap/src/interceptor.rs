//! Error interception for the duration of one invocation.
//!
//! [`ErrorInterceptor`] installs a [`TrapHandler`] on the execution context,
//! runs an action, and restores whatever handler was active before. Restoration
//! is owned by the [`HookGuard`], so it happens on normal return, on `?` early
//! return, and during unwinding.
//!
//! # Hook Pipeline
//!
//! Each fired error passes through, in order:
//! 1. the reporting mask (outside the mask: dropped)
//! 2. the noise filter (noise: dropped)
//! 3. the error log, when logging is enabled
//! 4. [`ErrorQueue::prepare`](crate::ErrorQueue::prepare) under the queue
//!    lock, then the report to the test once the lock is released
//!
//! Steps 2 to 4 run with the hook suspended. The hook always answers
//! [`Disposition::Handled`], so default handling never runs for an error it saw.
//!
//! # Usage
//!
//! ```text
//! let interceptor = ErrorInterceptor::new(queue);
//! interceptor.run(cx, |cx| {
//!     cx.trigger(Severity::UserNotice, "captured")?;
//!     Ok(())
//! })  // previous handler active again here, even on panic
//! ```

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use errtrap_core::{CapturedError, NoiseFilter, TrapError};

use crate::queue::{Reconciliation, SharedQueue};
use crate::runtime::{Disposition, ErrorHandler, ExecutionContext, Handler, PreviousHandler};

/// The capture hook.
#[derive(Debug)]
pub struct TrapHandler {
    queue: SharedQueue,
    noise: NoiseFilter,
}

impl TrapHandler {
    pub fn new(queue: SharedQueue, noise: NoiseFilter) -> Self {
        TrapHandler { queue, noise }
    }

    pub fn queue(&self) -> &SharedQueue {
        &self.queue
    }

    pub fn noise(&self) -> &NoiseFilter {
        &self.noise
    }

    /// Log and reconcile a genuine error (hook steps 3 and 4).
    ///
    /// Severities are named by the context's classifier. The queue is held
    /// only while the expectation is taken; a queue already locked by the
    /// running test fails with [`TrapError::QueueBusy`].
    fn record(
        &self,
        cx: &ExecutionContext,
        error: &CapturedError,
    ) -> Result<Reconciliation, TrapError> {
        let name = cx.classifier().name_of(error.severity)?;
        if cx.log_errors() {
            cx.error_log().write(&error.log_line(name));
        }
        let pending = self
            .queue
            .try_lock()
            .ok_or(TrapError::QueueBusy)?
            .prepare(name, &error.message, &error.file, error.line)?;
        Ok(pending.deliver())
    }
}

impl ErrorHandler for TrapHandler {
    fn handle(
        &self,
        cx: &mut ExecutionContext,
        error: &CapturedError,
    ) -> Result<Disposition, TrapError> {
        if !cx.reporting_mask().admits(error.severity) {
            tracing::trace!(severity = %error.severity, "outside reporting mask");
            return Ok(Disposition::Handled);
        }

        cx.suspend_active(|cx| -> Result<(), TrapError> {
            if let Some(rule) = self.noise.classify(&error.message) {
                tracing::trace!(rule = rule.label(), "dropped as noise");
                return Ok(());
            }
            self.record(cx, error)?;
            Ok(())
        })?;
        Ok(Disposition::Handled)
    }
}

/// Scoped installer for a [`TrapHandler`].
#[derive(Clone, Debug)]
pub struct ErrorInterceptor {
    hook: Arc<TrapHandler>,
}

impl ErrorInterceptor {
    /// Interceptor feeding `queue`, with the default noise rules.
    pub fn new(queue: SharedQueue) -> Self {
        Self::with_noise_filter(queue, NoiseFilter::default())
    }

    pub fn with_noise_filter(queue: SharedQueue, noise: NoiseFilter) -> Self {
        ErrorInterceptor {
            hook: Arc::new(TrapHandler::new(queue, noise)),
        }
    }

    pub fn queue(&self) -> &SharedQueue {
        self.hook.queue()
    }

    /// The hook as installed on a context.
    pub fn handler(&self) -> Handler {
        self.hook.clone()
    }

    /// Install the hook until the returned guard drops.
    ///
    /// Access the context through the guard; it implements `Deref` and
    /// `DerefMut`.
    pub fn install<'cx>(&self, cx: &'cx mut ExecutionContext) -> HookGuard<'cx> {
        let previous = cx.install(self.handler());
        HookGuard {
            cx,
            previous: Some(previous),
        }
    }

    /// Run `action` with the hook installed.
    ///
    /// The previous handler is active again once this returns or unwinds.
    pub fn run<R>(
        &self,
        cx: &mut ExecutionContext,
        action: impl FnOnce(&mut ExecutionContext) -> R,
    ) -> R {
        let mut guard = self.install(cx);
        action(&mut *guard)
    }

    /// Feed an error that bypassed the hook into the same reporting path.
    ///
    /// Skips the mask and noise checks; a funneled error is always genuine.
    pub fn funnel(
        &self,
        cx: &ExecutionContext,
        error: &CapturedError,
    ) -> Result<Reconciliation, TrapError> {
        tracing::debug!(severity = %error.severity, message = %error.message, "funneling failure");
        self.hook.record(cx, error)
    }
}

/// RAII guard restoring the handler that was active before an install.
///
/// Restores on drop, including during unwinding.
pub struct HookGuard<'cx> {
    cx: &'cx mut ExecutionContext,
    previous: Option<PreviousHandler>,
}

impl Drop for HookGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.cx.restore(previous);
        }
    }
}

impl Deref for HookGuard<'_> {
    type Target = ExecutionContext;

    fn deref(&self) -> &Self::Target {
        self.cx
    }
}

impl DerefMut for HookGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.cx
    }
}
