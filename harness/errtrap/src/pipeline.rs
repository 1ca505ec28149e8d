//! One test-method invocation as a fixed sequence of stages.
//!
//! ```text
//! Bind ──► Trap ──► Funnel ──► Tally
//! ```
//!
//! - Bind: reset the queue and bind it to the running test
//! - Trap: run the delegate with the capture hook installed; a panicking
//!   body becomes [`InvocationFailure::Panicked`]
//! - Funnel: feed an argument-count failure, which the hook never sees, into
//!   the hook's reporting path
//! - Tally: report leftovers; runs whatever happened before
//!
//! The ordering is static. Each stage runs inside a `tracing` span so nested
//! output (see [`crate::init_tracing`]) shows where an event came from.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use errtrap_core::TestContext;

use crate::interceptor::ErrorInterceptor;
use crate::invoker::{InvocationFailure, Invoker};
use crate::queue::{ErrorQueue, SharedQueue};
use crate::runtime::ExecutionContext;

/// A pipeline stage.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Bind,
    Trap,
    Funnel,
    Tally,
}

impl Stage {
    /// Execution order.
    pub const ORDER: [Stage; 4] = [Stage::Bind, Stage::Trap, Stage::Funnel, Stage::Tally];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Bind => "bind",
            Stage::Trap => "trap",
            Stage::Funnel => "funnel",
            Stage::Tally => "tally",
        }
    }
}

/// Runs test methods through [`Stage::ORDER`].
#[derive(Debug)]
pub struct InvocationPipeline<I> {
    interceptor: ErrorInterceptor,
    delegate: I,
}

impl<I: Invoker> InvocationPipeline<I> {
    /// Pipeline with a fresh queue.
    ///
    /// Each invocation's bind stage makes the queue name severities the way
    /// the invoking context does.
    pub fn new(delegate: I) -> Self {
        Self::with_queue(ErrorQueue::new().shared(), delegate)
    }

    /// Pipeline whose queue names severities the way `cx` does.
    pub fn for_context(cx: &ExecutionContext, delegate: I) -> Self {
        Self::with_queue(ErrorQueue::with_classifier(*cx.classifier()).shared(), delegate)
    }

    pub fn with_queue(queue: SharedQueue, delegate: I) -> Self {
        Self::with_interceptor(ErrorInterceptor::new(queue), delegate)
    }

    pub fn with_interceptor(interceptor: ErrorInterceptor, delegate: I) -> Self {
        InvocationPipeline {
            interceptor,
            delegate,
        }
    }

    /// The queue expectations are declared on.
    pub fn queue(&self) -> &SharedQueue {
        self.interceptor.queue()
    }

    pub fn interceptor(&self) -> &ErrorInterceptor {
        &self.interceptor
    }

    pub fn delegate(&self) -> &I {
        &self.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut I {
        &mut self.delegate
    }

    /// Invoke `method` on behalf of `test`.
    ///
    /// Every captured error and expectation is reported to `test`. Returns the
    /// invocation's own failure if one survives the funnel, otherwise a tally
    /// error if tally could not report.
    pub fn invoke<T>(
        &mut self,
        cx: &mut ExecutionContext,
        test: &Arc<T>,
        method: &str,
    ) -> Result<(), InvocationFailure>
    where
        T: TestContext + 'static,
    {
        let _invocation = tracing::debug_span!("invoke", method).entered();

        let test = Arc::downgrade(test);
        self.bind(cx, test);
        let outcome = self.trap(cx, method);
        let remaining = match outcome {
            Ok(()) => None,
            Err(failure) => self.funnel(cx, failure),
        };
        let tallied = self.tally();

        match remaining {
            Some(failure) => {
                if let Err(error) = tallied {
                    tracing::warn!(%error, "tally failed after invocation failure");
                }
                Err(failure)
            }
            None => tallied,
        }
    }

    fn bind(&self, cx: &ExecutionContext, test: Weak<dyn TestContext>) {
        let _stage = tracing::trace_span!("stage", stage = Stage::Bind.as_str()).entered();
        let mut queue = self.queue().lock();
        queue.clear();
        queue.set_classifier(*cx.classifier());
        queue.set_test_case(test);
    }

    fn trap(&mut self, cx: &mut ExecutionContext, method: &str) -> Result<(), InvocationFailure> {
        let _stage = tracing::trace_span!("stage", stage = Stage::Trap.as_str()).entered();
        let interceptor = &self.interceptor;
        let delegate = &mut self.delegate;
        catch_unwind(AssertUnwindSafe(|| {
            interceptor.run(cx, |cx| delegate.invoke(cx, method))
        }))
        .unwrap_or_else(|payload| {
            let message = panic_message(&*payload);
            tracing::debug!(method, %message, "test body panicked");
            Err(InvocationFailure::Panicked {
                method: method.to_string(),
                message,
            })
        })
    }

    /// Route a hook-bypassing failure through the hook's reporting path.
    ///
    /// Returns the failure when it has no captured form.
    fn funnel(
        &self,
        cx: &ExecutionContext,
        failure: InvocationFailure,
    ) -> Option<InvocationFailure> {
        let _stage = tracing::trace_span!("stage", stage = Stage::Funnel.as_str()).entered();
        let Some(error) = failure.as_captured() else {
            return Some(failure);
        };
        match self.interceptor.funnel(cx, &error) {
            Ok(_) => None,
            Err(trap) => Some(InvocationFailure::Trap(trap)),
        }
    }

    fn tally(&self) -> Result<(), InvocationFailure> {
        let _stage = tracing::trace_span!("stage", stage = Stage::Tally.as_str()).entered();
        let leftovers = self.queue().lock().take_leftovers()?;
        leftovers.report();
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "test body panicked".to_string()
    }
}
