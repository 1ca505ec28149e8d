//! Error interception and expectation reconciliation for test invocations.
//!
//! While a test method runs, every runtime error raised into its
//! [`ExecutionContext`] is captured and reconciled against the errors the test
//! declared it expects. Each captured error ends in exactly one report to the
//! running test: a passing or failing assertion when it meets an expectation,
//! an error when none was pending. Expectations nothing fulfilled fail when the
//! invocation ends.
//!
//! # Components
//!
//! - [`ExecutionContext`]: handler stack and reporting settings
//! - [`ErrorQueue`]: FIFO expectations for the bound test
//! - [`ErrorInterceptor`]: scoped install of the capture hook
//! - [`InvocationPipeline`]: bind, trap, funnel, tally
//!
//! The severity table, noise rules, matchers and the [`TestContext`]
//! capability live in `errtrap_core` and are re-exported here.

mod config;
mod error_log;
mod interceptor;
mod invoker;
mod pipeline;
mod queue;
mod runtime;

use std::sync::Once;

pub use config::{parse_mask, ConfigError, TrapConfig};
pub use error_log::{BufferErrorLog, ErrorLog};
pub use interceptor::{ErrorInterceptor, HookGuard, TrapHandler};
pub use invoker::{FnInvoker, InvocationFailure, Invoker, MethodTable};
pub use pipeline::{InvocationPipeline, Stage};
pub use queue::{
    ErrorQueue, Expectation, Leftovers, PendingReport, Reconciliation, SharedQueue, TallySummary,
};
pub use runtime::{
    Disposition, ErrorHandler, ExecutionContext, Handler, PreviousHandler, SuspendedHandler,
};

pub use errtrap_core::{
    template, AnyError, CapturedError, ExpectedError, Generation, Matcher, MessageContains,
    MessageEquals, NoiseFilter, NoiseRule, Observed, RecordedCall, RecordingContext,
    RuntimeCapabilities, Severity, SeverityClassifier, SeverityMask, TestContext, TrapError,
};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debugging.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=errtrap=debug` or `RUST_LOG=errtrap=trace`; set
/// `ERRTRAP_LOG_TREE` to nest output by invocation stage.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        let registry = tracing_subscriber::registry().with(filter);
        let result = if std::env::var("ERRTRAP_LOG_TREE").is_ok() {
            registry
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .try_init()
        } else {
            registry
                .with(fmt::layer().with_target(true).with_level(true))
                .try_init()
        };
        if let Err(error) = result {
            eprintln!("errtrap: tracing already initialized: {error}");
        }
    });
}
