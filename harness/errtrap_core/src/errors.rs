//! Programming errors raised by the engine itself.
//!
//! None of these are test outcomes. They indicate a misconfigured embedder
//! (unknown codes, missing bindings) and propagate out of the invocation.

/// Error raised when the engine is driven outside its contract.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TrapError {
    /// A raw severity code that is not part of the enumeration.
    #[error("unknown severity code {0}")]
    UnknownSeverityCode(u32),
    /// A conditional severity the configured runtime generation lacks.
    #[error("severity {name} is not available on this runtime")]
    UnavailableSeverity { name: &'static str },
    /// A report was attempted before any test case was bound.
    #[error("no test case is bound to the error queue")]
    NoTestBound,
    /// The bound test case was dropped while its queue was still in use.
    #[error("the bound test case was dropped before reporting")]
    TestContextDropped,
    /// The hook found the error queue locked, usually by a test body holding
    /// its guard across a raise.
    #[error("the error queue is locked by the running test")]
    QueueBusy,
}
