//! Per-test queue reconciling captured errors against declared expectations.
//!
//! Features:
//! - FIFO, one-to-one reconciliation: the Nth captured error consumes the
//!   oldest pending expectation, never a later one
//! - Percent escaping of captured messages before any template handling
//! - End-of-test tally turning unfulfilled expectations into failures
//! - Two-phase reporting ([`ErrorQueue::prepare`], [`ErrorQueue::take_leftovers`])
//!   so a [`SharedQueue`] is never locked while the test is called
//!
//! # Raw-error sequence
//!
//! The queue nominally buffers raw errors for `tally()` to drain, but `add`
//! reconciles synchronously and never buffers. The drain is kept so the
//! sequence can be fed by other producers later; today it is always empty.

use std::collections::VecDeque;
use std::mem;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use errtrap_core::template::{escape_percent, interpolate};
use errtrap_core::{
    CapturedError, ExpectedError, Matcher, Observed, Severity, SeverityClassifier, TestContext,
    TrapError,
};

/// Suffix appended to the template of an expectation nothing fulfilled.
const NOT_CAUGHT: &str = " -> Expected error not caught";

/// Queue shared between an invocation pipeline and the hook it installs.
pub type SharedQueue = Arc<Mutex<ErrorQueue>>;

/// A declared, not-yet-fulfilled anticipation of an error.
#[derive(Debug)]
pub struct Expectation {
    matcher: Box<dyn Matcher>,
    template: String,
}

impl Expectation {
    pub fn new(matcher: Box<dyn Matcher>, template: impl Into<String>) -> Self {
        Expectation {
            matcher,
            template: template.into(),
        }
    }

    pub fn matcher(&self) -> &dyn Matcher {
        self.matcher.as_ref()
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

/// How one captured error was resolved.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reconciliation {
    /// No expectation was pending; reported as an error.
    Unexpected,
    /// Consumed the oldest expectation; reported as an assertion.
    Matched { passed: bool },
}

/// What `tally()` reported.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TallySummary {
    /// Buffered raw errors reported as errors.
    pub errors: usize,
    /// Expectations reported as not caught.
    pub unfulfilled: usize,
}

impl TallySummary {
    pub fn is_clean(&self) -> bool {
        self.errors == 0 && self.unfulfilled == 0
    }
}

/// Expectation queue for the currently bound test.
#[derive(Debug)]
pub struct ErrorQueue {
    expectations: VecDeque<Expectation>,
    errors: VecDeque<CapturedError>,
    /// The running test. Owned by the invocation layer, not by the queue.
    test: Option<Weak<dyn TestContext>>,
    classifier: SeverityClassifier,
}

impl Default for ErrorQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorQueue {
    /// Create a queue naming severities for the current runtime generation.
    pub fn new() -> Self {
        Self::with_classifier(SeverityClassifier::default())
    }

    pub fn with_classifier(classifier: SeverityClassifier) -> Self {
        ErrorQueue {
            expectations: VecDeque::new(),
            errors: VecDeque::new(),
            test: None,
            classifier,
        }
    }

    /// Wrap the queue for sharing with a hook.
    pub fn shared(self) -> SharedQueue {
        Arc::new(Mutex::new(self))
    }

    /// Bind the queue to the test that receives its reports.
    ///
    /// Call [`clear`](Self::clear) first; rebinding never discards state.
    pub fn set_test_case(&mut self, test: Weak<dyn TestContext>) {
        self.test = Some(test);
    }

    /// Discard pending expectations and buffered errors.
    pub fn clear(&mut self) {
        self.expectations.clear();
        self.errors.clear();
    }

    /// Declare that an error satisfying `matcher` is expected next.
    ///
    /// `template` is the assertion message; its `%s` slot receives the
    /// description of the error that fulfils it.
    pub fn expect_error(&mut self, matcher: Box<dyn Matcher>, template: impl Into<String>) {
        self.expectations
            .push_back(Expectation::new(matcher, template));
    }

    /// Like [`expect_error`](Self::expect_error), coercing shorthand.
    pub fn expect(&mut self, expected: impl Into<ExpectedError>, template: impl Into<String>) {
        self.expect_error(expected.into().into_matcher(), template);
    }

    /// Reconcile one captured error against the oldest expectation.
    pub fn add(
        &mut self,
        severity: Severity,
        message: &str,
        file: &str,
        line: u32,
    ) -> Result<Reconciliation, TrapError> {
        let name = self.classifier.name_of(severity)?;
        Ok(self.prepare(name, message, file, line)?.deliver())
    }

    /// [`add`](Self::add) for an already-built record.
    pub fn add_captured(&mut self, error: &CapturedError) -> Result<Reconciliation, TrapError> {
        self.add(error.severity, &error.message, &error.file, error.line)
    }

    /// Consume the oldest expectation for an error already named `name`,
    /// deferring the report.
    ///
    /// The returned [`PendingReport`] holds no borrow of the queue, so a
    /// shared queue can be unlocked before the test is called.
    pub fn prepare(
        &mut self,
        name: &'static str,
        message: &str,
        file: &str,
        line: u32,
    ) -> Result<PendingReport, TrapError> {
        let test = self.test()?;
        Ok(PendingReport {
            test,
            expectation: self.expectations.pop_front(),
            name,
            message: escape_percent(message).into_owned(),
            file: file.to_string(),
            line,
        })
    }

    /// Pop the oldest buffered raw error.
    pub fn extract(&mut self) -> Option<CapturedError> {
        self.errors.pop_front()
    }

    /// Report everything still pending and leave both sequences empty.
    ///
    /// Buffered errors become `error` reports; expectations become failed
    /// assertions against [`Observed::Nothing`]. On error nothing is taken, so
    /// the tally can be retried once a test is bound.
    pub fn tally(&mut self) -> Result<TallySummary, TrapError> {
        Ok(self.take_leftovers()?.report())
    }

    /// Take everything still pending for a deferred [`tally`](Self::tally).
    ///
    /// Resolves the test and every severity name first; on error the queue is
    /// left untouched.
    pub fn take_leftovers(&mut self) -> Result<Leftovers, TrapError> {
        if self.is_empty() {
            return Ok(Leftovers::default());
        }
        let test = self.test()?;
        let names = self
            .errors
            .iter()
            .map(|error| self.classifier.name_of(error.severity))
            .collect::<Result<Vec<_>, _>>()?;
        let errors = mem::take(&mut self.errors);
        Ok(Leftovers {
            test: Some(test),
            errors: names.into_iter().zip(errors).collect(),
            expectations: mem::take(&mut self.expectations),
        })
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.expectations.is_empty() && self.errors.is_empty()
    }

    pub fn pending_expectations(&self) -> usize {
        self.expectations.len()
    }

    pub fn classifier(&self) -> &SeverityClassifier {
        &self.classifier
    }

    /// Name severities with `classifier` from now on.
    pub fn set_classifier(&mut self, classifier: SeverityClassifier) {
        self.classifier = classifier;
    }

    fn test(&self) -> Result<Arc<dyn TestContext>, TrapError> {
        self.test
            .as_ref()
            .ok_or(TrapError::NoTestBound)?
            .upgrade()
            .ok_or(TrapError::TestContextDropped)
    }
}

/// One reconciled error whose report has not been delivered yet.
#[must_use = "the test receives nothing until the report is delivered"]
pub struct PendingReport {
    test: Arc<dyn TestContext>,
    expectation: Option<Expectation>,
    name: &'static str,
    /// Percent-escaped.
    message: String,
    file: String,
    line: u32,
}

impl PendingReport {
    /// Call into the bound test.
    pub fn deliver(self) -> Reconciliation {
        let PendingReport {
            test,
            expectation,
            name,
            message,
            file,
            line,
        } = self;

        let Some(expectation) = expectation else {
            tracing::debug!(severity = name, %message, "unexpected error");
            test.error(name, &message, &file, line);
            return Reconciliation::Unexpected;
        };

        let description = format!(
            "%s -> Error [{message}] severity [{name}] in [{}] line [{line}]",
            escape_percent(&file)
        );
        let template = interpolate(&expectation.template, &description);
        let passed = test.assert(
            expectation.matcher(),
            Observed::Message(&message),
            &template,
        );
        tracing::debug!(severity = name, %message, passed, "error reconciled against expectation");
        Reconciliation::Matched { passed }
    }
}

/// Everything a queue still held at tally time, detached from the queue.
#[derive(Default)]
#[must_use = "leftovers are only reported by `report`"]
pub struct Leftovers {
    test: Option<Arc<dyn TestContext>>,
    errors: Vec<(&'static str, CapturedError)>,
    expectations: VecDeque<Expectation>,
}

impl Leftovers {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.expectations.is_empty()
    }

    /// Report the leftovers to the test they were taken for.
    pub fn report(self) -> TallySummary {
        let mut summary = TallySummary::default();
        let Some(test) = self.test else {
            return summary;
        };
        for (name, error) in self.errors {
            test.error(name, &error.message, &error.file, error.line);
            summary.errors += 1;
        }
        for expectation in self.expectations {
            let template = format!("{}{NOT_CAUGHT}", expectation.template);
            test.assert(expectation.matcher(), Observed::Nothing, &template);
            summary.unfulfilled += 1;
        }

        if !summary.is_clean() {
            tracing::warn!(
                errors = summary.errors,
                unfulfilled = summary.unfulfilled,
                "tally reported leftovers"
            );
        }
        summary
    }
}
