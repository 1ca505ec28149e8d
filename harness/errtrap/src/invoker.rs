//! The delegate that actually calls a test method.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::Location;

use errtrap_core::{CapturedError, Severity, TrapError};

use crate::runtime::ExecutionContext;

/// Why a test method invocation did not complete normally.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvocationFailure {
    /// The call mechanism rejected the call before the body ran.
    ///
    /// Never seen by the capture hook; the pipeline funnels it instead.
    #[error("Too few arguments to function {method}(), {got} passed and exactly {expected} expected")]
    ArgumentCount {
        method: String,
        expected: usize,
        got: usize,
        file: String,
        line: u32,
    },
    #[error("no test method named {method}")]
    UnknownMethod { method: String },
    /// The test body panicked.
    #[error("{method} panicked: {message}")]
    Panicked { method: String, message: String },
    /// The test body returned an error of its own.
    #[error("{method} failed: {message}")]
    Failed { method: String, message: String },
    /// The engine was driven outside its contract.
    #[error(transparent)]
    Trap(#[from] TrapError),
}

impl InvocationFailure {
    /// The captured-error form of a failure that bypasses the hook.
    ///
    /// Only [`InvocationFailure::ArgumentCount`] has one: a fatal error at the
    /// failure's location, described by the failure's message.
    pub fn as_captured(&self) -> Option<CapturedError> {
        match self {
            InvocationFailure::ArgumentCount { file, line, .. } => Some(CapturedError::new(
                Severity::Error,
                self.to_string(),
                file.clone(),
                *line,
            )),
            _ => None,
        }
    }
}

/// Calls a test method by name.
pub trait Invoker {
    fn invoke(&mut self, cx: &mut ExecutionContext, method: &str) -> Result<(), InvocationFailure>;
}

/// Invoker backed by a closure.
pub struct FnInvoker<F>(pub F);

impl<F> Invoker for FnInvoker<F>
where
    F: FnMut(&mut ExecutionContext, &str) -> Result<(), InvocationFailure>,
{
    fn invoke(&mut self, cx: &mut ExecutionContext, method: &str) -> Result<(), InvocationFailure> {
        (self.0)(cx, method)
    }
}

impl<F> fmt::Debug for FnInvoker<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnInvoker")
    }
}

type TestBody = Box<dyn FnMut(&mut ExecutionContext, &[String]) -> Result<(), InvocationFailure>>;

struct TestMethod {
    arity: usize,
    arguments: Vec<String>,
    body: TestBody,
    file: &'static str,
    line: u32,
}

/// Named test methods with declared arity.
///
/// Each method receives the arguments supplied for it (none by default).
/// Invoking a method with fewer supplied arguments than it declares fails with
/// [`InvocationFailure::ArgumentCount`] located at the registration site,
/// without running the body.
#[derive(Default)]
pub struct MethodTable {
    methods: BTreeMap<String, TestMethod>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `body` under `name`, declaring `arity` parameters.
    #[track_caller]
    pub fn register<F>(&mut self, name: impl Into<String>, arity: usize, body: F) -> &mut Self
    where
        F: FnMut(&mut ExecutionContext, &[String]) -> Result<(), InvocationFailure> + 'static,
    {
        let location = Location::caller();
        self.methods.insert(
            name.into(),
            TestMethod {
                arity,
                arguments: Vec::new(),
                body: Box::new(body),
                file: location.file(),
                line: location.line(),
            },
        );
        self
    }

    /// Set the arguments passed to `name`. Returns false for unknown methods.
    pub fn supply<I, S>(&mut self, name: &str, arguments: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.methods.get_mut(name) {
            Some(method) => {
                method.arguments = arguments.into_iter().map(Into::into).collect();
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Method names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}

impl Invoker for MethodTable {
    fn invoke(&mut self, cx: &mut ExecutionContext, method: &str) -> Result<(), InvocationFailure> {
        let Some(entry) = self.methods.get_mut(method) else {
            return Err(InvocationFailure::UnknownMethod {
                method: method.to_string(),
            });
        };
        if entry.arguments.len() < entry.arity {
            return Err(InvocationFailure::ArgumentCount {
                method: method.to_string(),
                expected: entry.arity,
                got: entry.arguments.len(),
                file: entry.file.to_string(),
                line: entry.line,
            });
        }
        (entry.body)(cx, &entry.arguments)
    }
}

impl fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.methods.iter().map(|(name, m)| (name, m.arity)))
            .finish()
    }
}
