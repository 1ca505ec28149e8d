//! Matchers deciding whether a captured error fulfils an expectation.
//!
//! Messages reaching a matcher are already percent-escaped (see
//! [`crate::template`]); the string-based matchers escape their own expected
//! text the same way, so `MessageEquals::new("50% done")` matches the captured
//! message `50% done`.

use std::fmt;

use crate::template::escape_percent;

/// What the test context compares a matcher against.
///
/// `Nothing` is used at tally time for expectations no error ever reached.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Observed<'a> {
    Message(&'a str),
    Nothing,
}

impl<'a> Observed<'a> {
    pub fn message(self) -> Option<&'a str> {
        match self {
            Observed::Message(m) => Some(m),
            Observed::Nothing => None,
        }
    }
}

impl fmt::Display for Observed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observed::Message(m) => f.write_str(m),
            Observed::Nothing => f.write_str("no error"),
        }
    }
}

/// Capability to judge an observed error message.
pub trait Matcher: fmt::Debug + Send + Sync {
    /// Whether `observed` satisfies this matcher.
    fn matches(&self, observed: Observed<'_>) -> bool;

    /// What this matcher expects, for report text.
    fn describe(&self) -> String;

    /// Describe the comparison against `observed`, pass or fail.
    fn overlay(&self, observed: Observed<'_>) -> String {
        if self.matches(observed) {
            format!("{} [{observed}]", self.describe())
        } else {
            format!("{} fails with [{observed}]", self.describe())
        }
    }
}

/// Accepts any captured error.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AnyError;

impl Matcher for AnyError {
    fn matches(&self, observed: Observed<'_>) -> bool {
        matches!(observed, Observed::Message(_))
    }

    fn describe(&self) -> String {
        "Any error".to_string()
    }
}

/// Accepts an error whose message equals the expected text exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageEquals {
    /// Escaped expected text.
    expected: String,
}

impl MessageEquals {
    pub fn new(expected: &str) -> Self {
        MessageEquals {
            expected: escape_percent(expected).into_owned(),
        }
    }
}

impl Matcher for MessageEquals {
    fn matches(&self, observed: Observed<'_>) -> bool {
        observed.message() == Some(self.expected.as_str())
    }

    fn describe(&self) -> String {
        format!("Error message equal to [{}]", self.expected)
    }
}

/// Accepts an error whose message contains the expected fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageContains {
    fragment: String,
}

impl MessageContains {
    pub fn new(fragment: &str) -> Self {
        MessageContains {
            fragment: escape_percent(fragment).into_owned(),
        }
    }
}

impl Matcher for MessageContains {
    fn matches(&self, observed: Observed<'_>) -> bool {
        observed
            .message()
            .is_some_and(|m| m.contains(self.fragment.as_str()))
    }

    fn describe(&self) -> String {
        format!("Error message containing [{}]", self.fragment)
    }
}

/// Shorthand accepted by `expect`, coerced into a matcher.
#[derive(Debug, Default)]
pub enum ExpectedError {
    /// Any error at all.
    #[default]
    Any,
    /// Exact message.
    Message(String),
    /// Message fragment.
    Containing(String),
    /// Caller-supplied matcher.
    Custom(Box<dyn Matcher>),
}

impl ExpectedError {
    pub fn into_matcher(self) -> Box<dyn Matcher> {
        match self {
            ExpectedError::Any => Box::new(AnyError),
            ExpectedError::Message(m) => Box::new(MessageEquals::new(&m)),
            ExpectedError::Containing(f) => Box::new(MessageContains::new(&f)),
            ExpectedError::Custom(matcher) => matcher,
        }
    }
}

impl From<&str> for ExpectedError {
    fn from(message: &str) -> Self {
        ExpectedError::Message(message.to_string())
    }
}

impl From<String> for ExpectedError {
    fn from(message: String) -> Self {
        ExpectedError::Message(message)
    }
}

impl From<Box<dyn Matcher>> for ExpectedError {
    fn from(matcher: Box<dyn Matcher>) -> Self {
        ExpectedError::Custom(matcher)
    }
}

#[cfg(test)]
mod tests;
