//! Suppression of errors that are artifacts of the framework or environment.
//!
//! Noise never reaches reconciliation: no log line, no queue entry, no report.
//! A rule is an ordered list of fragments; a message is noise when every
//! fragment appears in it, each after the previous one.

/// One suppression rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NoiseRule {
    label: String,
    fragments: Vec<String>,
}

impl NoiseRule {
    /// Create a rule matching `fragments` in order.
    pub fn new<I, S>(label: impl Into<String>, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NoiseRule {
            label: label.into(),
            fragments: fragments.into_iter().map(Into::into).collect(),
        }
    }

    /// Framework reflection produces "returned by reference" notices.
    pub fn returned_by_reference() -> Self {
        Self::new("returned-by-reference", ["returned by reference"])
    }

    /// The runtime nags about an unset default timezone.
    pub fn timezone_nag() -> Self {
        Self::new("timezone-nag", ["not safe to rely", "timezone settings"])
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether `message` contains every fragment, in order.
    pub fn matches(&self, message: &str) -> bool {
        let mut rest = message;
        for fragment in &self.fragments {
            match rest.find(fragment.as_str()) {
                Some(idx) => rest = &rest[idx + fragment.len()..],
                None => return false,
            }
        }
        !self.fragments.is_empty()
    }
}

/// Predicate set deciding whether a captured message is genuine.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NoiseFilter {
    rules: Vec<NoiseRule>,
}

impl Default for NoiseFilter {
    fn default() -> Self {
        NoiseFilter {
            rules: vec![NoiseRule::returned_by_reference(), NoiseRule::timezone_nag()],
        }
    }
}

impl NoiseFilter {
    /// A filter that lets everything through.
    pub fn none() -> Self {
        NoiseFilter { rules: Vec::new() }
    }

    /// Add an embedder-specific rule.
    #[must_use]
    pub fn with_rule(mut self, rule: NoiseRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[NoiseRule] {
        &self.rules
    }

    /// The first rule suppressing `message`, if any.
    pub fn classify(&self, message: &str) -> Option<&NoiseRule> {
        self.rules.iter().find(|rule| rule.matches(message))
    }

    /// True unless `message` is noise.
    pub fn is_genuine(&self, message: &str) -> bool {
        self.classify(message).is_none()
    }
}

#[cfg(test)]
mod tests;
