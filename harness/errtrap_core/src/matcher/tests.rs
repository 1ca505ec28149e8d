use super::*;
use pretty_assertions::assert_eq;

#[test]
fn any_error_accepts_messages_but_not_nothing() {
    assert!(AnyError.matches(Observed::Message("boom")));
    assert!(AnyError.matches(Observed::Message("")));
    assert!(!AnyError.matches(Observed::Nothing));
}

#[test]
fn message_equals_compares_escaped_text() {
    let matcher = MessageEquals::new("50% done");
    assert!(matcher.matches(Observed::Message("50%% done")));
    assert!(!matcher.matches(Observed::Message("50% done")));
    assert!(!matcher.matches(Observed::Nothing));
}

#[test]
fn message_contains_finds_fragment() {
    let matcher = MessageContains::new("Undefined");
    assert!(matcher.matches(Observed::Message("Notice: Undefined index: a")));
    assert!(!matcher.matches(Observed::Message("Division by zero")));
}

#[test]
fn overlay_reports_pass_and_failure() {
    let matcher = MessageEquals::new("x");
    assert_eq!(
        matcher.overlay(Observed::Message("x")),
        "Error message equal to [x] [x]"
    );
    assert_eq!(
        matcher.overlay(Observed::Nothing),
        "Error message equal to [x] fails with [no error]"
    );
}

#[test]
fn expected_error_defaults_to_any() {
    let matcher = ExpectedError::default().into_matcher();
    assert_eq!(matcher.describe(), "Any error");
}

#[test]
fn string_shorthand_becomes_exact_match() {
    let matcher = ExpectedError::from("Division by zero").into_matcher();
    assert!(matcher.matches(Observed::Message("Division by zero")));
    assert!(!matcher.matches(Observed::Message("Division by zero!")));
}

#[test]
fn containing_shorthand_becomes_fragment_match() {
    let matcher = ExpectedError::Containing("by zero".into()).into_matcher();
    assert!(matcher.matches(Observed::Message("Division by zero")));
}

#[test]
fn custom_matcher_passes_through() {
    let custom: Box<dyn Matcher> = Box::new(MessageContains::new("abc"));
    let matcher = ExpectedError::from(custom).into_matcher();
    assert_eq!(matcher.describe(), "Error message containing [abc]");
}

#[test]
fn observed_display() {
    assert_eq!(Observed::Message("m").to_string(), "m");
    assert_eq!(Observed::Nothing.to_string(), "no error");
}
