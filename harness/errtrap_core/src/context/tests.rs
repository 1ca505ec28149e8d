use super::*;
use crate::matcher::{AnyError, MessageEquals};
use pretty_assertions::assert_eq;

#[test]
fn error_calls_are_recorded_verbatim() {
    let ctx = RecordingContext::new("test_warns");
    ctx.error("E_WARNING", "deprecated call", "a.src", 10);
    assert_eq!(
        ctx.calls(),
        vec![RecordedCall::Error {
            severity: "E_WARNING".into(),
            message: "deprecated call".into(),
            file: "a.src".into(),
            line: 10,
        }]
    );
    assert_eq!(ctx.error_count(), 1);
    assert!(!ctx.is_clean());
}

#[test]
fn error_text_unescapes_percent() {
    let ctx = RecordingContext::new("t");
    ctx.error("E_NOTICE", "100%% wrong", "b.src", 3);
    assert_eq!(
        ctx.transcript(),
        vec!["Unexpected error [100% wrong] severity [E_NOTICE] in [b.src] line [3]".to_string()]
    );
}

#[test]
fn passing_assert_renders_overlay_into_slot() {
    let ctx = RecordingContext::new("t");
    let passed = ctx.assert(&AnyError, Observed::Message("boom"), "caught: %s");
    assert!(passed);
    assert_eq!(ctx.pass_count(), 1);
    assert_eq!(ctx.transcript(), vec!["caught: Any error [boom]".to_string()]);
    assert!(ctx.is_clean());
}

#[test]
fn failing_assert_is_recorded_as_failure() {
    let ctx = RecordingContext::new("t");
    let matcher = MessageEquals::new("expected");
    let passed = ctx.assert(&matcher, Observed::Nothing, "%s -> Expected error not caught");
    assert!(!passed);
    assert_eq!(ctx.failure_count(), 1);
    assert_eq!(
        ctx.transcript(),
        vec![
            "Error message equal to [expected] fails with [no error] -> Expected error not caught"
                .to_string()
        ]
    );
}

#[test]
fn overlay_of_escaped_message_renders_literally() {
    let ctx = RecordingContext::new("t");
    ctx.assert(&AnyError, Observed::Message("50%% done %%s"), "%s!");
    assert_eq!(ctx.transcript(), vec!["Any error [50% done %s]!".to_string()]);
}

#[test]
fn clear_discards_calls() {
    let ctx = RecordingContext::new("t");
    ctx.error("E_ERROR", "x", "f", 1);
    ctx.clear();
    assert!(ctx.calls().is_empty());
    assert_eq!(ctx.name(), "t");
}
