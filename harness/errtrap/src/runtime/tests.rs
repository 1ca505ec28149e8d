use super::*;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

/// Handler that records every message it sees.
fn recorder(seen: &Arc<Mutex<Vec<String>>>, disposition: Disposition) -> Handler {
    let seen = Arc::clone(seen);
    Arc::new(
        move |_: &mut ExecutionContext, error: &CapturedError| -> Result<Disposition, TrapError> {
            seen.lock().push(error.message.clone());
            Ok(disposition)
        },
    )
}

#[test]
fn raise_without_handler_uses_default_handling() {
    let mut cx = ExecutionContext::new().with_error_log(ErrorLog::buffer());
    cx.set_log_errors(true);

    let disposition = cx.raise(Severity::Warning, "careful", "a.src", 4).unwrap();

    assert_eq!(disposition, Disposition::Default);
    assert_eq!(
        cx.error_log().lines(),
        vec!["E_WARNING: careful in a.src on line 4".to_string()]
    );
}

#[test]
fn default_handling_respects_mask_and_logging_flag() {
    let mut cx = ExecutionContext::new().with_error_log(ErrorLog::buffer());
    cx.raise(Severity::Notice, "not logged", "a.src", 1).unwrap();
    assert!(cx.error_log().lines().is_empty());

    cx.set_log_errors(true);
    cx.set_reporting_mask(SeverityMask::ALL - SeverityMask::NOTICE);
    cx.raise(Severity::Notice, "masked", "a.src", 2).unwrap();
    assert!(cx.error_log().lines().is_empty());
}

#[test]
fn installed_handler_receives_raised_errors() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut cx = ExecutionContext::new().with_error_log(ErrorLog::buffer());
    cx.set_log_errors(true);
    cx.install(recorder(&seen, Disposition::Handled));

    let disposition = cx.raise(Severity::Notice, "hello", "b.src", 9).unwrap();

    assert_eq!(disposition, Disposition::Handled);
    assert_eq!(*seen.lock(), vec!["hello".to_string()]);
    assert!(cx.error_log().lines().is_empty());
}

#[test]
fn deferring_handler_falls_through_to_default() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut cx = ExecutionContext::new().with_error_log(ErrorLog::buffer());
    cx.set_log_errors(true);
    cx.install(recorder(&seen, Disposition::Default));

    cx.raise(Severity::UserWarning, "both", "c.src", 1).unwrap();

    assert_eq!(seen.lock().len(), 1);
    assert_eq!(cx.error_log().lines().len(), 1);
}

#[test]
fn install_returns_previous_and_restore_reinstates_it() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let outer = recorder(&seen, Disposition::Handled);
    let inner = recorder(&seen, Disposition::Handled);
    let mut cx = ExecutionContext::new();

    let first = cx.install(Arc::clone(&outer));
    assert!(first.handler().is_none());
    assert_eq!(first.depth(), 0);

    let second = cx.install(Arc::clone(&inner));
    assert!(second
        .handler()
        .is_some_and(|previous| Arc::ptr_eq(previous, &outer)));
    assert!(cx.is_active(&inner));

    cx.restore(second);
    assert!(cx.is_active(&outer));
    cx.restore(first);
    assert!(cx.active_handler().is_none());
}

#[test]
fn restore_discards_handlers_left_behind() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut cx = ExecutionContext::new();
    let previous = cx.install(recorder(&seen, Disposition::Handled));
    cx.install(recorder(&seen, Disposition::Handled));
    cx.install(recorder(&seen, Disposition::Handled));
    assert_eq!(cx.handler_depth(), 3);

    cx.restore(previous);
    assert_eq!(cx.handler_depth(), 0);
}

#[test]
fn restore_after_stack_unwound_below_token_reinstates_handler() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let outer = recorder(&seen, Disposition::Handled);
    let mut cx = ExecutionContext::new();
    let first = cx.install(Arc::clone(&outer));
    let second = cx.install(recorder(&seen, Disposition::Handled));

    // An older token unwinds past the newer one.
    cx.restore(first);
    assert_eq!(cx.handler_depth(), 0);

    cx.restore(second);
    assert!(cx.is_active(&outer));
    assert_eq!(cx.handler_depth(), 1);
}

#[test]
fn suspended_hook_routes_errors_to_the_handler_below() {
    let below = Arc::new(Mutex::new(Vec::new()));
    let above = Arc::new(Mutex::new(Vec::new()));
    let mut cx = ExecutionContext::new();
    cx.install(recorder(&below, Disposition::Handled));
    let top = recorder(&above, Disposition::Handled);
    cx.install(Arc::clone(&top));

    cx.suspend_active(|cx| {
        cx.raise(Severity::Notice, "while suspended", "d.src", 1)
            .unwrap();
    });
    cx.raise(Severity::Notice, "after resume", "d.src", 2).unwrap();

    assert_eq!(*below.lock(), vec!["while suspended".to_string()]);
    assert_eq!(*above.lock(), vec!["after resume".to_string()]);
    assert!(cx.is_active(&top));
}

#[test]
fn suspended_hook_is_resumed_after_panic() {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut cx = ExecutionContext::new();
    let top = recorder(&seen, Disposition::Handled);
    cx.install(Arc::clone(&top));

    let result = catch_unwind(AssertUnwindSafe(|| {
        cx.suspend_active(|cx| {
            assert_eq!(cx.handler_depth(), 0);
            panic!("inside suspension");
        });
    }));

    assert!(result.is_err());
    assert!(cx.is_active(&top));
}

#[test]
fn trigger_records_the_caller_location() {
    let located = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&located);
    let mut cx = ExecutionContext::new();
    cx.install(Arc::new(
        move |_: &mut ExecutionContext, error: &CapturedError| -> Result<Disposition, TrapError> {
            *sink.lock() = Some((error.file.clone(), error.line));
            Ok(Disposition::Handled)
        },
    ));

    let line = line!() + 1;
    cx.trigger(Severity::UserNotice, "here").unwrap();

    let (file, recorded_line) = located.lock().clone().unwrap();
    assert!(file.ends_with("tests.rs"));
    assert_eq!(recorded_line, line);
}

#[test]
fn default_handling_rejects_unavailable_severity_when_logging() {
    let config = TrapConfig {
        log_errors: true,
        generation: errtrap_core::Generation::Legacy,
        ..TrapConfig::default()
    };
    let mut cx = ExecutionContext::from_config(&config).with_error_log(ErrorLog::Silent);
    assert_eq!(
        cx.raise(Severity::Deprecated, "old api", "e.src", 1),
        Err(TrapError::UnavailableSeverity {
            name: "E_DEPRECATED"
        })
    );
}
