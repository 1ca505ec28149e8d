use super::*;

#[test]
fn buffer_log_keeps_lines_in_order() {
    let log = ErrorLog::buffer();
    log.write("E_NOTICE: a in f on line 1");
    log.write("E_WARNING: b in f on line 2");
    assert_eq!(
        log.lines(),
        vec![
            "E_NOTICE: a in f on line 1".to_string(),
            "E_WARNING: b in f on line 2".to_string(),
        ]
    );
}

#[test]
fn buffer_log_clear_empties() {
    let log = ErrorLog::buffer();
    log.write("line");
    log.clear();
    assert!(log.lines().is_empty());
}

#[test]
fn silent_and_tracing_logs_capture_nothing() {
    let silent = ErrorLog::Silent;
    silent.write("dropped");
    assert!(silent.lines().is_empty());

    let tracing = ErrorLog::default();
    tracing.write("emitted as an event");
    assert!(tracing.lines().is_empty());
}
