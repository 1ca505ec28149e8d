use super::*;
use pretty_assertions::assert_eq;

#[test]
fn codes_are_distinct_single_bits_except_all() {
    for severity in Severity::VARIANTS {
        if severity == Severity::All {
            continue;
        }
        assert_eq!(severity.code().count_ones(), 1, "{severity}");
    }
    let union = Severity::VARIANTS
        .into_iter()
        .filter(|s| *s != Severity::All)
        .fold(0, |acc, s| acc | s.code());
    assert_eq!(union, Severity::All.code());
}

#[test]
fn from_code_round_trips_every_variant() {
    for severity in Severity::VARIANTS {
        assert_eq!(Severity::from_code(severity.code()), Ok(severity));
    }
}

#[test]
fn from_code_rejects_unknown_codes() {
    assert_eq!(Severity::from_code(3), Err(TrapError::UnknownSeverityCode(3)));
    assert_eq!(
        Severity::from_code(1 << 20),
        Err(TrapError::UnknownSeverityCode(1 << 20))
    );
}

#[test]
fn from_name_accepts_prefixed_and_bare_names() {
    assert_eq!(Severity::from_name("E_WARNING"), Some(Severity::Warning));
    assert_eq!(Severity::from_name("user_notice"), Some(Severity::UserNotice));
    assert_eq!(Severity::from_name(" E_ALL "), Some(Severity::All));
    assert_eq!(Severity::from_name("E_BOGUS"), None);
}

#[test]
fn current_generation_names_everything() {
    let classifier = SeverityClassifier::for_generation(Generation::Current);
    for severity in Severity::VARIANTS {
        assert_eq!(classifier.name_of(severity), Ok(severity.name()));
    }
    assert_eq!(classifier.runtime_mask(), SeverityMask::ALL);
}

#[test]
fn legacy_generation_lacks_conditional_entries() {
    let classifier = SeverityClassifier::for_generation(Generation::Legacy);
    assert_eq!(classifier.name_of(Severity::Notice), Ok("E_NOTICE"));
    assert_eq!(
        classifier.name_of(Severity::Deprecated),
        Err(TrapError::UnavailableSeverity {
            name: "E_DEPRECATED"
        })
    );
    assert_eq!(
        classifier.name_of(Severity::RecoverableError),
        Err(TrapError::UnavailableSeverity {
            name: "E_RECOVERABLE_ERROR"
        })
    );
    assert_eq!(classifier.name_of(Severity::All), Ok("E_ALL"));
    assert_eq!(classifier.available().count(), 13);
}

#[test]
fn recoverable_generation_adds_only_recoverable_error() {
    let classifier = SeverityClassifier::for_generation(Generation::Recoverable);
    assert!(classifier.is_available(Severity::RecoverableError));
    assert!(!classifier.is_available(Severity::UserDeprecated));
}

#[test]
fn name_of_code_reports_unknown_codes() {
    let classifier = SeverityClassifier::default();
    assert_eq!(classifier.name_of_code(2), Ok("E_WARNING"));
    assert_eq!(
        classifier.name_of_code(6),
        Err(TrapError::UnknownSeverityCode(6))
    );
}

#[test]
fn mask_admits_intersecting_severities() {
    let mask = SeverityMask::ALL - SeverityMask::NOTICE;
    assert!(mask.admits(Severity::Warning));
    assert!(!mask.admits(Severity::Notice));
    assert!(mask.admits(Severity::All));
    assert!(!SeverityMask::empty().admits(Severity::All));
}

#[test]
fn generation_parses_case_insensitively() {
    assert_eq!("Legacy".parse::<Generation>(), Ok(Generation::Legacy));
    assert_eq!(" current ".parse::<Generation>(), Ok(Generation::Current));
    assert!("future".parse::<Generation>().is_err());
    assert!(Generation::Legacy < Generation::Current);
}
