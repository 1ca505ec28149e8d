use super::*;

#[test]
fn reflection_notice_is_noise() {
    let filter = NoiseFilter::default();
    assert!(!filter.is_genuine(
        "Only variable references should be returned by reference"
    ));
}

#[test]
fn timezone_nag_is_noise() {
    let filter = NoiseFilter::default();
    let nag = "date(): It is not safe to rely on the system's timezone settings. \
               You are *required* to use the date.timezone setting";
    assert!(!filter.is_genuine(nag));
    assert_eq!(filter.classify(nag).map(NoiseRule::label), Some("timezone-nag"));
}

#[test]
fn timezone_fragments_must_appear_in_order() {
    let filter = NoiseFilter::default();
    assert!(filter.is_genuine("timezone settings are not safe to rely on"));
}

#[test]
fn ordinary_messages_are_genuine() {
    let filter = NoiseFilter::default();
    assert!(filter.is_genuine("Undefined variable: x"));
    assert!(filter.is_genuine(""));
}

#[test]
fn matching_is_case_sensitive() {
    let filter = NoiseFilter::default();
    assert!(filter.is_genuine("Returned By Reference"));
}

#[test]
fn custom_rules_extend_the_defaults() {
    let filter = NoiseFilter::default().with_rule(NoiseRule::new("xdebug", ["xdebug", "nesting"]));
    assert!(!filter.is_genuine("xdebug: maximum nesting level reached"));
    assert!(!filter.is_genuine("value returned by reference"));
    assert_eq!(filter.rules().len(), 3);
}

#[test]
fn empty_filter_accepts_everything() {
    let filter = NoiseFilter::none();
    assert!(filter.is_genuine("value returned by reference"));
}

#[test]
fn rule_without_fragments_matches_nothing() {
    let rule = NoiseRule::new("empty", Vec::<String>::new());
    assert!(!rule.matches("anything"));
}
