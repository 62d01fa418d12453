//! Unit tests for routing rule normalization

use sr_shared::config::RoutingConfig;

use crate::services::sms::RoutingRules;

fn names(list: Option<&[String]>) -> Option<Vec<&str>> {
    list.map(|names| names.iter().map(String::as_str).collect())
}

#[test]
fn test_country_keys_are_upper_cased() {
    let rules = RoutingRules::from_config(
        &RoutingConfig::default()
            .with_country("eg", vec!["nexmo", "twilio"])
            .with_country("US", "twilio"),
    );

    assert_eq!(names(rules.country_names("EG")), Some(vec!["nexmo", "twilio"]));
    assert_eq!(names(rules.country_names("US")), Some(vec!["twilio"]));
    assert_eq!(rules.country_names("eg"), None);
}

#[test]
fn test_prefix_keys_drop_leading_plus() {
    let rules = RoutingRules::from_config(
        &RoutingConfig::default()
            .with_prefix("+44", "vonage")
            .with_prefix("20", vec!["nexmo", "twilio"]),
    );

    assert_eq!(names(rules.names_for_prefix("44")), Some(vec!["vonage"]));
    assert_eq!(names(rules.names_for_prefix("20")), Some(vec!["nexmo", "twilio"]));
    assert_eq!(rules.names_for_prefix("+44"), None);
}

#[test]
fn test_single_names_become_one_element_lists() {
    let rules = RoutingRules::from_config(&RoutingConfig::default().with_prefix("1", "twilio"));
    assert_eq!(names(rules.names_for_prefix("1")), Some(vec!["twilio"]));
}

#[test]
fn test_longest_prefix_wins() {
    let rules = RoutingRules::from_config(
        &RoutingConfig::default()
            .with_prefix("1", vec!["twilio", "vonage"])
            .with_prefix("14", vec!["vonage"])
            .with_prefix("141", vec!["nexmo"]),
    );

    assert_eq!(rules.prefixes().collect::<Vec<_>>(), vec!["141", "14", "1"]);
    assert_eq!(names(rules.prefix_names("14155550100")), Some(vec!["nexmo"]));
    assert_eq!(names(rules.prefix_names("14255550100")), Some(vec!["vonage"]));
    assert_eq!(names(rules.prefix_names("12125550100")), Some(vec!["twilio", "vonage"]));
    assert_eq!(rules.prefix_names("999"), None);
}

#[test]
fn test_equal_length_prefixes_are_ordered_lexicographically() {
    let rules = RoutingRules::from_config(
        &RoutingConfig::default()
            .with_prefix("44", "b")
            .with_prefix("20", "a")
            .with_prefix("1", "c"),
    );

    assert_eq!(rules.prefixes().collect::<Vec<_>>(), vec!["20", "44", "1"]);
}

#[test]
fn test_colliding_keys_resolve_deterministically() {
    let rules = RoutingRules::from_config(
        &RoutingConfig::default()
            .with_prefix("+1", "twilio")
            .with_prefix("1", "vonage")
            .with_country("US", "twilio")
            .with_country("us", "vonage"),
    );

    // Raw keys are visited in lexicographic order; the later one wins
    assert_eq!(names(rules.names_for_prefix("1")), Some(vec!["vonage"]));
    assert_eq!(names(rules.country_names("US")), Some(vec!["vonage"]));
}

#[test]
fn test_blank_and_invalid_entries_are_dropped() {
    let rules = RoutingRules::from_config(
        &RoutingConfig::default()
            .with_default("   ")
            .with_prefix("1", vec!["", " twilio "])
            .with_prefix("20", vec![" "])
            .with_prefix("44x", "vonage")
            .with_country("", "vonage"),
    );

    assert_eq!(rules.default_name(), None);
    assert_eq!(names(rules.names_for_prefix("1")), Some(vec!["twilio"]));
    assert_eq!(rules.names_for_prefix("20"), None);
    assert_eq!(rules.prefixes().count(), 1);
}

#[test]
fn test_empty_config() {
    let rules = RoutingRules::from_config(&RoutingConfig::default());
    assert!(rules.is_empty());
    assert_eq!(rules.prefix_names("14155550100"), None);

    let rules = RoutingRules::from(&RoutingConfig::default().with_default("log"));
    assert!(!rules.is_empty());
    assert_eq!(rules.default_name(), Some("log"));
}
