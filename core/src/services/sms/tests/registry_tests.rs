//! Unit tests for the backend registry

use serde_json::json;
use std::error::Error;

use super::mocks::{registry_with, CarrierError, Outcome, ScriptedBackend};
use crate::errors::SmsError;
use crate::services::sms::{BackendRegistry, SendOptions};

fn options(value: serde_json::Value) -> SendOptions {
    value.as_object().cloned().unwrap_or_default()
}

#[test]
fn test_register_has_and_unregister() {
    let registry = BackendRegistry::new();
    assert!(registry.is_empty());

    registry.register("twilio", ScriptedBackend::new(Outcome::Succeed)).unwrap();
    assert!(registry.has("twilio"));
    assert!(!registry.has("Twilio")); // names are case-sensitive

    registry.unregister("twilio");
    assert!(!registry.has("twilio"));

    // Unknown names are a no-op
    registry.unregister("vonage");
    assert!(registry.is_empty());
}

#[test]
fn test_register_rejects_blank_names() {
    let registry = BackendRegistry::new();
    let result = registry.register("  ", ScriptedBackend::new(Outcome::Succeed));

    assert!(matches!(result, Err(SmsError::InvalidBackendName { .. })));
    assert!(registry.is_empty());
}

#[test]
fn test_all_names_keeps_insertion_order() {
    let registry = registry_with(&["vonage", "twilio", "log"]);
    assert_eq!(registry.all_names(), vec!["vonage", "twilio", "log"]);

    // Re-registering replaces the binding in place
    registry.register("vonage", ScriptedBackend::new(Outcome::ReturnFalse)).unwrap();
    assert_eq!(registry.all_names(), vec!["vonage", "twilio", "log"]);
    assert_eq!(registry.len(), 3);
}

#[tokio::test]
async fn test_register_last_write_wins() {
    let first = ScriptedBackend::new(Outcome::Succeed);
    let second = ScriptedBackend::new(Outcome::Succeed);
    let registry = BackendRegistry::new();
    registry.register("twilio", first.clone()).unwrap();
    registry.register("twilio", second.clone()).unwrap();

    registry.dispatch("twilio", "+1555", "Hello", &SendOptions::new()).await.unwrap();

    assert_eq!(first.calls(), 0);
    assert_eq!(second.calls(), 1);
}

#[test]
fn test_default_backend_name() {
    let registry = BackendRegistry::new();
    assert_eq!(registry.default_backend_name(), None);

    registry.register("vonage", ScriptedBackend::new(Outcome::Succeed)).unwrap();
    registry.register("twilio", ScriptedBackend::new(Outcome::Succeed)).unwrap();

    // No configured default: first registered wins
    assert_eq!(registry.default_backend_name().as_deref(), Some("vonage"));

    registry.set_default_sender(Some("twilio".to_string()));
    assert_eq!(registry.default_backend_name().as_deref(), Some("twilio"));

    registry.set_default_sender(Some(" twilio ".to_string()));
    assert_eq!(registry.default_backend_name().as_deref(), Some("twilio"));

    // Configured default that is not registered falls back to the first one
    registry.set_default_sender(Some("nexmo".to_string()));
    assert_eq!(registry.default_backend_name().as_deref(), Some("vonage"));
}

#[tokio::test]
async fn test_dispatch_unregistered_backend() {
    let registry = BackendRegistry::new();
    let result = registry.dispatch("twilio", "+1555", "Hello", &SendOptions::new()).await;

    match result {
        Err(SmsError::UnregisteredBackend { name }) => assert_eq!(name, "twilio"),
        other => panic!("Expected UnregisteredBackend, got {:?}", other),
    }
}

#[tokio::test]
async fn test_dispatch_merges_stored_and_call_options() {
    let backend = ScriptedBackend::new(Outcome::Succeed);
    let registry = BackendRegistry::new();
    registry
        .register_with_config(
            "twilio",
            backend.clone(),
            options(json!({ "from": "+15550000000", "region": "us1" })),
        )
        .unwrap();

    let sent = registry
        .dispatch("twilio", "+1555", "Hello", &options(json!({ "from": "+15559999999" })))
        .await
        .unwrap();

    assert!(sent);
    assert_eq!(
        backend.last_options(),
        Some(options(json!({ "from": "+15559999999", "region": "us1" })))
    );
}

#[tokio::test]
async fn test_dispatch_false_becomes_reported_failure() {
    let registry = BackendRegistry::new();
    registry.register("vonage", ScriptedBackend::new(Outcome::ReturnFalse)).unwrap();

    let error = registry
        .dispatch("vonage", "+1555", "Hello", &SendOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(error, SmsError::BackendReportedFailure { ref name } if name == "vonage"));
    assert!(error.source().is_none());
}

#[tokio::test]
async fn test_dispatch_wraps_raised_errors() {
    let registry = BackendRegistry::new();
    registry.register("twilio", ScriptedBackend::new(Outcome::Raise("503 from carrier"))).unwrap();

    let error = registry
        .dispatch("twilio", "+1555", "Hello", &SendOptions::new())
        .await
        .unwrap_err();

    assert!(error.is_delivery_failure());
    assert_eq!(error.to_string(), "SMS sending failed: 503 from carrier");
    let cause = error.source().and_then(|e| e.downcast_ref::<CarrierError>());
    assert_eq!(cause.map(|c| c.0), Some("503 from carrier"));
}

#[tokio::test]
async fn test_dispatch_passes_sms_errors_through() {
    let registry = BackendRegistry::new();
    registry.register("twilio", ScriptedBackend::new(Outcome::Internal("bad wiring"))).unwrap();

    let error = registry
        .dispatch("twilio", "+1555", "Hello", &SendOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(error, SmsError::Internal { ref message } if message == "bad wiring"));
}

#[tokio::test]
async fn test_dispatch_default() {
    let empty = BackendRegistry::new();
    let result = empty.dispatch_default("+1555", "Hello", &SendOptions::new()).await;
    assert!(matches!(result, Err(SmsError::NoAvailableBackend)));

    let log = ScriptedBackend::new(Outcome::Succeed);
    let twilio = ScriptedBackend::new(Outcome::Succeed);
    let registry = BackendRegistry::new().with_default_sender("twilio");
    registry.register("log", log.clone()).unwrap();
    registry.register("twilio", twilio.clone()).unwrap();

    assert!(registry.dispatch_default("+1555", "Hello", &SendOptions::new()).await.unwrap());
    assert_eq!(twilio.calls(), 1);
    assert_eq!(log.calls(), 0);
}
