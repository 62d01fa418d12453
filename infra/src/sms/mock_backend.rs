//! Mock SMS Backend
//!
//! A mock backend for development and testing. It records every delivery
//! attempt and can be told to fail in each of the ways a real carrier can.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use sr_core::{BoxError, SendOptions, SmsBackend};
use sr_shared::phone::{is_valid_international_phone, mask_phone_number};

/// How the mock answers delivery attempts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBehavior {
    /// Deliver successfully
    Succeed,
    /// Return `false` (the backend reports failure)
    ReportFailure,
    /// Return an error with the given message
    RaiseError(String),
}

/// A delivery attempt seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub destination: String,
    pub message: String,
    pub options: SendOptions,
}

/// Error raised by the mock backend
#[derive(Debug, thiserror::Error)]
pub enum MockBackendError {
    #[error("Invalid phone number format: {0}")]
    InvalidPhoneNumber(String),

    #[error("{0}")]
    Simulated(String),
}

/// Mock SMS backend for development and testing
///
/// Clones share the recorded attempts, so a test can keep a handle after
/// registering the backend.
#[derive(Clone)]
pub struct MockBackend {
    name: String,
    behavior: Arc<Mutex<MockBehavior>>,
    attempts: Arc<AtomicU64>,
    sent: Arc<Mutex<Vec<SentMessage>>>,
    validate_destination: bool,
}

impl MockBackend {
    /// Create a mock that always succeeds
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_behavior(name, MockBehavior::Succeed)
    }

    /// Create a mock with a given behavior
    pub fn with_behavior(name: impl Into<String>, behavior: MockBehavior) -> Self {
        Self {
            name: name.into(),
            behavior: Arc::new(Mutex::new(behavior)),
            attempts: Arc::new(AtomicU64::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
            validate_destination: false,
        }
    }

    /// Create a mock from stored options
    ///
    /// Recognized options: `behavior` ("succeed", "report_failure", "raise_error"),
    /// `error_message`, `validate_destination` (bool).
    pub fn from_options(name: impl Into<String>, options: &SendOptions) -> Self {
        let behavior = match options.get("behavior").and_then(|v| v.as_str()) {
            Some("report_failure") => MockBehavior::ReportFailure,
            Some("raise_error") => MockBehavior::RaiseError(
                options
                    .get("error_message")
                    .and_then(|v| v.as_str())
                    .unwrap_or("Simulated SMS sending failure")
                    .to_string(),
            ),
            _ => MockBehavior::Succeed,
        };

        let validate = options
            .get("validate_destination")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        Self::with_behavior(name, behavior).validating_destination(validate)
    }

    /// Reject destinations that are not E.164 numbers
    pub fn validating_destination(mut self, validate: bool) -> Self {
        self.validate_destination = validate;
        self
    }

    /// Change the behavior for subsequent attempts
    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.lock() = behavior;
    }

    /// Number of delivery attempts, successful or not
    pub fn attempt_count(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Successfully delivered messages, oldest first
    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    /// Reset counters and recorded messages
    pub fn reset(&self) {
        self.attempts.store(0, Ordering::SeqCst);
        self.sent.lock().clear();
    }
}

#[async_trait]
impl SmsBackend for MockBackend {
    async fn attempt_delivery(
        &self,
        destination: &str,
        message: &str,
        options: &SendOptions,
    ) -> Result<bool, BoxError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.validate_destination && !is_valid_international_phone(destination) {
            return Err(Box::new(MockBackendError::InvalidPhoneNumber(
                mask_phone_number(destination),
            )));
        }

        let behavior = self.behavior.lock().clone();
        match behavior {
            MockBehavior::Succeed => {
                self.sent.lock().push(SentMessage {
                    destination: destination.to_string(),
                    message: message.to_string(),
                    options: options.clone(),
                });

                info!(
                    target: "sms_service",
                    provider = "mock",
                    sender = %self.name,
                    phone = %mask_phone_number(destination),
                    message_length = message.len(),
                    "SMS sent successfully (mock)"
                );
                Ok(true)
            }
            MockBehavior::ReportFailure => {
                warn!(sender = %self.name, "Mock SMS backend reporting failure");
                Ok(false)
            }
            MockBehavior::RaiseError(reason) => {
                warn!(sender = %self.name, "Mock SMS backend simulating error");
                Err(Box::new(MockBackendError::Simulated(reason)))
            }
        }
    }

    fn provider_name(&self) -> &str {
        "Mock"
    }
}
