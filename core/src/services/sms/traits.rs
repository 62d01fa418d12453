//! Contracts for delivery backends and country resolution

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::BoxError;

/// Per-call and stored backend options (option name -> value)
pub type SendOptions = Map<String, Value>;

/// A delivery backend
///
/// Returning `Ok(false)` is a failure signal equivalent to returning an error;
/// the registry turns it into [`SmsError::BackendReportedFailure`].
///
/// [`SmsError::BackendReportedFailure`]: crate::errors::SmsError::BackendReportedFailure
#[async_trait]
pub trait SmsBackend: Send + Sync {
    /// Attempt to deliver `message` to `destination`
    ///
    /// # Arguments
    ///
    /// * `destination` - The recipient's phone number, as given by the caller
    /// * `message` - The message content to send
    /// * `options` - Stored configuration merged with call-time options
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The message was handed to the carrier
    /// * `Ok(false)` - The backend declined or could not deliver
    /// * `Err(_)` - Delivery failed; an `SmsError` is passed through as-is,
    ///   anything else is wrapped as `BackendRaisedError`
    async fn attempt_delivery(
        &self,
        destination: &str,
        message: &str,
        options: &SendOptions,
    ) -> Result<bool, BoxError>;

    /// Get the provider name (e.g. "Twilio", "Log")
    fn provider_name(&self) -> &str;
}

/// Resolves a destination number to an ISO alpha-2 region code
///
/// Failures never abort routing; they only mean no country rule applies.
pub trait CountryResolver: Send + Sync {
    fn region_code(&self, destination: &str) -> Result<String, BoxError>;
}
