//! Log SMS Backend
//!
//! Writes messages to the tracing log instead of sending them. Registered as
//! `log`, it doubles as the last-resort fallback of every route.

use async_trait::async_trait;
use tracing::info;

use sr_core::{BoxError, SendOptions, SmsBackend};
use sr_shared::phone::mask_phone_number;

/// Backend that logs each message at `info` level
#[derive(Debug, Clone)]
pub struct LogBackend {
    /// Whether to mask the destination number in log lines
    mask_destination: bool,
}

impl LogBackend {
    /// Create a log backend that masks destinations
    pub fn new() -> Self {
        Self {
            mask_destination: true,
        }
    }

    /// Create a log backend from stored options
    ///
    /// Recognized option: `mask_destination` (bool, default `true`).
    pub fn from_options(options: &SendOptions) -> Self {
        Self {
            mask_destination: options
                .get("mask_destination")
                .and_then(|v| v.as_bool())
                .unwrap_or(true),
        }
    }

    fn display_destination(&self, destination: &str) -> String {
        if self.mask_destination {
            mask_phone_number(destination)
        } else {
            destination.to_string()
        }
    }
}

impl Default for LogBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SmsBackend for LogBackend {
    async fn attempt_delivery(
        &self,
        destination: &str,
        message: &str,
        options: &SendOptions,
    ) -> Result<bool, BoxError> {
        let option_keys: Vec<&str> = options.keys().map(String::as_str).collect();

        info!(
            target: "sms",
            provider = "log",
            to = %self.display_destination(destination),
            options = ?option_keys,
            "[SMS] {}",
            message
        );

        Ok(true)
    }

    fn provider_name(&self) -> &str {
        "Log"
    }
}
