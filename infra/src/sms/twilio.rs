//! Twilio SMS Backend
//!
//! Sends messages through the Twilio Programmable Messaging REST API.
//!
//! ## Features
//!
//! - E.164 validation and normalization of destinations
//! - Per-call `from` override through send options
//! - Twilio API errors surfaced with status and message
//! - Security: phone number masking in logs

use async_trait::async_trait;
use phonenumber::{Mode, PhoneNumber};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use sr_core::{BoxError, SendOptions, SmsBackend};
use sr_shared::phone::mask_phone_number;

/// Twilio's limit on a message body
const MAX_BODY_CHARS: usize = 1600;

const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

/// Twilio backend configuration
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    /// Twilio Account SID
    pub account_sid: String,
    /// Twilio Auth Token
    pub auth_token: String,
    /// From phone number (must be a Twilio phone number)
    pub from_number: String,
    /// API base URL
    pub base_url: String,
    /// Timeout for API requests in seconds
    pub request_timeout_secs: u64,
}

/// Errors raised by the Twilio backend
#[derive(Debug, thiserror::Error)]
pub enum TwilioError {
    #[error("Twilio configuration error: {0}")]
    Config(String),

    #[error("Invalid phone number format: {0}")]
    InvalidPhoneNumber(String),

    #[error("Message exceeds maximum length of 1600 characters ({0})")]
    MessageTooLong(usize),

    #[error("Twilio request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Twilio API error {status}: {message}")]
    Api { status: u16, message: String },
}

impl TwilioConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, TwilioError> {
        let var = |key: &str| {
            std::env::var(key).map_err(|_| TwilioError::Config(format!("{} not set", key)))
        };

        Self::validated(
            var("TWILIO_ACCOUNT_SID")?,
            var("TWILIO_AUTH_TOKEN")?,
            var("TWILIO_FROM_NUMBER")?,
            std::env::var("TWILIO_BASE_URL").ok(),
            std::env::var("TWILIO_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok()),
        )
    }

    /// Create configuration from a sender's stored options
    ///
    /// Keys: `account_sid`, `auth_token`, `from`, optional `base_url` and
    /// `timeout_secs`.
    pub fn from_options(options: &SendOptions) -> Result<Self, TwilioError> {
        let string = |key: &str| {
            options
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| TwilioError::Config(format!("missing option '{}'", key)))
        };

        Self::validated(
            string("account_sid")?,
            string("auth_token")?,
            string("from")?,
            options.get("base_url").and_then(|v| v.as_str()).map(str::to_string),
            options.get("timeout_secs").and_then(|v| v.as_u64()),
        )
    }

    fn validated(
        account_sid: String,
        auth_token: String,
        from_number: String,
        base_url: Option<String>,
        request_timeout_secs: Option<u64>,
    ) -> Result<Self, TwilioError> {
        if account_sid.trim().is_empty() || auth_token.trim().is_empty() {
            return Err(TwilioError::Config(
                "account SID and auth token must not be empty".to_string(),
            ));
        }

        // Validate from number format
        if !from_number.starts_with('+') {
            return Err(TwilioError::Config(
                "from number must be in E.164 format (starting with '+')".to_string(),
            ));
        }

        Ok(Self {
            account_sid,
            auth_token,
            from_number,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout_secs: request_timeout_secs.unwrap_or(30),
        })
    }

    /// Messages resource of the configured account
    pub fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url.trim_end_matches('/'),
            self.account_sid
        )
    }
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Twilio SMS backend
pub struct TwilioBackend {
    client: reqwest::Client,
    config: TwilioConfig,
}

impl TwilioBackend {
    /// Create a new Twilio backend
    pub fn new(config: TwilioConfig) -> Result<Self, TwilioError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(
            "Twilio SMS backend initialized with from number: {}",
            mask_phone_number(&config.from_number)
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, TwilioError> {
        Self::new(TwilioConfig::from_env()?)
    }

    /// Validate and normalize phone number to E.164 format
    fn validate_phone_number(&self, phone: &str) -> Result<String, TwilioError> {
        if phone.starts_with('+') {
            let parsed = phone
                .parse::<PhoneNumber>()
                .map_err(|e| TwilioError::InvalidPhoneNumber(e.to_string()))?;
            let formatted = parsed.format().mode(Mode::E164).to_string();
            debug!("Validated phone number: {}", mask_phone_number(&formatted));
            Ok(formatted)
        } else {
            // Try to parse with a default country code (US)
            let with_country = format!("+1{}", phone);
            match with_country.parse::<PhoneNumber>() {
                Ok(parsed) => {
                    let formatted = parsed.format().mode(Mode::E164).to_string();
                    warn!(
                        "Phone number missing country code, assumed US: {}",
                        mask_phone_number(&formatted)
                    );
                    Ok(formatted)
                }
                Err(_) => Err(TwilioError::InvalidPhoneNumber(
                    "phone number must be in E.164 format (e.g., +1234567890)".to_string(),
                )),
            }
        }
    }

    async fn post_message(&self, to: &str, from: &str, body: &str) -> Result<(), TwilioError> {
        let response = self
            .client
            .post(self.config.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[("To", to), ("From", from), ("Body", body)])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let resource: MessageResource = response.json().await?;
            info!(
                "SMS sent successfully to {} with SID: {}",
                mask_phone_number(to),
                resource.sid.as_deref().unwrap_or("unknown")
            );
            return Ok(());
        }

        let message = response
            .json::<ApiErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

        Err(TwilioError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl SmsBackend for TwilioBackend {
    async fn attempt_delivery(
        &self,
        destination: &str,
        message: &str,
        options: &SendOptions,
    ) -> Result<bool, BoxError> {
        let to = self.validate_phone_number(destination)?;

        let length = message.chars().count();
        if length > MAX_BODY_CHARS {
            return Err(Box::new(TwilioError::MessageTooLong(length)));
        }

        let from = options
            .get("from")
            .and_then(|v| v.as_str())
            .unwrap_or(&self.config.from_number);

        info!(
            "Sending SMS to {} via Twilio (message length: {} chars)",
            mask_phone_number(&to),
            length
        );

        self.post_message(&to, from, message).await?;
        Ok(true)
    }

    fn provider_name(&self) -> &str {
        "Twilio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_config() -> TwilioConfig {
        TwilioConfig {
            account_sid: "ACtest".to_string(),
            auth_token: "test".to_string(),
            from_number: "+15551234567".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 1,
        }
    }

    #[test]
    fn test_phone_validation() {
        let backend = TwilioBackend::new(test_config()).unwrap();

        assert_eq!(backend.validate_phone_number("+12024561111").unwrap(), "+12024561111");
        assert!(backend.validate_phone_number("+abc").is_err());

        // US number without country code - should add +1
        assert_eq!(backend.validate_phone_number("2024561111").unwrap(), "+12024561111");
    }

    #[test]
    fn test_config_from_options() {
        let options = json!({
            "account_sid": "AC123",
            "auth_token": "secret",
            "from": "+15550000000",
            "base_url": "https://twilio.example/",
            "timeout_secs": 5
        });

        let config = TwilioConfig::from_options(options.as_object().unwrap()).unwrap();
        assert_eq!(config.account_sid, "AC123");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(
            config.messages_url(),
            "https://twilio.example/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn test_config_from_options_defaults_and_errors() {
        let options = json!({ "account_sid": "AC123", "auth_token": "secret", "from": "+15550000000" });
        let config = TwilioConfig::from_options(options.as_object().unwrap()).unwrap();
        assert_eq!(config.base_url, "https://api.twilio.com");
        assert_eq!(config.request_timeout_secs, 30);

        let missing = json!({ "account_sid": "AC123", "from": "+15550000000" });
        let error = TwilioConfig::from_options(missing.as_object().unwrap()).unwrap_err();
        assert!(error.to_string().contains("missing option 'auth_token'"));

        let bad_from = json!({ "account_sid": "AC123", "auth_token": "secret", "from": "15550000000" });
        let error = TwilioConfig::from_options(bad_from.as_object().unwrap()).unwrap_err();
        assert!(error.to_string().contains("E.164 format"));
    }

    #[test]
    fn test_config_from_env() {
        std::env::remove_var("TWILIO_BASE_URL");
        std::env::remove_var("TWILIO_REQUEST_TIMEOUT_SECS");
        std::env::set_var("TWILIO_ACCOUNT_SID", "ACtest");
        std::env::set_var("TWILIO_AUTH_TOKEN", "test_token");
        std::env::set_var("TWILIO_FROM_NUMBER", "+15551234567");

        let config = TwilioConfig::from_env().unwrap();
        assert_eq!(config.account_sid, "ACtest");
        assert_eq!(config.from_number, "+15551234567");
        assert_eq!(config.request_timeout_secs, 30);

        std::env::remove_var("TWILIO_ACCOUNT_SID");
        std::env::remove_var("TWILIO_AUTH_TOKEN");
        std::env::remove_var("TWILIO_FROM_NUMBER");
    }

    #[tokio::test]
    async fn test_rejects_overlong_messages_before_sending() {
        let backend = TwilioBackend::new(test_config()).unwrap();
        let body = "x".repeat(MAX_BODY_CHARS + 1);

        let error = backend
            .attempt_delivery("+12024561111", &body, &SendOptions::new())
            .await
            .unwrap_err();

        assert!(error.to_string().contains("maximum length of 1600"));
    }
}
