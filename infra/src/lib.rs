//! # Infrastructure Layer
//!
//! Concrete collaborators for the SmsRoute core:
//!
//! - **SMS backends**: log sink, mock backend, Twilio REST API
//! - **Country lookup**: libphonenumber-based region resolution
//! - **Bootstrap**: builds the registry and router from configuration,
//!   reporting every malformed entry
//! - **Telemetry**: tracing subscriber set-up
//!
//! ## Features
//!
//! - `twilio-sms`: Enable the Twilio backend (default)

use sr_shared::ConfigIssue;

// Re-export core types for convenience
pub use sr_core::errors::*;

/// SMS backends, country lookup and bootstrap
pub mod sms;

/// Tracing subscriber initialisation
pub mod telemetry;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Configuration could not be loaded or parsed
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration contained malformed entries (strict bootstrap)
    #[error("Invalid SMS configuration: {}", format_issues(.0))]
    InvalidConfig(Vec<ConfigIssue>),

    /// Tracing subscriber could not be installed
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// Routing or dispatch error
    #[error(transparent)]
    Sms(#[from] SmsError),
}

fn format_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
