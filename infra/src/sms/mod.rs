//! SMS backends and router bootstrap
//!
//! ## Features
//!
//! - **Log backend**: writes messages to the tracing log; the reserved `log` fallback
//! - **Mock backend**: scriptable outcomes for development and tests
//! - **Twilio backend**: production SMS via the Twilio REST API (`twilio-sms`)
//! - **Country lookup**: region resolution for `by_country` routing rules
//! - **Bootstrap**: builds the registry and router from `SmsConfig`

pub mod country;
pub mod factory;
pub mod log_backend;
pub mod mock_backend;

// Twilio SMS backend (feature-gated)
#[cfg(feature = "twilio-sms")]
pub mod twilio;

// Re-export commonly used types
pub use country::{CountryLookupError, PhoneNumberCountryResolver};
pub use factory::{build_stack, BackendBuilder, BackendFactory, SmsStack};
pub use log_backend::LogBackend;
pub use mock_backend::{MockBackend, MockBackendError, MockBehavior, SentMessage};

#[cfg(feature = "twilio-sms")]
pub use twilio::{TwilioBackend, TwilioConfig, TwilioError};
