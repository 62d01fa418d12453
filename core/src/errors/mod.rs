//! SMS routing and dispatch error types.

use thiserror::Error;

/// Boxed error returned by backends and country resolvers
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Uniform error type for routing and dispatch
///
/// `UnregisteredBackend`, `BackendReportedFailure` and `BackendRaisedError` are
/// delivery failures: the router records them and moves on to the next
/// candidate. Every other variant aborts a send immediately.
#[derive(Error, Debug)]
pub enum SmsError {
    #[error("SMS sender '{name}' is not registered.")]
    UnregisteredBackend { name: String },

    #[error("SMS sending via '{name}' reported failure.")]
    BackendReportedFailure { name: String },

    #[error("SMS sending failed: {source}")]
    BackendRaisedError {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("No available SMS sender to handle this phone number.")]
    NoAvailableBackend,

    #[error("All SMS senders failed: {}", .failures.join("; "))]
    AllBackendsFailed { failures: Vec<String> },

    #[error("Invalid SMS sender name: '{name}'")]
    InvalidBackendName { name: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SmsError {
    /// Whether the failover loop may recover from this error by trying the next backend
    pub fn is_delivery_failure(&self) -> bool {
        matches!(
            self,
            SmsError::UnregisteredBackend { .. }
                | SmsError::BackendReportedFailure { .. }
                | SmsError::BackendRaisedError { .. }
        )
    }

    /// Name of the backend the error is about, if any
    pub fn backend_name(&self) -> Option<&str> {
        match self {
            SmsError::UnregisteredBackend { name }
            | SmsError::BackendReportedFailure { name }
            | SmsError::BackendRaisedError { name, .. }
            | SmsError::InvalidBackendName { name } => Some(name),
            _ => None,
        }
    }

    /// Wrap a backend error, passing an `SmsError` through unchanged
    pub fn from_backend(name: &str, error: BoxError) -> Self {
        match error.downcast::<SmsError>() {
            Ok(sms_error) => *sms_error,
            Err(source) => SmsError::BackendRaisedError {
                name: name.to_string(),
                source,
            },
        }
    }
}

pub type SmsResult<T> = Result<T, SmsError>;
