//! Backend registry: named backend instances, stored options and dispatch

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use sr_shared::phone::mask_phone_number;

use super::traits::{SendOptions, SmsBackend};
use crate::errors::{SmsError, SmsResult};

/// A backend bound to a name, with its stored configuration
#[derive(Clone)]
struct Registration {
    name: String,
    backend: Arc<dyn SmsBackend>,
    stored_config: SendOptions,
}

/// Process-wide lookup table of delivery backends
///
/// Registrations keep insertion order; re-registering a name replaces the
/// binding in place. Reads vastly outnumber writes, so the table sits behind a
/// read-write lock that is never held across a delivery attempt.
#[derive(Default)]
pub struct BackendRegistry {
    registrations: RwLock<Vec<Registration>>,
    default_sender: RwLock<Option<String>>,
}

impl BackendRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configured default sender (builder style)
    pub fn with_default_sender(self, name: impl Into<String>) -> Self {
        self.set_default_sender(Some(name.into()));
        self
    }

    /// Set or clear the configured default sender
    pub fn set_default_sender(&self, name: Option<String>) {
        *self.default_sender.write() = name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
    }

    /// Register a backend without stored configuration
    pub fn register(&self, name: impl Into<String>, backend: Arc<dyn SmsBackend>) -> SmsResult<()> {
        self.register_with_config(name, backend, SendOptions::new())
    }

    /// Register a backend with stored configuration
    ///
    /// Last write wins on a name collision.
    pub fn register_with_config(
        &self,
        name: impl Into<String>,
        backend: Arc<dyn SmsBackend>,
        stored_config: SendOptions,
    ) -> SmsResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SmsError::InvalidBackendName { name });
        }

        debug!(
            sender = %name,
            provider = backend.provider_name(),
            options = stored_config.len(),
            "Registering SMS sender"
        );

        let registration = Registration {
            name,
            backend,
            stored_config,
        };

        let mut registrations = self.registrations.write();
        match registrations.iter_mut().find(|r| r.name == registration.name) {
            Some(existing) => *existing = registration,
            None => registrations.push(registration),
        }
        Ok(())
    }

    /// Remove a backend; no-op when the name is unknown
    pub fn unregister(&self, name: &str) {
        self.registrations.write().retain(|r| r.name != name);
    }

    /// Whether a backend is registered under `name`
    pub fn has(&self, name: &str) -> bool {
        self.registrations.read().iter().any(|r| r.name == name)
    }

    /// Registered names in insertion order
    pub fn all_names(&self) -> Vec<String> {
        self.registrations.read().iter().map(|r| r.name.clone()).collect()
    }

    /// Number of registered backends
    pub fn len(&self) -> usize {
        self.registrations.read().len()
    }

    /// Whether no backend is registered
    pub fn is_empty(&self) -> bool {
        self.registrations.read().is_empty()
    }

    /// Backend instance registered under `name`
    pub fn backend(&self, name: &str) -> Option<Arc<dyn SmsBackend>> {
        self.registrations
            .read()
            .iter()
            .find(|r| r.name == name)
            .map(|r| Arc::clone(&r.backend))
    }

    /// Configured default sender if registered, else the first registered one
    pub fn default_backend_name(&self) -> Option<String> {
        let registrations = self.registrations.read();

        if let Some(default) = self.default_sender.read().as_deref() {
            if registrations.iter().any(|r| r.name == default) {
                return Some(default.to_string());
            }
        }

        registrations.first().map(|r| r.name.clone())
    }

    /// Deliver through the backend registered under `name`
    ///
    /// Stored configuration is merged with `call_options`, call options winning
    /// on key collision. `Ok(true)` is the only non-error outcome.
    pub async fn dispatch(
        &self,
        name: &str,
        destination: &str,
        message: &str,
        call_options: &SendOptions,
    ) -> SmsResult<bool> {
        let (backend, options) = {
            let registrations = self.registrations.read();
            let registration = registrations
                .iter()
                .find(|r| r.name == name)
                .ok_or_else(|| SmsError::UnregisteredBackend {
                    name: name.to_string(),
                })?;

            (
                Arc::clone(&registration.backend),
                merge_options(&registration.stored_config, call_options),
            )
        };

        debug!(
            sender = %name,
            provider = backend.provider_name(),
            phone = %mask_phone_number(destination),
            "Dispatching SMS"
        );

        match backend.attempt_delivery(destination, message, &options).await {
            Ok(true) => {
                info!(
                    target: "sms_service",
                    sender = %name,
                    phone = %mask_phone_number(destination),
                    message_length = message.len(),
                    "SMS sent successfully"
                );
                Ok(true)
            }
            Ok(false) => Err(SmsError::BackendReportedFailure {
                name: name.to_string(),
            }),
            Err(error) => Err(SmsError::from_backend(name, error)),
        }
    }

    /// Deliver through [`default_backend_name`](Self::default_backend_name)
    pub async fn dispatch_default(
        &self,
        destination: &str,
        message: &str,
        call_options: &SendOptions,
    ) -> SmsResult<bool> {
        let name = self
            .default_backend_name()
            .ok_or(SmsError::NoAvailableBackend)?;
        self.dispatch(&name, destination, message, call_options).await
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("senders", &self.all_names())
            .field("default_sender", &*self.default_sender.read())
            .finish()
    }
}

/// Stored options overlaid with call-time options
fn merge_options(stored: &SendOptions, call: &SendOptions) -> SendOptions {
    let mut merged = stored.clone();
    for (key, value) in call {
        merged.insert(key.clone(), value.clone());
    }
    merged
}
