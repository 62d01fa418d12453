//! Bootstrap: build the backend registry and router from configuration
//!
//! Every sender definition is turned into a backend by the builder registered
//! for its `kind`. Malformed entries never abort the bootstrap; they are
//! skipped and reported as [`ConfigIssue`]s on the returned [`SmsStack`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use sr_core::{BackendRegistry, BoxError, RoutingRules, SmsBackend, SmsRouter, LOG_BACKEND_NAME};
use sr_shared::{ConfigIssue, SenderDefinition, SmsConfig};

use super::country::PhoneNumberCountryResolver;
use super::log_backend::LogBackend;
use super::mock_backend::MockBackend;
use crate::InfrastructureError;

/// Builds a backend from a sender definition
pub type BackendBuilder =
    Box<dyn Fn(&SenderDefinition) -> Result<Arc<dyn SmsBackend>, BoxError> + Send + Sync>;

/// Maps sender kinds to backend builders
pub struct BackendFactory {
    builders: HashMap<String, BackendBuilder>,
}

impl BackendFactory {
    /// Factory without any kind
    pub fn new() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Factory knowing the built-in kinds: `log`, `mock` and `twilio`
    pub fn with_defaults() -> Self {
        let factory = Self::new()
            .with_kind("log", |def| Ok(Arc::new(LogBackend::from_options(&def.config))))
            .with_kind("mock", |def| {
                Ok(Arc::new(MockBackend::from_options(def.name.clone(), &def.config)))
            });

        #[cfg(feature = "twilio-sms")]
        let factory = factory.with_kind("twilio", |def| {
            let config = super::twilio::TwilioConfig::from_options(&def.config)?;
            Ok(Arc::new(super::twilio::TwilioBackend::new(config)?))
        });

        factory
    }

    /// Add or replace the builder for `kind` (builder style)
    pub fn with_kind<F>(mut self, kind: impl Into<String>, builder: F) -> Self
    where
        F: Fn(&SenderDefinition) -> Result<Arc<dyn SmsBackend>, BoxError> + Send + Sync + 'static,
    {
        self.register_kind(kind, builder);
        self
    }

    /// Add or replace the builder for `kind`
    pub fn register_kind<F>(&mut self, kind: impl Into<String>, builder: F)
    where
        F: Fn(&SenderDefinition) -> Result<Arc<dyn SmsBackend>, BoxError> + Send + Sync + 'static,
    {
        self.builders.insert(kind.into(), Box::new(builder));
    }

    /// Whether a builder exists for `kind`
    pub fn supports(&self, kind: &str) -> bool {
        self.builders.contains_key(kind)
    }

    /// Known kinds, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    fn build(&self, definition: &SenderDefinition) -> Option<Result<Arc<dyn SmsBackend>, BoxError>> {
        self.builders
            .get(definition.kind.trim())
            .map(|builder| builder(definition))
    }
}

impl Default for BackendFactory {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for BackendFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendFactory")
            .field("kinds", &self.kinds())
            .finish()
    }
}

/// A configured router and the problems found while building it
pub struct SmsStack {
    pub router: SmsRouter,
    pub issues: Vec<ConfigIssue>,
}

impl SmsStack {
    /// Shared registry behind the router
    pub fn registry(&self) -> &Arc<BackendRegistry> {
        self.router.registry()
    }

    /// Whether the configuration was clean
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Reject a stack built from a configuration with issues
    pub fn into_strict(self) -> Result<Self, InfrastructureError> {
        if self.issues.is_empty() {
            Ok(self)
        } else {
            Err(InfrastructureError::InvalidConfig(self.issues))
        }
    }
}

impl fmt::Debug for SmsStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmsStack")
            .field("registry", self.router.registry())
            .field("rules", self.router.rules())
            .field("issues", &self.issues)
            .finish()
    }
}

/// Build the registry and router described by `config`
///
/// Senders are registered in configuration order; a later definition with the
/// same name replaces the earlier backend in place.
pub fn build_stack(config: &SmsConfig, factory: &BackendFactory) -> SmsStack {
    let mut issues = config.validate();

    let registry = Arc::new(BackendRegistry::new());
    registry.set_default_sender(config.default_sender.clone());

    for (index, definition) in config.senders.iter().enumerate() {
        let name = definition.name.trim();
        // Blank names and kinds are already reported by validation
        if name.is_empty() || definition.kind.trim().is_empty() {
            continue;
        }

        let path = format!("senders[{}]", index);
        let backend = match factory.build(definition) {
            Some(Ok(backend)) => backend,
            Some(Err(e)) => {
                issues.push(ConfigIssue::new(
                    &path,
                    format!("sender '{}' could not be built: {}; sender skipped", name, e),
                ));
                continue;
            }
            None => {
                issues.push(ConfigIssue::new(
                    &path,
                    format!("unknown sender kind '{}'; sender skipped", definition.kind.trim()),
                ));
                continue;
            }
        };

        if let Err(e) = registry.register_with_config(name, backend, definition.config.clone()) {
            issues.push(ConfigIssue::new(&path, format!("{}; sender skipped", e)));
        }
    }

    if config.ensure_log_fallback && !registry.has(LOG_BACKEND_NAME) {
        // Infallible: the reserved name is never blank
        let _ = registry.register(LOG_BACKEND_NAME, Arc::new(LogBackend::new()));
    }

    let mut router = SmsRouter::new(Arc::clone(&registry), RoutingRules::from_config(&config.routing));
    if config.country_lookup {
        router = router.with_country_resolver(Arc::new(PhoneNumberCountryResolver::new()));
    }

    for issue in &issues {
        warn!(path = %issue.path, "SMS configuration issue: {}", issue.message);
    }

    info!(
        senders = ?registry.all_names(),
        default_sender = ?registry.default_backend_name(),
        issues = issues.len(),
        "SMS router ready"
    );

    SmsStack { router, issues }
}
