//! Destination-aware routing with ordered failover
//!
//! Candidate order for a destination:
//! 1. senders of the destination's country rule (when a country resolver is set)
//! 2. senders of the longest matching prefix rule
//! 3. the routing default
//!
//! The list is then filtered to registered senders, deduplicated keeping the
//! first occurrence, and the reserved `log` sender is appended when registered.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use sr_shared::phone::{mask_phone_number, normalize_country_code, strip_leading_plus};

use super::registry::BackendRegistry;
use super::rules::RoutingRules;
use super::traits::{CountryResolver, SendOptions};
use crate::errors::{SmsError, SmsResult};

/// Name of the sender always tried last when it is registered
pub const LOG_BACKEND_NAME: &str = "log";

/// Routes messages to registered backends and fails over in priority order
pub struct SmsRouter {
    registry: Arc<BackendRegistry>,
    rules: RoutingRules,
    country_resolver: Option<Arc<dyn CountryResolver>>,
}

impl SmsRouter {
    /// Create a router over a shared registry
    pub fn new(registry: Arc<BackendRegistry>, rules: RoutingRules) -> Self {
        Self {
            registry,
            rules,
            country_resolver: None,
        }
    }

    /// Enable `by_country` rules through a country resolver
    pub fn with_country_resolver(mut self, resolver: Arc<dyn CountryResolver>) -> Self {
        self.country_resolver = Some(resolver);
        self
    }

    /// The registry this router dispatches through
    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }

    /// The normalized routing rules
    pub fn rules(&self) -> &RoutingRules {
        &self.rules
    }

    /// Top-priority sender for `destination`
    pub fn choose_sender_name(&self, destination: &str) -> Option<String> {
        self.candidate_names(destination).into_iter().next()
    }

    /// Prioritized, deduplicated list of registered senders for `destination`
    pub fn choose_sender_names(&self, destination: &str) -> Vec<String> {
        self.candidate_names(destination)
    }

    /// Prioritized, deduplicated list of registered senders for `destination`
    ///
    /// Depends only on the destination and the current registry contents.
    pub fn candidate_names(&self, destination: &str) -> Vec<String> {
        let mut candidates: Vec<&str> = Vec::new();

        if let Some(region) = self.resolve_region(destination) {
            if let Some(names) = self.rules.country_names(&region) {
                candidates.extend(names.iter().map(String::as_str));
            }
        }

        if let Some(names) = self.rules.prefix_names(strip_leading_plus(destination)) {
            candidates.extend(names.iter().map(String::as_str));
        }

        if let Some(default) = self.rules.default_name() {
            candidates.push(default);
        }

        let mut seen = HashSet::new();
        let mut ordered: Vec<String> = candidates
            .into_iter()
            .filter(|name| self.registry.has(name) && seen.insert(*name))
            .map(str::to_string)
            .collect();

        if self.needs_log_fallback(&ordered) {
            ordered.push(LOG_BACKEND_NAME.to_string());
        }

        debug!(
            phone = %mask_phone_number(destination),
            candidates = ?ordered,
            "Computed SMS sender candidates"
        );

        ordered
    }

    /// Send through the candidates in order until one succeeds
    ///
    /// Delivery failures are recorded as `"<name>: <reason>"` and the next
    /// candidate is tried; any other error is returned immediately.
    pub async fn send(
        &self,
        destination: &str,
        message: &str,
        options: &SendOptions,
    ) -> SmsResult<bool> {
        let names = self.candidate_names(destination);
        if names.is_empty() {
            warn!(
                phone = %mask_phone_number(destination),
                "No SMS sender available for destination"
            );
            return Err(SmsError::NoAvailableBackend);
        }

        let mut failures = Vec::with_capacity(names.len());
        for (attempt, name) in names.iter().enumerate() {
            match self.registry.dispatch(name, destination, message, options).await {
                Ok(_) => {
                    if attempt > 0 {
                        info!(
                            sender = %name,
                            attempt = attempt + 1,
                            "SMS delivered after failover"
                        );
                    }
                    return Ok(true);
                }
                Err(e) if e.is_delivery_failure() => {
                    warn!(sender = %name, error = %e, "SMS sender failed, trying next candidate");
                    failures.push(format!("{}: {}", name, e));
                }
                Err(e) => return Err(e),
            }
        }

        error!(
            phone = %mask_phone_number(destination),
            attempts = failures.len(),
            "All SMS senders failed"
        );
        Err(SmsError::AllBackendsFailed { failures })
    }

    /// Region code of `destination`, or `None` on any resolution failure
    fn resolve_region(&self, destination: &str) -> Option<String> {
        let resolver = self.country_resolver.as_ref()?;
        match resolver.region_code(destination) {
            Ok(region) => {
                let region = normalize_country_code(&region);
                (!region.is_empty()).then_some(region)
            }
            Err(e) => {
                debug!(
                    phone = %mask_phone_number(destination),
                    error = %e,
                    "Country lookup failed; skipping country rules"
                );
                None
            }
        }
    }

    /// Whether the reserved `log` sender must be appended as the last resort
    fn needs_log_fallback(&self, ordered: &[String]) -> bool {
        self.registry.has(LOG_BACKEND_NAME) && !ordered.iter().any(|name| name == LOG_BACKEND_NAME)
    }
}
