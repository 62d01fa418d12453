//! Normalized routing rules

use std::collections::BTreeMap;
use tracing::warn;

use sr_shared::config::{NameList, RoutingConfig};
use sr_shared::phone::{is_prefix_key, normalize_country_code, normalize_prefix_key};

/// Routing rules, normalized once at construction and immutable afterwards
///
/// Country keys are upper-case ISO alpha-2 codes, prefix keys are digit-only
/// strings. Every name list is non-empty and free of blank names. Prefix rules
/// are kept sorted by length descending, then key ascending, so the first
/// matching entry is the longest match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingRules {
    default: Option<String>,
    by_country: BTreeMap<String, Vec<String>>,
    by_prefix: Vec<(String, Vec<String>)>,
}

impl RoutingRules {
    /// Normalize raw routing configuration
    ///
    /// Raw keys are visited in lexicographic order; when two raw keys
    /// normalize to the same key the later one replaces the earlier one.
    pub fn from_config(config: &RoutingConfig) -> Self {
        let default = config
            .default
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        let mut by_country = BTreeMap::new();
        for (raw_key, names) in &config.by_country {
            let key = normalize_country_code(raw_key);
            if key.is_empty() {
                warn!(key = %raw_key, "Ignoring country rule with blank region code");
                continue;
            }
            if let Some(names) = normalize_names(names) {
                by_country.insert(key, names);
            }
        }

        let mut prefixes = BTreeMap::new();
        for (raw_key, names) in &config.by_prefix {
            let key = normalize_prefix_key(raw_key);
            if !is_prefix_key(&key) {
                warn!(key = %raw_key, "Ignoring prefix rule with non-numeric prefix");
                continue;
            }
            if let Some(names) = normalize_names(names) {
                prefixes.insert(key, names);
            }
        }

        let mut by_prefix: Vec<(String, Vec<String>)> = prefixes.into_iter().collect();
        by_prefix.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        Self {
            default,
            by_country,
            by_prefix,
        }
    }

    /// Lowest-priority sender
    pub fn default_name(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Senders for an upper-case region code
    pub fn country_names(&self, region: &str) -> Option<&[String]> {
        self.by_country.get(region).map(Vec::as_slice)
    }

    /// Senders for the longest prefix rule matching `digits`
    pub fn prefix_names(&self, digits: &str) -> Option<&[String]> {
        self.by_prefix
            .iter()
            .find(|(prefix, _)| digits.starts_with(prefix.as_str()))
            .map(|(_, names)| names.as_slice())
    }

    /// Senders configured for an exact prefix key
    pub fn names_for_prefix(&self, prefix: &str) -> Option<&[String]> {
        self.by_prefix
            .iter()
            .find(|(key, _)| key == prefix)
            .map(|(_, names)| names.as_slice())
    }

    /// Prefix keys in matching order
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.by_prefix.iter().map(|(key, _)| key.as_str())
    }

    /// Whether no rule of any kind is configured
    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_country.is_empty() && self.by_prefix.is_empty()
    }
}

impl From<&RoutingConfig> for RoutingRules {
    fn from(config: &RoutingConfig) -> Self {
        Self::from_config(config)
    }
}

fn normalize_names(names: &NameList) -> Option<Vec<String>> {
    let names: Vec<String> = names
        .names()
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}
