//! SMS sender and routing configuration

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::issues::ConfigIssue;
use crate::utils::phone::{is_prefix_key, normalize_country_code, normalize_prefix_key};

/// Name of the sender registered out of the box
const LOG_SENDER: &str = "log";

/// SMS configuration: which senders exist and how numbers are routed to them
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsConfig {
    /// Sender used for direct sends when routing is not involved
    #[serde(default = "default_sender_name")]
    pub default_sender: Option<String>,

    /// Sender definitions, registered in this order
    #[serde(default = "default_senders")]
    pub senders: Vec<SenderDefinition>,

    /// Routing rules
    #[serde(default = "default_routing")]
    pub routing: RoutingConfig,

    /// Resolve the destination's country for `by_country` rules
    #[serde(default = "default_true")]
    pub country_lookup: bool,

    /// Register a log sender named "log" when none is configured
    #[serde(default = "default_true")]
    pub ensure_log_fallback: bool,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            default_sender: default_sender_name(),
            senders: default_senders(),
            routing: default_routing(),
            country_lookup: true,
            ensure_log_fallback: true,
        }
    }
}

/// A single configured sender
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SenderDefinition {
    /// Registration name (case-sensitive)
    pub name: String,

    /// Backend kind understood by the backend factory ("log", "twilio", ...)
    pub kind: String,

    /// Stored options merged under call-time options on every send
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl SenderDefinition {
    /// Create a definition without stored options
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            config: Map::new(),
        }
    }

    /// Attach stored options
    pub fn with_config(mut self, config: Map<String, Value>) -> Self {
        self.config = config;
        self
    }
}

/// One backend name or a prioritized list of names
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NameList {
    One(String),
    Many(Vec<String>),
}

impl NameList {
    /// Names in priority order, as configured
    pub fn names(&self) -> Vec<&str> {
        match self {
            NameList::One(name) => vec![name.as_str()],
            NameList::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for NameList {
    fn from(name: &str) -> Self {
        NameList::One(name.to_string())
    }
}

impl From<Vec<&str>> for NameList {
    fn from(names: Vec<&str>) -> Self {
        NameList::Many(names.into_iter().map(str::to_string).collect())
    }
}

/// Raw routing rules, before normalization
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RoutingConfig {
    /// Lowest-priority sender when no rule matches
    #[serde(default)]
    pub default: Option<String>,

    /// ISO alpha-2 region -> senders (keys are upper-cased on normalization)
    #[serde(default)]
    pub by_country: BTreeMap<String, NameList>,

    /// Numeric prefix -> senders (a leading `+` is stripped on normalization)
    #[serde(default)]
    pub by_prefix: BTreeMap<String, NameList>,
}

impl RoutingConfig {
    /// Set the default sender
    pub fn with_default(mut self, name: impl Into<String>) -> Self {
        self.default = Some(name.into());
        self
    }

    /// Add a country rule
    pub fn with_country(mut self, code: impl Into<String>, names: impl Into<NameList>) -> Self {
        self.by_country.insert(code.into(), names.into());
        self
    }

    /// Add a prefix rule
    pub fn with_prefix(mut self, prefix: impl Into<String>, names: impl Into<NameList>) -> Self {
        self.by_prefix.insert(prefix.into(), names.into());
        self
    }

    /// Report every malformed routing entry
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if let Some(default) = &self.default {
            if default.trim().is_empty() {
                issues.push(ConfigIssue::new("routing.default", "blank sender name; ignored"));
            }
        }

        validate_rule_map(
            "routing.by_country",
            &self.by_country,
            normalize_country_code,
            |key| !key.is_empty(),
            "not a region code",
            &mut issues,
        );
        validate_rule_map(
            "routing.by_prefix",
            &self.by_prefix,
            normalize_prefix_key,
            is_prefix_key,
            "not a numeric prefix",
            &mut issues,
        );

        issues
    }
}

fn validate_rule_map(
    section: &str,
    rules: &BTreeMap<String, NameList>,
    normalize: fn(&str) -> String,
    is_valid_key: fn(&str) -> bool,
    invalid_key_message: &str,
    issues: &mut Vec<ConfigIssue>,
) {
    let mut seen: HashMap<String, &str> = HashMap::new();

    for (raw_key, names) in rules {
        let path = format!("{}.{}", section, raw_key);
        let key = normalize(raw_key);

        if !is_valid_key(&key) {
            issues.push(ConfigIssue::new(&path, format!("{}; entry ignored", invalid_key_message)));
            continue;
        }

        let names = names.names();
        let blank = names.iter().filter(|name| name.trim().is_empty()).count();
        if blank == names.len() {
            issues.push(ConfigIssue::new(&path, "no sender names; entry ignored"));
            continue;
        }
        if blank > 0 {
            issues.push(ConfigIssue::new(&path, "blank sender name ignored"));
        }

        if let Some(previous) = seen.insert(key.clone(), raw_key.as_str()) {
            issues.push(ConfigIssue::new(
                &path,
                format!("normalizes to '{}' like '{}'; this entry wins", key, previous),
            ));
        }
    }
}

impl SmsConfig {
    /// Report every malformed entry instead of dropping it silently
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let mut names = HashSet::new();

        for (index, sender) in self.senders.iter().enumerate() {
            let path = format!("senders[{}]", index);
            if sender.name.trim().is_empty() {
                issues.push(ConfigIssue::new(&path, "blank sender name; sender skipped"));
                continue;
            }
            if sender.kind.trim().is_empty() {
                issues.push(ConfigIssue::new(
                    &path,
                    format!("sender '{}' has no kind; sender skipped", sender.name),
                ));
                continue;
            }
            if !names.insert(sender.name.trim()) {
                issues.push(ConfigIssue::new(
                    &path,
                    format!("duplicate sender name '{}'; this definition wins", sender.name),
                ));
            }
        }

        if let Some(default) = &self.default_sender {
            let default = default.trim();
            let implicit_log = self.ensure_log_fallback && default == LOG_SENDER;
            if !names.contains(default) && !implicit_log {
                issues.push(ConfigIssue::new(
                    "default_sender",
                    format!("'{}' is not a configured sender", default),
                ));
            }
        }

        issues.extend(self.routing.validate());
        issues
    }
}

fn default_sender_name() -> Option<String> {
    Some(LOG_SENDER.to_string())
}

fn default_senders() -> Vec<SenderDefinition> {
    vec![SenderDefinition::new(LOG_SENDER, LOG_SENDER)]
}

fn default_routing() -> RoutingConfig {
    RoutingConfig::default().with_default(LOG_SENDER)
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sms_config_default() {
        let config = SmsConfig::default();
        assert_eq!(config.default_sender.as_deref(), Some("log"));
        assert_eq!(config.senders, vec![SenderDefinition::new("log", "log")]);
        assert_eq!(config.routing.default.as_deref(), Some("log"));
        assert!(config.country_lookup);
        assert!(config.ensure_log_fallback);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_name_list_names() {
        assert_eq!(NameList::from("twilio").names(), vec!["twilio"]);
        assert_eq!(
            NameList::from(vec!["vonage", "twilio"]).names(),
            vec!["vonage", "twilio"]
        );
    }

    #[test]
    fn test_validate_reports_sender_problems() {
        let config = SmsConfig {
            default_sender: Some("missing".to_string()),
            senders: vec![
                SenderDefinition::new("", "log"),
                SenderDefinition::new("twilio", " "),
                SenderDefinition::new("log", "log"),
                SenderDefinition::new("log", "mock"),
            ],
            ..SmsConfig::default()
        };

        let paths: Vec<String> = config.validate().into_iter().map(|i| i.path).collect();
        assert_eq!(
            paths,
            vec!["senders[0]", "senders[1]", "senders[3]", "default_sender"]
        );
    }

    #[test]
    fn test_validate_reports_routing_problems() {
        let routing = RoutingConfig::default()
            .with_default("  ")
            .with_country("us", vec!["twilio", ""])
            .with_country("US", "vonage")
            .with_country("", "twilio")
            .with_prefix("+1", "twilio")
            .with_prefix("1", "vonage")
            .with_prefix("44x", "twilio")
            .with_prefix("20", vec!["", " "]);

        let issues = routing.validate();
        let rendered: Vec<String> = issues.iter().map(ToString::to_string).collect();

        assert!(rendered.contains(&"routing.default: blank sender name; ignored".to_string()));
        assert!(rendered.contains(&"routing.by_country.: not a region code; entry ignored".to_string()));
        assert!(rendered.contains(&"routing.by_country.us: blank sender name ignored".to_string()));
        assert!(rendered
            .contains(&"routing.by_country.us: normalizes to 'US' like 'US'; this entry wins".to_string()));
        assert!(rendered
            .contains(&"routing.by_prefix.1: normalizes to '1' like '+1'; this entry wins".to_string()));
        assert!(rendered.contains(&"routing.by_prefix.44x: not a numeric prefix; entry ignored".to_string()));
        assert!(rendered.contains(&"routing.by_prefix.20: no sender names; entry ignored".to_string()));
        assert_eq!(issues.len(), 7);
    }

    #[test]
    fn test_validate_compares_trimmed_names() {
        let config = SmsConfig {
            default_sender: Some("twilio ".to_string()),
            senders: vec![
                SenderDefinition::new("twilio", "twilio"),
                SenderDefinition::new(" twilio", "mock"),
            ],
            ..SmsConfig::default()
        };

        let rendered: Vec<String> = config.validate().iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec!["senders[1]: duplicate sender name ' twilio'; this definition wins"]
        );
    }

    #[test]
    fn test_implicit_log_default_is_valid() {
        let config = SmsConfig {
            senders: vec![SenderDefinition::new("twilio", "twilio")],
            ..SmsConfig::default()
        };
        assert!(config.validate().is_empty());

        let config = SmsConfig {
            ensure_log_fallback: false,
            ..config
        };
        assert_eq!(config.validate().len(), 1);
    }
}
