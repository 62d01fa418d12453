//! Configuration module
//!
//! - `environment` - Environment detection and logging configuration
//! - `sms` - Sender definitions and routing rules
//! - `issues` - Structured reports for malformed entries

pub mod environment;
pub mod issues;
pub mod sms;

use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

// Re-export commonly used types
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use issues::ConfigIssue;
pub use sms::{NameList, RoutingConfig, SenderDefinition, SmsConfig};

/// Prefix for generic environment overrides, e.g. `APP__SMS__COUNTRY_LOOKUP=false`
const ENV_PREFIX: &str = "APP";

/// Complete application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// SMS senders and routing
    #[serde(default)]
    pub sms: SmsConfig,
}

impl AppConfig {
    /// Load configuration from an optional TOML file layered with environment variables
    ///
    /// A `.env` file is read first when present. `SMS_DEFAULT_SENDER` and
    /// `SMS_ROUTING_DEFAULT` override the matching keys.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let mut app = Self::from_settings(settings)?;
        app.apply_overrides(|key| std::env::var(key).ok());
        Ok(app)
    }

    /// Load `<dir>/sms.<environment>.toml` for the environment named in `ENVIRONMENT`
    ///
    /// The file is optional; defaults apply when it does not exist.
    pub fn load_for_environment(dir: &Path) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = Environment::from_env();
        let settings = Config::builder()
            .add_source(File::from(dir.join(environment.config_file())).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .set_override("environment", environment.to_string())?
            .build()?;

        let mut app = Self::from_settings(settings)?;
        app.apply_overrides(|key| std::env::var(key).ok());
        Ok(app)
    }

    /// Parse configuration from a TOML string, without environment layering
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Self::from_settings(settings)
    }

    /// Deserialize layered settings
    ///
    /// Without a `logging` table, logging follows the environment's defaults.
    fn from_settings(settings: Config) -> Result<Self, ConfigError> {
        let logging_configured = settings.get_table("logging").is_ok();

        let mut app: AppConfig = settings.try_deserialize()?;
        if !logging_configured {
            app.logging = LoggingConfig::for_environment(app.environment);
        }
        Ok(app)
    }

    /// Apply the `SMS_DEFAULT_SENDER` / `SMS_ROUTING_DEFAULT` overrides
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(sender) = non_blank("SMS_DEFAULT_SENDER") {
            self.sms.default_sender = Some(sender);
        }
        if let Some(sender) = non_blank("SMS_ROUTING_DEFAULT") {
            self.sms.routing.default = Some(sender);
        }
    }
}
