//! Shared utilities and common types for SmsRoute
//!
//! This crate provides functionality used across all workspace members:
//! - Configuration types and loading (`AppConfig`, `SmsConfig`, `RoutingConfig`)
//! - Structured configuration issues reported by validation
//! - Utility functions (phone number normalization, masking, prefix keys)

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, ConfigIssue, Environment, LogFormat, LoggingConfig, NameList, RoutingConfig,
    SenderDefinition, SmsConfig,
};
pub use utils::phone;
