//! # SmsRoute Core
//!
//! Routing-and-dispatch engine for outbound SMS. Given a destination number,
//! the router picks registered delivery backends by country and numeric
//! prefix, then tries them one at a time until one accepts the message.

pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use errors::*;
pub use services::*;
