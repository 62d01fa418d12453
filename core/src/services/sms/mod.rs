//! SMS routing and dispatch
//!
//! - **Backend contract**: [`SmsBackend`], implemented by every delivery backend
//! - **Registry**: [`BackendRegistry`], named backends with stored options
//! - **Routing**: [`RoutingRules`] + [`SmsRouter`], candidate selection by
//!   country and longest numeric prefix with ordered failover

mod registry;
mod router;
mod rules;
mod traits;

#[cfg(test)]
mod tests;

pub use registry::BackendRegistry;
pub use router::{SmsRouter, LOG_BACKEND_NAME};
pub use rules::RoutingRules;
pub use traits::{CountryResolver, SendOptions, SmsBackend};
