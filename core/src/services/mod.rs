//! Business services

pub mod sms;

pub use sms::{
    BackendRegistry, CountryResolver, RoutingRules, SendOptions, SmsBackend, SmsRouter,
    LOG_BACKEND_NAME,
};
