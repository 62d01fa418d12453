//! Unit tests for SMS routing and dispatch

mod registry_tests;
mod rules_tests;
