//! Structured configuration issues

use serde::Serialize;
use std::fmt;

/// A malformed configuration entry, reported instead of silently dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigIssue {
    /// Location of the entry, e.g. `senders[2]` or `routing.by_prefix.+1`
    pub path: String,
    /// What is wrong and what happened to the entry
    pub message: String,
}

impl ConfigIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
