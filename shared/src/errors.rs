//! Shared error types for the generation orchestrator

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SharedError {
    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },
}

pub type SharedResult<T> = Result<T, SharedError>;

/// Classified failure of a call across the remote job client boundary.
///
/// The client decides the class from whatever the service reports (HTTP
/// status, symbolic status, transport error kind). Callers only look at the
/// class, never at the message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiFailure {
    /// Failure that may succeed when repeated later
    Transient { rate_limited: bool, message: String },
    /// Failure that will not go away by repeating the call
    Fatal { message: String },
}

impl ApiFailure {
    pub fn rate_limited(message: impl Into<String>) -> Self {
        ApiFailure::Transient {
            rate_limited: true,
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        ApiFailure::Transient {
            rate_limited: false,
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        ApiFailure::Fatal {
            message: message.into(),
        }
    }

    /// Only rate-limit failures are eligible for backoff
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ApiFailure::Transient { rate_limited: true, .. })
    }

    pub fn message(&self) -> &str {
        match self {
            ApiFailure::Transient { message, .. } | ApiFailure::Fatal { message } => message,
        }
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFailure::Transient { rate_limited: true, message } => {
                write!(f, "rate limit exceeded: {message}")
            }
            ApiFailure::Transient { rate_limited: false, message } => {
                write!(f, "transient failure: {message}")
            }
            ApiFailure::Fatal { message } => write!(f, "fatal failure: {message}"),
        }
    }
}

impl std::error::Error for ApiFailure {}
