//! Browser login error type.

use std::time::Duration;
use thiserror::Error;

use crate::http::ApiError;

#[derive(Debug, Error)]
pub enum LoginError {
    /// The WebDriver server could not be reached or answered garbage.
    #[error(transparent)]
    Http(#[from] ApiError),

    /// The WebDriver server rejected a command (W3C error object).
    #[error("webdriver {command} failed: {error}: {message}")]
    WebDriver {
        command: String,
        error: String,
        message: String,
    },

    #[error("malformed webdriver response to {command}: {reason}")]
    Protocol { command: String, reason: String },

    #[error("no element matching {0}")]
    NoSuchElement(String),

    #[error("timed out after {timeout:?} waiting for {locator} to become {readiness}")]
    Timeout {
        locator: String,
        timeout: Duration,
        readiness: &'static str,
    },

    #[error("page title {actual:?} does not contain {expected:?}")]
    UnexpectedTitle { expected: String, actual: String },
}
