//! Error type shared by every request made through the curl transport.

use thiserror::Error;

/// Failure while talking to a remote JSON API.
///
/// Every variant carries the URL involved so a propagated error is enough to
/// tell which call in a harness run failed. Nothing here is retried.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid URL {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Curl reported an error (DNS, connect, timeout, TLS...).
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: curl::Error,
    },

    #[error("{method} {url} returned HTTP {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u32,
        body: String,
    },

    #[error("invalid JSON from {url}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response from {url} is missing field `{field}`")]
    MissingField { url: String, field: &'static str },

    #[error("page {url} is malformed: {reason}")]
    MalformedPage { url: String, reason: String },

    #[error("pagination loop: {url} was already fetched")]
    PaginationLoop { url: String },
}
