//! API request error types.
//!
//! Errors produced by the HTTP verb wrappers and the generic JSON request
//! helper. Every remote call is single-attempt: a failure here aborts the
//! enclosing operation and is propagated to the caller unchanged.

use std::fmt;

/// Errors that can occur while issuing a request against a JSON HTTP API.
#[derive(Debug)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    ///
    /// Carries the request URL, the numeric status code, and the raw
    /// response body text so the failure is diagnosable from the message
    /// alone.
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// Network-level failure: connection refused, DNS resolution, broken
    /// transfer.
    Transport(String),

    /// The request exceeded the transport's timeout.
    Timeout,

    /// The request or response body could not be serialized or parsed as
    /// JSON.
    Json(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Status { url, status, body } => write!(
                f,
                "API request failed to {}. Status Code: {} Response: {}",
                url, status, body
            ),
            ApiError::Transport(msg) => write!(f, "Network error: {}", msg),
            ApiError::Timeout => write!(f, "Request timed out"),
            ApiError::Json(msg) => write!(f, "JSON error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// Map reqwest errors onto the API error taxonomy.
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Json(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}
