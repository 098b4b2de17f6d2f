//! Errors returned by the API gateway.
//!
//! The first four variants are the gateway's classification of a response;
//! [`crate::shop::Shop::settle`] decides what each one does to client state.

use reqwest::StatusCode;
use thiserror::Error;

/// Error returned by any call through [`crate::api::ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server rejected the credential (HTTP 401).
    #[error("unauthorized: {}", .message.as_deref().unwrap_or("session rejected"))]
    Unauthorized {
        /// Server-provided message, if any.
        message: Option<String>,
    },

    /// The credential is valid but not allowed to do this (HTTP 403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The server failed (HTTP 5xx). Not retried.
    #[error("server error ({status}): {message}")]
    Server {
        /// Response status.
        status: StatusCode,
        /// Server-provided message or a generic fallback.
        message: String,
    },

    /// The request never completed (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Any other non-success status, e.g. 404 or 400.
    #[error("HTTP {status}: {message}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Server-provided message or the status reason.
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// An endpoint path or asset name could not be turned into a URL.
    #[error("invalid request URL: {0}")]
    Url(String),
}

impl ApiError {
    /// HTTP status carried by this error, if it came from a response.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Forbidden(_) => Some(StatusCode::FORBIDDEN),
            Self::Server { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::Network(e) => e.status(),
            Self::Decode(_) | Self::Url(_) => None,
        }
    }

    /// `true` for a 401 from the server.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// `true` for errors a caller may reasonably re-invoke after (5xx and
    /// network failures). Nothing in this crate retries on its own.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::Network(_))
    }
}
