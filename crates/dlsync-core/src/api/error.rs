//! Errors talking to the download service.

use thiserror::Error;

/// Failure of a request or push connection. Never fatal: callers log it and
/// keep the registry at its last known state.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-success status.
    #[error("HTTP {status}")]
    Http { status: u16 },
    /// Connect, send, or body read failed.
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response body was not the JSON we expected.
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
    /// The push stream ended without being asked to.
    #[error("stream ended by server")]
    StreamEnded,
    #[error("invalid API base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
