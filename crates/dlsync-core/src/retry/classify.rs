//! Classify API/transport errors into retry policy error kinds.

use crate::api::ApiError;
use crate::retry::policy::ErrorKind;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u16) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code),
        _ => ErrorKind::Other,
    }
}

fn classify_reqwest(e: &reqwest::Error) -> ErrorKind {
    if let Some(status) = e.status() {
        return classify_http_status(status.as_u16());
    }
    if e.is_timeout() {
        return ErrorKind::Timeout;
    }
    if e.is_connect() || e.is_request() || e.is_body() {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

pub fn classify(e: &ApiError) -> ErrorKind {
    match e {
        ApiError::Http { status } => classify_http_status(*status),
        ApiError::Transport(e) => classify_reqwest(e),
        ApiError::StreamEnded => ErrorKind::Connection,
        ApiError::Decode(_) | ApiError::InvalidBaseUrl { .. } => ErrorKind::Other,
    }
}
