//! Reconnection policy for push connections.
//!
//! Error classification (timeouts, throttling, connection failures, hard
//! errors) and exponential backoff live here so the stream manager only has to
//! ask "retry, and after how long?".

mod classify;
mod policy;

pub use classify::{classify, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
