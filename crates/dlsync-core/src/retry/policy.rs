use std::time::Duration;

use crate::config::ReconnectConfig;

/// Coarse failure class used to decide whether a connection is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connect or read timed out.
    Timeout,
    /// Service asked us to slow down (429, 503).
    Throttled,
    /// Connection refused/reset, or the stream ended under us.
    Connection,
    /// Retryable server error.
    Http5xx(u16),
    /// Anything else: 4xx, undecodable response, bad configuration. A hard
    /// error; the connection is not reopened.
    Other,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    NoRetry,
    RetryAfter(Duration),
}

/// Exponential backoff with a cap, used to reopen push connections.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of consecutive attempts (including the first).
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ReconnectConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(cfg: &ReconnectConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(cfg.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(cfg.max_delay_secs),
        }
    }

    /// Same backoff, but never gives up on retryable errors.
    pub fn unbounded(self) -> Self {
        Self {
            max_attempts: u32::MAX,
            ..self
        }
    }

    /// `attempt` is 1-based: the number of consecutive failures so far.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if kind == ErrorKind::Other || attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.backoff(attempt))
    }

    /// base * 2^(attempt-1), capped at `max_delay`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }
}
