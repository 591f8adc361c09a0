//! One push connection: open, decode, reconnect with backoff, until cancelled
//! or the retry policy gives up.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::{ConnectionState, EventByteStream, EventTransport, SseDecoder, SseEvent, StreamEvent, StreamKey};
use crate::api::ApiError;
use crate::job::JobRecord;
use crate::retry::{self, RetryDecision, RetryPolicy};

/// Distinguishes successive connections opened for the same key.
pub(super) type ConnectionId = u64;

/// An event stamped with the connection that produced it.
pub(super) type Tagged = (ConnectionId, StreamEvent);

pub(super) struct ConnectionTask<T> {
    pub(super) id: ConnectionId,
    pub(super) key: StreamKey,
    pub(super) transport: Arc<T>,
    pub(super) policy: RetryPolicy,
    pub(super) events: mpsc::UnboundedSender<Tagged>,
    pub(super) state: watch::Sender<ConnectionState>,
    pub(super) cancel: CancellationToken,
}

enum PumpEnd {
    Cancelled,
    Failed(ApiError),
}

impl<T: EventTransport> ConnectionTask<T> {
    pub(super) async fn run(self) {
        let mut failures = 0u32;
        let mut hint = None;
        loop {
            self.state.send_replace(ConnectionState::Connecting);
            let opened = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                r = self.transport.open(&self.key) => r,
            };
            let err = match opened {
                Ok(body) => {
                    self.state.send_replace(ConnectionState::Open);
                    tracing::info!(stream = %self.key, "push connection open");
                    failures = 0;
                    match self.pump(body, &mut hint).await {
                        PumpEnd::Cancelled => break,
                        PumpEnd::Failed(e) => e,
                    }
                }
                Err(e) => e,
            };

            failures = failures.saturating_add(1);
            let kind = retry::classify(&err);
            let decision = match self.policy.decide(failures, kind) {
                RetryDecision::RetryAfter(backoff) => RetryDecision::RetryAfter(reconnect_delay(
                    backoff,
                    failures,
                    hint,
                    self.policy.max_delay,
                )),
                RetryDecision::NoRetry => RetryDecision::NoRetry,
            };
            // Publish the state before reporting the error so whoever handles
            // the report sees whether we are still alive.
            match decision {
                RetryDecision::NoRetry => {
                    tracing::warn!(stream = %self.key, "push connection failed, giving up: {}", err);
                    self.state.send_replace(ConnectionState::Closed);
                }
                RetryDecision::RetryAfter(delay) => {
                    tracing::warn!(
                        stream = %self.key,
                        attempt = failures,
                        "push connection error, reconnecting in {:?}: {}",
                        delay,
                        err
                    );
                    self.state
                        .send_replace(ConnectionState::Reconnecting { attempt: failures });
                }
            }
            self.emit(StreamEvent::Error {
                key: self.key.clone(),
                kind,
                message: err.to_string(),
            });
            match decision {
                RetryDecision::NoRetry => break,
                RetryDecision::RetryAfter(delay) => {
                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        self.state.send_replace(ConnectionState::Closed);
        tracing::debug!(stream = %self.key, "push connection closed");
        self.emit(StreamEvent::Closed {
            key: self.key.clone(),
        });
    }

    fn emit(&self, ev: StreamEvent) -> bool {
        self.events.send((self.id, ev)).is_ok()
    }

    /// Forward records until the body fails or the connection is cancelled.
    /// `hint` picks up any `retry:` value the server sends.
    async fn pump(&self, mut body: EventByteStream, hint: &mut Option<Duration>) -> PumpEnd {
        let mut decoder = SseDecoder::new();
        loop {
            let chunk = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return PumpEnd::Cancelled,
                c = body.next() => c,
            };
            let bytes = match chunk {
                Some(Ok(bytes)) => bytes,
                Some(Err(e)) => return PumpEnd::Failed(e),
                None => return PumpEnd::Failed(ApiError::StreamEnded),
            };
            let events = decoder.feed(&bytes);
            if let Some(ms) = decoder.retry_hint() {
                *hint = Some(Duration::from_millis(ms));
            }
            for ev in events {
                let Some(record) = record_from_event(&self.key, &ev) else {
                    continue;
                };
                let sent = self.emit(StreamEvent::Record {
                    key: self.key.clone(),
                    record,
                });
                if !sent {
                    return PumpEnd::Cancelled;
                }
            }
        }
    }
}

/// Delay before reopening after `attempt` consecutive failures.
///
/// A server `retry:` hint replaces the first backoff step, capped at `max`.
/// Later attempts fall back to the policy's exponential backoff.
pub(super) fn reconnect_delay(
    backoff: Duration,
    attempt: u32,
    hint: Option<Duration>,
    max: Duration,
) -> Duration {
    match hint {
        Some(hint) if attempt == 1 => hint.min(max),
        _ => backoff,
    }
}

/// Decode an event payload into a job record.
///
/// Malformed payloads are logged at debug level and dropped. When the body
/// carries no version, it is taken from an event id of the form
/// `<job id>:<version>`.
pub(super) fn record_from_event(key: &StreamKey, ev: &SseEvent) -> Option<JobRecord> {
    match ev.event.as_deref() {
        None | Some("message") | Some("progress") => {}
        Some(other) => {
            tracing::debug!(stream = %key, event = other, "ignoring unknown event type");
            return None;
        }
    }
    let mut record: JobRecord = match serde_json::from_str(&ev.data) {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!(stream = %key, "dropping malformed event payload: {}", e);
            return None;
        }
    };
    if record.version.is_none() {
        record.version = ev
            .id
            .as_deref()
            .and_then(|id| id.rsplit_once(':'))
            .filter(|(job, _)| *job == record.id)
            .and_then(|(_, v)| v.parse().ok());
    }
    Some(record)
}
