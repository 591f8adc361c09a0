//! Push-update connections.
//!
//! The stream manager owns every open connection, keyed by [`StreamKey`].
//! Connections run as tokio tasks that decode server-sent events into
//! [`JobRecord`]s and hand them to the owning session over a channel; they
//! never touch the registry themselves.

mod connection;
mod manager;
mod sse;

use std::fmt;
use std::future::Future;

use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::job::{JobId, JobRecord};
use crate::retry::ErrorKind;

pub use manager::StreamManager;
pub use sse::{SseDecoder, SseEvent};

/// Raw body chunks of one push connection.
pub type EventByteStream = BoxStream<'static, Result<Vec<u8>, ApiError>>;

/// Opens push connections. Implemented by [`crate::api::HttpClient`].
pub trait EventTransport: Send + Sync + 'static {
    fn open(
        &self,
        key: &StreamKey,
    ) -> impl Future<Output = Result<EventByteStream, ApiError>> + Send;
}

/// How push connections are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StreamStrategy {
    /// One connection per non-terminal job.
    #[default]
    PerJob,
    /// One connection carrying events for every job.
    Global,
}

/// Identifies one connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StreamKey {
    All,
    Job(JobId),
}

impl StreamKey {
    pub fn job(id: impl Into<JobId>) -> Self {
        StreamKey::Job(id.into())
    }
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKey::All => f.write_str("*"),
            StreamKey::Job(id) => f.write_str(id),
        }
    }
}

/// Lifecycle of one connection as published by its task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    /// Waiting out a backoff after `attempt` consecutive failures.
    Reconnecting { attempt: u32 },
    Closed,
}

/// What a connection task reports to the session.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// A decoded job record.
    Record { key: StreamKey, record: JobRecord },
    /// The connection failed; it may still be reconnecting.
    Error {
        key: StreamKey,
        kind: ErrorKind,
        message: String,
    },
    /// The task has finished and will send nothing more.
    Closed { key: StreamKey },
}

impl StreamEvent {
    pub fn key(&self) -> &StreamKey {
        match self {
            StreamEvent::Record { key, .. }
            | StreamEvent::Error { key, .. }
            | StreamEvent::Closed { key } => key,
        }
    }
}
