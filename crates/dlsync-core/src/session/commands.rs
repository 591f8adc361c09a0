//! User intents: start, cancel, pause, resume.

use std::fmt;

use thiserror::Error;

use super::SyncSession;
use crate::api::{ApiError, DownloadApi};
use crate::job::{JobRecord, StartRequest, ValidationError};
use crate::stream::{EventTransport, StreamKey, StreamStrategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Cancel,
    Pause,
    Resume,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Start => "start",
            Action::Cancel => "cancel",
            Action::Pause => "pause",
            Action::Resume => "resume",
        })
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    /// Rejected locally; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("could not {action} download: {source}")]
    Api {
        action: Action,
        #[source]
        source: ApiError,
    },
}

impl CommandError {
    fn api(action: Action) -> impl FnOnce(ApiError) -> Self {
        move |source| {
            tracing::warn!("{} request failed: {}", action, source);
            CommandError::Api { action, source }
        }
    }
}

impl<A: DownloadApi, T: EventTransport> SyncSession<A, T> {
    /// Validate `request`, ask the service to create the job and apply the
    /// returned record. Under the per-job strategy a connection is opened for
    /// the new job unless it is already terminal.
    pub async fn start(&mut self, request: StartRequest) -> Result<JobRecord, CommandError> {
        let request = request.validate()?;
        let record = self
            .api
            .create(&request)
            .await
            .map_err(CommandError::api(Action::Start))?;
        tracing::info!(job = %record.id, url = %request.url, "download started");

        if self.reconciler.apply(&mut self.registry, record.clone()).changed() {
            self.publish();
        }
        if self.strategy() == StreamStrategy::PerJob && !record.is_terminal() {
            self.streams.open(StreamKey::job(record.id.clone()));
        }
        Ok(record)
    }

    /// Remove a job on the service, then locally.
    ///
    /// An id the registry does not know is ignored with a warning and no
    /// request. The local entry and its connection are dropped only after
    /// the service confirms.
    pub async fn cancel(&mut self, id: &str) -> Result<(), CommandError> {
        if !self.registry.contains(id) {
            tracing::warn!(job = id, "cancel requested for unknown job, ignoring");
            return Ok(());
        }
        self.api
            .remove(id)
            .await
            .map_err(CommandError::api(Action::Cancel))?;

        self.reconciler.remove(&mut self.registry, id);
        self.streams.close(&StreamKey::job(id));
        self.publish();
        tracing::info!(job = id, "download removed");
        Ok(())
    }

    /// Ask the service to pause a job. The registry changes only when the
    /// service reports the new status.
    pub async fn pause(&mut self, id: &str) -> Result<(), CommandError> {
        self.api
            .pause(id)
            .await
            .map_err(CommandError::api(Action::Pause))?;
        tracing::debug!(job = id, "pause requested");
        Ok(())
    }

    /// Ask the service to resume a job and make sure its connection is open
    /// under the per-job strategy.
    pub async fn resume(&mut self, id: &str) -> Result<(), CommandError> {
        self.api
            .resume(id)
            .await
            .map_err(CommandError::api(Action::Resume))?;
        tracing::debug!(job = id, "resume requested");
        if self.strategy() == StreamStrategy::PerJob {
            self.streams.open(StreamKey::job(id));
        }
        Ok(())
    }
}
