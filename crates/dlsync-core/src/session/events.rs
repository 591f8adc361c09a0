use std::future::Future;

use super::SyncSession;
use crate::api::DownloadApi;
use crate::registry::Applied;
use crate::stream::{EventTransport, StreamEvent, StreamKey, StreamStrategy};

impl<A: DownloadApi, T: EventTransport> SyncSession<A, T> {
    /// Fold one push event into the registry.
    ///
    /// Returns the reconcile outcome for record events, `None` otherwise.
    /// Under the per-job strategy, a job whose stored record is terminal
    /// after the update has its connection closed.
    pub fn handle_stream_event(&mut self, ev: StreamEvent) -> Option<Applied> {
        match ev {
            StreamEvent::Record { key, record } => {
                let id = record.id.clone();
                let applied = self.reconciler.apply(&mut self.registry, record);
                if applied.changed() {
                    self.publish();
                }
                tracing::trace!(stream = %key, job = %id, ?applied, "stream update");

                let terminal = self.registry.get(&id).is_some_and(|r| r.is_terminal());
                if terminal && self.strategy() == StreamStrategy::PerJob {
                    self.streams.close(&StreamKey::Job(id));
                }
                Some(applied)
            }
            StreamEvent::Error { key, kind, message } => {
                tracing::debug!(stream = %key, ?kind, "stream error reported: {}", message);
                None
            }
            StreamEvent::Closed { key } => {
                tracing::debug!(stream = %key, "stream finished");
                None
            }
        }
    }

    /// Wait for the next push event and apply it.
    ///
    /// `None` once no connection is tracked, for example after every per-job
    /// connection has reached a terminal job or the session was shut down.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        let ev = self.streams.next_event().await?;
        self.handle_stream_event(ev.clone());
        Some(ev)
    }

    /// Apply push events until `shutdown` resolves, then close every
    /// connection. With no connection left the session idles until then.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                ev = self.streams.next_event() => match ev {
                    Some(ev) => {
                        self.handle_stream_event(ev);
                    }
                    None => {
                        tracing::debug!("no push connections left, waiting for shutdown");
                        shutdown.as_mut().await;
                        break;
                    }
                },
            }
        }
        self.shutdown().await;
    }
}
