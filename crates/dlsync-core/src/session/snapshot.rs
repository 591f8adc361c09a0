use super::SyncSession;
use crate::api::DownloadApi;
use crate::job::JobRecord;
use crate::stream::{EventTransport, StreamKey, StreamStrategy};

impl<A: DownloadApi, T: EventTransport> SyncSession<A, T> {
    /// Replace the registry with the service's current job list.
    ///
    /// On failure the registry is left as it was and an empty list is
    /// returned; the error is logged, not raised.
    pub async fn load_snapshot(&mut self) -> Vec<JobRecord> {
        match self.api.list().await {
            Ok(records) => {
                tracing::info!("loaded snapshot of {} job(s)", records.len());
                self.reconciler.replace_all(&mut self.registry, records.clone());
                self.publish();
                records
            }
            Err(e) => {
                tracing::warn!("failed to load job snapshot: {}", e);
                Vec::new()
            }
        }
    }

    /// Load the snapshot, then open the push connections the strategy calls
    /// for: the shared connection, or one per non-terminal job.
    pub async fn bootstrap(&mut self) -> Vec<JobRecord> {
        let records = self.load_snapshot().await;
        match self.strategy() {
            StreamStrategy::Global => {
                self.streams.open(StreamKey::All);
            }
            StreamStrategy::PerJob => {
                for record in records.iter().filter(|r| !r.is_terminal()) {
                    self.streams.open(StreamKey::job(record.id.clone()));
                }
            }
        }
        records
    }
}
