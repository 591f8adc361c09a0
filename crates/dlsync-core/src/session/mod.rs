//! A sync session: the single owner of the registry.
//!
//! The session seeds the registry from a snapshot, keeps push connections
//! open through its [`StreamManager`], folds every event into the registry
//! with the [`Reconciler`], and dispatches user commands. All mutation goes
//! through `&mut self`, so the registry needs no locking; observers get
//! read-only [`RegistryView`]s over a watch channel.

mod commands;
mod events;
mod snapshot;

use std::sync::Arc;

use tokio::sync::watch;

use crate::api::{ApiError, DownloadApi, HttpClient};
use crate::config::SyncConfig;
use crate::job::{ActiveSet, JobRecord};
use crate::registry::{sort_for_display, InsertPosition, Reconciler, Registry, VersionPolicy};
use crate::retry::RetryPolicy;
use crate::stats::{Stats, StatsAggregator};
use crate::stream::{EventTransport, StreamManager, StreamStrategy};

pub use commands::{Action, CommandError};

/// Knobs that shape a session; usually built from [`SyncConfig`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub strategy: StreamStrategy,
    pub insert_position: InsertPosition,
    pub version_policy: VersionPolicy,
    pub active_statuses: ActiveSet,
    pub failed_includes_cancelled: bool,
    pub reconnect: RetryPolicy,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&SyncConfig::default())
    }
}

impl SessionOptions {
    pub fn from_config(cfg: &SyncConfig) -> Self {
        Self {
            strategy: cfg.stream_strategy,
            insert_position: cfg.insert_position,
            version_policy: cfg.version_policy,
            active_statuses: cfg.active_statuses.clone(),
            failed_includes_cancelled: cfg.failed_includes_cancelled,
            reconnect: RetryPolicy::from_config(&cfg.reconnect()),
        }
    }
}

/// Read-only picture of the registry published after every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryView {
    /// Records in registry insertion order.
    pub jobs: Vec<JobRecord>,
    pub stats: Stats,
}

impl RegistryView {
    /// Jobs in presentation order; see [`crate::registry::display_order`].
    pub fn display_order(&self) -> Vec<&JobRecord> {
        let mut jobs: Vec<&JobRecord> = self.jobs.iter().collect();
        sort_for_display(&mut jobs);
        jobs
    }
}

pub struct SyncSession<A, T> {
    api: A,
    registry: Registry,
    reconciler: Reconciler,
    stats: StatsAggregator,
    streams: StreamManager<T>,
    view: watch::Sender<RegistryView>,
}

impl SyncSession<HttpClient, HttpClient> {
    /// Session talking HTTP to the service named in `cfg`.
    pub fn connect(cfg: &SyncConfig) -> Result<Self, ApiError> {
        let client = HttpClient::from_config(cfg)?;
        tracing::debug!(base = %client.base_url(), "connecting session");
        let transport = Arc::new(client.clone());
        Ok(Self::new(client, transport, SessionOptions::from_config(cfg)))
    }
}

impl<A: DownloadApi, T: EventTransport> SyncSession<A, T> {
    pub fn new(api: A, transport: Arc<T>, opts: SessionOptions) -> Self {
        let (view, _) = watch::channel(RegistryView::default());
        Self {
            api,
            registry: Registry::new(),
            reconciler: Reconciler::new(opts.insert_position, opts.version_policy),
            stats: StatsAggregator::new(opts.active_statuses, opts.failed_includes_cancelled),
            streams: StreamManager::new(transport, opts.strategy, opts.reconnect),
            view,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn streams(&self) -> &StreamManager<T> {
        &self.streams
    }

    pub fn strategy(&self) -> StreamStrategy {
        self.streams.strategy()
    }

    /// Counts derived from the current registry.
    pub fn stats(&self) -> Stats {
        self.stats.compute(&self.registry)
    }

    /// Receive a fresh [`RegistryView`] after every registry change.
    pub fn subscribe(&self) -> watch::Receiver<RegistryView> {
        self.view.subscribe()
    }

    /// Close every push connection and wait for them to finish.
    pub async fn shutdown(&mut self) {
        self.streams.shutdown().await;
    }

    fn publish(&self) {
        let view = RegistryView {
            jobs: self.registry.to_vec(),
            stats: self.stats(),
        };
        self.view.send_replace(view);
    }
}

