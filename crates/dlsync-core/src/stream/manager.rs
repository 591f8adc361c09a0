//! Owned set of push connections keyed by [`StreamKey`].

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::connection::{ConnectionId, ConnectionTask, Tagged};
use super::{ConnectionState, EventTransport, StreamEvent, StreamKey, StreamStrategy};
use crate::retry::RetryPolicy;

struct Connection {
    id: ConnectionId,
    cancel: CancellationToken,
    state: watch::Receiver<ConnectionState>,
    task: JoinHandle<()>,
}

impl Connection {
    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }
}

/// Opens, tracks and tears down push connections.
///
/// Every connection is a child of one root cancellation token, so
/// [`shutdown`](Self::shutdown) or dropping the manager stops all of them.
/// Events from all connections arrive on a single channel, read with
/// [`next_event`](Self::next_event), in arrival order. Each connection is
/// tagged with its own id, so events still queued from a connection that
/// was closed (or replaced by a reopen of the same key) are never delivered.
pub struct StreamManager<T> {
    transport: Arc<T>,
    strategy: StreamStrategy,
    policy: RetryPolicy,
    connections: HashMap<StreamKey, Connection>,
    /// Tasks of closed connections that may still be winding down.
    closing: Vec<JoinHandle<()>>,
    next_id: ConnectionId,
    events_tx: mpsc::UnboundedSender<Tagged>,
    events_rx: mpsc::UnboundedReceiver<Tagged>,
    root: CancellationToken,
}

impl<T: EventTransport> StreamManager<T> {
    pub fn new(transport: Arc<T>, strategy: StreamStrategy, policy: RetryPolicy) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            transport,
            strategy,
            policy,
            connections: HashMap::new(),
            closing: Vec::new(),
            next_id: 0,
            events_tx,
            events_rx,
            root: CancellationToken::new(),
        }
    }

    pub fn strategy(&self) -> StreamStrategy {
        self.strategy
    }

    /// Open a connection for `key` unless one is already live.
    ///
    /// Returns `false` (and does nothing) when a connection for the key exists
    /// and has not closed. Must be called from within a tokio runtime.
    pub fn open(&mut self, key: StreamKey) -> bool {
        if self.is_open(&key) {
            tracing::debug!(stream = %key, "push connection already open");
            return false;
        }
        if self.root.is_cancelled() {
            tracing::debug!(stream = %key, "stream manager shut down, not opening");
            return false;
        }
        // A closed-but-unreleased entry for this key is replaced below.
        if let Some(old) = self.connections.remove(&key) {
            self.retire(old);
        }

        // The shared connection lives as long as the session; only per-job
        // connections give up after the configured number of attempts.
        let policy = match key {
            StreamKey::All => self.policy.unbounded(),
            StreamKey::Job(_) => self.policy,
        };
        self.next_id += 1;
        let id = self.next_id;
        let cancel = self.root.child_token();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let task = ConnectionTask {
            id,
            key: key.clone(),
            transport: Arc::clone(&self.transport),
            policy,
            events: self.events_tx.clone(),
            state: state_tx,
            cancel: cancel.clone(),
        };
        let handle = tokio::spawn(task.run());
        tracing::debug!(stream = %key, conn = id, "opening push connection");
        self.connections.insert(
            key,
            Connection {
                id,
                cancel,
                state: state_rx,
                task: handle,
            },
        );
        true
    }

    /// Close the connection for `key`. Returns whether one was tracked.
    ///
    /// Nothing the connection produced is delivered after this returns.
    pub fn close(&mut self, key: &StreamKey) -> bool {
        match self.connections.remove(key) {
            Some(conn) => {
                tracing::debug!(stream = %key, conn = conn.id, "closing push connection");
                self.retire(conn);
                true
            }
            None => false,
        }
    }

    fn retire(&mut self, conn: Connection) {
        conn.cancel.cancel();
        self.closing.retain(|h| !h.is_finished());
        self.closing.push(conn.task);
    }

    /// Whether a connection for `key` is tracked and not yet closed.
    pub fn is_open(&self, key: &StreamKey) -> bool {
        self.connections
            .get(key)
            .is_some_and(|c| c.state() != ConnectionState::Closed)
    }

    pub fn state(&self, key: &StreamKey) -> Option<ConnectionState> {
        self.connections.get(key).map(Connection::state)
    }

    /// Number of tracked connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &StreamKey> + '_ {
        self.connections.keys()
    }

    /// Wait for the next event from a tracked connection.
    ///
    /// Returns `None` once no connection is tracked and nothing deliverable
    /// is queued. Events from connections that were closed or replaced are
    /// discarded. A connection's `Closed` report releases its entry.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        loop {
            if self.connections.is_empty() {
                // Anything still queued belongs to retired connections.
                while self.events_rx.try_recv().is_ok() {}
                return None;
            }
            let (id, ev) = self.events_rx.recv().await?;
            let current = self.connections.get(ev.key()).is_some_and(|c| c.id == id);
            if !current {
                tracing::trace!(stream = %ev.key(), conn = id, "dropping event from retired connection");
                continue;
            }
            if let StreamEvent::Closed { key } = &ev {
                self.connections.remove(key);
                tracing::debug!(stream = %key, conn = id, "push connection released");
            }
            return Some(ev);
        }
    }

    /// Close every connection and wait for all of their tasks, including
    /// ones closed earlier, to finish.
    pub async fn shutdown(&mut self) {
        self.root.cancel();
        let count = self.connections.len();
        let tracked = self.connections.drain().map(|(key, conn)| (Some(key), conn.task));
        let retired = self.closing.drain(..).map(|task| (None, task));
        let tasks: Vec<_> = tracked.chain(retired).collect();
        for (key, task) in tasks {
            if let Err(e) = task.await {
                tracing::debug!(stream = ?key, "push connection task ended abnormally: {}", e);
            }
        }
        while self.events_rx.try_recv().is_ok() {}
        tracing::info!("stream manager shut down, {} connection(s) closed", count);
    }
}

impl<T> Drop for StreamManager<T> {
    fn drop(&mut self) {
        self.root.cancel();
        for conn in self.connections.values() {
            conn.task.abort();
        }
        for task in &self.closing {
            task.abort();
        }
    }
}
