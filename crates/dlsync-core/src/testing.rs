//! In-memory fakes of the download service for unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;

use crate::api::{ApiError, DownloadApi};
use crate::job::{JobRecord, StartRequest};
use crate::stream::{EventByteStream, EventTransport, StreamKey};

/// REST fake: serves a fixed snapshot, records every call, fails the
/// operations it is told to with HTTP 500.
#[derive(Default)]
pub(crate) struct FakeApi {
    snapshot: Mutex<Vec<JobRecord>>,
    created: Mutex<VecDeque<JobRecord>>,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub(crate) fn with_snapshot(records: Vec<JobRecord>) -> Arc<Self> {
        let api = Self::default();
        *api.snapshot.lock().unwrap() = records;
        Arc::new(api)
    }

    /// Make `op` ("list", "create", "remove", "pause", "resume") fail.
    pub(crate) fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub(crate) fn recover(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    /// Record returned by the next `create`.
    pub(crate) fn respond_to_create(&self, record: JobRecord) {
        self.created.lock().unwrap().push_back(record);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn call(&self, op: &'static str, arg: &str) -> Result<(), ApiError> {
        let entry = if arg.is_empty() {
            op.to_string()
        } else {
            format!("{op} {arg}")
        };
        self.calls.lock().unwrap().push(entry);
        if self.failing.lock().unwrap().contains(op) {
            return Err(ApiError::Http { status: 500 });
        }
        Ok(())
    }
}

impl DownloadApi for FakeApi {
    async fn list(&self) -> Result<Vec<JobRecord>, ApiError> {
        self.call("list", "")?;
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn create(&self, request: &StartRequest) -> Result<JobRecord, ApiError> {
        self.call("create", &request.url)?;
        self.created
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(ApiError::Http { status: 500 })
    }

    async fn remove(&self, id: &str) -> Result<(), ApiError> {
        self.call("remove", id)
    }

    async fn pause(&self, id: &str) -> Result<(), ApiError> {
        self.call("pause", id)
    }

    async fn resume(&self, id: &str) -> Result<(), ApiError> {
        self.call("resume", id)
    }
}

/// Decrements the live-stream counter when a body stream is dropped.
struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Push transport fake. Each `open` pops a scripted failure status for the
/// key if there is one, otherwise hands out an endless body fed by
/// [`push`](Self::push).
#[derive(Default)]
pub(crate) struct FakeTransport {
    opens: Mutex<Vec<StreamKey>>,
    failures: Mutex<HashMap<StreamKey, VecDeque<u16>>>,
    senders: Mutex<HashMap<StreamKey, mpsc::UnboundedSender<Result<Vec<u8>, ApiError>>>>,
    live: Arc<AtomicUsize>,
}

impl FakeTransport {
    pub(crate) fn fail_with(&self, key: StreamKey, statuses: &[u16]) {
        self.failures
            .lock()
            .unwrap()
            .insert(key, statuses.iter().copied().collect());
    }

    /// Send raw SSE text down the most recent body opened for `key`.
    pub(crate) fn push(&self, key: &StreamKey, chunk: &str) {
        let senders = self.senders.lock().unwrap();
        senders[key]
            .send(Ok(chunk.as_bytes().to_vec()))
            .expect("body stream dropped");
    }

    /// End the most recent body opened for `key`, as a server dropping the
    /// connection would.
    pub(crate) fn end(&self, key: &StreamKey) {
        self.senders.lock().unwrap().remove(key);
    }

    /// Send one `progress` event carrying `record`.
    pub(crate) fn push_record(&self, key: &StreamKey, record: &JobRecord) {
        let data = serde_json::to_string(record).unwrap();
        self.push(key, &format!("event: progress\ndata: {data}\n\n"));
    }

    /// Number of `open` calls so far, for any key.
    pub(crate) fn opens(&self) -> usize {
        self.opens.lock().unwrap().len()
    }

    pub(crate) fn opens_for(&self, key: &StreamKey) -> usize {
        self.opens.lock().unwrap().iter().filter(|k| *k == key).count()
    }

    /// Bodies handed out and not yet dropped.
    pub(crate) fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Poll until `live()` equals `want`.
    pub(crate) async fn wait_live(&self, want: usize) {
        for _ in 0..400 {
            if self.live() == want {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("expected {want} live streams, have {}", self.live());
    }
}

impl EventTransport for FakeTransport {
    async fn open(&self, key: &StreamKey) -> Result<EventByteStream, ApiError> {
        self.opens.lock().unwrap().push(key.clone());
        let failure = self
            .failures
            .lock()
            .unwrap()
            .get_mut(key)
            .and_then(VecDeque::pop_front);
        if let Some(status) = failure {
            return Err(ApiError::Http { status });
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.lock().unwrap().insert(key.clone(), tx);
        self.live.fetch_add(1, Ordering::SeqCst);
        let guard = LiveGuard(Arc::clone(&self.live));
        let body = futures_util::stream::unfold((rx, guard), |(mut rx, guard)| async move {
            rx.recv().await.map(|item| (item, (rx, guard)))
        });
        Ok(body.boxed())
    }
}
