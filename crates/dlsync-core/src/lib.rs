pub mod api;
pub mod config;
pub mod format;
pub mod job;
pub mod logging;
pub mod registry;
pub mod retry;
pub mod session;
pub mod stats;
pub mod stream;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiError, DownloadApi, HttpClient};
pub use config::SyncConfig;
pub use job::{JobId, JobRecord, JobStatus, StartRequest};
pub use session::{Action, CommandError, RegistryView, SessionOptions, SyncSession};
pub use stats::Stats;
pub use stream::{StreamKey, StreamStrategy};
