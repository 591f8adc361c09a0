//! CLI command handlers, one file per command.

mod add;
mod pause;
mod remove;
mod resume;
mod status;
mod watch;

use anyhow::{Context, Result};
use dlsync_core::config::SyncConfig;
use dlsync_core::{HttpClient, SyncSession};

pub use add::run_add;
pub use pause::run_pause;
pub use remove::run_remove;
pub use resume::run_resume;
pub use status::run_status;
pub use watch::run_watch;

type Session = SyncSession<HttpClient, HttpClient>;

fn connect(cfg: &SyncConfig) -> Result<Session> {
    SyncSession::connect(cfg).with_context(|| format!("cannot reach {}", cfg.api_base_url))
}
