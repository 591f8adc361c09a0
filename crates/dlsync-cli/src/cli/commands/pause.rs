//! `dlsync pause <id>` – ask the service to pause a job.

use anyhow::Result;
use dlsync_core::config::SyncConfig;

pub async fn run_pause(cfg: &SyncConfig, id: &str) -> Result<()> {
    let mut session = super::connect(cfg)?;
    session.pause(id).await?;
    println!("Paused job {id}");
    Ok(())
}
