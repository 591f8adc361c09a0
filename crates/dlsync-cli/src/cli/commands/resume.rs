//! `dlsync resume <id>` – resume a paused job.

use anyhow::Result;
use dlsync_core::config::SyncConfig;

pub async fn run_resume(cfg: &SyncConfig, id: &str) -> Result<()> {
    let mut session = super::connect(cfg)?;
    session.resume(id).await?;
    session.shutdown().await;
    println!("Resumed job {id}");
    Ok(())
}
