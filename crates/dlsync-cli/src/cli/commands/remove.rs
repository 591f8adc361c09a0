//! `dlsync remove <id>` – cancel a job and drop it from the service.

use anyhow::{bail, Result};
use dlsync_core::config::SyncConfig;

/// Loads the job list first so an unknown id is reported instead of sent.
pub async fn run_remove(cfg: &SyncConfig, id: &str) -> Result<()> {
    let mut session = super::connect(cfg)?;
    session.load_snapshot().await;
    if !session.registry().contains(id) {
        bail!("no job with id {id}");
    }
    session.cancel(id).await?;
    println!("Removed job {id}");
    Ok(())
}
