//! `dlsync add <url> -o <dir>` – start a new download.

use anyhow::Result;
use dlsync_core::config::SyncConfig;
use dlsync_core::StartRequest;

pub async fn run_add(cfg: &SyncConfig, url: &str, output: &str, filename: Option<&str>) -> Result<()> {
    let mut session = super::connect(cfg)?;
    let mut request = StartRequest::new(url, output);
    if let Some(name) = filename {
        request = request.with_filename(name);
    }
    let job = session.start(request).await?;
    println!("Started job {} ({})", job.id, job.status);
    session.shutdown().await;
    Ok(())
}
