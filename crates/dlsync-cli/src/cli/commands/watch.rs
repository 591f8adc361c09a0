//! `dlsync watch` – follow live progress until Ctrl-C.

use anyhow::Result;
use dlsync_core::config::SyncConfig;
use dlsync_core::RegistryView;
use tokio::sync::watch;

use super::status::{job_line, print_table, stats_line};

pub async fn run_watch(cfg: &SyncConfig) -> Result<()> {
    let mut session = super::connect(cfg)?;
    session.bootstrap().await;
    print_table(session.registry(), session.stats());
    let updates = session.subscribe();
    tracing::info!(strategy = ?session.strategy(), "watching downloads");

    let printer = tokio::spawn(print_updates(updates));
    session
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;
    printer.abort();
    println!("Stopped.");
    Ok(())
}

/// Print the stats line and every non-terminal job on each registry change.
async fn print_updates(mut updates: watch::Receiver<RegistryView>) {
    while updates.changed().await.is_ok() {
        let view = updates.borrow_and_update().clone();
        println!();
        println!("{}", stats_line(view.stats));
        for job in view.display_order().into_iter().filter(|j| !j.is_terminal()) {
            println!("{}", job_line(job));
        }
    }
}
