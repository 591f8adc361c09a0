//! `dlsync status` – show every job with the status counts.

use anyhow::Result;
use dlsync_core::config::SyncConfig;
use dlsync_core::format::{format_bytes, format_duration, format_speed};
use dlsync_core::registry::{display_order, Registry};
use dlsync_core::{JobRecord, JobStatus, Stats};

pub async fn run_status(cfg: &SyncConfig) -> Result<()> {
    let mut session = super::connect(cfg)?;
    session.load_snapshot().await;
    print_table(session.registry(), session.stats());
    Ok(())
}

pub(super) fn print_table(registry: &Registry, stats: Stats) {
    println!("{}", stats_line(stats));
    if registry.is_empty() {
        println!("No downloads.");
        return;
    }
    println!(
        "{:<12} {:<12} {:>6} {:>18} {:>12} {:>8}  {}",
        "ID", "STATUS", "PCT", "SIZE", "SPEED", "ETA", "NAME"
    );
    for job in display_order(registry) {
        println!("{}", job_line(job));
    }
}

pub(super) fn stats_line(stats: Stats) -> String {
    format!(
        "total {}  active {}  completed {}  failed {}",
        stats.total, stats.active, stats.completed, stats.failed
    )
}

pub(super) fn job_line(job: &JobRecord) -> String {
    let size = if job.total_size > 0 {
        format!(
            "{} / {}",
            format_bytes(job.downloaded_size),
            format_bytes(job.total_size)
        )
    } else {
        format_bytes(job.downloaded_size)
    };
    let active = job.status == JobStatus::Downloading;
    let speed = if active {
        format_speed(job.speed)
    } else {
        "-".to_string()
    };
    let eta = if active && job.time_remaining > 0 {
        format_duration(job.time_remaining)
    } else {
        "-".to_string()
    };
    let mut line = format!(
        "{:<12} {:<12} {:>5.1}% {:>18} {:>12} {:>8}  {}",
        job.id,
        job.status,
        job.progress,
        size,
        speed,
        eta,
        job.display_name()
    );
    if let Some(err) = job.error.as_deref().filter(|_| job.status == JobStatus::Failed) {
        line.push_str(&format!("  ({err})"));
    }
    line
}
