//! Presentation order: derived from the registry on demand, never stored.

use std::cmp::Ordering;

use super::Registry;
use crate::job::{JobRecord, JobStatus};

/// Lower sorts first: transferring jobs on top, finished ones at the bottom.
pub fn status_priority(status: JobStatus) -> u8 {
    match status {
        JobStatus::Downloading => 1,
        JobStatus::Pending | JobStatus::Queued => 2,
        JobStatus::Starting => 3,
        JobStatus::Paused => 4,
        JobStatus::Completed => 5,
        JobStatus::Failed | JobStatus::Cancelled => 6,
        JobStatus::Unknown => 7,
    }
}

/// Records sorted by status priority, then newest start time first.
///
/// Start times are compared as strings; the service sends ISO-8601, which
/// orders lexicographically. Records without a start time sort last within
/// their priority band.
pub fn display_order(registry: &Registry) -> Vec<&JobRecord> {
    let mut jobs: Vec<&JobRecord> = registry.iter().collect();
    sort_for_display(&mut jobs);
    jobs
}

/// In-place form of [`display_order`] for records held outside a registry.
pub fn sort_for_display(jobs: &mut [&JobRecord]) {
    jobs.sort_by(|a, b| {
        status_priority(a.status)
            .cmp(&status_priority(b.status))
            .then_with(|| newest_first(a.start_time.as_deref(), b.start_time.as_deref()))
    });
}

fn newest_first(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
