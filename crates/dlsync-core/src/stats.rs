//! Derived job counts (total / active / completed / failed).
//!
//! Always computed from the registry; nothing stores a count that could drift
//! from the records it describes.

use serde::Serialize;

use crate::job::{ActiveSet, JobStatus};
use crate::registry::Registry;

/// Counts shown in the header of the job list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Pure function from registry contents to [`Stats`].
#[derive(Debug, Clone, Default)]
pub struct StatsAggregator {
    active: ActiveSet,
    failed_includes_cancelled: bool,
}

impl StatsAggregator {
    pub fn new(active: ActiveSet, failed_includes_cancelled: bool) -> Self {
        Self {
            active,
            failed_includes_cancelled,
        }
    }

    pub fn active_set(&self) -> &ActiveSet {
        &self.active
    }

    pub fn compute(&self, registry: &Registry) -> Stats {
        let mut stats = Stats {
            total: registry.len(),
            ..Stats::default()
        };
        for job in registry.iter() {
            if self.active.contains(job.status) {
                stats.active += 1;
            }
            match job.status {
                JobStatus::Completed => stats.completed += 1,
                JobStatus::Failed => stats.failed += 1,
                JobStatus::Cancelled if self.failed_includes_cancelled => stats.failed += 1,
                _ => {}
            }
        }
        stats
    }

    /// Number of records currently in `status`.
    pub fn count(registry: &Registry, status: JobStatus) -> usize {
        registry.iter().filter(|j| j.status == status).count()
    }
}
