//! Job status as reported by the download service.

use serde::{Deserialize, Serialize};

/// Server-authoritative job status.
///
/// The client never enforces transition legality; whatever the service
/// reports is applied. Unrecognised values deserialize to `Unknown` so a new
/// server-side state does not turn every event into a malformed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Queued,
    Starting,
    Downloading,
    Paused,
    Completed,
    Failed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub const ALL: [JobStatus; 9] = [
        JobStatus::Pending,
        JobStatus::Queued,
        JobStatus::Starting,
        JobStatus::Downloading,
        JobStatus::Paused,
        JobStatus::Completed,
        JobStatus::Failed,
        JobStatus::Cancelled,
        JobStatus::Unknown,
    ];

    /// No further transition occurs from a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Queued => "QUEUED",
            JobStatus::Starting => "STARTING",
            JobStatus::Downloading => "DOWNLOADING",
            JobStatus::Paused => "PAUSED",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
            JobStatus::Cancelled => "CANCELLED",
            JobStatus::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// The set of statuses counted as "in flight".
///
/// Which statuses belong here changed as the service evolved (`PENDING` and
/// `STARTING` early on, `QUEUED` later), so the set is configuration rather
/// than a hard-coded list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveSet(Vec<JobStatus>);

impl ActiveSet {
    pub fn new(statuses: impl IntoIterator<Item = JobStatus>) -> Self {
        let mut v: Vec<JobStatus> = statuses.into_iter().collect();
        v.sort();
        v.dedup();
        Self(v)
    }

    pub fn contains(&self, status: JobStatus) -> bool {
        self.0.contains(&status)
    }

    pub fn statuses(&self) -> &[JobStatus] {
        &self.0
    }
}

impl Default for ActiveSet {
    fn default() -> Self {
        Self::new([
            JobStatus::Pending,
            JobStatus::Queued,
            JobStatus::Starting,
            JobStatus::Downloading,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        let terminal: Vec<_> = JobStatus::ALL
            .iter()
            .copied()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(
            terminal,
            vec![JobStatus::Completed, JobStatus::Failed, JobStatus::Cancelled]
        );
    }

    #[test]
    fn wire_names_are_screaming_case() {
        assert_eq!(
            serde_json::to_string(&JobStatus::Downloading).unwrap(),
            "\"DOWNLOADING\""
        );
        let s: JobStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(s, JobStatus::Cancelled);
    }

    #[test]
    fn unrecognised_status_is_unknown() {
        let s: JobStatus = serde_json::from_str("\"VERIFYING\"").unwrap();
        assert_eq!(s, JobStatus::Unknown);
        assert!(!s.is_terminal());
    }

    #[test]
    fn active_set_default_and_dedup() {
        let set = ActiveSet::default();
        assert!(set.contains(JobStatus::Pending));
        assert!(set.contains(JobStatus::Queued));
        assert!(set.contains(JobStatus::Downloading));
        assert!(!set.contains(JobStatus::Paused));

        let set = ActiveSet::new([JobStatus::Queued, JobStatus::Queued]);
        assert_eq!(set.statuses(), &[JobStatus::Queued]);
    }
}
