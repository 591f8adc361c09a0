//! One tracked download, as carried by snapshots and push events.

use serde::{Deserialize, Serialize};

use super::JobStatus;

/// Job identifier assigned by the download service. Opaque to the client.
pub type JobId = String;

/// Latest known state of a single job.
///
/// The service omits several fields depending on the endpoint (the stream
/// payload never carries `url`/`outputPath`, older builds omit `version`), so
/// everything except `id` and `status` has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: JobId,
    #[serde(default)]
    pub url: String,
    /// Empty or absent until the service has detected a filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default)]
    pub output_path: String,
    pub status: JobStatus,
    /// Percent complete in [0, 100].
    #[serde(default)]
    pub progress: f64,
    /// 0 while the size is still unknown.
    #[serde(default)]
    pub total_size: u64,
    #[serde(default)]
    pub downloaded_size: u64,
    /// Bytes per second; 0 when not transferring.
    #[serde(default)]
    pub speed: u64,
    /// Seconds; only meaningful while active.
    #[serde(default)]
    pub time_remaining: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Per-job update counter assigned by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

impl JobRecord {
    /// Minimal record with the given id and status; everything else defaulted.
    pub fn new(id: impl Into<JobId>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            url: String::new(),
            filename: None,
            output_path: String::new(),
            status,
            progress: 0.0,
            total_size: 0,
            downloaded_size: 0,
            speed: 0,
            time_remaining: 0,
            start_time: None,
            end_time: None,
            error: None,
            version: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Filename if detected, otherwise the last path segment of the URL.
    pub fn display_name(&self) -> &str {
        match self.filename.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self
                .url
                .rsplit('/')
                .find(|s| !s.is_empty())
                .unwrap_or(self.id.as_str()),
        }
    }
}
