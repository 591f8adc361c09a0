//! Merge incoming job records into the registry.

use serde::{Deserialize, Serialize};

use super::Registry;
use crate::job::JobRecord;

/// Where a record seen for the first time goes in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsertPosition {
    #[default]
    Prepend,
    Append,
}

/// How the per-job `version` counter is used when merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionPolicy {
    /// Apply every record in arrival order.
    #[default]
    AcceptAll,
    /// Drop a record whose version is lower than the stored one. Records
    /// without a version on either side are always applied.
    DiscardStale,
}

/// What a merge did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Inserted,
    Replaced,
    /// Identical to the stored record; nothing written.
    Unchanged,
    /// Older than the stored record under [`VersionPolicy::DiscardStale`].
    Stale,
}

impl Applied {
    /// Whether the registry contents changed.
    pub fn changed(self) -> bool {
        matches!(self, Applied::Inserted | Applied::Replaced)
    }
}

/// Insert-or-replace by id. The only writer of job state besides the
/// confirmed removal on cancel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    insert_at: InsertPosition,
    versions: VersionPolicy,
}

impl Reconciler {
    pub fn new(insert_at: InsertPosition, versions: VersionPolicy) -> Self {
        Self {
            insert_at,
            versions,
        }
    }

    pub fn insert_position(&self) -> InsertPosition {
        self.insert_at
    }

    pub fn version_policy(&self) -> VersionPolicy {
        self.versions
    }

    /// Merge one record. Applying the same record twice leaves the registry
    /// exactly as applying it once.
    pub fn apply(&self, registry: &mut Registry, record: JobRecord) -> Applied {
        if let Some(current) = registry.get(&record.id) {
            if *current == record {
                return Applied::Unchanged;
            }
            if self.is_stale(current, &record) {
                tracing::debug!(
                    job = %record.id,
                    incoming = ?record.version,
                    stored = ?current.version,
                    "discarding stale job update"
                );
                return Applied::Stale;
            }
        }
        match registry.upsert(record, self.insert_at) {
            Some(_) => Applied::Replaced,
            None => Applied::Inserted,
        }
    }

    /// Overwrite the whole registry with an authoritative snapshot.
    ///
    /// Records keep the order the service returned them in; a duplicate id
    /// later in the list replaces the earlier one.
    pub fn replace_all(&self, registry: &mut Registry, records: impl IntoIterator<Item = JobRecord>) {
        registry.clear();
        for record in records {
            registry.upsert(record, InsertPosition::Append);
        }
    }

    /// Drop a record after the service confirmed its removal.
    pub fn remove(&self, registry: &mut Registry, id: &str) -> Option<JobRecord> {
        registry.remove(id)
    }

    fn is_stale(&self, current: &JobRecord, incoming: &JobRecord) -> bool {
        match (self.versions, current.version, incoming.version) {
            (VersionPolicy::DiscardStale, Some(stored), Some(new)) => new < stored,
            _ => false,
        }
    }
}
