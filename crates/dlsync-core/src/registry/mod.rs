//! In-memory job registry: one record per job id, the single piece of mutable
//! shared state in a session.
//!
//! Writers live in this crate (the reconciler and the command dispatcher);
//! everything outside gets read-only access.

mod display;
mod reconcile;

use std::collections::HashMap;

use crate::job::{JobId, JobRecord};

pub use display::{display_order, sort_for_display, status_priority};
pub use reconcile::{Applied, InsertPosition, Reconciler, VersionPolicy};

/// Keyed map from job id to the latest known record.
///
/// Insertion order is kept only so that the configured insert position
/// (prepend/append) is observable; it carries no other meaning.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    order: Vec<JobId>,
    records: HashMap<JobId, JobRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&JobRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &JobRecord> + '_ {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// Cloned records in insertion order.
    pub fn to_vec(&self) -> Vec<JobRecord> {
        self.iter().cloned().collect()
    }

    /// Position of `id` in insertion order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.order.iter().position(|k| k == id)
    }

    /// Insert a new record or replace an existing one in place.
    /// Returns the replaced record, if any.
    pub(crate) fn upsert(&mut self, record: JobRecord, at: InsertPosition) -> Option<JobRecord> {
        if let Some(slot) = self.records.get_mut(&record.id) {
            return Some(std::mem::replace(slot, record));
        }
        match at {
            InsertPosition::Prepend => self.order.insert(0, record.id.clone()),
            InsertPosition::Append => self.order.push(record.id.clone()),
        }
        self.records.insert(record.id.clone(), record);
        None
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<JobRecord> {
        let removed = self.records.remove(id)?;
        self.order.retain(|k| k != id);
        Some(removed)
    }

    pub(crate) fn clear(&mut self) {
        self.order.clear();
        self.records.clear();
    }
}
