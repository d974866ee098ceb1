//! The authoritative identity → record mapping.
//!
//! All mutation goes through [`Registry::initialize`], [`Registry::upsert`],
//! [`Registry::update_status`] and [`Registry::remove`]. Callers only ever get
//! shared references to records; the `selected` flag is owned by the
//! [`SelectionController`](crate::selection::SelectionController).

use std::collections::HashMap;

use tracing::debug;

use crate::model::{ContainerRecord, ContainerStatus};

struct Entry {
    record: ContainerRecord,
    first_seen: u64,
}

#[derive(Default)]
pub struct Registry {
    records: HashMap<String, Entry>,
    next_seq: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole set. Later duplicates of an identity update the earlier
    /// entry in place and keep its first-seen position.
    pub fn initialize(&mut self, records: Vec<ContainerRecord>) {
        self.records.clear();
        self.next_seq = 0;
        for mut record in records {
            record.selected = false;
            match self.records.get_mut(&record.identity) {
                Some(entry) => entry.record = record,
                None => self.insert(record),
            }
        }
    }

    /// Create a record for an identity first seen through an event, or update
    /// the existing one. Returns true if a new record was created.
    pub fn upsert(&mut self, identity: &str, handle: &str, status: ContainerStatus) -> bool {
        if let Some(entry) = self.records.get_mut(identity) {
            entry.record.status = status;
            if !handle.is_empty() {
                entry.record.handle = handle.to_string();
            }
            return false;
        }
        self.insert(ContainerRecord::new(identity, handle, status));
        true
    }

    /// Set the status of a known identity. Unknown identities are a logged no-op.
    pub fn update_status(&mut self, identity: &str, status: ContainerStatus) -> bool {
        match self.records.get_mut(identity) {
            Some(entry) => {
                entry.record.status = status;
                true
            }
            None => {
                debug!(identity, %status, "status update for unknown container");
                false
            }
        }
    }

    /// Delete a record. The caller must re-validate the selection afterwards.
    pub fn remove(&mut self, identity: &str) -> Option<ContainerRecord> {
        self.records.remove(identity).map(|e| e.record)
    }

    /// Classify the engine's raw state flag.
    pub fn status_of(raw_state: &str) -> ContainerStatus {
        ContainerStatus::from_engine_state(raw_state)
    }

    pub fn get(&self, identity: &str) -> Option<&ContainerRecord> {
        self.records.get(identity).map(|e| &e.record)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.records.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Display order: running containers first, then by first-seen order.
    pub fn ordered(&self) -> Vec<&ContainerRecord> {
        let mut entries: Vec<&Entry> = self.records.values().collect();
        entries.sort_by_key(|e| (!e.record.status.is_running(), e.first_seen));
        entries.into_iter().map(|e| &e.record).collect()
    }

    /// First record in display order.
    pub fn first(&self) -> Option<&ContainerRecord> {
        self.records
            .values()
            .min_by_key(|e| (!e.record.status.is_running(), e.first_seen))
            .map(|e| &e.record)
    }

    /// Mark exactly `identity` as selected and clear every other flag.
    pub(crate) fn mark_selected(&mut self, identity: Option<&str>) {
        for (key, entry) in self.records.iter_mut() {
            entry.record.selected = Some(key.as_str()) == identity;
        }
    }

    fn insert(&mut self, record: ContainerRecord) {
        let first_seen = self.next_seq;
        self.next_seq += 1;
        self.records
            .insert(record.identity.clone(), Entry { record, first_seen });
    }
}
