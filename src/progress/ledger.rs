//! The per-user progress ledger
//!
//! An in-memory snapshot of a user's progress records, keyed by tutorial. The ledger
//! itself is never edited in place: it is rebuilt from whatever the store returns.

use std::collections::HashMap;

use super::model::{ProgressRecord, ProgressStatus};

/// Snapshot of one user's progress records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressLedger {
    records: HashMap<String, ProgressRecord>,
}

impl ProgressLedger {
    /// Build a ledger from store records.
    ///
    /// At most one record per tutorial is kept; when a store returns several, the most
    /// advanced (then most recent) wins. Not-started rows are dropped.
    pub fn from_records(records: impl IntoIterator<Item = ProgressRecord>) -> Self {
        let mut by_tutorial: HashMap<String, ProgressRecord> = HashMap::new();

        for record in records {
            if record.status == ProgressStatus::NotStarted {
                continue;
            }
            let record = record.normalized();
            match by_tutorial.get(&record.tutorial_id) {
                Some(existing) if !record.supersedes(existing) => {}
                _ => {
                    by_tutorial.insert(record.tutorial_id.clone(), record);
                }
            }
        }

        Self { records: by_tutorial }
    }

    /// Look up the record for a tutorial
    pub fn get(&self, tutorial_id: &str) -> Option<&ProgressRecord> {
        self.records.get(tutorial_id)
    }

    /// Status for a tutorial, `NotStarted` when there is no record
    pub fn status(&self, tutorial_id: &str) -> ProgressStatus {
        self.get(tutorial_id).map_or(ProgressStatus::NotStarted, |r| r.status)
    }

    /// All records, in no particular order
    pub fn records(&self) -> impl Iterator<Item = &ProgressRecord> {
        self.records.values()
    }

    /// Completed records
    pub fn completed(&self) -> impl Iterator<Item = &ProgressRecord> {
        self.records().filter(|r| r.is_completed())
    }

    /// In-progress records
    pub fn in_progress(&self) -> impl Iterator<Item = &ProgressRecord> {
        self.records().filter(|r| r.is_in_progress())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
