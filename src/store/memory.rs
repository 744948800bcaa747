//! In-memory store
//!
//! Holds everything in process memory. Reads and writes can be made to fail on demand,
//! which makes it the store of choice for exercising error paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CatalogSource, PersistenceError, ProgressStore};
use crate::catalog::{Category, Tutorial};
use crate::progress::ProgressRecord;

/// Store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tutorials: RwLock<Vec<Tutorial>>,
    categories: RwLock<Vec<Category>>,
    /// Records per user, one per tutorial
    progress: RwLock<HashMap<String, Vec<ProgressRecord>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create a store serving the given catalog
    pub fn with_catalog(tutorials: Vec<Tutorial>, categories: Vec<Category>) -> Self {
        Self {
            tutorials: RwLock::new(tutorials),
            categories: RwLock::new(categories),
            ..Default::default()
        }
    }

    /// Make every read fail until switched off
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write fail until switched off
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful progress writes
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Replace the catalog
    pub async fn set_catalog(&self, tutorials: Vec<Tutorial>, categories: Vec<Category>) {
        *self.tutorials.write().await = tutorials;
        *self.categories.write().await = categories;
    }

    /// Raw records stored for a user
    pub async fn records_for(&self, user_id: &str) -> Vec<ProgressRecord> {
        self.progress.read().await.get(user_id).cloned().unwrap_or_default()
    }

    fn check_reads(&self) -> Result<(), PersistenceError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable("reads disabled".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for MemoryStore {
    async fn list_tutorials(&self) -> Result<Vec<Tutorial>, PersistenceError> {
        self.check_reads()?;
        Ok(self.tutorials.read().await.clone())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, PersistenceError> {
        self.check_reads()?;
        Ok(self.categories.read().await.clone())
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn fetch_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>, PersistenceError> {
        self.check_reads()?;
        Ok(self.records_for(user_id).await)
    }

    async fn upsert_progress(
        &self,
        user_id: &str,
        record: &ProgressRecord,
    ) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable("writes disabled".into()));
        }

        let mut progress = self.progress.write().await;
        let records = progress.entry(user_id.to_string()).or_default();
        match records.iter_mut().find(|r| r.tutorial_id == record.tutorial_id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
