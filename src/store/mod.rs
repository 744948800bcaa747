//! Collaborator stores
//!
//! The catalog and progress ledger live outside this crate. These traits are the
//! seams: a local JSON store, an in-memory store and a hosted REST backend implement
//! them.

pub mod error;
pub mod local;
pub mod memory;
pub mod remote;

use async_trait::async_trait;

use crate::catalog::{Category, Tutorial};
use crate::progress::ProgressRecord;

pub use error::PersistenceError;
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use remote::RemoteStore;

/// Read-only source of the authoritative catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// All tutorials, newest first
    async fn list_tutorials(&self) -> Result<Vec<Tutorial>, PersistenceError>;

    /// All categories
    async fn list_categories(&self) -> Result<Vec<Category>, PersistenceError>;
}

/// Source of truth for users' progress records
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// All records stored for a user
    async fn fetch_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>, PersistenceError>;

    /// Insert or replace the user's record for `record.tutorial_id`
    async fn upsert_progress(
        &self,
        user_id: &str,
        record: &ProgressRecord,
    ) -> Result<(), PersistenceError>;
}
