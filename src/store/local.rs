//! Local JSON store
//!
//! Keeps the catalog in `catalog.json` and every user's progress in `progress.json`
//! under a single data directory. Also carries the admin-side catalog writes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{CatalogSource, PersistenceError, ProgressStore};
use crate::catalog::{Category, Tutorial};
use crate::progress::ProgressRecord;

/// On-disk layout of `catalog.json`
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    tutorials: Vec<Tutorial>,
    #[serde(default)]
    categories: Vec<Category>,
}

/// On-disk layout of `progress.json`
#[derive(Debug, Default, Serialize, Deserialize)]
struct ProgressFile {
    /// Records per user id
    #[serde(default)]
    users: HashMap<String, Vec<ProgressRecord>>,
}

/// Store backed by JSON files in a data directory
#[derive(Debug)]
pub struct LocalStore {
    root: PathBuf,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl LocalStore {
    /// Create a store rooted at `root`. Files are created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), write_lock: Mutex::new(()) }
    }

    /// Data directory of this store
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn catalog_path(&self) -> PathBuf {
        self.root.join("catalog.json")
    }

    fn progress_path(&self) -> PathBuf {
        self.root.join("progress.json")
    }

    async fn load_catalog(&self) -> Result<CatalogFile, PersistenceError> {
        read_json(&self.catalog_path()).await
    }

    /// Insert a tutorial or replace the one with the same id
    pub async fn upsert_tutorial(&self, tutorial: Tutorial) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock().await;
        let mut catalog = self.load_catalog().await?;

        info!(slug = %tutorial.slug, "Saving tutorial");
        match catalog.tutorials.iter_mut().find(|t| t.id == tutorial.id) {
            Some(existing) => *existing = tutorial,
            None => catalog.tutorials.push(tutorial),
        }

        write_json(&self.catalog_path(), &catalog).await
    }

    /// Remove a tutorial by id
    pub async fn remove_tutorial(&self, id: &str) -> Result<bool, PersistenceError> {
        let _guard = self.write_lock.lock().await;
        let mut catalog = self.load_catalog().await?;

        let len_before = catalog.tutorials.len();
        catalog.tutorials.retain(|t| t.id != id);
        if catalog.tutorials.len() == len_before {
            return Ok(false);
        }

        info!(id, "Removed tutorial");
        write_json(&self.catalog_path(), &catalog).await?;
        Ok(true)
    }

    /// Insert a category or replace the one with the same id
    pub async fn upsert_category(&self, category: Category) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock().await;
        let mut catalog = self.load_catalog().await?;

        info!(slug = %category.slug, "Saving category");
        match catalog.categories.iter_mut().find(|c| c.id == category.id) {
            Some(existing) => *existing = category,
            None => catalog.categories.push(category),
        }

        write_json(&self.catalog_path(), &catalog).await
    }

    /// Remove a category by id. Tutorials in it become uncategorized.
    pub async fn remove_category(&self, id: &str) -> Result<bool, PersistenceError> {
        let _guard = self.write_lock.lock().await;
        let mut catalog = self.load_catalog().await?;

        let len_before = catalog.categories.len();
        catalog.categories.retain(|c| c.id != id);
        if catalog.categories.len() == len_before {
            return Ok(false);
        }

        for tutorial in catalog.tutorials.iter_mut().filter(|t| t.in_category(id)) {
            tutorial.category_id = None;
        }

        info!(id, "Removed category");
        write_json(&self.catalog_path(), &catalog).await?;
        Ok(true)
    }
}

#[async_trait]
impl CatalogSource for LocalStore {
    async fn list_tutorials(&self) -> Result<Vec<Tutorial>, PersistenceError> {
        let mut tutorials = self.load_catalog().await?.tutorials;
        tutorials.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tutorials)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, PersistenceError> {
        Ok(self.load_catalog().await?.categories)
    }
}

#[async_trait]
impl ProgressStore for LocalStore {
    async fn fetch_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>, PersistenceError> {
        let mut file: ProgressFile = read_json(&self.progress_path()).await?;
        Ok(file.users.remove(user_id).unwrap_or_default())
    }

    async fn upsert_progress(
        &self,
        user_id: &str,
        record: &ProgressRecord,
    ) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock().await;
        let path = self.progress_path();
        let mut file: ProgressFile = read_json(&path).await?;

        let records = file.users.entry(user_id.to_string()).or_default();
        match records.iter_mut().find(|r| r.tutorial_id == record.tutorial_id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }

        write_json(&path, &file).await
    }
}

/// Read a JSON file, yielding the default value when it does not exist yet
async fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, PersistenceError> {
    match fs::read_to_string(path).await {
        Ok(contents) => Ok(serde_json::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(?path, "No file yet, starting empty");
            Ok(T::default())
        }
        Err(e) => Err(PersistenceError::io(path, e)),
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(|e| PersistenceError::io(parent, e))?;
    }

    let contents = serde_json::to_string_pretty(value)?;
    fs::write(path, contents).await.map_err(|e| PersistenceError::io(path, e))
}
