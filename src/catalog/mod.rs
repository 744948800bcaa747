//! Tutorial catalog
//!
//! A read-only snapshot of tutorials and categories. The snapshot keeps the order it
//! was built with (newest first when it comes from a store) and is replaced wholesale
//! on refresh.

pub mod draft;
pub mod model;
pub mod slug;

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::store::{CatalogSource, PersistenceError};

pub use draft::{CategoryDraft, TutorialDraft, ValidationError};
pub use model::{Category, Difficulty, Tags, Tutorial, UnknownDifficulty};
pub use slug::slugify;

/// A snapshot that breaks catalog invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Duplicate tutorial slug: {0}")]
    DuplicateTutorialSlug(String),

    #[error("Duplicate category slug: {0}")]
    DuplicateCategorySlug(String),
}

/// Read-only snapshot of tutorials and categories
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tutorials: Vec<Tutorial>,
    categories: Vec<Category>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate slugs
    pub fn new(tutorials: Vec<Tutorial>, categories: Vec<Category>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for tutorial in &tutorials {
            if !seen.insert(tutorial.slug.as_str()) {
                return Err(CatalogError::DuplicateTutorialSlug(tutorial.slug.clone()));
            }
        }

        let mut seen = HashSet::new();
        for category in &categories {
            if !seen.insert(category.slug.as_str()) {
                return Err(CatalogError::DuplicateCategorySlug(category.slug.clone()));
            }
        }

        Ok(Self { tutorials, categories })
    }

    /// Fetch a fresh snapshot from a catalog source
    pub async fn fetch(source: &dyn CatalogSource) -> Result<Self, PersistenceError> {
        let tutorials = source.list_tutorials().await?;
        let categories = source.list_categories().await?;
        debug!(tutorials = tutorials.len(), categories = categories.len(), "Fetched catalog");
        Ok(Self::new(tutorials, categories)?)
    }

    /// All tutorials in snapshot order
    pub fn tutorials(&self) -> &[Tutorial] {
        &self.tutorials
    }

    /// All categories in snapshot order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Find a tutorial by id
    pub fn tutorial(&self, id: &str) -> Option<&Tutorial> {
        self.tutorials.iter().find(|t| t.id == id)
    }

    /// Find a tutorial by slug
    pub fn find_by_slug(&self, slug: &str) -> Option<&Tutorial> {
        self.tutorials.iter().find(|t| t.slug == slug)
    }

    /// Find a category by id
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Find a category by slug
    pub fn find_category_by_slug(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    /// Category a tutorial belongs to, if it resolves
    pub fn category_of(&self, tutorial: &Tutorial) -> Option<&Category> {
        tutorial.category_id.as_deref().and_then(|id| self.category(id))
    }

    /// The first `n` tutorials of the snapshot
    pub fn latest(&self, n: usize) -> &[Tutorial] {
        &self.tutorials[..n.min(self.tutorials.len())]
    }

    pub fn len(&self) -> usize {
        self.tutorials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tutorials.is_empty()
    }
}
