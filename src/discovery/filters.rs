//! Filter state for tutorial discovery

use tracing::debug;

use crate::catalog::{Difficulty, Tutorial};

/// Search text plus category and difficulty selection.
///
/// All set criteria must match. A filter built from an unrecognized difficulty
/// matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    search: String,
    category: Option<String>,
    difficulty: Option<Difficulty>,
    unmatchable: bool,
}

impl Filters {
    /// Filters that match every tutorial
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.set_search(term);
        self
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category = Some(category_id.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn set_category(&mut self, category_id: Option<String>) {
        self.category = category_id;
    }

    pub fn set_difficulty(&mut self, difficulty: Option<Difficulty>) {
        self.difficulty = difficulty;
        self.unmatchable = false;
    }

    /// Select a difficulty from user text. Unknown text makes the filter match nothing.
    pub fn set_difficulty_text(&mut self, text: &str) {
        match text.parse::<Difficulty>() {
            Ok(difficulty) => self.set_difficulty(Some(difficulty)),
            Err(e) => {
                debug!("{e}; filter will match nothing");
                self.difficulty = None;
                self.unmatchable = true;
            }
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    /// Whether any criterion narrows the result
    pub fn has_active_filters(&self) -> bool {
        !self.search.trim().is_empty()
            || self.category.is_some()
            || self.difficulty.is_some()
            || self.unmatchable
    }

    /// Reset to match everything
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether a tutorial passes every criterion
    pub fn matches(&self, tutorial: &Tutorial) -> bool {
        self.matcher()(tutorial)
    }

    /// A predicate with the search term normalized once
    pub(crate) fn matcher(&self) -> impl Fn(&Tutorial) -> bool + '_ {
        let needle = self.search.trim().to_lowercase();
        move |tutorial| {
            !self.unmatchable
                && tutorial.matches_search(&needle)
                && self.category.as_deref().is_none_or(|c| tutorial.in_category(c))
                && self.difficulty.is_none_or(|d| tutorial.difficulty == d)
        }
    }
}
