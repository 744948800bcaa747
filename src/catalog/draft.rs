//! Admin-side drafts for tutorials and categories
//!
//! Drafts are what an editor submits. They are validated and turned into catalog
//! entries before being handed to a store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::model::{Category, Difficulty, Tags, Tutorial};
use super::slug::slugify;

/// A draft rejected before persistence
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The draft references a category that does not exist
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

/// Editable tutorial fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TutorialDraft {
    pub title: String,
    /// Explicit slug; derived from the title when absent or blank
    #[serde(default)]
    pub slug: Option<String>,
    pub description: String,
    pub content: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TutorialDraft {
    /// The slug this draft will be stored under
    pub fn effective_slug(&self) -> String {
        match self.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => slugify(&self.title),
        }
    }

    /// Validate the draft and build the tutorial.
    ///
    /// When `existing` is given the tutorial keeps its id and creation time.
    pub fn into_tutorial(
        self,
        existing: Option<&Tutorial>,
        now: DateTime<Utc>,
    ) -> Result<Tutorial, ValidationError> {
        require("title", &self.title)?;
        require("description", &self.description)?;
        require("content", &self.content)?;

        let slug = self.effective_slug();
        require("slug", &slug)?;

        let (id, created_at) = match existing {
            Some(t) => (t.id.clone(), t.created_at),
            None => (Uuid::new_v4().to_string(), now),
        };

        Ok(Tutorial {
            id,
            title: self.title.trim().to_string(),
            slug,
            description: self.description.trim().to_string(),
            content: self.content,
            video_url: non_blank(self.video_url),
            category_id: non_blank(self.category_id),
            difficulty: self.difficulty,
            duration: self.duration,
            tags: Tags::from(self.tags),
            created_at,
            updated_at: now,
        })
    }
}

/// Editable category fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CategoryDraft {
    /// Validate the draft and build the category
    pub fn into_category(self, existing: Option<&Category>) -> Result<Category, ValidationError> {
        require("name", &self.name)?;

        let slug = match self.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => slugify(&self.name),
        };
        require("slug", &slug)?;

        Ok(Category {
            id: existing.map_or_else(|| Uuid::new_v4().to_string(), |c| c.id.clone()),
            name: self.name.trim().to_string(),
            slug,
            description: non_blank(self.description),
        })
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() { Err(ValidationError::MissingField(field)) } else { Ok(()) }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::model::fixtures;
    use pretty_assertions::assert_eq;

    fn draft(title: &str) -> TutorialDraft {
        TutorialDraft {
            title: title.into(),
            description: "Learn the basics".into(),
            content: "# Basics".into(),
            ..Default::default()
        }
    }

    #[test]
    fn slug_is_derived_from_title() {
        let tutorial = draft("Premiers pas avec Élixir").into_tutorial(None, Utc::now()).unwrap();
        assert_eq!(tutorial.slug, "premiers-pas-avec-elixir");
    }

    #[test]
    fn explicit_slug_wins() {
        let mut d = draft("Anything");
        d.slug = Some("custom-slug".into());
        assert_eq!(d.into_tutorial(None, Utc::now()).unwrap().slug, "custom-slug");
    }

    #[test]
    fn blank_explicit_slug_falls_back_to_title() {
        let mut d = draft("Git Basics");
        d.slug = Some("   ".into());
        assert_eq!(d.effective_slug(), "git-basics");
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        let mut d = draft("Title");
        d.content = "  ".into();
        assert_eq!(
            d.into_tutorial(None, Utc::now()),
            Err(ValidationError::MissingField("content"))
        );

        assert_eq!(
            draft("").into_tutorial(None, Utc::now()),
            Err(ValidationError::MissingField("title"))
        );
    }

    #[test]
    fn title_without_slug_characters_is_rejected() {
        assert_eq!(
            draft("!!!").into_tutorial(None, Utc::now()),
            Err(ValidationError::MissingField("slug"))
        );
    }

    #[test]
    fn update_keeps_identity_and_creation_time() {
        let existing = fixtures::tutorial("t-42", "Old title");
        let now = Utc::now();

        let updated = draft("New title").into_tutorial(Some(&existing), now).unwrap();

        assert_eq!(updated.id, "t-42");
        assert_eq!(updated.created_at, existing.created_at);
        assert_eq!(updated.updated_at, now);
    }

    #[test]
    fn tags_are_deduplicated() {
        let mut d = draft("Tags");
        d.tags = vec!["rust".into(), " rust ".into(), "cli".into()];
        let tutorial = d.into_tutorial(None, Utc::now()).unwrap();
        assert_eq!(tutorial.tags.iter().collect::<Vec<_>>(), vec!["rust", "cli"]);
    }

    #[test]
    fn category_draft_requires_name() {
        let d = CategoryDraft { name: " ".into(), ..Default::default() };
        assert_eq!(d.into_category(None), Err(ValidationError::MissingField("name")));
    }

    #[test]
    fn category_draft_derives_slug() {
        let d = CategoryDraft {
            name: "Base de données".into(),
            description: Some("".into()),
            ..Default::default()
        };
        let category = d.into_category(None).unwrap();
        assert_eq!(category.slug, "base-de-donnees");
        assert!(category.description.is_none());
    }
}
