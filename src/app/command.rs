//! Commands accepted by the command line

use std::path::PathBuf;

use clap::Subcommand;

/// A user-facing command
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List tutorials, optionally filtered
    List {
        /// Text to look for in titles, descriptions and tags
        #[arg(short, long)]
        search: Option<String>,
        /// Category slug or id
        #[arg(short, long)]
        category: Option<String>,
        /// beginner, intermediate or advanced
        #[arg(short, long)]
        difficulty: Option<String>,
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Show a tutorial
    Show {
        /// Tutorial slug
        slug: String,
    },
    /// Start a tutorial
    Start {
        /// Tutorial slug
        slug: String,
    },
    /// Mark a tutorial as completed
    Complete {
        /// Tutorial slug
        slug: String,
    },
    /// Show your learning statistics
    Stats,
    /// Sign in as a user
    Login {
        /// User identifier
        user_id: String,
    },
    /// Sign out
    Logout,
    /// Print the slug for some text
    Slug {
        /// Text to turn into a slug
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Manage the local catalog
    #[command(subcommand)]
    Admin(AdminCommand),
}

/// Catalog administration (local backend only)
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum AdminCommand {
    /// Create or update tutorials from a JSON file of drafts
    Import {
        /// Path to a JSON array of tutorial drafts
        path: PathBuf,
    },
    /// Remove a tutorial
    Remove {
        /// Tutorial slug
        slug: String,
    },
    /// Create or update a category
    AddCategory {
        /// Category name
        name: String,
        /// Explicit slug (derived from the name otherwise)
        #[arg(long)]
        slug: Option<String>,
        /// Short description
        #[arg(long)]
        description: Option<String>,
    },
    /// Remove a category; its tutorials become uncategorized
    RemoveCategory {
        /// Category slug
        slug: String,
    },
}
