//! TutorHub - tutorial discovery and learning progress tracking
//!
//! TutorHub browses a catalog of tutorials with search, category and difficulty
//! filters, tracks each user's progress through them and derives dashboard
//! statistics. Catalog and progress live in an external store.

pub mod app;
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod progress;
pub mod session;
pub mod store;

pub use app::App;
pub use catalog::{Catalog, Category, Difficulty, Tutorial, slugify};
pub use config::Config;
pub use discovery::{Filters, Page, discover};
pub use progress::{ProgressLedger, ProgressRecord, ProgressStatus, Stats};
pub use session::Session;
pub use store::PersistenceError;
