//! Command execution
//!
//! Wires configuration to stores and runs one command at a time, producing the text
//! to print.

pub mod command;
pub mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use tracing::info;

use crate::catalog::{Catalog, CategoryDraft, Tutorial, TutorialDraft, ValidationError, slugify};
use crate::config::{Backend, Config};
use crate::discovery::{Filters, discover};
use crate::progress::{ProgressStatus, Stats, continue_learning};
use crate::session::Session;
use crate::store::{CatalogSource, LocalStore, PersistenceError, ProgressStore, RemoteStore};

pub use command::{AdminCommand, Command};

/// Tutorials shown in the "new tutorials" panel of `stats`
const NEW_TUTORIALS: usize = 3;

/// The command-line application
pub struct App {
    /// Application configuration
    config: Config,

    /// Where `config` is persisted; login state is kept in memory only when unset
    config_path: Option<PathBuf>,

    catalog_source: Arc<dyn CatalogSource>,

    progress_store: Arc<dyn ProgressStore>,

    /// Writable catalog, available with the local backend
    admin: Option<Arc<LocalStore>>,
}

impl App {
    /// Create the application for a loaded configuration
    pub fn new(config: Config) -> Result<Self> {
        let config_path = Config::config_path()?;

        let app = match config.backend.clone() {
            Backend::Local { .. } => {
                let store = Arc::new(LocalStore::new(config.local_data_dir()?));
                info!(root = ?store.root(), "Using local store");
                Self::with_stores(config, store.clone(), store.clone(), Some(store))
            }
            Backend::Remote { url, access_token, .. } => {
                let api_key = config
                    .remote_api_key()
                    .context("Remote backend needs an API key (config or TUTORHUB_API_KEY)")?;
                let mut store = RemoteStore::new(&url, api_key)?;
                if let Some(token) = access_token {
                    store = store.with_access_token(token);
                }
                info!(%url, "Using remote store");
                let store = Arc::new(store);
                Self::with_stores(config, store.clone(), store, None)
            }
        };

        Ok(app.persisting_config_to(config_path))
    }

    /// Create the application over explicit stores
    pub fn with_stores(
        config: Config,
        catalog_source: Arc<dyn CatalogSource>,
        progress_store: Arc<dyn ProgressStore>,
        admin: Option<Arc<LocalStore>>,
    ) -> Self {
        Self { config, config_path: None, catalog_source, progress_store, admin }
    }

    /// Persist login state to `path`
    pub fn persisting_config_to(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a command and return its output
    pub async fn execute(&mut self, command: Command) -> Result<String> {
        match command {
            Command::List { search, category, difficulty, page } => {
                self.list(search, category, difficulty, page).await
            }
            Command::Show { slug } => self.show(&slug).await,
            Command::Start { slug } => self.start(&slug).await,
            Command::Complete { slug } => self.complete(&slug).await,
            Command::Stats => self.stats().await,
            Command::Login { user_id } => self.login(user_id),
            Command::Logout => self.logout(),
            Command::Slug { text } => Ok(format!("{}\n", slugify(&text.join(" ")))),
            Command::Admin(admin) => self.admin(admin).await,
        }
    }

    async fn catalog(&self) -> Result<Catalog> {
        Catalog::fetch(self.catalog_source.as_ref()).await.map_err(explain)
    }

    async fn session(&self) -> Result<Session> {
        Session::open(self.config.user_id.clone(), self.progress_store.clone())
            .await
            .map_err(explain)
    }

    async fn list(
        &self,
        search: Option<String>,
        category: Option<String>,
        difficulty: Option<String>,
        page: usize,
    ) -> Result<String> {
        let catalog = self.catalog().await?;

        let mut filters = Filters::new().with_search(search.unwrap_or_default());
        if let Some(category) = category {
            // Accept slugs as well as ids; unknown values simply match nothing
            let id = catalog
                .find_category_by_slug(&category)
                .map_or(category.clone(), |c| c.id.clone());
            filters.set_category(Some(id));
        }
        if let Some(difficulty) = difficulty {
            filters.set_difficulty_text(&difficulty);
        }

        let session = self.session().await?;
        let page = discover(catalog.tutorials(), &filters, page, self.config.page_size);
        let ledger = session.is_signed_in().then(|| session.ledger());

        Ok(render::render_page(&page, &catalog, ledger))
    }

    async fn show(&self, slug: &str) -> Result<String> {
        let catalog = self.catalog().await?;
        let tutorial = find_tutorial(&catalog, slug)?;
        let session = self.session().await?;

        Ok(render::render_tutorial(tutorial, &catalog, session.get(&tutorial.id)))
    }

    async fn start(&self, slug: &str) -> Result<String> {
        let catalog = self.catalog().await?;
        let tutorial = find_tutorial(&catalog, slug)?;
        let mut session = self.session().await?;
        if !session.is_signed_in() {
            return Ok(not_signed_in());
        }

        session.start(&tutorial.id).await.map_err(explain)?;
        let status = session.ledger().status(&tutorial.id);
        Ok(format!("{}: {}\n", tutorial.title, describe_status(status)))
    }

    async fn complete(&self, slug: &str) -> Result<String> {
        let catalog = self.catalog().await?;
        let tutorial = find_tutorial(&catalog, slug)?;
        let mut session = self.session().await?;
        if !session.is_signed_in() {
            return Ok(not_signed_in());
        }

        session.complete(&tutorial.id).await.map_err(explain)?;
        let status = session.ledger().status(&tutorial.id);
        Ok(format!("{}: {}\n", tutorial.title, describe_status(status)))
    }

    async fn stats(&self) -> Result<String> {
        let catalog = self.catalog().await?;
        let session = self.session().await?;
        if !session.is_signed_in() {
            return Ok(not_signed_in());
        }

        let stats = Stats::derive(&catalog, session.ledger());
        let continuing = continue_learning(&catalog, session.ledger());
        Ok(render::render_stats(&stats, &continuing, catalog.latest(NEW_TUTORIALS)))
    }

    fn login(&mut self, user_id: String) -> Result<String> {
        let user_id = user_id.trim().to_string();
        if user_id.is_empty() {
            bail!("User id cannot be empty");
        }

        self.config.user_id = Some(user_id.clone());
        self.save_config()?;
        info!(%user_id, "Signed in");
        Ok(format!("Signed in as {user_id}\n"))
    }

    fn logout(&mut self) -> Result<String> {
        if self.config.user_id.take().is_none() {
            return Ok("Not signed in\n".to_string());
        }
        self.save_config()?;
        Ok("Signed out\n".to_string())
    }

    fn save_config(&self) -> Result<()> {
        match &self.config_path {
            Some(path) => self.config.save_to(path),
            None => Ok(()),
        }
    }

    async fn admin(&self, command: AdminCommand) -> Result<String> {
        let store = self
            .admin
            .clone()
            .ok_or_else(|| anyhow!("Catalog administration needs the local backend"))?;

        match command {
            AdminCommand::Import { path } => self.import(&store, &path).await,
            AdminCommand::Remove { slug } => {
                let catalog = self.catalog().await?;
                let tutorial = find_tutorial(&catalog, &slug)?;
                store.remove_tutorial(&tutorial.id).await.map_err(explain)?;
                Ok(format!("Removed {}\n", tutorial.title))
            }
            AdminCommand::AddCategory { name, slug, description } => {
                let catalog = self.catalog().await?;
                let draft = CategoryDraft { name, slug, description };
                let existing = catalog.find_category_by_slug(&draft_category_slug(&draft));
                let updated = existing.is_some();

                let category = draft.into_category(existing)?;
                store.upsert_category(category.clone()).await.map_err(explain)?;
                let verb = if updated { "Updated" } else { "Created" };
                Ok(format!("{verb} category {} ({})\n", category.name, category.slug))
            }
            AdminCommand::RemoveCategory { slug } => {
                let catalog = self.catalog().await?;
                let category = catalog
                    .find_category_by_slug(&slug)
                    .ok_or_else(|| anyhow!("No category with slug '{slug}'"))?;
                store.remove_category(&category.id).await.map_err(explain)?;
                Ok(format!("Removed category {}\n", category.name))
            }
        }
    }

    async fn import(&self, store: &LocalStore, path: &Path) -> Result<String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read drafts from {:?}", path))?;
        let drafts: Vec<TutorialDraft> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse drafts in {:?}", path))?;

        let (mut created, mut updated) = (0, 0);
        for (index, draft) in drafts.into_iter().enumerate() {
            // Re-read so drafts later in the file see earlier ones
            let catalog = self.catalog().await?;
            let title = draft.title.clone();

            let tutorial = build_tutorial(&catalog, draft)
                .with_context(|| format!("Draft #{} ({title})", index + 1))?;
            if catalog.tutorial(&tutorial.id).is_some() {
                updated += 1;
            } else {
                created += 1;
            }
            store.upsert_tutorial(tutorial).await.map_err(explain)?;
        }

        let total = created + updated;
        Ok(format!("Imported {total} tutorials ({created} created, {updated} updated)\n"))
    }
}

/// Validate a draft against the catalog it will join
fn build_tutorial(catalog: &Catalog, draft: TutorialDraft) -> Result<Tutorial, ValidationError> {
    if let Some(category_id) = draft.category_id.as_deref().filter(|c| !c.trim().is_empty()) {
        if catalog.category(category_id).is_none() {
            return Err(ValidationError::UnknownCategory(category_id.to_string()));
        }
    }

    let existing = catalog.find_by_slug(&draft.effective_slug());
    draft.into_tutorial(existing, Utc::now())
}

fn draft_category_slug(draft: &CategoryDraft) -> String {
    match draft.slug.as_deref().map(str::trim) {
        Some(slug) if !slug.is_empty() => slug.to_string(),
        _ => slugify(&draft.name),
    }
}

fn find_tutorial<'a>(catalog: &'a Catalog, slug: &str) -> Result<&'a Tutorial> {
    catalog.find_by_slug(slug).ok_or_else(|| anyhow!("No tutorial with slug '{slug}'"))
}

fn describe_status(status: ProgressStatus) -> &'static str {
    match status {
        ProgressStatus::NotStarted => "not started",
        ProgressStatus::InProgress => "in progress",
        ProgressStatus::Completed => "completed",
    }
}

fn not_signed_in() -> String {
    "Not signed in. Run `tutorhub login <user-id>` first.\n".to_string()
}

/// Attach a retry hint to transient store failures
fn explain(err: PersistenceError) -> anyhow::Error {
    if err.is_recoverable() {
        anyhow::Error::new(err).context("Temporary storage failure, please try again")
    } else if err.is_saved() {
        anyhow::Error::new(err).context("Your progress was saved but could not be reloaded")
    } else if err.requires_reauth() {
        anyhow::Error::new(err).context("The backend rejected your credentials")
    } else {
        anyhow::Error::new(err)
    }
}
