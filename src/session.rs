//! User session
//!
//! A session ties the current identity to its progress ledger and to the store that
//! owns the records. Mutations go to the store first; the ledger is then re-read from
//! the store, so it only ever shows what the store confirmed.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::progress::{ProgressLedger, ProgressRecord};
use crate::store::{PersistenceError, ProgressStore};

/// Progress state for the current user
pub struct Session {
    /// Signed-in user, if any
    user_id: Option<String>,
    store: Arc<dyn ProgressStore>,
    ledger: ProgressLedger,
}

impl Session {
    /// Create a session with an empty ledger. Call [`Session::refresh`] to load it.
    pub fn new(user_id: Option<String>, store: Arc<dyn ProgressStore>) -> Self {
        Self { user_id, store, ledger: ProgressLedger::default() }
    }

    /// Session without a signed-in user; mutations are no-ops
    pub fn anonymous(store: Arc<dyn ProgressStore>) -> Self {
        Self::new(None, store)
    }

    /// Create a session and load the user's ledger
    pub async fn open(
        user_id: Option<String>,
        store: Arc<dyn ProgressStore>,
    ) -> Result<Self, PersistenceError> {
        let mut session = Self::new(user_id, store);
        session.refresh().await?;
        Ok(session)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_id.is_some()
    }

    /// The last ledger confirmed by the store
    pub fn ledger(&self) -> &ProgressLedger {
        &self.ledger
    }

    /// Look up the record for a tutorial
    pub fn get(&self, tutorial_id: &str) -> Option<&ProgressRecord> {
        self.ledger.get(tutorial_id)
    }

    /// Mark a tutorial as started.
    ///
    /// Does nothing when the tutorial already has a record (started or completed) or
    /// when nobody is signed in. The decision is made against a freshly fetched ledger,
    /// never a possibly stale one.
    pub async fn start(&mut self, tutorial_id: &str) -> Result<(), PersistenceError> {
        let Some(user_id) = self.user_id.clone() else {
            debug!(tutorial_id, "No signed-in user, ignoring start");
            return Ok(());
        };

        self.refresh().await?;
        if self.ledger.get(tutorial_id).is_some() {
            debug!(tutorial_id, "Tutorial already tracked, ignoring start");
            return Ok(());
        }

        let record = ProgressRecord::started(tutorial_id, Utc::now());
        self.write(&user_id, record).await
    }

    /// Mark a tutorial as completed.
    ///
    /// Creates the record when missing. Completing again refreshes the completion time;
    /// the original start time, as currently stored, is kept. Does nothing when nobody
    /// is signed in.
    pub async fn complete(&mut self, tutorial_id: &str) -> Result<(), PersistenceError> {
        let Some(user_id) = self.user_id.clone() else {
            debug!(tutorial_id, "No signed-in user, ignoring complete");
            return Ok(());
        };

        self.refresh().await?;
        let previous = self.ledger.get(tutorial_id);
        let record = ProgressRecord::completed(tutorial_id, previous, Utc::now());
        self.write(&user_id, record).await
    }

    /// Reload the ledger from the store.
    ///
    /// On failure the previous ledger is kept.
    pub async fn refresh(&mut self) -> Result<&ProgressLedger, PersistenceError> {
        let Some(user_id) = self.user_id.as_deref() else {
            self.ledger = ProgressLedger::default();
            return Ok(&self.ledger);
        };

        let records = self.store.fetch_progress(user_id).await.inspect_err(|e| {
            warn!(error = %e, "Failed to refresh progress");
        })?;

        self.ledger = ProgressLedger::from_records(records);
        debug!(records = self.ledger.len(), "Refreshed progress ledger");
        Ok(&self.ledger)
    }

    /// Sign out, discarding the ledger
    pub fn sign_out(&mut self) {
        if let Some(user_id) = self.user_id.take() {
            info!(%user_id, "Signed out");
        }
        self.ledger = ProgressLedger::default();
    }

    /// Upsert, then reload. A failed reload after a successful upsert is reported as
    /// [`PersistenceError::NotRefreshed`]: the record is stored, only the ledger is stale.
    async fn write(&mut self, user_id: &str, record: ProgressRecord) -> Result<(), PersistenceError> {
        self.store.upsert_progress(user_id, &record).await.inspect_err(|e| {
            warn!(tutorial_id = %record.tutorial_id, error = %e, "Failed to save progress");
        })?;

        info!(tutorial_id = %record.tutorial_id, status = ?record.status, "Saved progress");
        self.refresh().await.map_err(|e| PersistenceError::NotRefreshed(Box::new(e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressStatus;
    use crate::store::MemoryStore;

    /// Store whose reads start failing once a write has gone through
    struct FailAfterWrite {
        inner: Arc<MemoryStore>,
    }

    #[async_trait::async_trait]
    impl ProgressStore for FailAfterWrite {
        async fn fetch_progress(
            &self,
            user_id: &str,
        ) -> Result<Vec<ProgressRecord>, PersistenceError> {
            self.inner.fetch_progress(user_id).await
        }

        async fn upsert_progress(
            &self,
            user_id: &str,
            record: &ProgressRecord,
        ) -> Result<(), PersistenceError> {
            self.inner.upsert_progress(user_id, record).await?;
            self.inner.fail_reads(true);
            Ok(())
        }
    }

    async fn signed_in() -> (Arc<MemoryStore>, Session) {
        let store = Arc::new(MemoryStore::default());
        let session = Session::open(Some("u1".into()), store.clone()).await.unwrap();
        (store, session)
    }

    #[tokio::test]
    async fn start_twice_keeps_a_single_record() {
        let (store, mut session) = signed_in().await;

        session.start("t1").await.unwrap();
        session.start("t1").await.unwrap();

        assert_eq!(store.records_for("u1").await.len(), 1);
        assert_eq!(store.write_count(), 1);
        let record = session.get("t1").unwrap();
        assert_eq!(record.status, ProgressStatus::InProgress);
        assert_eq!(record.progress, 0);
    }

    #[tokio::test]
    async fn complete_after_start() {
        let (_store, mut session) = signed_in().await;

        session.start("t1").await.unwrap();
        let started_at = session.get("t1").unwrap().started_at;
        session.complete("t1").await.unwrap();

        let record = session.get("t1").unwrap();
        assert_eq!(record.tutorial_id, "t1");
        assert_eq!(record.status, ProgressStatus::Completed);
        assert_eq!(record.progress, 100);
        assert_eq!(record.started_at, started_at);
        assert!(record.completed_at.is_some());
    }

    #[tokio::test]
    async fn complete_without_start_creates_record() {
        let (store, mut session) = signed_in().await;

        session.complete("t1").await.unwrap();

        assert_eq!(store.records_for("u1").await.len(), 1);
        assert!(session.get("t1").unwrap().is_completed());
    }

    #[tokio::test]
    async fn completing_twice_is_idempotent() {
        let (store, mut session) = signed_in().await;

        session.complete("t1").await.unwrap();
        let first = session.get("t1").unwrap().clone();
        session.complete("t1").await.unwrap();
        let second = session.get("t1").unwrap();

        assert_eq!(store.records_for("u1").await.len(), 1);
        assert_eq!(second.status, ProgressStatus::Completed);
        assert_eq!(second.started_at, first.started_at);
        assert!(second.completed_at >= first.completed_at);
    }

    #[tokio::test]
    async fn start_never_regresses_completed() {
        let (_store, mut session) = signed_in().await;

        session.complete("t1").await.unwrap();
        session.start("t1").await.unwrap();

        assert!(session.get("t1").unwrap().is_completed());
    }

    #[tokio::test]
    async fn start_checks_the_store_not_an_unloaded_ledger() {
        let store = Arc::new(MemoryStore::default());
        let completed = ProgressRecord::completed("t1", None, Utc::now());
        store.upsert_progress("u1", &completed).await.unwrap();

        let mut session = Session::new(Some("u1".into()), store.clone());
        session.start("t1").await.unwrap();

        let stored = store.records_for("u1").await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, ProgressStatus::Completed);
        assert_eq!(stored[0].progress, 100);
        assert!(session.get("t1").unwrap().is_completed());
    }

    #[tokio::test]
    async fn start_with_stale_ledger_keeps_completion_from_elsewhere() {
        let (store, mut session) = signed_in().await;
        let completed = ProgressRecord::completed("t1", None, Utc::now());
        store.upsert_progress("u1", &completed).await.unwrap();

        session.start("t1").await.unwrap();

        assert!(store.records_for("u1").await[0].is_completed());
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn complete_keeps_start_time_written_elsewhere() {
        let (store, mut session) = signed_in().await;
        let started = ProgressRecord::started("t1", Utc::now() - chrono::Duration::days(3));
        store.upsert_progress("u1", &started).await.unwrap();

        session.complete("t1").await.unwrap();

        let record = session.get("t1").unwrap();
        assert!(record.is_completed());
        assert_eq!(record.started_at, started.started_at);
    }

    #[tokio::test]
    async fn failed_reload_after_write_reports_saved() {
        let (store, mut session) = signed_in().await;
        let failing = FailAfterWrite { inner: store.clone() };
        session.store = Arc::new(failing);

        let err = session.start("t1").await.unwrap_err();

        assert!(err.is_saved());
        assert_eq!(store.records_for("u1").await.len(), 1);
        assert!(session.ledger().is_empty());
    }

    #[tokio::test]
    async fn anonymous_mutations_are_no_ops() {
        let store = Arc::new(MemoryStore::default());
        let mut session = Session::anonymous(store.clone());

        session.start("t1").await.unwrap();
        session.complete("t2").await.unwrap();

        assert_eq!(store.write_count(), 0);
        assert!(session.ledger().is_empty());
    }

    #[tokio::test]
    async fn failed_write_leaves_ledger_untouched() {
        let (store, mut session) = signed_in().await;
        session.start("t1").await.unwrap();
        let before = session.ledger().clone();

        store.fail_writes(true);
        let err = session.complete("t1").await.unwrap_err();

        assert!(err.is_recoverable());
        assert_eq!(session.ledger(), &before);
        assert!(!store.records_for("u1").await[0].is_completed());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_ledger() {
        let (store, mut session) = signed_in().await;
        session.start("t1").await.unwrap();

        store.fail_reads(true);
        assert!(session.refresh().await.is_err());
        assert_eq!(session.ledger().len(), 1);
    }

    #[tokio::test]
    async fn ledger_reflects_store_writes_from_elsewhere() {
        let (store, mut session) = signed_in().await;
        store.upsert_progress("u1", &ProgressRecord::started("t9", Utc::now())).await.unwrap();

        assert!(session.get("t9").is_none());
        session.refresh().await.unwrap();
        assert!(session.get("t9").is_some());
    }

    #[tokio::test]
    async fn sign_out_discards_ledger() {
        let (_store, mut session) = signed_in().await;
        session.start("t1").await.unwrap();

        session.sign_out();

        assert!(!session.is_signed_in());
        assert!(session.ledger().is_empty());
        session.start("t2").await.unwrap();
        assert!(session.ledger().is_empty());
    }
}
