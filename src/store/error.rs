//! Error types for catalog and progress stores

use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::CatalogError;

/// Errors that can occur when reading from or writing to a store
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Local file could not be read or written
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored or received data is not valid JSON for the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request to the hosted backend failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Hosted backend answered with an error status
    #[error("Backend error ({status}): {message}")]
    Backend {
        /// HTTP status code
        status: u16,
        /// Error body returned by the backend
        message: String,
    },

    /// Fetched catalog breaks catalog invariants
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(#[from] CatalogError),

    /// Store is temporarily unable to serve requests
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A write was saved but reloading the ledger afterwards failed
    #[error("Progress saved, but reloading it failed: {0}")]
    NotRefreshed(#[source] Box<PersistenceError>),
}

impl PersistenceError {
    /// Check if this error is transient (the caller can retry)
    pub fn is_recoverable(&self) -> bool {
        match self {
            PersistenceError::Io { .. }
            | PersistenceError::Request(_)
            | PersistenceError::Unavailable(_) => true,
            PersistenceError::Backend { status, .. } => *status == 429 || *status >= 500,
            PersistenceError::Json(_)
            | PersistenceError::InvalidCatalog(_)
            | PersistenceError::NotRefreshed(_) => false,
        }
    }

    /// Check if the backend rejected our credentials
    pub fn requires_reauth(&self) -> bool {
        matches!(self, PersistenceError::Backend { status: 401 | 403, .. })
    }

    /// Check if the write itself went through despite the error
    pub fn is_saved(&self) -> bool {
        matches!(self, PersistenceError::NotRefreshed(_))
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PersistenceError::Io { path: path.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_recoverable() {
        let err = PersistenceError::Backend { status: 503, message: "down".into() };
        assert!(err.is_recoverable());
        assert!(!err.requires_reauth());
    }

    #[test]
    fn client_errors_are_not_recoverable() {
        let err = PersistenceError::Backend { status: 400, message: "bad".into() };
        assert!(!err.is_recoverable());

        let err = PersistenceError::Backend { status: 401, message: "jwt expired".into() };
        assert!(err.requires_reauth());
    }

    #[test]
    fn io_errors_are_recoverable() {
        let err = PersistenceError::io(
            "/tmp/progress.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("progress.json"));
    }

    #[test]
    fn invalid_catalog_is_permanent() {
        let err: PersistenceError = CatalogError::DuplicateTutorialSlug("x".into()).into();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn failed_reload_after_write_reports_saved() {
        let err = PersistenceError::NotRefreshed(Box::new(PersistenceError::Unavailable(
            "reads disabled".into(),
        )));
        assert!(err.is_saved());
        assert!(!err.is_recoverable());
        assert!(err.to_string().starts_with("Progress saved"));
    }
}
