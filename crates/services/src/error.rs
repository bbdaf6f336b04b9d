//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{Category, SessionStateError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::sessions::SessionPhase;

/// Errors emitted by content sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("no content available for {category}")]
    Unavailable { category: Category },
    #[error("content request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by translators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TranslationError {
    #[error("translation returned an empty response")]
    EmptyResponse,
    #[error("translation request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by remote progression stores.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyncError {
    #[error("guest players are never synced")]
    Guest,
    #[error("remote store unavailable: {0}")]
    Unavailable(String),
}

/// Errors emitted by `ProgressionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressionServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Export(#[from] serde_json::Error),
}

/// Errors emitted by the session orchestrator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("a session is already warming up")]
    WarmUpInProgress,
    #[error("session already completed")]
    Completed,
    #[error("no feedback pending, session is {0:?}")]
    NoFeedbackPending(SessionPhase),
    #[error(transparent)]
    State(#[from] SessionStateError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
