//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{LoadError, QuestionId, SnapshotError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the session engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    EmptyQueue,
    #[error("no active session")]
    NotActive,
    #[error("session still has questions left")]
    NotFinished,
    #[error("question at position {position} was already answered")]
    DoubleAnswer { position: usize },
    #[error("choice {choice} is out of range for {choices} choices")]
    InvalidChoice { choice: usize, choices: usize },
    #[error("saved session refers to unknown question {0}")]
    StaleReference(QuestionId),
    #[error("saved session is inconsistent: {0}")]
    CorruptSnapshot(#[from] SnapshotError),
}

/// Errors emitted by `ProgressStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no saved session to resume")]
    NoSnapshot,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

/// Errors emitted while reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error("could not prepare database file: {0}")]
    DatabaseFile(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
