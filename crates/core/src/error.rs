use thiserror::Error;

use crate::model::{LoadError, QuestionError, SnapshotError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
