//! Where a question catalog comes from and how it is read.

use std::io::ErrorKind;
use std::path::PathBuf;

use quiz_core::model::{CatalogDocument, LoadError, QuestionSet};

/// A catalog either embedded by the caller or stored as a local JSON file.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    Inline(CatalogDocument),
    File(PathBuf),
}

impl From<CatalogDocument> for CatalogSource {
    fn from(document: CatalogDocument) -> Self {
        Self::Inline(document)
    }
}

impl From<PathBuf> for CatalogSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

/// Read and validate a catalog. Must finish before any session starts.
///
/// # Errors
///
/// Returns `LoadError::NotFound` for a missing file, `LoadError::Unreadable`
/// for other I/O failures, and `LoadError::MalformedData` when the content is
/// not a valid catalog.
pub async fn load_catalog(source: CatalogSource) -> Result<QuestionSet, LoadError> {
    let set = match source {
        CatalogSource::Inline(document) => QuestionSet::from_document(document)?,
        CatalogSource::File(path) => {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .map_err(|err| match err.kind() {
                    ErrorKind::NotFound => LoadError::NotFound(path.display().to_string()),
                    _ => LoadError::Unreadable {
                        path: path.display().to_string(),
                        reason: err.to_string(),
                    },
                })?;
            QuestionSet::from_json_str(&raw)?
        }
    };
    tracing::info!(questions = set.len(), "question catalog loaded");
    Ok(set)
}
