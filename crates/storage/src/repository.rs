use async_trait::async_trait;
use quiz_core::model::ProgressDocument;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Serialize the document into the JSON body that backends store.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the document cannot be encoded.
pub fn encode_document(document: &ProgressDocument) -> Result<String, StorageError> {
    serde_json::to_string(document).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Parse a stored JSON body back into a document.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the body is not a valid document.
pub fn decode_document(body: &str) -> Result<ProgressDocument, StorageError> {
    serde_json::from_str(body).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Repository contract for the single progress document.
///
/// Backends only need get/set/delete of one JSON document per key.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the stored body is corrupt.
    async fn get_document(&self, key: &str) -> Result<Option<ProgressDocument>, StorageError>;

    /// Persist or replace the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be stored.
    async fn put_document(&self, key: &str, document: &ProgressDocument)
    -> Result<(), StorageError>;

    /// Delete the document stored under `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    async fn delete_document(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Documents are kept as encoded JSON so they go through the same
/// serialization path as a real backend.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    documents: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Raw stored body for `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn raw_body(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_document(&self, key: &str) -> Result<Option<ProgressDocument>, StorageError> {
        self.raw_body(key)?
            .map(|body| decode_document(&body))
            .transpose()
    }

    async fn put_document(
        &self,
        key: &str,
        document: &ProgressDocument,
    ) -> Result<(), StorageError> {
        let body = encode_document(document)?;
        let mut guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), body);
        Ok(())
    }

    async fn delete_document(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .documents
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Holds the progress repository behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let progress: Arc<dyn ProgressRepository> = Arc::new(InMemoryRepository::new());
        Self { progress }
    }
}
