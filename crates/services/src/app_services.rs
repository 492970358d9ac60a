use std::path::Path;
use std::sync::Arc;

use quiz_core::model::QuestionSet;
use storage::repository::Storage;

use crate::Clock;
use crate::catalog::{CatalogSource, load_catalog};
use crate::config::QuizConfig;
use crate::error::{AppServicesError, ConfigError};
use crate::progress_store::ProgressStore;
use crate::sessions::QuizService;

/// Loaded catalog plus storage, ready to hand out quiz services.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    catalog: Arc<QuestionSet>,
    storage_key: String,
    clock: Clock,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the configured catalog file.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database file cannot be prepared,
    /// storage initialization fails, or the catalog cannot be loaded.
    pub async fn new_sqlite(config: &QuizConfig, clock: Clock) -> Result<Self, AppServicesError> {
        prepare_sqlite_file(&config.db_url)?;
        let storage = Storage::sqlite(&config.db_url).await?;
        let catalog = load_catalog(CatalogSource::File(config.catalog_path.clone())).await?;
        tracing::info!(db_url = %config.db_url, key = %config.storage_key, "app services ready");

        Ok(Self {
            storage,
            catalog: Arc::new(catalog),
            storage_key: config.storage_key.clone(),
            clock,
        })
    }

    /// Build services backed by in-memory storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Load` if the catalog cannot be loaded.
    pub async fn new_in_memory(
        source: CatalogSource,
        storage_key: impl Into<String>,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let catalog = load_catalog(source).await?;
        Ok(Self {
            storage: Storage::in_memory(),
            catalog: Arc::new(catalog),
            storage_key: storage_key.into(),
            clock,
        })
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<QuestionSet> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Open the progress document and wrap it in a fresh quiz service.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Progress` if the stored document cannot be read.
    pub async fn quiz_service(&self) -> Result<QuizService, AppServicesError> {
        let store =
            ProgressStore::open(Arc::clone(&self.storage.progress), self.storage_key.clone())
                .await?;
        Ok(QuizService::new(self.clock, self.catalog(), store))
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), AppServicesError> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let invalid = || ConfigError::Invalid {
        key: "QUIZ_DB_URL",
        value: db_url.to_string(),
    };
    let path = db_url.strip_prefix("sqlite://").ok_or_else(invalid)?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(invalid().into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_url_needs_no_file() {
        assert!(prepare_sqlite_file("sqlite::memory:").is_ok());
    }

    #[test]
    fn non_sqlite_url_is_rejected() {
        let err = prepare_sqlite_file("postgres://localhost/quiz").unwrap_err();
        assert!(matches!(err, AppServicesError::Config(_)));
    }
}
