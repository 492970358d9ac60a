use async_trait::async_trait;
use chrono::Utc;
use quiz_core::model::ProgressDocument;
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{ProgressRepository, StorageError, decode_document, encode_document};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get_document(&self, key: &str) -> Result<Option<ProgressDocument>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT body
            FROM progress_documents
            WHERE storage_key = ?1
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let body: String = row
            .try_get("body")
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        decode_document(&body).map(Some)
    }

    async fn put_document(
        &self,
        key: &str,
        document: &ProgressDocument,
    ) -> Result<(), StorageError> {
        let body = encode_document(document)?;

        sqlx::query(
            r"
            INSERT INTO progress_documents (storage_key, schema_version, body, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(storage_key) DO UPDATE SET
                schema_version = excluded.schema_version,
                body = excluded.body,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(i64::from(document.schema_version))
        .bind(body)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn delete_document(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM progress_documents WHERE storage_key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
