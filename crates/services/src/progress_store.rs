use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;

use quiz_core::model::{
    DailyEntry, MonthActivity, ProgressAggregate, ProgressDocument, QuestionId, ResumeSnapshot,
};
use quiz_core::time::calendar_day;
use storage::repository::{ProgressRepository, StorageError};

use crate::error::ProgressError;

/// A value produced by a mutation together with the outcome of persisting it.
///
/// The in-memory change has always been applied; `storage_error` is set when
/// the write that followed it failed.
#[derive(Debug)]
pub struct Persisted<T> {
    pub value: T,
    pub storage_error: Option<ProgressError>,
}

impl<T> Persisted<T> {
    pub(crate) fn new(value: T, result: Result<(), ProgressError>) -> Self {
        Self {
            value,
            storage_error: result.err(),
        }
    }

    /// Whether the change reached storage.
    #[must_use]
    pub fn is_durable(&self) -> bool {
        self.storage_error.is_none()
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Persisted<U> {
        Persisted {
            value: f(self.value),
            storage_error: self.storage_error,
        }
    }
}

/// Durable learning progress and the single resume slot.
///
/// Every mutation updates memory first, then rewrites the whole document
/// under `key` before returning.
pub struct ProgressStore {
    repo: Arc<dyn ProgressRepository>,
    key: String,
    document: ProgressDocument,
}

impl ProgressStore {
    /// Load the document stored under `key`, or start empty if there is none.
    ///
    /// A stored document that cannot be decoded is logged and replaced by an
    /// empty one; the next write overwrites it.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the backend fails.
    pub async fn open(
        repo: Arc<dyn ProgressRepository>,
        key: impl Into<String>,
    ) -> Result<Self, ProgressError> {
        let key = key.into();
        let document = match repo.get_document(&key).await {
            Ok(document) => document.unwrap_or_default(),
            Err(StorageError::Serialization(reason)) => {
                tracing::warn!(
                    key = %key,
                    %reason,
                    "stored progress is unreadable, starting empty"
                );
                ProgressDocument::default()
            }
            Err(err) => return Err(err.into()),
        };
        tracing::debug!(
            key = %key,
            answers = document.progress.totals().attempts,
            has_resume = document.resume.is_some(),
            "progress loaded"
        );
        Ok(Self {
            repo,
            key,
            document,
        })
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn aggregate(&self) -> &ProgressAggregate {
        &self.document.progress
    }

    #[must_use]
    pub fn document(&self) -> &ProgressDocument {
        &self.document
    }

    #[must_use]
    pub fn wrong_ids(&self) -> BTreeSet<QuestionId> {
        self.document.progress.wrong_ids()
    }

    /// Today's log entry, if anything was answered today.
    #[must_use]
    pub fn today(&self, now: DateTime<Utc>) -> Option<&DailyEntry> {
        self.document.progress.daily(calendar_day(now))
    }

    /// Today's accuracy, 0 when nothing was answered today.
    #[must_use]
    pub fn today_rate(&self, now: DateTime<Utc>) -> u32 {
        self.today(now).map_or(0, DailyEntry::correct_rate)
    }

    #[must_use]
    pub fn overall_rate(&self) -> u32 {
        self.document.progress.overall_rate()
    }

    #[must_use]
    pub fn month_activity(&self, year: i32, month: u32) -> Option<MonthActivity> {
        self.document.progress.month_activity(year, month)
    }

    /// Days with at least one answer, oldest first.
    #[must_use]
    pub fn active_days(&self) -> Vec<NaiveDate> {
        self.document.progress.daily_log().keys().copied().collect()
    }

    /// Apply one answer and persist.
    pub async fn record_answer(
        &mut self,
        id: &QuestionId,
        correct: bool,
        now: DateTime<Utc>,
    ) -> Persisted<()> {
        self.document.progress.record_answer(id, correct, now);
        Persisted::new((), self.persist().await)
    }

    /// Overwrite the last-session summary and persist.
    pub async fn record_session_end(
        &mut self,
        correct: u32,
        total: u32,
        now: DateTime<Utc>,
    ) -> Persisted<()> {
        self.document.progress.record_session_end(correct, total, now);
        Persisted::new((), self.persist().await)
    }

    /// Replace the resume slot.
    pub async fn save_resume(&mut self, snapshot: ResumeSnapshot) -> Persisted<()> {
        self.document.resume = Some(snapshot);
        Persisted::new((), self.persist().await)
    }

    /// Peek at the resume slot without consuming it.
    #[must_use]
    pub fn load_resume(&self) -> Option<&ResumeSnapshot> {
        self.document.resume.as_ref()
    }

    #[must_use]
    pub fn has_resume(&self) -> bool {
        self.document.resume.is_some()
    }

    /// Read the resume slot once, leaving it empty.
    pub async fn take_resume(&mut self) -> Persisted<Option<ResumeSnapshot>> {
        let Some(snapshot) = self.document.resume.take() else {
            return Persisted::new(None, Ok(()));
        };
        Persisted::new(Some(snapshot), self.persist().await)
    }

    /// Empty the resume slot. Does not write when it is already empty.
    pub async fn clear_resume(&mut self) -> Persisted<()> {
        if self.document.resume.take().is_none() {
            return Persisted::new((), Ok(()));
        }
        Persisted::new((), self.persist().await)
    }

    /// Forget all progress, including the resume slot.
    pub async fn reset(&mut self) -> Persisted<()> {
        self.document = ProgressDocument::default();
        tracing::info!(key = %self.key, "progress reset");
        Persisted::new((), self.persist().await)
    }

    async fn persist(&self) -> Result<(), ProgressError> {
        if let Err(err) = self.repo.put_document(&self.key, &self.document).await {
            tracing::warn!(key = %self.key, error = %err, "failed to persist progress");
            return Err(err.into());
        }
        Ok(())
    }
}

impl std::fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStore")
            .field("key", &self.key)
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}
