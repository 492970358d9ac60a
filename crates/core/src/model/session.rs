use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::QuestionId;

/// How a session orders its questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Catalog order.
    Sequential,
    /// Whole catalog, shuffled.
    Random,
    /// Only currently missed questions, in catalog order.
    Review,
}

impl SessionMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionMode::Sequential => "sequential",
            SessionMode::Random => "random",
            SessionMode::Review => "review",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("position {position} is beyond the queue of {len} questions")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("correct count ({correct}) exceeds answered count ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },

    #[error("answered count ({total}) exceeds reachable positions ({reachable})")]
    TooManyAnswers { total: u32, reachable: usize },

    #[error("wrong list has {wrong} entries but tallies imply {expected}")]
    WrongCountMismatch { wrong: usize, expected: u32 },
}

/// 1-based position hint for a saved session, e.g. "resume at Q.4 of 20".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumeProgress {
    pub current: usize,
    pub total: usize,
}

/// Durable copy of an in-flight session, with questions stored by id.
///
/// Only one snapshot exists at a time; resuming consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeSnapshot {
    pub mode: SessionMode,
    pub queue: Vec<QuestionId>,
    pub position: usize,
    pub correct_count: u32,
    pub total_answered: u32,
    pub wrong_in_session: Vec<QuestionId>,
    /// The question at `position` was answered but the session was not advanced.
    #[serde(default)]
    pub answered_current: bool,
    pub saved_at: DateTime<Utc>,
}

impl ResumeSnapshot {
    #[must_use]
    pub fn progress(&self) -> ResumeProgress {
        ResumeProgress {
            current: (self.position + 1).min(self.queue.len()),
            total: self.queue.len(),
        }
    }

    /// Check that the tallies describe a session that could actually exist.
    ///
    /// # Errors
    ///
    /// Returns the first `SnapshotError` found.
    pub fn check_consistency(&self) -> Result<(), SnapshotError> {
        let len = self.queue.len();
        if self.position > len || (self.answered_current && self.position == len) {
            return Err(SnapshotError::PositionOutOfRange {
                position: self.position,
                len,
            });
        }
        if self.correct_count > self.total_answered {
            return Err(SnapshotError::CorrectExceedsTotal {
                correct: self.correct_count,
                total: self.total_answered,
            });
        }
        let reachable = self.position + usize::from(self.answered_current);
        if usize::try_from(self.total_answered).map_or(true, |total| total > reachable) {
            return Err(SnapshotError::TooManyAnswers {
                total: self.total_answered,
                reachable,
            });
        }
        let expected = self.total_answered - self.correct_count;
        if usize::try_from(expected).map_or(true, |exp| exp != self.wrong_in_session.len()) {
            return Err(SnapshotError::WrongCountMismatch {
                wrong: self.wrong_in_session.len(),
                expected,
            });
        }
        Ok(())
    }
}
