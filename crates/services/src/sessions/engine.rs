use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use quiz_core::model::{Question, QuestionId, QuestionSet, ResumeSnapshot, SessionMode};
use quiz_core::stats::percent;

use super::progress::SessionProgress;
use super::queue::build_queue;
use crate::error::SessionError;

//
// ─── EVENTS AND OUTCOMES ───────────────────────────────────────────────────────
//

/// What the engine reports after an answer is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerEvent {
    pub question_id: QuestionId,
    pub correct: bool,
}

/// Final tallies of a session that ran to the end of its queue.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub mode: SessionMode,
    pub correct: u32,
    pub total: u32,
    /// Questions answered wrong during this session, in answer order.
    pub wrong_in_session: Vec<Arc<Question>>,
}

impl SessionOutcome {
    #[must_use]
    pub fn rate(&self) -> u32 {
        percent(self.correct, self.total)
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.correct == self.total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Active,
    Finished,
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

struct RunningSession {
    mode: SessionMode,
    queue: Vec<Arc<Question>>,
    position: usize,
    correct_count: u32,
    total_answered: u32,
    wrong_in_session: Vec<Arc<Question>>,
    answered_current: bool,
}

impl RunningSession {
    fn is_exhausted(&self) -> bool {
        self.position >= self.queue.len()
    }
}

/// In-memory state machine for one quiz run.
///
/// `Idle → Active → Finished`, with `suspend` taking an active run back to
/// `Idle` as a [`ResumeSnapshot`]. Questions are held by reference and are
/// only ever identified by id.
#[derive(Default)]
pub struct SessionEngine {
    session: Option<RunningSession>,
}

impl SessionEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        match &self.session {
            None => EngineState::Idle,
            Some(s) if s.is_exhausted() => EngineState::Finished,
            Some(_) => EngineState::Active,
        }
    }

    #[must_use]
    pub fn mode(&self) -> Option<SessionMode> {
        self.session.as_ref().map(|s| s.mode)
    }

    /// Start a new run, replacing whatever was running.
    ///
    /// `wrong_ids` is read once here; later changes to the wrong set do not
    /// affect the queue.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyQueue` if the mode selects no questions. The
    /// engine is left untouched in that case.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        mode: SessionMode,
        catalog: &QuestionSet,
        wrong_ids: &BTreeSet<QuestionId>,
        rng: &mut R,
    ) -> Result<(), SessionError> {
        let queue = build_queue(mode, catalog, wrong_ids, rng);
        if queue.is_empty() {
            return Err(SessionError::EmptyQueue);
        }

        tracing::debug!(%mode, questions = queue.len(), "session started");
        self.session = Some(RunningSession {
            mode,
            queue,
            position: 0,
            correct_count: 0,
            total_answered: 0,
            wrong_in_session: Vec::new(),
            answered_current: false,
        });
        Ok(())
    }

    /// The question at the current position, or `None` when idle or finished.
    #[must_use]
    pub fn current(&self) -> Option<&Arc<Question>> {
        let session = self.session.as_ref()?;
        session.queue.get(session.position)
    }

    /// Whether the current question already has an answer.
    #[must_use]
    pub fn is_current_answered(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.answered_current)
    }

    /// Record an answer for the current question.
    ///
    /// `choice` is an index into the question's original choice order.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` without a current question,
    /// `SessionError::DoubleAnswer` if this position was already answered, and
    /// `SessionError::InvalidChoice` if `choice` is not a valid index.
    pub fn submit_answer(&mut self, choice: usize) -> Result<AnswerEvent, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NotActive)?;
        let question = session
            .queue
            .get(session.position)
            .cloned()
            .ok_or(SessionError::NotActive)?;
        if session.answered_current {
            return Err(SessionError::DoubleAnswer {
                position: session.position,
            });
        }
        if choice >= question.choices().len() {
            return Err(SessionError::InvalidChoice {
                choice,
                choices: question.choices().len(),
            });
        }

        let correct = question.is_correct(choice);
        session.answered_current = true;
        session.total_answered += 1;
        if correct {
            session.correct_count += 1;
        } else {
            session.wrong_in_session.push(Arc::clone(&question));
        }

        Ok(AnswerEvent {
            question_id: question.id().clone(),
            correct,
        })
    }

    /// Move to the next position. Returns whether a question remains.
    ///
    /// Advancing past an unanswered question skips it without recording
    /// anything.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` when idle or already finished.
    pub fn advance(&mut self) -> Result<bool, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NotActive)?;
        if session.is_exhausted() {
            return Err(SessionError::NotActive);
        }
        session.position += 1;
        session.answered_current = false;
        Ok(!session.is_exhausted())
    }

    /// Take the outcome of a finished run and return to idle.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` when idle and
    /// `SessionError::NotFinished` while questions remain.
    pub fn complete(&mut self) -> Result<SessionOutcome, SessionError> {
        match self.state() {
            EngineState::Idle => return Err(SessionError::NotActive),
            EngineState::Active => return Err(SessionError::NotFinished),
            EngineState::Finished => {}
        }
        let session = self.session.take().ok_or(SessionError::NotActive)?;
        tracing::debug!(
            correct = session.correct_count,
            total = session.total_answered,
            "session finished"
        );
        Ok(SessionOutcome {
            mode: session.mode,
            correct: session.correct_count,
            total: session.total_answered,
            wrong_in_session: session.wrong_in_session,
        })
    }

    /// Snapshot the active run by id and return to idle.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` unless a question is pending.
    pub fn suspend(&mut self, now: DateTime<Utc>) -> Result<ResumeSnapshot, SessionError> {
        if self.state() != EngineState::Active {
            return Err(SessionError::NotActive);
        }
        let session = self.session.take().ok_or(SessionError::NotActive)?;
        let ids = |questions: &[Arc<Question>]| -> Vec<QuestionId> {
            questions.iter().map(|q| q.id().clone()).collect()
        };

        tracing::debug!(position = session.position, "session suspended");
        Ok(ResumeSnapshot {
            mode: session.mode,
            queue: ids(&session.queue),
            position: session.position,
            correct_count: session.correct_count,
            total_answered: session.total_answered,
            wrong_in_session: ids(&session.wrong_in_session),
            answered_current: session.answered_current,
            saved_at: now,
        })
    }

    /// Rebuild a run from a snapshot, resolving every id through `catalog`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::CorruptSnapshot` for impossible tallies and
    /// `SessionError::StaleReference` if an id is no longer in the catalog.
    /// The engine is left untouched on error.
    pub fn resume(
        &mut self,
        snapshot: &ResumeSnapshot,
        catalog: &QuestionSet,
    ) -> Result<(), SessionError> {
        snapshot.check_consistency()?;
        if snapshot.queue.is_empty() {
            return Err(SessionError::EmptyQueue);
        }

        let resolve = |ids: &[QuestionId]| -> Result<Vec<Arc<Question>>, SessionError> {
            ids.iter()
                .map(|id| {
                    catalog
                        .by_id(id.as_str())
                        .cloned()
                        .ok_or_else(|| SessionError::StaleReference(id.clone()))
                })
                .collect()
        };
        let queue = resolve(&snapshot.queue)?;
        let wrong_in_session = resolve(&snapshot.wrong_in_session)?;

        tracing::debug!(
            position = snapshot.position,
            total = queue.len(),
            "session resumed"
        );
        self.session = Some(RunningSession {
            mode: snapshot.mode,
            queue,
            position: snapshot.position,
            correct_count: snapshot.correct_count,
            total_answered: snapshot.total_answered,
            wrong_in_session,
            answered_current: snapshot.answered_current,
        });
        Ok(())
    }

    /// Ids of the queue in session order.
    #[must_use]
    pub fn queue_ids(&self) -> Vec<QuestionId> {
        self.session
            .as_ref()
            .map(|s| s.queue.iter().map(|q| q.id().clone()).collect())
            .unwrap_or_default()
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> Option<SessionProgress> {
        let session = self.session.as_ref()?;
        let total = session.queue.len();
        Some(SessionProgress {
            current: (session.position + 1).min(total),
            total,
            answered: session.total_answered,
            correct: session.correct_count,
            remaining: total.saturating_sub(session.position),
            is_complete: session.is_exhausted(),
        })
    }
}

impl fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("SessionEngine");
        dbg.field("state", &self.state());
        if let Some(session) = &self.session {
            dbg.field("mode", &session.mode)
                .field("queue_len", &session.queue.len())
                .field("position", &session.position)
                .field("correct_count", &session.correct_count)
                .field("total_answered", &session.total_answered)
                .field("answered_current", &session.answered_current);
        }
        dbg.finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
