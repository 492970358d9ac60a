use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;

use quiz_core::model::{Question, QuestionSet, ResumeProgress, SessionMode};

use super::choices::ChoiceOrder;
use super::engine::{EngineState, SessionEngine, SessionOutcome};
use super::progress::SessionProgress;
use crate::Clock;
use crate::error::{QuizError, SessionError};
use crate::events::{EventSink, NoopEvents, QuizEvent};
use crate::progress_store::{Persisted, ProgressStore};

/// Result of answering the current question.
#[derive(Debug, Clone)]
pub struct AnswerFeedback {
    pub question: Arc<Question>,
    /// Original index of the chosen choice.
    pub choice: usize,
    pub correct: bool,
}

impl AnswerFeedback {
    /// Original index of the correct choice.
    #[must_use]
    pub fn answer_index(&self) -> usize {
        self.question.answer()
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        self.question.explanation()
    }
}

/// What follows a call to [`QuizService::next`].
#[derive(Debug, Clone)]
pub enum NextStep {
    /// Another question is pending.
    Question(SessionProgress),
    /// The queue is exhausted and the session has been recorded.
    Finished(SessionOutcome),
}

/// Drives quiz sessions against a catalog and durable progress.
///
/// Engine transitions happen in memory first. Progress writes are awaited
/// before each method returns, and a failed write is reported in the
/// [`Persisted`] result without stopping the session.
pub struct QuizService {
    clock: Clock,
    catalog: Arc<QuestionSet>,
    store: ProgressStore,
    engine: SessionEngine,
    events: Arc<dyn EventSink>,
    rng: StdRng,
}

impl QuizService {
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<QuestionSet>, store: ProgressStore) -> Self {
        Self {
            clock,
            catalog,
            store,
            engine: SessionEngine::new(),
            events: Arc::new(NoopEvents),
            rng: StdRng::from_os_rng(),
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Use a deterministic RNG for queue and choice shuffles.
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Start a new session, discarding any saved one.
    ///
    /// A running session is replaced.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyQueue` (wrapped) if the mode selects no
    /// questions, e.g. review with nothing missed. The saved session is kept
    /// in that case.
    pub async fn start(
        &mut self,
        mode: SessionMode,
    ) -> Result<Persisted<SessionProgress>, QuizError> {
        let wrong_ids = self.store.wrong_ids();
        self.engine
            .start(mode, &self.catalog, &wrong_ids, &mut self.rng)?;
        let cleared = self.store.clear_resume().await;
        Ok(cleared.map(|()| self.current_progress()))
    }

    /// Continue the saved session. The snapshot is consumed either way.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoSnapshot` if nothing was saved, and a session
    /// error if the snapshot no longer matches the catalog. The engine is idle
    /// after an error.
    pub async fn resume(&mut self) -> Result<Persisted<SessionProgress>, QuizError> {
        let Persisted {
            value,
            storage_error,
        } = self.store.take_resume().await;
        let snapshot = value.ok_or(QuizError::NoSnapshot)?;

        if let Err(err) = self.engine.resume(&snapshot, &self.catalog) {
            tracing::warn!(error = %err, "discarding saved session");
            return Err(err.into());
        }

        let ResumeProgress { current, total } = snapshot.progress();
        self.events.emit(&QuizEvent::SessionResumed {
            position: current,
            total,
        });
        Ok(Persisted {
            value: self.current_progress(),
            storage_error,
        })
    }

    /// Answer the current question with an original choice index.
    ///
    /// # Errors
    ///
    /// Returns a session error if there is no pending question, it was already
    /// answered, or `choice` is out of range. Nothing is recorded then.
    pub async fn answer(&mut self, choice: usize) -> Result<Persisted<AnswerFeedback>, QuizError> {
        let question = self
            .engine
            .current()
            .cloned()
            .ok_or(SessionError::NotActive)?;
        let event = self.engine.submit_answer(choice)?;

        let now = self.clock.now();
        let recorded = self
            .store
            .record_answer(&event.question_id, event.correct, now)
            .await;
        self.events.emit(&QuizEvent::AnswerSubmitted {
            question_id: event.question_id,
            correct: event.correct,
        });

        Ok(recorded.map(|()| AnswerFeedback {
            question,
            choice,
            correct: event.correct,
        }))
    }

    /// Move past the current question, unanswered or not.
    ///
    /// When the queue runs out the session is completed, its summary recorded,
    /// and the engine returns to idle.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` (wrapped) when no session is running.
    pub async fn next(&mut self) -> Result<Persisted<NextStep>, QuizError> {
        if self.engine.state() == EngineState::Active && self.engine.advance()? {
            return Ok(Persisted::new(
                NextStep::Question(self.current_progress()),
                Ok(()),
            ));
        }

        let outcome = self.engine.complete()?;
        let now = self.clock.now();
        let recorded = self
            .store
            .record_session_end(outcome.correct, outcome.total, now)
            .await;
        self.events.emit(&QuizEvent::SessionFinished {
            correct: outcome.correct,
            total: outcome.total,
        });
        tracing::info!(
            mode = %outcome.mode,
            correct = outcome.correct,
            total = outcome.total,
            rate = outcome.rate(),
            "session recorded"
        );
        Ok(recorded.map(|()| NextStep::Finished(outcome)))
    }

    /// Save the running session for later and go idle.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` (wrapped) unless a question is pending.
    pub async fn suspend(&mut self) -> Result<Persisted<ResumeProgress>, QuizError> {
        let snapshot = self.engine.suspend(self.clock.now())?;
        let progress = snapshot.progress();
        let saved = self.store.save_resume(snapshot).await;
        self.events.emit(&QuizEvent::SessionSuspended);
        Ok(saved.map(|()| progress))
    }

    /// Forget all learning progress and any saved session.
    pub async fn reset_progress(&mut self) -> Persisted<()> {
        self.store.reset().await
    }

    /// A fresh display order for the current question's choices.
    pub fn shuffled_choices(&mut self) -> Option<ChoiceOrder> {
        let question = self.engine.current()?;
        Some(ChoiceOrder::shuffled(question, &mut self.rng))
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Arc<Question>> {
        self.engine.current()
    }

    #[must_use]
    pub fn progress(&self) -> Option<SessionProgress> {
        self.engine.progress()
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        self.engine.state()
    }

    #[must_use]
    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    #[must_use]
    pub fn catalog(&self) -> &QuestionSet {
        &self.catalog
    }

    #[must_use]
    pub fn has_resume(&self) -> bool {
        self.store.has_resume()
    }

    /// Whether a review session would have any questions.
    #[must_use]
    pub fn review_available(&self) -> bool {
        let wrong_ids = self.store.wrong_ids();
        !self.catalog.filter_by_ids(&wrong_ids).is_empty()
    }

    fn current_progress(&self) -> SessionProgress {
        self.engine.progress().unwrap_or(SessionProgress {
            current: 0,
            total: 0,
            answered: 0,
            correct: 0,
            remaining: 0,
            is_complete: true,
        })
    }
}
