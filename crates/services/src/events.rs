//! Notifications emitted by `QuizService`.
//!
//! Sinks only observe; nothing they do feeds back into the session.

use serde::Serialize;
use std::sync::{Arc, Mutex};

use quiz_core::model::QuestionId;

/// Serializes as `{"event": "answerSubmitted", ...}` for front ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum QuizEvent {
    AnswerSubmitted { question_id: QuestionId, correct: bool },
    SessionFinished { correct: u32, total: u32 },
    SessionSuspended,
    /// `position` is 1-based.
    SessionResumed { position: usize, total: usize },
}

/// Receiver for quiz notifications.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &QuizEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEvents;

impl EventSink for NoopEvents {
    fn emit(&self, _event: &QuizEvent) {}
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Clone, Default)]
pub struct RecordedEvents {
    events: Arc<Mutex<Vec<QuizEvent>>>,
}

impl RecordedEvents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<QuizEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<QuizEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl EventSink for RecordedEvents {
    fn emit(&self, event: &QuizEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
