use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// Raw question as it appears in a catalog document.
///
/// Nothing is checked until [`QuestionDraft::validate`] runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub id: QuestionId,
    pub question: String,
    pub choices: Vec<String>,
    pub answer: usize,
    pub explanation: String,
}

impl QuestionDraft {
    /// Check the draft and turn it into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyId` for a blank id, `QuestionError::NoChoices`
    /// when the choice list is empty, and `QuestionError::AnswerOutOfBounds` when
    /// `answer` does not index into `choices`.
    pub fn validate(self) -> Result<Question, QuestionError> {
        if self.id.is_blank() {
            return Err(QuestionError::EmptyId);
        }
        if self.choices.is_empty() {
            return Err(QuestionError::NoChoices { id: self.id });
        }
        if self.answer >= self.choices.len() {
            return Err(QuestionError::AnswerOutOfBounds {
                id: self.id,
                answer: self.answer,
                choices: self.choices.len(),
            });
        }

        Ok(Question {
            id: self.id,
            question: self.question,
            choices: self.choices,
            answer: self.answer,
            explanation: self.explanation,
        })
    }
}

/// A validated multiple-choice question.
///
/// `answer` always indexes into `choices` in their original order.
#[derive(Debug, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    question: String,
    choices: Vec<String>,
    answer: usize,
    explanation: String,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// Index of the correct choice in the original choice order.
    #[must_use]
    pub fn answer(&self) -> usize {
        self.answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// True when `choice` is the correct original choice index.
    #[must_use]
    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.answer
    }
}

//
// ─── QUESTION VALIDATION ERRORS ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question id cannot be empty")]
    EmptyId,

    #[error("question {id} has no choices")]
    NoChoices { id: QuestionId },

    #[error("question {id} answer index {answer} is out of bounds for {choices} choices")]
    AnswerOutOfBounds {
        id: QuestionId,
        answer: usize,
        choices: usize,
    },
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
