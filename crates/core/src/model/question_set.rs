use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::question::{Question, QuestionDraft, QuestionError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Why a catalog's content was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog is not valid JSON for the question schema: {0}")]
    Json(String),

    #[error("question #{index} is invalid: {source}")]
    Question {
        index: usize,
        #[source]
        source: QuestionError,
    },

    #[error("duplicate question id: {0}")]
    DuplicateId(QuestionId),
}

/// Failure to obtain a usable question catalog. Fatal to startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoadError {
    #[error("question catalog not found: {0}")]
    NotFound(String),

    #[error("question catalog {path} could not be read: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("malformed question catalog: {0}")]
    MalformedData(#[from] CatalogError),
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// The catalog document shape: `{ "questions": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub questions: Vec<QuestionDraft>,
}

/// Immutable, validated set of questions in catalog order.
///
/// Questions are shared as `Arc<Question>` so sessions can hold references to
/// them without copying.
#[derive(Debug, Default)]
pub struct QuestionSet {
    questions: Vec<Arc<Question>>,
    index: HashMap<QuestionId, usize>,
}

impl QuestionSet {
    /// Validate every question and build the set.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::MalformedData` when a question fails validation or an
    /// id appears twice.
    pub fn from_document(document: CatalogDocument) -> Result<Self, LoadError> {
        let mut questions = Vec::with_capacity(document.questions.len());
        let mut index = HashMap::with_capacity(document.questions.len());

        for (position, draft) in document.questions.into_iter().enumerate() {
            let question = draft.validate().map_err(|source| CatalogError::Question {
                index: position,
                source,
            })?;
            if index.contains_key(question.id()) {
                return Err(CatalogError::DuplicateId(question.id().clone()).into());
            }
            index.insert(question.id().clone(), questions.len());
            questions.push(Arc::new(question));
        }

        Ok(Self { questions, index })
    }

    /// Parse a JSON catalog document and build the set.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::MalformedData` for invalid JSON, missing fields, or
    /// any validation failure from [`QuestionSet::from_document`].
    pub fn from_json_str(raw: &str) -> Result<Self, LoadError> {
        let document: CatalogDocument =
            serde_json::from_str(raw).map_err(|err| CatalogError::Json(err.to_string()))?;
        Self::from_document(document)
    }

    #[must_use]
    pub fn questions(&self) -> &[Arc<Question>] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Look up a question by id.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&Arc<Question>> {
        self.index.get(id).map(|&pos| &self.questions[pos])
    }

    /// Questions whose ids are in `ids`, in catalog order.
    ///
    /// The order of `ids` is irrelevant and unknown ids are skipped.
    pub fn filter_by_ids<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a QuestionId>,
    ) -> Vec<Arc<Question>> {
        let wanted: HashSet<&str> = ids.into_iter().map(QuestionId::as_str).collect();
        self.questions
            .iter()
            .filter(|q| wanted.contains(q.id().as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_json() -> &'static str {
        r#"{
            "questions": [
                {"id": "q1", "question": "One?", "choices": ["a", "b"], "answer": 0, "explanation": "a"},
                {"id": "q2", "question": "Two?", "choices": ["a", "b"], "answer": 1, "explanation": "b"},
                {"id": "q3", "question": "Three?", "choices": ["a", "b", "c"], "answer": 2, "explanation": "c"}
            ]
        }"#
    }

    #[test]
    fn loads_questions_in_catalog_order() {
        let set = QuestionSet::from_json_str(catalog_json()).unwrap();
        let ids: Vec<_> = set.questions().iter().map(|q| q.id().as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2", "q3"]);
        assert_eq!(set.len(), 3);
        assert!(set.contains("q2"));
    }

    #[test]
    fn by_id_returns_shared_question() {
        let set = QuestionSet::from_json_str(catalog_json()).unwrap();
        let q = set.by_id("q3").unwrap();
        assert_eq!(q.answer(), 2);
        assert!(Arc::ptr_eq(q, &set.questions()[2]));
        assert!(set.by_id("missing").is_none());
    }

    #[test]
    fn filter_preserves_catalog_order_not_input_order() {
        let set = QuestionSet::from_json_str(catalog_json()).unwrap();
        let ids = [QuestionId::new("q3"), QuestionId::new("zz"), QuestionId::new("q1")];
        let filtered = set.filter_by_ids(&ids);
        let got: Vec<_> = filtered.iter().map(|q| q.id().as_str()).collect();
        assert_eq!(got, vec!["q1", "q3"]);
    }

    #[test]
    fn duplicate_ids_fail_at_load() {
        let raw = r#"{"questions": [
            {"id": "q1", "question": "?", "choices": ["a"], "answer": 0, "explanation": ""},
            {"id": "q1", "question": "?", "choices": ["a"], "answer": 0, "explanation": ""}
        ]}"#;
        let err = QuestionSet::from_json_str(raw).unwrap_err();
        assert_eq!(
            err,
            LoadError::MalformedData(CatalogError::DuplicateId(QuestionId::new("q1")))
        );
    }

    #[test]
    fn out_of_bounds_answer_reports_position() {
        let raw = r#"{"questions": [
            {"id": "q1", "question": "?", "choices": ["a"], "answer": 0, "explanation": ""},
            {"id": "q2", "question": "?", "choices": ["a", "b"], "answer": 5, "explanation": ""}
        ]}"#;
        let err = QuestionSet::from_json_str(raw).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MalformedData(CatalogError::Question { index: 1, .. })
        ));
    }

    #[test]
    fn missing_field_is_malformed() {
        let raw = r#"{"questions": [{"id": "q1", "choices": ["a"], "answer": 0, "explanation": ""}]}"#;
        let err = QuestionSet::from_json_str(raw).unwrap_err();
        assert!(matches!(err, LoadError::MalformedData(CatalogError::Json(_))));
    }

    #[test]
    fn missing_questions_key_is_malformed() {
        let err = QuestionSet::from_json_str("{}").unwrap_err();
        assert!(matches!(err, LoadError::MalformedData(CatalogError::Json(_))));
    }
}
