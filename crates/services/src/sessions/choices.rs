use rand::Rng;

use quiz_core::model::Question;

use super::queue::fisher_yates;

/// Display order for a question's choices.
///
/// Maps display positions back to original choice indices. The question itself
/// is never touched, and answers must be checked against the original index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOrder {
    order: Vec<usize>,
}

impl ChoiceOrder {
    /// Choices in their original order.
    #[must_use]
    pub fn identity(question: &Question) -> Self {
        Self {
            order: (0..question.choices().len()).collect(),
        }
    }

    /// Choices in a uniformly random order.
    pub fn shuffled<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..question.choices().len()).collect();
        fisher_yates(&mut order, rng);
        Self { order }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Original choice index shown at `display`.
    #[must_use]
    pub fn original_index(&self, display: usize) -> Option<usize> {
        self.order.get(display).copied()
    }

    /// Where the original choice `original` is shown.
    #[must_use]
    pub fn display_index(&self, original: usize) -> Option<usize> {
        self.order.iter().position(|&idx| idx == original)
    }

    /// Where the correct answer is shown.
    #[must_use]
    pub fn display_answer_index(&self, question: &Question) -> Option<usize> {
        self.display_index(question.answer())
    }

    /// Choice texts in display order.
    #[must_use]
    pub fn display_choices<'q>(&self, question: &'q Question) -> Vec<&'q str> {
        self.order
            .iter()
            .filter_map(|&idx| question.choices().get(idx).map(String::as_str))
            .collect()
    }
}
