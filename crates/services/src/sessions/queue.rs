use rand::Rng;
use std::collections::BTreeSet;
use std::sync::Arc;

use quiz_core::model::{Question, QuestionId, QuestionSet, SessionMode};

/// Shuffle `items` in place with Fisher–Yates.
///
/// Walks from the last index down to 1 and swaps each slot with a uniformly
/// chosen index in `0..=i`, so every permutation is equally likely.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Build the question queue for a new session.
///
/// - `Sequential` takes the catalog as is.
/// - `Random` takes the whole catalog, shuffled.
/// - `Review` takes the currently missed questions in catalog order.
pub fn build_queue<R: Rng + ?Sized>(
    mode: SessionMode,
    catalog: &QuestionSet,
    wrong_ids: &BTreeSet<QuestionId>,
    rng: &mut R,
) -> Vec<Arc<Question>> {
    match mode {
        SessionMode::Sequential => catalog.questions().to_vec(),
        SessionMode::Random => {
            let mut queue = catalog.questions().to_vec();
            fisher_yates(&mut queue, rng);
            queue
        }
        SessionMode::Review => catalog.filter_by_ids(wrong_ids),
    }
}
