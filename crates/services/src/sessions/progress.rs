use serde::Serialize;

/// Aggregated view of session progress, useful for UI.
///
/// `current` is 1-based ("question 3 of 10") and never exceeds `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub current: usize,
    pub total: usize,
    pub answered: u32,
    pub correct: u32,
    pub remaining: usize,
    pub is_complete: bool,
}
