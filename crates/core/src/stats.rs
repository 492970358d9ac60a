//! Percentage helpers shared by every rate the trainer reports.

/// Whole-number percentage of `correct` over `total`, rounded half up.
///
/// Returns 0 when `total` is 0. Computed in integer arithmetic as
/// `(200 * correct + total) / (2 * total)` so results never depend on float
/// rounding.
#[must_use]
pub fn percent(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let correct = u64::from(correct);
    let total = u64::from(total);
    u32::try_from((200 * correct + total) / (2 * total)).unwrap_or(u32::MAX)
}
