use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Consecutive calendar days with at least one recorded answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Streak {
    current: u32,
    max: u32,
    last_active_date: Option<NaiveDate>,
}

impl Streak {
    #[must_use]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[must_use]
    pub fn max(&self) -> u32 {
        self.max
    }

    #[must_use]
    pub fn last_active_date(&self) -> Option<NaiveDate> {
        self.last_active_date
    }

    /// Mark `day` as active.
    ///
    /// Extends the streak when the previous active day is exactly the day
    /// before and restarts it at 1 after a gap. A day on or before the last
    /// active day changes nothing. Returns whether anything changed.
    pub fn register_activity(&mut self, day: NaiveDate) -> bool {
        if self.last_active_date.is_some_and(|last| day <= last) {
            return false;
        }

        let extends = self
            .last_active_date
            .and_then(|last| last.succ_opt())
            .is_some_and(|next| next == day);

        self.current = if extends {
            self.current.saturating_add(1)
        } else {
            1
        };
        self.max = self.max.max(self.current);
        self.last_active_date = Some(day);
        true
    }
}
