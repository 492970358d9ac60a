use chrono::{Datelike, NaiveDate};

use crate::model::progress::ProgressAggregate;

/// One day cell of a month view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayActivity {
    pub day: u32,
    pub date: NaiveDate,
    /// `None` when nothing was answered that day.
    pub correct_rate: Option<u32>,
}

impl DayActivity {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.correct_rate.is_some()
    }
}

/// Activity for every day of one month, ready for a calendar grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthActivity {
    pub year: i32,
    pub month: u32,
    /// Weekday of the 1st, counted from Sunday = 0.
    pub leading_blank_days: u32,
    pub days: Vec<DayActivity>,
}

impl MonthActivity {
    #[must_use]
    pub fn active_days(&self) -> usize {
        self.days.iter().filter(|d| d.is_active()).count()
    }
}

impl ProgressAggregate {
    /// Per-day activity for `month` (1-12) of `year`.
    ///
    /// Returns `None` for an invalid month.
    #[must_use]
    pub fn month_activity(&self, year: i32, month: u32) -> Option<MonthActivity> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let days = first
            .iter_days()
            .take_while(|date| date.month() == month)
            .map(|date| DayActivity {
                day: date.day(),
                date,
                correct_rate: self.daily(date).map(|entry| entry.correct_rate()),
            })
            .collect();

        Some(MonthActivity {
            year,
            month,
            leading_blank_days: first.weekday().num_days_from_sunday(),
            days,
        })
    }
}
