use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::model::session::ResumeSnapshot;
use crate::model::streak::Streak;
use crate::model::QuestionId;
use crate::stats::percent;
use crate::time::calendar_day;

/// Current layout version of [`ProgressDocument`].
pub const PROGRESS_SCHEMA_VERSION: u32 = 1;

//
// ─── AGGREGATE PARTS ───────────────────────────────────────────────────────────
//

/// Lifetime answer counters. Both only ever grow (until a reset).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Totals {
    pub attempts: u32,
    pub correct: u32,
}

/// Answers recorded on one calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyEntry {
    total_count: u32,
    correct_count: u32,
    correct_rate: u32,
}

impl DailyEntry {
    #[must_use]
    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    /// Whole-number percentage, always `percent(correct_count, total_count)`.
    #[must_use]
    pub fn correct_rate(&self) -> u32 {
        self.correct_rate
    }

    fn record(&mut self, correct: bool) {
        self.total_count = self.total_count.saturating_add(1);
        if correct {
            self.correct_count = self.correct_count.saturating_add(1);
        }
        self.correct_rate = percent(self.correct_count, self.total_count);
    }
}

/// Result of the most recently completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastSession {
    pub correct: u32,
    pub total: u32,
    pub rate: u32,
    pub timestamp: DateTime<Utc>,
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// Cumulative learning statistics.
///
/// Every mutation goes through `record_answer`, `record_session_end` or
/// `reset`, which keep the daily rates and the wrong set consistent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressAggregate {
    totals: Totals,
    daily_log: BTreeMap<NaiveDate, DailyEntry>,
    streak: Streak,
    /// Currently missed questions and when they were last missed.
    wrong_set: BTreeMap<QuestionId, DateTime<Utc>>,
    /// Questions answered correctly at least once.
    mastered: BTreeSet<QuestionId>,
    last_session: Option<LastSession>,
}

impl ProgressAggregate {
    /// Apply one answer.
    ///
    /// The first answer of a calendar day creates that day's log entry. Every
    /// answer is offered to the streak, which ignores days it has already seen.
    pub fn record_answer(&mut self, id: &QuestionId, correct: bool, now: DateTime<Utc>) {
        self.totals.attempts = self.totals.attempts.saturating_add(1);
        if correct {
            self.totals.correct = self.totals.correct.saturating_add(1);
            self.wrong_set.remove(id);
            self.mastered.insert(id.clone());
        } else {
            self.wrong_set.insert(id.clone(), now);
        }

        let day = calendar_day(now);
        self.streak.register_activity(day);
        self.daily_log.entry(day).or_default().record(correct);
    }

    /// Overwrite the last-session summary.
    pub fn record_session_end(&mut self, correct: u32, total: u32, now: DateTime<Utc>) {
        self.last_session = Some(LastSession {
            correct,
            total,
            rate: percent(correct, total),
            timestamp: now,
        });
    }

    #[must_use]
    pub fn totals(&self) -> Totals {
        self.totals
    }

    /// Lifetime accuracy as a whole-number percentage.
    #[must_use]
    pub fn overall_rate(&self) -> u32 {
        percent(self.totals.correct, self.totals.attempts)
    }

    #[must_use]
    pub fn daily_log(&self) -> &BTreeMap<NaiveDate, DailyEntry> {
        &self.daily_log
    }

    #[must_use]
    pub fn daily(&self, day: NaiveDate) -> Option<&DailyEntry> {
        self.daily_log.get(&day)
    }

    #[must_use]
    pub fn streak(&self) -> Streak {
        self.streak
    }

    /// Ids whose most recent answer was wrong.
    #[must_use]
    pub fn wrong_ids(&self) -> BTreeSet<QuestionId> {
        self.wrong_set.keys().cloned().collect()
    }

    #[must_use]
    pub fn wrong_count(&self) -> usize {
        self.wrong_set.len()
    }

    #[must_use]
    pub fn is_wrong(&self, id: &str) -> bool {
        self.wrong_set.contains_key(id)
    }

    /// When a currently missed question was last answered wrong.
    #[must_use]
    pub fn missed_at(&self, id: &str) -> Option<DateTime<Utc>> {
        self.wrong_set.get(id).copied()
    }

    #[must_use]
    pub fn mastered(&self) -> &BTreeSet<QuestionId> {
        &self.mastered
    }

    #[must_use]
    pub fn last_session(&self) -> Option<&LastSession> {
        self.last_session.as_ref()
    }
}

//
// ─── PERSISTED DOCUMENT ────────────────────────────────────────────────────────
//

/// Everything the trainer persists, stored as one document under one key.
///
/// Fields missing from an older document fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressDocument {
    pub schema_version: u32,
    pub progress: ProgressAggregate,
    pub resume: Option<ResumeSnapshot>,
}

impl Default for ProgressDocument {
    fn default() -> Self {
        Self {
            schema_version: PROGRESS_SCHEMA_VERSION,
            progress: ProgressAggregate::default(),
            resume: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;
    use proptest::prelude::*;

    fn q(id: &str) -> QuestionId {
        QuestionId::new(id)
    }

    #[test]
    fn wrong_then_right_clears_wrong_set() {
        let mut agg = ProgressAggregate::default();
        agg.record_answer(&q("q1"), false, fixed_now());
        assert_eq!(agg.wrong_ids(), BTreeSet::from([q("q1")]));
        assert_eq!(agg.missed_at("q1"), Some(fixed_now()));

        agg.record_answer(&q("q1"), true, fixed_now());
        assert!(agg.wrong_ids().is_empty());
        assert!(agg.mastered().contains("q1"));
    }

    #[test]
    fn right_then_wrong_stays_mastered_but_missed() {
        let mut agg = ProgressAggregate::default();
        agg.record_answer(&q("q1"), true, fixed_now());
        agg.record_answer(&q("q1"), false, fixed_now());
        assert!(agg.is_wrong("q1"));
        assert!(agg.mastered().contains("q1"));
    }

    #[test]
    fn totals_and_daily_entry_accumulate() {
        let mut agg = ProgressAggregate::default();
        let now = fixed_now();
        agg.record_answer(&q("q1"), true, now);
        agg.record_answer(&q("q2"), false, now);
        agg.record_answer(&q("q3"), true, now);

        assert_eq!(agg.totals(), Totals { attempts: 3, correct: 2 });
        let entry = agg.daily(calendar_day(now)).unwrap();
        assert_eq!(entry.total_count(), 3);
        assert_eq!(entry.correct_count(), 2);
        assert_eq!(entry.correct_rate(), 67);
        assert_eq!(agg.overall_rate(), 67);
    }

    #[test]
    fn new_day_gets_its_own_entry_and_extends_streak() {
        let mut agg = ProgressAggregate::default();
        let day1 = fixed_now();
        let day2 = day1 + Duration::days(1);
        agg.record_answer(&q("q1"), true, day1);
        agg.record_answer(&q("q1"), false, day2);

        assert_eq!(agg.daily_log().len(), 2);
        assert_eq!(agg.daily(calendar_day(day2)).unwrap().correct_rate(), 0);
        assert_eq!(agg.streak().current(), 2);
        assert_eq!(agg.streak().max(), 2);
    }

    #[test]
    fn broken_streak_scenario() {
        let mut agg = ProgressAggregate::default();
        let day1 = fixed_now();
        agg.record_answer(&q("q1"), true, day1);
        assert_eq!((agg.streak().current(), agg.streak().max()), (1, 1));

        agg.record_answer(&q("q1"), true, day1 + Duration::days(2));
        assert_eq!((agg.streak().current(), agg.streak().max()), (1, 1));
    }

    #[test]
    fn answer_on_earlier_day_does_not_break_streak() {
        let mut agg = ProgressAggregate::default();
        let day_n = fixed_now();
        agg.record_answer(&q("q1"), true, day_n);
        agg.record_answer(&q("q2"), true, day_n - Duration::days(1));
        agg.record_answer(&q("q3"), true, day_n);
        agg.record_answer(&q("q4"), true, day_n + Duration::days(1));

        assert_eq!(agg.daily_log().len(), 3);
        let streak = agg.streak();
        assert_eq!((streak.current(), streak.max()), (2, 2));
        assert_eq!(
            streak.last_active_date(),
            Some(calendar_day(day_n + Duration::days(1)))
        );
    }

    #[test]
    fn session_end_rate_rounds_and_handles_zero() {
        let mut agg = ProgressAggregate::default();
        agg.record_session_end(2, 3, fixed_now());
        assert_eq!(agg.last_session().unwrap().rate, 67);

        agg.record_session_end(0, 0, fixed_now());
        let last = agg.last_session().unwrap();
        assert_eq!((last.correct, last.total, last.rate), (0, 0, 0));
    }

    #[test]
    fn document_defaults_fill_missing_fields() {
        let doc: ProgressDocument =
            serde_json::from_str(r#"{"progress": {"totals": {"attempts": 4}}}"#).unwrap();
        assert_eq!(doc.schema_version, PROGRESS_SCHEMA_VERSION);
        assert_eq!(doc.progress.totals(), Totals { attempts: 4, correct: 0 });
        assert!(doc.resume.is_none());
    }

    #[test]
    fn document_json_uses_iso_day_keys() {
        let mut doc = ProgressDocument::default();
        doc.progress.record_answer(&q("q1"), true, fixed_now());
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["progress"]["daily_log"]["2023-11-14"]["correct_rate"], 100);

        let back: ProgressDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }

    proptest! {
        #[test]
        fn same_day_rate_matches_exact_ratio(answers in proptest::collection::vec(any::<bool>(), 1..200)) {
            let mut agg = ProgressAggregate::default();
            let now = fixed_now();
            for (i, correct) in answers.iter().enumerate() {
                agg.record_answer(&q(&format!("q{i}")), *correct, now);
            }
            let total = u32::try_from(answers.len()).unwrap();
            let correct = u32::try_from(answers.iter().filter(|c| **c).count()).unwrap();
            let entry = agg.daily(calendar_day(now)).unwrap();
            prop_assert_eq!(entry.total_count(), total);
            prop_assert_eq!(entry.correct_count(), correct);
            prop_assert_eq!(entry.correct_rate(), percent(correct, total));
        }

        #[test]
        fn wrong_set_tracks_latest_answer(answers in proptest::collection::vec((0u8..5, any::<bool>()), 1..100)) {
            let mut agg = ProgressAggregate::default();
            let mut latest = BTreeMap::new();
            for (id, correct) in &answers {
                let id = q(&format!("q{id}"));
                agg.record_answer(&id, *correct, fixed_now());
                latest.insert(id, *correct);
            }
            let expected: BTreeSet<_> = latest.into_iter().filter(|(_, c)| !c).map(|(id, _)| id).collect();
            prop_assert_eq!(agg.wrong_ids(), expected);
        }
    }
}
