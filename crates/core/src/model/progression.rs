use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::category::Category;
use crate::time::previous_day;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressionError {
    #[error("correct answers ({correct}) exceed total questions ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },

    #[error("current streak ({current}) exceeds best streak ({best})")]
    StreakExceedsBest { current: u32, best: u32 },
}

//
// ─── SNAPSHOT ─────────────────────────────────────────────────────────────────
//

/// Persisted shape of a progression record.
///
/// Every field defaults so that partial documents (older clients, remote copies
/// missing a field) load as zeroes rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressionSnapshot {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub daily_quizzes: u32,
    #[serde(rename = "categoriesCompleted")]
    pub per_category_correct: BTreeMap<Category, u32>,
    #[serde(with = "play_date")]
    pub last_play_date: Option<NaiveDate>,
    pub total_days_played: u32,
}

//
// ─── STREAK STATUS ────────────────────────────────────────────────────────────
//

/// Whether the long-term daily streak is still alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakStatus {
    /// Played today; come back tomorrow to extend it.
    Active,
    /// Last played yesterday; playing today keeps it alive.
    LastChance,
    /// More than a day has passed, or never played.
    Broken,
}

//
// ─── RECORD ───────────────────────────────────────────────────────────────────
//

/// Durable per-player statistics.
///
/// Invariants: `correct_answers <= total_questions` and
/// `current_streak <= best_streak`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProgressionSnapshot", into = "ProgressionSnapshot")]
pub struct ProgressionRecord {
    total_questions: u32,
    correct_answers: u32,
    current_streak: u32,
    best_streak: u32,
    daily_quizzes: u32,
    per_category_correct: BTreeMap<Category, u32>,
    last_play_date: Option<NaiveDate>,
    total_days_played: u32,
}

impl Default for ProgressionRecord {
    fn default() -> Self {
        Self {
            total_questions: 0,
            correct_answers: 0,
            current_streak: 0,
            best_streak: 0,
            daily_quizzes: 0,
            per_category_correct: zeroed_categories(),
            last_play_date: None,
            total_days_played: 0,
        }
    }
}

fn zeroed_categories() -> BTreeMap<Category, u32> {
    Category::ALL.into_iter().map(|c| (c, 0)).collect()
}

impl ProgressionRecord {
    /// Rehydrate a record from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError` if the snapshot violates a record invariant.
    pub fn from_persisted(snapshot: ProgressionSnapshot) -> Result<Self, ProgressionError> {
        if snapshot.correct_answers > snapshot.total_questions {
            return Err(ProgressionError::CorrectExceedsTotal {
                correct: snapshot.correct_answers,
                total: snapshot.total_questions,
            });
        }
        if snapshot.current_streak > snapshot.best_streak {
            return Err(ProgressionError::StreakExceedsBest {
                current: snapshot.current_streak,
                best: snapshot.best_streak,
            });
        }

        let mut per_category_correct = zeroed_categories();
        per_category_correct.extend(snapshot.per_category_correct);

        Ok(Self {
            total_questions: snapshot.total_questions,
            correct_answers: snapshot.correct_answers,
            current_streak: snapshot.current_streak,
            best_streak: snapshot.best_streak,
            daily_quizzes: snapshot.daily_quizzes,
            per_category_correct,
            last_play_date: snapshot.last_play_date,
            total_days_played: snapshot.total_days_played,
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressionSnapshot {
        ProgressionSnapshot::from(self.clone())
    }

    /// Fold one answered question into the record.
    ///
    /// `session_streak` is the live streak after this answer. When the player
    /// last played before yesterday the persisted streak is broken first, and
    /// the streak carried forward is capped to what this answer alone earns.
    pub fn record_answer(
        &mut self,
        is_correct: bool,
        category: Category,
        session_streak: u32,
        today: NaiveDate,
    ) {
        let continuity_broken = self
            .last_play_date
            .is_some_and(|last| last != today && last != previous_day(today));
        if continuity_broken {
            self.current_streak = 0;
        }

        self.total_questions = self.total_questions.saturating_add(1);
        if is_correct {
            self.correct_answers = self.correct_answers.saturating_add(1);
            let slot = self.per_category_correct.entry(category).or_insert(0);
            *slot = slot.saturating_add(1);
        }

        self.current_streak = if continuity_broken {
            session_streak.min(u32::from(is_correct))
        } else {
            session_streak
        };
        self.best_streak = self.best_streak.max(session_streak).max(self.current_streak);

        if self.last_play_date != Some(today) {
            self.daily_quizzes = self.daily_quizzes.saturating_add(1);
            self.total_days_played = self.total_days_played.saturating_add(1);
            self.last_play_date = Some(today);
        }
    }

    /// Reconcile two copies of the same player's record.
    ///
    /// Counters are cumulative achievements and merge by `max`; the play date
    /// takes the later of the two. The result is independent of argument order.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut per_category_correct = self.per_category_correct.clone();
        for (category, count) in &other.per_category_correct {
            let slot = per_category_correct.entry(*category).or_insert(0);
            *slot = (*slot).max(*count);
        }

        let best_streak = self.best_streak.max(other.best_streak);
        Self {
            total_questions: self.total_questions.max(other.total_questions),
            correct_answers: self.correct_answers.max(other.correct_answers),
            current_streak: self.current_streak.max(other.current_streak),
            best_streak,
            daily_quizzes: self.daily_quizzes.max(other.daily_quizzes),
            per_category_correct,
            last_play_date: self.last_play_date.max(other.last_play_date),
            total_days_played: self.total_days_played.max(other.total_days_played),
        }
    }

    /// Streak as it should be displayed today: zero once the daily chain broke.
    #[must_use]
    pub fn validated_streak(&self, today: NaiveDate) -> u32 {
        match self.streak_status(today) {
            StreakStatus::Active | StreakStatus::LastChance => self.current_streak,
            StreakStatus::Broken => 0,
        }
    }

    #[must_use]
    pub fn streak_status(&self, today: NaiveDate) -> StreakStatus {
        match self.last_play_date {
            Some(last) if last == today => StreakStatus::Active,
            Some(last) if last == previous_day(today) => StreakStatus::LastChance,
            _ => StreakStatus::Broken,
        }
    }

    /// Share of correct answers in `[0.0, 1.0]`; zero before the first answer.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        f64::from(self.correct_answers) / f64::from(self.total_questions)
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    #[must_use]
    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    #[must_use]
    pub fn daily_quizzes(&self) -> u32 {
        self.daily_quizzes
    }

    #[must_use]
    pub fn category_correct(&self, category: Category) -> u32 {
        self.per_category_correct.get(&category).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn last_play_date(&self) -> Option<NaiveDate> {
        self.last_play_date
    }

    #[must_use]
    pub fn total_days_played(&self) -> u32 {
        self.total_days_played
    }
}

impl TryFrom<ProgressionSnapshot> for ProgressionRecord {
    type Error = ProgressionError;

    fn try_from(snapshot: ProgressionSnapshot) -> Result<Self, Self::Error> {
        Self::from_persisted(snapshot)
    }
}

impl From<ProgressionRecord> for ProgressionSnapshot {
    fn from(record: ProgressionRecord) -> Self {
        Self {
            total_questions: record.total_questions,
            correct_answers: record.correct_answers,
            current_streak: record.current_streak,
            best_streak: record.best_streak,
            daily_quizzes: record.daily_quizzes,
            per_category_correct: record.per_category_correct,
            last_play_date: record.last_play_date,
            total_days_played: record.total_days_played,
        }
    }
}

/// `lastPlayDate` is an ISO date string, or `""` before the first game.
mod play_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(total: u32, correct: u32, current: u32, best: u32) -> ProgressionRecord {
        ProgressionRecord::from_persisted(ProgressionSnapshot {
            total_questions: total,
            correct_answers: correct,
            current_streak: current,
            best_streak: best,
            ..ProgressionSnapshot::default()
        })
        .unwrap()
    }

    #[test]
    fn correct_answer_updates_counters_and_day() {
        let mut r = ProgressionRecord::default();
        r.record_answer(true, Category::Neo, 1, day(2024, 3, 1));

        assert_eq!(r.total_questions(), 1);
        assert_eq!(r.correct_answers(), 1);
        assert_eq!(r.category_correct(Category::Neo), 1);
        assert_eq!(r.category_correct(Category::Apod), 0);
        assert_eq!(r.current_streak(), 1);
        assert_eq!(r.best_streak(), 1);
        assert_eq!(r.total_days_played(), 1);
        assert_eq!(r.daily_quizzes(), 1);
        assert_eq!(r.last_play_date(), Some(day(2024, 3, 1)));
    }

    #[test]
    fn same_day_answers_count_the_day_once() {
        let mut r = ProgressionRecord::default();
        let today = day(2024, 3, 1);
        r.record_answer(true, Category::Apod, 1, today);
        r.record_answer(false, Category::Apod, 0, today);

        assert_eq!(r.total_questions(), 2);
        assert_eq!(r.correct_answers(), 1);
        assert_eq!(r.current_streak(), 0);
        assert_eq!(r.best_streak(), 1);
        assert_eq!(r.total_days_played(), 1);
    }

    #[test]
    fn best_streak_never_decreases() {
        let mut r = ProgressionRecord::default();
        let today = day(2024, 3, 1);
        let mut best = 0;
        for (is_correct, streak) in [(true, 1), (true, 2), (false, 0), (true, 1), (true, 2)] {
            r.record_answer(is_correct, Category::MarsRover, streak, today);
            assert!(r.best_streak() >= best);
            assert!(r.best_streak() >= r.current_streak());
            best = r.best_streak();
        }
        assert_eq!(best, 2);
    }

    #[test]
    fn day_gap_breaks_persisted_streak() {
        let mut r = ProgressionRecord::default();
        r.record_answer(true, Category::Apod, 4, day(2024, 3, 1));
        assert_eq!(r.current_streak(), 4);

        r.record_answer(true, Category::Apod, 5, day(2024, 3, 5));
        assert_eq!(r.current_streak(), 1);
        assert_eq!(r.best_streak(), 5);
        assert_eq!(r.total_days_played(), 2);
    }

    #[test]
    fn yesterday_keeps_streak_continuity() {
        let mut r = ProgressionRecord::default();
        r.record_answer(true, Category::Apod, 3, day(2024, 3, 1));
        r.record_answer(true, Category::Apod, 4, day(2024, 3, 2));
        assert_eq!(r.current_streak(), 4);
        assert_eq!(r.streak_status(day(2024, 3, 2)), StreakStatus::Active);
        assert_eq!(r.streak_status(day(2024, 3, 3)), StreakStatus::LastChance);
        assert_eq!(r.streak_status(day(2024, 3, 4)), StreakStatus::Broken);
        assert_eq!(r.validated_streak(day(2024, 3, 4)), 0);
        assert_eq!(r.validated_streak(day(2024, 3, 3)), 4);
    }

    #[test]
    fn merge_takes_max_of_best_streak() {
        let a = record(10, 5, 1, 3);
        let b = record(4, 4, 2, 7);
        let merged = a.merge(&b);
        assert_eq!(merged.best_streak(), 7);
        assert_eq!(merged.total_questions(), 10);
        assert_eq!(merged.correct_answers(), 5);
        assert_eq!(merged.current_streak(), 2);
    }

    #[test]
    fn merge_is_idempotent_and_commutative() {
        let mut a = ProgressionRecord::default();
        a.record_answer(true, Category::Neo, 1, day(2024, 3, 1));
        let mut b = ProgressionRecord::default();
        b.record_answer(true, Category::Apod, 1, day(2024, 2, 1));
        b.record_answer(true, Category::Apod, 2, day(2024, 2, 1));

        assert_eq!(a.merge(&a), a);
        assert_eq!(a.merge(&b), b.merge(&a));
        let once = a.merge(&b);
        assert_eq!(once.merge(&b), once);
        assert_eq!(once.last_play_date(), Some(day(2024, 3, 1)));
        assert_eq!(once.category_correct(Category::Apod), 2);
        assert_eq!(once.category_correct(Category::Neo), 1);
    }

    #[test]
    fn snapshot_rejects_broken_invariants() {
        let err = ProgressionRecord::from_persisted(ProgressionSnapshot {
            total_questions: 1,
            correct_answers: 2,
            ..ProgressionSnapshot::default()
        })
        .unwrap_err();
        assert!(matches!(err, ProgressionError::CorrectExceedsTotal { .. }));
    }

    #[test]
    fn json_shape_uses_camel_case_and_empty_date() {
        let json = serde_json::to_value(ProgressionRecord::default()).unwrap();
        assert_eq!(json["lastPlayDate"], "");
        assert_eq!(json["categoriesCompleted"]["mars_rover"], 0);
        assert_eq!(json["totalDaysPlayed"], 0);

        let partial = r#"{"totalQuestions":3,"correctAnswers":2,"lastPlayDate":"2024-03-01"}"#;
        let parsed: ProgressionRecord = serde_json::from_str(partial).unwrap();
        assert_eq!(parsed.total_questions(), 3);
        assert_eq!(parsed.last_play_date(), Some(day(2024, 3, 1)));
        assert_eq!(parsed.category_correct(Category::Neo), 0);
    }
}
