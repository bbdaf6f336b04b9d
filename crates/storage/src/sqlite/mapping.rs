use chrono::{DateTime, NaiveDate, Utc};
use quiz_core::model::{Category, EarnedBadge, EarnedBadges, ProgressionRecord, ProgressionSnapshot};
use sqlx::Row;
use std::collections::BTreeMap;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn count(row: &sqlx::sqlite::SqliteRow, field: &'static str) -> Result<u32, StorageError> {
    u32_from_i64(field, row.try_get::<i64, _>(field).map_err(ser)?)
}

/// Column holding the correct-answer count for a category.
pub(crate) fn category_column(category: Category) -> &'static str {
    match category {
        Category::Apod => "apod_correct",
        Category::MarsRover => "mars_rover_correct",
        Category::Neo => "neo_correct",
    }
}

pub(crate) fn map_record_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<ProgressionRecord, StorageError> {
    let per_category_correct = Category::ALL
        .into_iter()
        .map(|c| Ok((c, count(row, category_column(c))?)))
        .collect::<Result<BTreeMap<_, _>, StorageError>>()?;
    let last_play_date: Option<NaiveDate> = row.try_get("last_play_date").map_err(ser)?;

    ProgressionRecord::from_persisted(ProgressionSnapshot {
        total_questions: count(row, "total_questions")?,
        correct_answers: count(row, "correct_answers")?,
        current_streak: count(row, "current_streak")?,
        best_streak: count(row, "best_streak")?,
        daily_quizzes: count(row, "daily_quizzes")?,
        per_category_correct,
        last_play_date,
        total_days_played: count(row, "total_days_played")?,
    })
    .map_err(ser)
}

pub(crate) fn map_badge_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<EarnedBadges, StorageError> {
    let badges = rows
        .iter()
        .map(|row| {
            let id: String = row.try_get("badge_id").map_err(ser)?;
            let earned_at: DateTime<Utc> = row.try_get("earned_at").map_err(ser)?;
            Ok(EarnedBadge { id, earned_at })
        })
        .collect::<Result<Vec<_>, StorageError>>()?;
    Ok(EarnedBadges::from(badges))
}
