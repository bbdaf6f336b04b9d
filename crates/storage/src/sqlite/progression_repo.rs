use chrono::Utc;
use quiz_core::model::{Category, PlayerId, ProgressionRecord};

use super::SqliteRepository;
use super::mapping::map_record_row;
use crate::repository::{ProgressionRepository, StorageError};

#[async_trait::async_trait]
impl ProgressionRepository for SqliteRepository {
    async fn get_record(
        &self,
        player: &PlayerId,
    ) -> Result<Option<ProgressionRecord>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT
                    total_questions, correct_answers, current_streak, best_streak,
                    daily_quizzes, apod_correct, mars_rover_correct, neo_correct,
                    last_play_date, total_days_played
                FROM progression_records
                WHERE player_id = ?1
            ",
        )
        .bind(player.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_record_row).transpose()
    }

    async fn save_record(
        &self,
        player: &PlayerId,
        record: &ProgressionRecord,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO progression_records (
                    player_id, total_questions, correct_answers, current_streak,
                    best_streak, daily_quizzes, apod_correct, mars_rover_correct,
                    neo_correct, last_play_date, total_days_played, updated_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                ON CONFLICT(player_id) DO UPDATE SET
                    total_questions = excluded.total_questions,
                    correct_answers = excluded.correct_answers,
                    current_streak = excluded.current_streak,
                    best_streak = excluded.best_streak,
                    daily_quizzes = excluded.daily_quizzes,
                    apod_correct = excluded.apod_correct,
                    mars_rover_correct = excluded.mars_rover_correct,
                    neo_correct = excluded.neo_correct,
                    last_play_date = excluded.last_play_date,
                    total_days_played = excluded.total_days_played,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(player.as_str())
        .bind(i64::from(record.total_questions()))
        .bind(i64::from(record.correct_answers()))
        .bind(i64::from(record.current_streak()))
        .bind(i64::from(record.best_streak()))
        .bind(i64::from(record.daily_quizzes()))
        .bind(i64::from(record.category_correct(Category::Apod)))
        .bind(i64::from(record.category_correct(Category::MarsRover)))
        .bind(i64::from(record.category_correct(Category::Neo)))
        .bind(record.last_play_date())
        .bind(i64::from(record.total_days_played()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn delete_record(&self, player: &PlayerId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM progression_records WHERE player_id = ?1")
            .bind(player.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }
}
