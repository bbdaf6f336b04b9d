use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs the versioned migrations for the player schema.
///
/// Version 1 creates progression records and earned badges.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS progression_records (
                    player_id TEXT PRIMARY KEY,
                    total_questions INTEGER NOT NULL CHECK (total_questions >= 0),
                    correct_answers INTEGER NOT NULL CHECK (correct_answers >= 0),
                    current_streak INTEGER NOT NULL CHECK (current_streak >= 0),
                    best_streak INTEGER NOT NULL CHECK (best_streak >= 0),
                    daily_quizzes INTEGER NOT NULL CHECK (daily_quizzes >= 0),
                    apod_correct INTEGER NOT NULL CHECK (apod_correct >= 0),
                    mars_rover_correct INTEGER NOT NULL CHECK (mars_rover_correct >= 0),
                    neo_correct INTEGER NOT NULL CHECK (neo_correct >= 0),
                    last_play_date TEXT,
                    total_days_played INTEGER NOT NULL CHECK (total_days_played >= 0),
                    updated_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS earned_badges (
                    player_id TEXT NOT NULL,
                    badge_id TEXT NOT NULL,
                    earned_at TEXT NOT NULL,
                    PRIMARY KEY (player_id, badge_id)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_earned_badges_player
                ON earned_badges (player_id, earned_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)")
            .bind(1_i64)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
    }

    Ok(())
}
