use quiz_core::model::{EarnedBadges, PlayerId};

use super::SqliteRepository;
use super::mapping::map_badge_rows;
use crate::repository::{BadgeRepository, StorageError};

#[async_trait::async_trait]
impl BadgeRepository for SqliteRepository {
    async fn get_badges(&self, player: &PlayerId) -> Result<EarnedBadges, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT badge_id, earned_at
                FROM earned_badges
                WHERE player_id = ?1
                ORDER BY earned_at ASC
            ",
        )
        .bind(player.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        map_badge_rows(&rows)
    }

    async fn save_badges(
        &self,
        player: &PlayerId,
        badges: &EarnedBadges,
    ) -> Result<(), StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        for badge in badges.iter() {
            // Timestamps are stored as RFC 3339 UTC text, so MIN orders them correctly.
            sqlx::query(
                r"
                    INSERT INTO earned_badges (player_id, badge_id, earned_at)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(player_id, badge_id) DO UPDATE SET
                        earned_at = MIN(earned_badges.earned_at, excluded.earned_at)
                ",
            )
            .bind(player.as_str())
            .bind(&badge.id)
            .bind(badge.earned_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn delete_badges(&self, player: &PlayerId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM earned_badges WHERE player_id = ?1")
            .bind(player.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }
}
