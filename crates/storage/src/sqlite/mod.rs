use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

use crate::repository::{ProgressionRepository, Storage};

mod badge_repo;
mod mapping;
mod migrate;
mod progression_repo;

/// Player progression and badges in one `SQLite` database.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteRepository {
    const MAX_CONNECTIONS: u32 = 4;
    const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

    /// Open (creating if missing) the database at `database_url`.
    ///
    /// File databases use WAL so answer writes do not block readers.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` for a malformed URL or a failed connection.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Self::BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new()
            .max_connections(Self::MAX_CONNECTIONS)
            .acquire_timeout(Self::BUSY_TIMEOUT)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Bring the player schema up to date. Safe to run on every start.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if a migration statement fails.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Connect, migrate, and expose both repositories over one pool.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connection or migrations fail.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = Arc::new(SqliteRepository::connect(database_url).await?);
        repo.migrate().await?;
        Ok(Self {
            progression: Arc::clone(&repo) as Arc<dyn ProgressionRepository>,
            badges: repo,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqliteRepository>();
    }
}
