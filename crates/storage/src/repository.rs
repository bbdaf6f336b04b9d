use async_trait::async_trait;
use quiz_core::model::{EarnedBadges, PlayerId, ProgressionRecord};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Durable store for a player's progression statistics.
#[async_trait]
pub trait ProgressionRepository: Send + Sync {
    /// Fetch the record for a player, `None` if they never played.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be read or decoded.
    async fn get_record(&self, player: &PlayerId)
    -> Result<Option<ProgressionRecord>, StorageError>;

    /// Persist or replace the record for a player.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save_record(
        &self,
        player: &PlayerId,
        record: &ProgressionRecord,
    ) -> Result<(), StorageError>;

    /// Remove the record for a player. Missing records are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn delete_record(&self, player: &PlayerId) -> Result<(), StorageError>;
}

/// Durable store for a player's earned badges.
///
/// Kept separate from `ProgressionRepository`: the two aggregates are written
/// independently.
#[async_trait]
pub trait BadgeRepository: Send + Sync {
    /// Fetch the earned set, empty if the player has none.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if badges cannot be read.
    async fn get_badges(&self, player: &PlayerId) -> Result<EarnedBadges, StorageError>;

    /// Persist the earned set. Existing unlocks keep their earliest timestamp.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if badges cannot be stored.
    async fn save_badges(&self, player: &PlayerId, badges: &EarnedBadges)
    -> Result<(), StorageError>;

    /// Remove every badge for a player.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn delete_badges(&self, player: &PlayerId) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    records: Arc<Mutex<HashMap<PlayerId, ProgressionRecord>>>,
    badges: Arc<Mutex<HashMap<PlayerId, EarnedBadges>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressionRepository for InMemoryRepository {
    async fn get_record(
        &self,
        player: &PlayerId,
    ) -> Result<Option<ProgressionRecord>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(player).cloned())
    }

    async fn save_record(
        &self,
        player: &PlayerId,
        record: &ProgressionRecord,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(player.clone(), record.clone());
        Ok(())
    }

    async fn delete_record(&self, player: &PlayerId) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(player);
        Ok(())
    }
}

#[async_trait]
impl BadgeRepository for InMemoryRepository {
    async fn get_badges(&self, player: &PlayerId) -> Result<EarnedBadges, StorageError> {
        let guard = self
            .badges
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(player).cloned().unwrap_or_default())
    }

    async fn save_badges(
        &self,
        player: &PlayerId,
        badges: &EarnedBadges,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .badges
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let merged = guard
            .get(player)
            .map_or_else(|| badges.clone(), |existing| existing.merge(badges));
        guard.insert(player.clone(), merged);
        Ok(())
    }

    async fn delete_badges(&self, player: &PlayerId) -> Result<(), StorageError> {
        let mut guard = self
            .badges
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(player);
        Ok(())
    }
}

/// Aggregates the player repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progression: Arc<dyn ProgressionRepository>,
    pub badges: Arc<dyn BadgeRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let progression: Arc<dyn ProgressionRepository> = Arc::new(repo.clone());
        let badges: Arc<dyn BadgeRepository> = Arc::new(repo);
        Self {
            progression,
            badges,
        }
    }
}
