//! Remote copy of a player's progression.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use quiz_core::model::{EarnedBadges, PlayerId, ProgressionRecord};

use crate::error::SyncError;

/// What a remote store holds for a player. Either half may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteSnapshot {
    pub record: Option<ProgressionRecord>,
    pub badges: Option<EarnedBadges>,
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `SyncError` when the remote copy cannot be written.
    async fn push(
        &self,
        player: &PlayerId,
        record: &ProgressionRecord,
        badges: &EarnedBadges,
    ) -> Result<(), SyncError>;

    /// # Errors
    ///
    /// Returns `SyncError` when the remote copy cannot be read.
    async fn pull(&self, player: &PlayerId) -> Result<RemoteSnapshot, SyncError>;
}

/// Remote store kept in process memory, for tests and local demos.
#[derive(Clone, Default)]
pub struct InMemoryRemoteStore {
    players: Arc<Mutex<HashMap<PlayerId, RemoteSnapshot>>>,
}

impl InMemoryRemoteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the remote copy for a player, replacing what was there.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if the store lock is poisoned.
    pub fn seed(&self, player: &PlayerId, snapshot: RemoteSnapshot) -> Result<(), SyncError> {
        let mut guard = self
            .players
            .lock()
            .map_err(|e| SyncError::Unavailable(e.to_string()))?;
        guard.insert(player.clone(), snapshot);
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn push(
        &self,
        player: &PlayerId,
        record: &ProgressionRecord,
        badges: &EarnedBadges,
    ) -> Result<(), SyncError> {
        self.seed(
            player,
            RemoteSnapshot {
                record: Some(record.clone()),
                badges: Some(badges.clone()),
            },
        )
    }

    async fn pull(&self, player: &PlayerId) -> Result<RemoteSnapshot, SyncError> {
        let guard = self
            .players
            .lock()
            .map_err(|e| SyncError::Unavailable(e.to_string()))?;
        Ok(guard.get(player).cloned().unwrap_or_default())
    }
}
