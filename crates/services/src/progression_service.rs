use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use quiz_core::model::{
    Category, EarnedBadge, EarnedBadges, NextBadgeProgress, PlayerId, ProgressionRecord,
    StreakStatus, progress_to_next_badge,
};
use storage::repository::{BadgeRepository, ProgressionRepository, Storage};

use crate::Clock;
use crate::error::ProgressionServiceError;
use crate::identity::{Identity, IdentityProvider};
use crate::sync::RemoteStore;

/// A player's two durable aggregates, held together in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerProgress {
    pub record: ProgressionRecord,
    pub badges: EarnedBadges,
}

/// Result of folding one answer into the player's progression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecorded {
    pub record: ProgressionRecord,
    pub newly_earned: Vec<EarnedBadge>,
    /// False when either aggregate could not be written locally. The update
    /// still stands in memory for the rest of the session.
    pub persisted: bool,
}

/// Streak as shown to the player today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakView {
    pub status: StreakStatus,
    pub streak: u32,
    pub best: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressExport<'a> {
    player_id: &'a PlayerId,
    stats: &'a ProgressionRecord,
    badges: &'a EarnedBadges,
    exported_at: DateTime<Utc>,
}

struct CachedProgress {
    progress: PlayerProgress,
    /// Set when the stored copy could not be read; writes are then skipped so
    /// a blank in-memory record never overwrites real data.
    detached: bool,
}

/// Owns the read-modify-write cycle for progression records and badges.
///
/// Updates are serialized behind one async mutex: a record update and its
/// badge check are written locally before the next update starts.
///
/// Remote pushes run in the background but go through one lane: each update
/// takes a sequence number under the cache lock, and a push older than the
/// last one delivered is dropped, so the remote copy never moves backwards.
pub struct ProgressionService {
    clock: Clock,
    records: Arc<dyn ProgressionRepository>,
    badges: Arc<dyn BadgeRepository>,
    identity: Arc<dyn IdentityProvider>,
    remote: Option<Arc<dyn RemoteStore>>,
    cache: Mutex<HashMap<PlayerId, CachedProgress>>,
    push_seq: AtomicU64,
    /// Sequence number of the newest snapshot delivered to the remote store.
    push_lane: Arc<Mutex<u64>>,
}

impl ProgressionService {
    #[must_use]
    pub fn new(clock: Clock, storage: &Storage, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            clock,
            records: Arc::clone(&storage.progression),
            badges: Arc::clone(&storage.badges),
            identity,
            remote: None,
            cache: Mutex::new(HashMap::new()),
            push_seq: AtomicU64::new(0),
            push_lane: Arc::new(Mutex::new(0)),
        }
    }

    #[must_use]
    pub fn with_remote(mut self, remote: Arc<dyn RemoteStore>) -> Self {
        self.remote = Some(remote);
        self
    }

    #[must_use]
    pub fn identity(&self) -> Identity {
        self.identity.current()
    }

    async fn read_stored(
        &self,
        player: &PlayerId,
    ) -> Result<PlayerProgress, ProgressionServiceError> {
        let record = self.records.get_record(player).await?.unwrap_or_default();
        let badges = self.badges.get_badges(player).await?;
        Ok(PlayerProgress { record, badges })
    }

    async fn cached<'a>(
        &self,
        cache: &'a mut HashMap<PlayerId, CachedProgress>,
        player: &PlayerId,
    ) -> &'a mut CachedProgress {
        match cache.entry(player.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(slot) => {
                let entry = match self.read_stored(player).await {
                    Ok(progress) => CachedProgress {
                        progress,
                        detached: false,
                    },
                    Err(err) => {
                        warn!(player = %player, error = %err, "progression unreadable, tracking in memory only");
                        CachedProgress {
                            progress: PlayerProgress::default(),
                            detached: true,
                        }
                    }
                };
                slot.insert(entry)
            }
        }
    }

    /// Write both aggregates independently. Returns whether both succeeded.
    async fn persist(&self, player: &PlayerId, progress: &PlayerProgress) -> bool {
        let record_saved = match self.records.save_record(player, &progress.record).await {
            Ok(()) => true,
            Err(err) => {
                warn!(player = %player, error = %err, "failed to persist progression record");
                false
            }
        };
        let badges_saved = match self.badges.save_badges(player, &progress.badges).await {
            Ok(()) => true,
            Err(err) => {
                warn!(player = %player, error = %err, "failed to persist earned badges");
                false
            }
        };
        record_saved && badges_saved
    }

    fn next_push_seq(&self) -> u64 {
        self.push_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn spawn_push(&self, identity: &Identity, progress: PlayerProgress, seq: u64) {
        let Some(remote) = self.remote.as_ref().filter(|_| identity.can_sync()) else {
            return;
        };
        let remote = Arc::clone(remote);
        let lane = Arc::clone(&self.push_lane);
        let player = identity.player_id.clone();
        tokio::spawn(async move {
            let mut delivered = lane.lock().await;
            if *delivered >= seq {
                debug!(player = %player, seq, "newer progression already pushed");
                return;
            }
            match remote.push(&player, &progress.record, &progress.badges).await {
                Ok(()) => *delivered = seq,
                Err(err) => warn!(player = %player, error = %err, "remote push failed"),
            }
        });
    }

    /// Current progression for the active player.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionServiceError` if nothing is cached and storage cannot be read.
    pub async fn load(&self) -> Result<PlayerProgress, ProgressionServiceError> {
        let player = self.identity.current().player_id;
        let cache = self.cache.lock().await;
        if let Some(entry) = cache.get(&player) {
            return Ok(entry.progress.clone());
        }
        drop(cache);
        self.read_stored(&player).await
    }

    /// Fold one answer into the active player's record and award any badges
    /// it unlocks, then persist both aggregates and push them remotely.
    ///
    /// Never fails: storage problems are reported through `persisted`.
    pub async fn record_answer(
        &self,
        is_correct: bool,
        category: Category,
        session_streak: u32,
    ) -> AnswerRecorded {
        let identity = self.identity.current();
        let player = &identity.player_id;
        let now = self.clock.now();

        let mut cache = self.cache.lock().await;
        let entry = self.cached(&mut cache, player).await;
        entry
            .progress
            .record
            .record_answer(is_correct, category, session_streak, now.date_naive());
        let newly_earned = entry.progress.badges.award(&entry.progress.record, now);
        for badge in &newly_earned {
            info!(player = %player, badge = %badge.id, "badge earned");
        }

        let progress = entry.progress.clone();
        let detached = entry.detached;

        let persisted = !detached && self.persist(player, &progress).await;
        let seq = self.next_push_seq();
        drop(cache);
        let record = progress.record.clone();
        self.spawn_push(&identity, progress, seq);

        AnswerRecorded {
            record,
            newly_earned,
            persisted,
        }
    }

    /// Merge the remote copy into the local one and store the result.
    ///
    /// Guests and services without a remote store just return local progress.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionServiceError` if the remote pull fails or local
    /// storage cannot be read. Local state is left untouched in that case.
    pub async fn pull_and_merge(&self) -> Result<PlayerProgress, ProgressionServiceError> {
        let identity = self.identity.current();
        let Some(remote) = self.remote.as_ref().filter(|_| identity.can_sync()) else {
            debug!(player = %identity.player_id, "remote sync skipped");
            return self.load().await;
        };

        let snapshot = remote.pull(&identity.player_id).await?;
        let player = &identity.player_id;

        let mut cache = self.cache.lock().await;
        let entry = self.cached(&mut cache, player).await;
        if let Some(record) = &snapshot.record {
            entry.progress.record = entry.progress.record.merge(record);
        }
        if let Some(badges) = &snapshot.badges {
            entry.progress.badges = entry.progress.badges.merge(badges);
        }
        let progress = entry.progress.clone();
        if !entry.detached {
            self.persist(player, &progress).await;
        }
        drop(cache);
        Ok(progress)
    }

    /// Push the current progression to the remote store and wait for it.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionServiceError` if local state cannot be read or the
    /// push fails.
    pub async fn sync_to_remote(&self) -> Result<(), ProgressionServiceError> {
        let identity = self.identity.current();
        let Some(remote) = self.remote.as_ref().filter(|_| identity.can_sync()) else {
            return Ok(());
        };
        let mut delivered = self.push_lane.lock().await;
        let seq = self.push_seq.load(Ordering::Relaxed);
        let progress = self.load().await?;
        remote
            .push(&identity.player_id, &progress.record, &progress.badges)
            .await?;
        *delivered = (*delivered).max(seq);
        Ok(())
    }

    /// Delete the active player's record and badges.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionServiceError` if either delete fails.
    pub async fn reset(&self) -> Result<(), ProgressionServiceError> {
        let player = self.identity.current().player_id;
        let mut cache = self.cache.lock().await;
        self.records.delete_record(&player).await?;
        self.badges.delete_badges(&player).await?;
        cache.remove(&player);
        info!(player = %player, "progression reset");
        Ok(())
    }

    /// Stats and badges as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionServiceError` if progression cannot be loaded or encoded.
    pub async fn export_json(&self) -> Result<String, ProgressionServiceError> {
        let player = self.identity.current().player_id;
        let progress = self.load().await?;
        let export = ProgressExport {
            player_id: &player,
            stats: &progress.record,
            badges: &progress.badges,
            exported_at: self.clock.now(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// # Errors
    ///
    /// Returns `ProgressionServiceError` if progression cannot be loaded.
    pub async fn next_badge(&self) -> Result<Option<NextBadgeProgress>, ProgressionServiceError> {
        let progress = self.load().await?;
        Ok(progress_to_next_badge(&progress.record, &progress.badges))
    }

    /// # Errors
    ///
    /// Returns `ProgressionServiceError` if progression cannot be loaded.
    pub async fn streak(&self) -> Result<StreakView, ProgressionServiceError> {
        let progress = self.load().await?;
        let today = self.clock.today();
        Ok(StreakView {
            status: progress.record.streak_status(today),
            streak: progress.record.validated_streak(today),
            best: progress.record.best_streak(),
        })
    }
}
