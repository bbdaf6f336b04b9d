use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::category::Category;
use crate::model::progression::ProgressionRecord;

//
// ─── CATALOG ──────────────────────────────────────────────────────────────────
//

/// Measurable quantity a badge is unlocked by, used for "next badge" hints.
#[derive(Debug, Clone, Copy)]
pub struct BadgeProgress {
    pub metric: fn(&ProgressionRecord) -> u32,
    pub target: u32,
}

/// Static badge definition. Predicates are pure functions of the record.
#[derive(Debug, Clone, Copy)]
pub struct BadgeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub unlocked: fn(&ProgressionRecord) -> bool,
    pub progress: Option<BadgeProgress>,
}

impl BadgeDef {
    #[must_use]
    pub fn is_unlocked_by(&self, record: &ProgressionRecord) -> bool {
        (self.unlocked)(record)
    }
}

const CATEGORY_MASTERY: u32 = 5;
const STREAK_MASTERY: u32 = 10;
const DAYS_EXPLORED: u32 = 7;
const EXPERT_CORRECT: u32 = 100;
const PERFECT_MIN_QUESTIONS: u32 = 5;

fn mars_correct(r: &ProgressionRecord) -> u32 {
    r.category_correct(Category::MarsRover)
}

fn apod_correct(r: &ProgressionRecord) -> u32 {
    r.category_correct(Category::Apod)
}

fn neo_correct(r: &ProgressionRecord) -> u32 {
    r.category_correct(Category::Neo)
}

static CATALOG: [BadgeDef; 8] = [
    BadgeDef {
        id: "first_steps",
        name: "First Steps",
        description: "Complete your first quiz",
        icon: "🚀",
        unlocked: |r| r.total_questions() >= 1,
        progress: None,
    },
    BadgeDef {
        id: "mars_master",
        name: "Mars Master",
        description: "Get 5 Mars Rover questions correct",
        icon: "🔴",
        unlocked: |r| mars_correct(r) >= CATEGORY_MASTERY,
        progress: Some(BadgeProgress {
            metric: mars_correct,
            target: CATEGORY_MASTERY,
        }),
    },
    BadgeDef {
        id: "space_photographer",
        name: "Space Photographer",
        description: "Get 5 APOD questions correct",
        icon: "📸",
        unlocked: |r| apod_correct(r) >= CATEGORY_MASTERY,
        progress: Some(BadgeProgress {
            metric: apod_correct,
            target: CATEGORY_MASTERY,
        }),
    },
    BadgeDef {
        id: "asteroid_hunter",
        name: "Asteroid Hunter",
        description: "Get 5 Near-Earth Object questions correct",
        icon: "☄️",
        unlocked: |r| neo_correct(r) >= CATEGORY_MASTERY,
        progress: Some(BadgeProgress {
            metric: neo_correct,
            target: CATEGORY_MASTERY,
        }),
    },
    BadgeDef {
        id: "streak_master",
        name: "Streak Master",
        description: "Achieve a streak of 10",
        icon: "🔥",
        unlocked: |r| r.best_streak() >= STREAK_MASTERY,
        progress: Some(BadgeProgress {
            metric: ProgressionRecord::best_streak,
            target: STREAK_MASTERY,
        }),
    },
    BadgeDef {
        id: "perfect_score",
        name: "Perfect Score",
        description: "Get 100% accuracy over at least 5 questions",
        icon: "⭐",
        unlocked: |r| {
            r.total_questions() >= PERFECT_MIN_QUESTIONS && r.correct_answers() == r.total_questions()
        },
        progress: None,
    },
    BadgeDef {
        id: "daily_explorer",
        name: "Daily Explorer",
        description: "Play on 7 different days",
        icon: "🌟",
        unlocked: |r| r.total_days_played() >= DAYS_EXPLORED,
        progress: Some(BadgeProgress {
            metric: ProgressionRecord::total_days_played,
            target: DAYS_EXPLORED,
        }),
    },
    BadgeDef {
        id: "space_expert",
        name: "Space Expert",
        description: "Answer 100 questions correctly",
        icon: "🎓",
        unlocked: |r| r.correct_answers() >= EXPERT_CORRECT,
        progress: Some(BadgeProgress {
            metric: ProgressionRecord::correct_answers,
            target: EXPERT_CORRECT,
        }),
    },
];

/// Every badge a player can earn, in display order.
#[must_use]
pub fn catalog() -> &'static [BadgeDef] {
    &CATALOG
}

#[must_use]
pub fn find_badge(id: &str) -> Option<&'static BadgeDef> {
    CATALOG.iter().find(|badge| badge.id == id)
}

//
// ─── EARNED SET ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnedBadge {
    pub id: String,
    pub earned_at: DateTime<Utc>,
}

/// Badges a player has unlocked, keyed by id. Append-only.
///
/// Serialized as a list of `{ id, earnedAt }` objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<EarnedBadge>", into = "Vec<EarnedBadge>")]
pub struct EarnedBadges(BTreeMap<String, DateTime<Utc>>);

impl EarnedBadges {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    #[must_use]
    pub fn earned_at(&self, id: &str) -> Option<DateTime<Utc>> {
        self.0.get(id).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = EarnedBadge> + '_ {
        self.0.iter().map(|(id, at)| EarnedBadge {
            id: id.clone(),
            earned_at: *at,
        })
    }

    /// Record a badge unless it is already present. Returns whether it was new.
    pub fn insert(&mut self, id: impl Into<String>, earned_at: DateTime<Utc>) -> bool {
        let id = id.into();
        if self.0.contains_key(&id) {
            return false;
        }
        self.0.insert(id, earned_at);
        true
    }

    /// Evaluate the catalog against `record` and add every newly unlocked badge.
    pub fn award(&mut self, record: &ProgressionRecord, at: DateTime<Utc>) -> Vec<EarnedBadge> {
        let fresh = check_newly_earned(record, self);
        let mut awarded = Vec::with_capacity(fresh.len());
        for badge in fresh {
            if self.insert(badge.id, at) {
                awarded.push(EarnedBadge {
                    id: badge.id.to_string(),
                    earned_at: at,
                });
            }
        }
        awarded
    }

    /// Union by id, keeping the earliest unlock time on conflict.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut merged = self.0.clone();
        for (id, at) in &other.0 {
            merged
                .entry(id.clone())
                .and_modify(|existing| *existing = (*existing).min(*at))
                .or_insert(*at);
        }
        Self(merged)
    }
}

impl From<Vec<EarnedBadge>> for EarnedBadges {
    fn from(list: Vec<EarnedBadge>) -> Self {
        let mut map: BTreeMap<String, DateTime<Utc>> = BTreeMap::new();
        for badge in list {
            let at = badge.earned_at;
            map.entry(badge.id)
                .and_modify(|existing| *existing = (*existing).min(at))
                .or_insert(at);
        }
        Self(map)
    }
}

impl From<EarnedBadges> for Vec<EarnedBadge> {
    fn from(set: EarnedBadges) -> Self {
        set.iter().collect()
    }
}

//
// ─── EVALUATION ───────────────────────────────────────────────────────────────
//

/// Catalog badges not yet in `earned` whose predicate holds for `record`.
#[must_use]
pub fn check_newly_earned(
    record: &ProgressionRecord,
    earned: &EarnedBadges,
) -> Vec<&'static BadgeDef> {
    CATALOG
        .iter()
        .filter(|badge| !earned.contains(badge.id) && badge.is_unlocked_by(record))
        .collect()
}

/// The first unearned badge with measurable progress that is not yet complete.
#[derive(Debug, Clone, Copy)]
pub struct NextBadgeProgress {
    pub badge: &'static BadgeDef,
    pub progress: u32,
    pub target: u32,
}

#[must_use]
pub fn progress_to_next_badge(
    record: &ProgressionRecord,
    earned: &EarnedBadges,
) -> Option<NextBadgeProgress> {
    CATALOG
        .iter()
        .filter(|badge| !earned.contains(badge.id))
        .find_map(|badge| {
            let tracked = badge.progress?;
            let progress = (tracked.metric)(record);
            (progress < tracked.target).then_some(NextBadgeProgress {
                badge,
                progress,
                target: tracked.target,
            })
        })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::progression::ProgressionSnapshot;
    use crate::time::fixed_now;
    use chrono::{Duration, NaiveDate};

    fn ids(badges: &[&BadgeDef]) -> Vec<&'static str> {
        badges.iter().map(|b| b.id).collect()
    }

    #[test]
    fn catalog_ids_are_unique() {
        let mut seen = std::collections::HashSet::new();
        assert!(catalog().iter().all(|b| seen.insert(b.id)));
        assert!(find_badge("streak_master").is_some());
        assert!(find_badge("unknown").is_none());
    }

    #[test]
    fn fifth_correct_answer_fires_each_badge_once() {
        let mut record = ProgressionRecord::from_persisted(ProgressionSnapshot {
            total_questions: 4,
            correct_answers: 4,
            current_streak: 4,
            best_streak: 4,
            per_category_correct: BTreeMap::from([(Category::MarsRover, 4)]),
            last_play_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            total_days_played: 1,
            ..ProgressionSnapshot::default()
        })
        .unwrap();
        let mut earned = EarnedBadges::new();
        earned.insert("first_steps", fixed_now());

        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        record.record_answer(true, Category::MarsRover, 5, today);
        assert_eq!(record.total_questions(), 5);
        assert_eq!(record.correct_answers(), 5);

        let fresh = check_newly_earned(&record, &earned);
        assert_eq!(ids(&fresh), ["mars_master", "perfect_score"]);

        let awarded = earned.award(&record, fixed_now());
        assert_eq!(awarded.len(), 2);
        assert!(check_newly_earned(&record, &earned).is_empty());
        assert!(earned.award(&record, fixed_now() + Duration::days(1)).is_empty());
        assert_eq!(earned.earned_at("mars_master"), Some(fixed_now()));
    }

    #[test]
    fn merge_keeps_earliest_unlock() {
        let early = fixed_now();
        let late = early + Duration::hours(3);
        let mut local = EarnedBadges::new();
        local.insert("first_steps", late);
        local.insert("mars_master", late);
        let mut remote = EarnedBadges::new();
        remote.insert("first_steps", early);
        remote.insert("asteroid_hunter", late);

        let merged = local.merge(&remote);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.earned_at("first_steps"), Some(early));
        assert_eq!(merged, remote.merge(&local));
        assert_eq!(merged.merge(&merged), merged);
    }

    #[test]
    fn next_badge_skips_earned_and_completed() {
        let record = ProgressionRecord::from_persisted(ProgressionSnapshot {
            total_questions: 3,
            correct_answers: 3,
            per_category_correct: BTreeMap::from([(Category::MarsRover, 3)]),
            ..ProgressionSnapshot::default()
        })
        .unwrap();
        let next = progress_to_next_badge(&record, &EarnedBadges::new()).unwrap();
        assert_eq!(next.badge.id, "mars_master");
        assert_eq!((next.progress, next.target), (3, 5));

        let mut earned = EarnedBadges::new();
        earned.insert("mars_master", fixed_now());
        let next = progress_to_next_badge(&record, &earned).unwrap();
        assert_eq!(next.badge.id, "space_photographer");
        assert_eq!(next.progress, 0);
    }

    #[test]
    fn earned_set_serializes_as_list() {
        let mut earned = EarnedBadges::new();
        earned.insert("first_steps", fixed_now());
        let json = serde_json::to_value(&earned).unwrap();
        assert_eq!(json[0]["id"], "first_steps");
        assert!(json[0]["earnedAt"].is_string());

        let back: EarnedBadges = serde_json::from_value(json).unwrap();
        assert_eq!(back, earned);
    }
}
