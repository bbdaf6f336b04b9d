use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashSet};

use crate::model::category::Category;
use crate::model::ids::QuestionId;
use crate::model::locale::Locale;
use crate::model::question::Question;

/// Per-locale cache of candidate questions grouped by category.
///
/// A pool is assembled in one go and never patched afterwards; refreshing means
/// building a new pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionPool {
    locale: Locale,
    built_at: DateTime<Utc>,
    by_category: BTreeMap<Category, Vec<Question>>,
}

impl QuestionPool {
    /// An empty pool, as produced by a total content outage.
    #[must_use]
    pub fn empty(locale: Locale, built_at: DateTime<Utc>) -> Self {
        Self {
            locale,
            built_at,
            by_category: BTreeMap::new(),
        }
    }

    /// Group questions by category, keeping the first occurrence of each id.
    #[must_use]
    pub fn assemble(
        locale: Locale,
        built_at: DateTime<Utc>,
        questions: impl IntoIterator<Item = Question>,
    ) -> Self {
        let mut seen = HashSet::new();
        let mut by_category: BTreeMap<Category, Vec<Question>> = BTreeMap::new();
        for question in questions {
            if !seen.insert(question.id().clone()) {
                continue;
            }
            by_category
                .entry(question.category())
                .or_default()
                .push(question);
        }
        Self {
            locale,
            built_at,
            by_category,
        }
    }

    #[must_use]
    pub fn locale(&self) -> Locale {
        self.locale
    }

    #[must_use]
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Whether the pool is older than `max_age` at `now`.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        now.signed_duration_since(self.built_at) > max_age
    }

    #[must_use]
    pub fn questions(&self, category: Category) -> &[Question] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All questions, category by category, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.by_category.values().flatten()
    }

    /// Questions whose id is not in `asked`.
    pub fn available<'a>(
        &'a self,
        asked: &'a HashSet<QuestionId>,
    ) -> impl Iterator<Item = &'a Question> + 'a {
        self.iter().filter(move |q| !asked.contains(q.id()))
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_category.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of questions per category, zero for categories with none.
    #[must_use]
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        Category::ALL
            .into_iter()
            .map(|c| (c, self.questions(c).len()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::QuestionDraft;
    use crate::time::fixed_now;

    fn question(id: &str, category: Category) -> Question {
        QuestionDraft {
            id: id.into(),
            category,
            prompt: format!("prompt {id}"),
            options: Vec::new(),
            correct_answer: "answer".into(),
            explanation: String::new(),
            media: None,
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn assemble_groups_and_drops_duplicate_ids() {
        let pool = QuestionPool::assemble(
            Locale::English,
            fixed_now(),
            vec![
                question("apod_1", Category::Apod),
                question("neo_1", Category::Neo),
                question("apod_1", Category::Apod),
                question("apod_2", Category::Apod),
            ],
        );

        assert_eq!(pool.len(), 3);
        assert_eq!(pool.questions(Category::Apod).len(), 2);
        assert!(pool.questions(Category::MarsRover).is_empty());
        assert_eq!(pool.category_counts()[&Category::MarsRover], 0);
    }

    #[test]
    fn available_excludes_asked_ids() {
        let pool = QuestionPool::assemble(
            Locale::English,
            fixed_now(),
            vec![question("apod_1", Category::Apod), question("neo_1", Category::Neo)],
        );
        let asked: HashSet<_> = [QuestionId::new("apod_1")].into_iter().collect();
        let ids: Vec<_> = pool.available(&asked).map(|q| q.id().as_str()).collect();
        assert_eq!(ids, ["neo_1"]);
    }

    #[test]
    fn staleness_is_measured_from_build_time() {
        let pool = QuestionPool::empty(Locale::Hindi, fixed_now());
        assert!(pool.is_empty());
        assert!(!pool.is_stale(fixed_now() + Duration::minutes(5), Duration::hours(1)));
        assert!(pool.is_stale(fixed_now() + Duration::hours(2), Duration::hours(1)));
    }
}
