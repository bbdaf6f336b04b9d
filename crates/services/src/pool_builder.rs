use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use quiz_core::bank;
use quiz_core::model::{Category, Locale, Question, QuestionDraft, QuestionPool};

use crate::Clock;
use crate::content::{
    ContentSource, FetchParams, RawItem, apod_draft, localize, mars_drafts, neo_drafts,
    shuffle_options,
};
use crate::translate::Translator;

/// Fetches every category concurrently and assembles a localized pool.
#[derive(Clone)]
pub struct PoolBuilder {
    clock: Clock,
    source: Arc<dyn ContentSource>,
    translator: Arc<dyn Translator>,
    include_local_bank: bool,
}

impl PoolBuilder {
    #[must_use]
    pub fn new(
        clock: Clock,
        source: Arc<dyn ContentSource>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            clock,
            source,
            translator,
            include_local_bank: false,
        }
    }

    /// Mix the built-in general-knowledge questions into every pool.
    #[must_use]
    pub fn with_local_bank(mut self, include: bool) -> Self {
        self.include_local_bank = include;
        self
    }

    /// Build a pool for `locale` from `categories`.
    ///
    /// A category that fails to fetch contributes nothing; the build itself
    /// never fails.
    pub async fn build_pool(&self, categories: &[Category], locale: Locale) -> QuestionPool {
        let params = FetchParams {
            today: self.clock.today(),
        };

        let per_category = join_all(
            categories
                .iter()
                .map(|category| self.category_drafts(*category, &params)),
        )
        .await;

        let mut drafts: Vec<QuestionDraft> = per_category.into_iter().flatten().collect();
        if self.include_local_bank {
            drafts.extend(bank::drafts());
        }

        let localized = join_all(
            drafts
                .into_iter()
                .map(|draft| localize(draft, self.translator.as_ref(), locale)),
        )
        .await;

        let mut rng = rand::rng();
        let questions: Vec<Question> = localized
            .into_iter()
            .filter_map(|draft| {
                let id = draft.id.clone();
                shuffle_options(draft, &mut rng)
                    .validate()
                    .inspect_err(|err| warn!(id = %id, error = %err, "discarding invalid question"))
                    .ok()
            })
            .collect();

        let pool = QuestionPool::assemble(locale, self.clock.now(), questions);
        info!(locale = %locale, questions = pool.len(), "question pool built");
        pool
    }

    async fn category_drafts(
        &self,
        category: Category,
        params: &FetchParams,
    ) -> Vec<QuestionDraft> {
        let items = match self.source.fetch(category, params).await {
            Ok(items) => items,
            Err(err) => {
                warn!(category = %category, error = %err, "category fetch failed");
                return Vec::new();
            }
        };
        debug!(category = %category, items = items.len(), "category fetched");
        drafts_for(category, &items)
    }
}

fn drafts_for(category: Category, items: &[RawItem]) -> Vec<QuestionDraft> {
    match category {
        Category::Apod => items
            .iter()
            .filter_map(|item| match item {
                RawItem::Apod(entry) => Some(apod_draft(entry)),
                _ => None,
            })
            .collect(),
        Category::MarsRover => {
            let photos: Vec<_> = items
                .iter()
                .filter_map(|item| match item {
                    RawItem::MarsPhoto(photo) => Some(photo.clone()),
                    _ => None,
                })
                .collect();
            mars_drafts(&photos)
        }
        Category::Neo => {
            let objects: Vec<_> = items
                .iter()
                .filter_map(|item| match item {
                    RawItem::Neo(neo) => Some(neo.clone()),
                    _ => None,
                })
                .collect();
            neo_drafts(&objects)
        }
    }
}

/// The question served when no pool question can be drawn.
///
/// Built from local data only, so it never fails. The text stays in English
/// for every locale; `locale` is only recorded in the log.
#[must_use]
pub fn build_fallback_question(locale: Locale) -> Question {
    debug!(locale = %locale, "serving fallback question");
    bank::fallback_question()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    use crate::content::{ApodEntry, NearEarthObject, OfflineSource};
    use crate::error::ContentError;
    use crate::translate::IdentityTranslator;

    struct NeoOnly;

    #[async_trait]
    impl ContentSource for NeoOnly {
        async fn fetch(
            &self,
            category: Category,
            _params: &FetchParams,
        ) -> Result<Vec<RawItem>, ContentError> {
            match category {
                Category::Neo => Ok((0..4)
                    .map(|i| {
                        RawItem::Neo(NearEarthObject {
                            id: format!("{i}"),
                            name: format!("(2024 N{i})"),
                            max_diameter_km: 1.0 + f64::from(i),
                            miss_distance_km: 1_000_000.0,
                        })
                    })
                    .collect()),
                Category::Apod => Ok(vec![RawItem::Apod(ApodEntry {
                    date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                    title: "   ".into(),
                    explanation: String::new(),
                    url: "https://apod.nasa.gov/a.jpg".into(),
                    hd_url: None,
                    is_video: false,
                })]),
                other => Err(ContentError::Unavailable { category: other }),
            }
        }
    }

    fn builder(source: Arc<dyn ContentSource>) -> PoolBuilder {
        PoolBuilder::new(
            quiz_core::time::fixed_clock(),
            source,
            Arc::new(IdentityTranslator),
        )
    }

    #[tokio::test]
    async fn failing_categories_do_not_abort_the_build() {
        let pool = builder(Arc::new(NeoOnly))
            .build_pool(&Category::ALL, Locale::English)
            .await;

        assert_eq!(pool.questions(Category::Neo).len(), 3);
        assert!(pool.questions(Category::MarsRover).is_empty());
        // Blank APOD title is rejected by validation.
        assert!(pool.questions(Category::Apod).is_empty());
        assert!(pool.iter().all(|q| q.options().contains(&q.correct_answer().to_string())));
    }

    #[tokio::test]
    async fn total_outage_yields_empty_pool_or_local_bank() {
        let empty = builder(Arc::new(OfflineSource))
            .build_pool(&Category::ALL, Locale::Hindi)
            .await;
        assert!(empty.is_empty());
        assert_eq!(empty.locale(), Locale::Hindi);

        let banked = builder(Arc::new(OfflineSource))
            .with_local_bank(true)
            .build_pool(&Category::ALL, Locale::English)
            .await;
        assert_eq!(banked.len(), 4);
    }

    #[test]
    fn fallback_question_is_deterministic() {
        assert_eq!(
            build_fallback_question(Locale::Tamil),
            build_fallback_question(Locale::English)
        );
    }

    #[test]
    fn fallback_question_stays_in_english_for_every_locale() {
        let english = bank::fallback_question();
        for locale in Locale::ALL {
            let question = build_fallback_question(locale);
            assert_eq!(question.prompt(), english.prompt());
            assert_eq!(question.options(), english.options());
        }
    }
}
