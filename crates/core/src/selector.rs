//! Question selection without repeats.

use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::HashSet;

use crate::model::{Question, QuestionId, QuestionPool};

/// Fewer unserved questions than this and the caller is asked to refill.
pub const MIN_AVAILABLE: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A question not yet served in this session.
    Next(Question),
    /// Fewer than `MIN_AVAILABLE` unserved questions remain. The caller decides
    /// whether to rebuild the pool, reset the asked set, or take the remainder.
    NeedsRefill { remaining: usize },
    /// The pool holds no questions at all.
    Exhausted,
}

/// Pick the next question uniformly at random among the unserved ones.
pub fn next<R: Rng + ?Sized>(
    pool: &QuestionPool,
    asked: &HashSet<QuestionId>,
    rng: &mut R,
) -> Selection {
    if pool.is_empty() {
        return Selection::Exhausted;
    }
    let available: Vec<&Question> = pool.available(asked).collect();
    if available.len() < MIN_AVAILABLE {
        return Selection::NeedsRefill {
            remaining: available.len(),
        };
    }
    available
        .choose(rng)
        .map_or(Selection::Exhausted, |q| Selection::Next((*q).clone()))
}

/// Take any unserved question, even the last one left.
pub fn take_remaining<R: Rng + ?Sized>(
    pool: &QuestionPool,
    asked: &HashSet<QuestionId>,
    rng: &mut R,
) -> Option<Question> {
    let available: Vec<&Question> = pool.available(asked).collect();
    available.choose(rng).map(|q| (*q).clone())
}

/// Pick from the whole pool, avoiding `previous` when another question exists.
///
/// Used after the asked set was reset so the question just answered does not
/// come straight back.
pub fn draw_after_reset<R: Rng + ?Sized>(
    pool: &QuestionPool,
    previous: Option<&QuestionId>,
    rng: &mut R,
) -> Option<Question> {
    let candidates: Vec<&Question> = pool
        .iter()
        .filter(|q| Some(q.id()) != previous)
        .collect();
    if candidates.is_empty() {
        return pool.iter().next().cloned();
    }
    candidates.choose(rng).map(|q| (*q).clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Locale, QuestionDraft};
    use crate::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pool_of(n: usize) -> QuestionPool {
        let questions = (0..n).map(|i| {
            QuestionDraft {
                id: format!("neo_{i}"),
                category: Category::Neo,
                prompt: format!("Which asteroid {i}?"),
                options: Vec::new(),
                correct_answer: format!("Asteroid {i}"),
                explanation: String::new(),
                media: None,
            }
            .validate()
            .unwrap()
        });
        QuestionPool::assemble(Locale::English, fixed_now(), questions)
    }

    #[test]
    fn empty_pool_is_exhausted() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool = pool_of(0);
        assert_eq!(next(&pool, &HashSet::new(), &mut rng), Selection::Exhausted);
        assert!(draw_after_reset(&pool, None, &mut rng).is_none());
    }

    #[test]
    fn never_repeats_until_refill_is_requested() {
        let mut rng = StdRng::seed_from_u64(42);
        let pool = pool_of(6);
        let mut asked = HashSet::new();

        for _ in 0..5 {
            match next(&pool, &asked, &mut rng) {
                Selection::Next(q) => assert!(asked.insert(q.id().clone())),
                other => panic!("unexpected selection: {other:?}"),
            }
        }
        assert_eq!(
            next(&pool, &asked, &mut rng),
            Selection::NeedsRefill { remaining: 1 }
        );

        let last = take_remaining(&pool, &asked, &mut rng).unwrap();
        assert!(!asked.contains(last.id()));
        asked.insert(last.id().clone());
        assert!(take_remaining(&pool, &asked, &mut rng).is_none());
    }

    #[test]
    fn draw_after_reset_avoids_previous_question() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool = pool_of(2);
        let previous = QuestionId::new("neo_0");
        for _ in 0..10 {
            let q = draw_after_reset(&pool, Some(&previous), &mut rng).unwrap();
            assert_eq!(q.id().as_str(), "neo_1");
        }

        let single = pool_of(1);
        let q = draw_after_reset(&single, Some(&previous), &mut rng).unwrap();
        assert_eq!(q.id(), &previous);
    }
}
