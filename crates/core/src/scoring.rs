//! Answer evaluation and in-session score/streak bookkeeping.

use crate::model::{Question, SessionState};

/// Outcome of applying one answer to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreUpdate {
    pub is_correct: bool,
    pub score: u32,
    pub streak: u32,
    pub answered: u32,
    pub is_complete: bool,
}

/// Lenient answer match: case-insensitive containment in either direction.
///
/// Free-text answers are often paraphrased ("the planet Mars"), so an exact
/// comparison is not required. A blank submission never matches.
#[must_use]
pub fn evaluate(submitted: &str, question: &Question) -> bool {
    answers_match(submitted, question.correct_answer())
}

#[must_use]
pub fn answers_match(submitted: &str, expected: &str) -> bool {
    let submitted = submitted.trim().to_lowercase();
    let expected = expected.trim().to_lowercase();
    if submitted.is_empty() || expected.is_empty() {
        return false;
    }
    submitted.contains(&expected) || expected.contains(&submitted)
}

impl SessionState {
    /// Fold one evaluated answer into the running score and streak.
    pub fn apply_result(&mut self, is_correct: bool) -> ScoreUpdate {
        if is_correct {
            self.score = self.score.saturating_add(1);
            self.streak = self.streak.saturating_add(1);
            self.best_streak = self.best_streak.max(self.streak);
        } else {
            self.streak = 0;
        }
        self.answered = self.answered.saturating_add(1);

        ScoreUpdate {
            is_correct,
            score: self.score,
            streak: self.streak,
            answered: self.answered,
            is_complete: self.is_complete(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_ignores_case() {
        assert!(answers_match("mars", "Mars"));
        assert!(answers_match("  MARS ", "Mars"));
    }

    #[test]
    fn matching_accepts_containment_both_ways() {
        assert!(answers_match("I think it is Jupiter", "Jupiter"));
        assert!(answers_match("8", "8 minutes"));
        assert!(!answers_match("Saturn", "Jupiter"));
    }

    #[test]
    fn blank_answers_never_match() {
        assert!(!answers_match("", "Mars"));
        assert!(!answers_match("   ", "Mars"));
    }

    #[test]
    fn streak_resets_on_wrong_answer() {
        let mut state = SessionState::new(4).unwrap();
        state.apply_result(true);
        state.apply_result(true);
        let update = state.apply_result(false);
        assert_eq!(update.streak, 0);
        assert_eq!(update.score, 2);
        let update = state.apply_result(true);
        assert_eq!(update.streak, 1);
        assert!(update.is_complete);
        assert_eq!(state.best_streak(), 2);
        assert_eq!(state.accuracy(), 0.75);
    }
}
