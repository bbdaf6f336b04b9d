use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::question::Question;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("session limit must be between 1 and {max}, got {limit}")]
    InvalidLimit { limit: u32, max: u32 },
}

/// Live, in-memory state of one quiz session. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) asked: HashSet<QuestionId>,
    pub(crate) current: Option<Question>,
    pub(crate) score: u32,
    pub(crate) streak: u32,
    pub(crate) best_streak: u32,
    pub(crate) answered: u32,
    pub(crate) limit: u32,
}

impl SessionState {
    pub const DEFAULT_LIMIT: u32 = 5;
    pub const MAX_LIMIT: u32 = 50;

    /// # Errors
    ///
    /// Returns `SessionStateError::InvalidLimit` if `limit` is zero or above `MAX_LIMIT`.
    pub fn new(limit: u32) -> Result<Self, SessionStateError> {
        if limit == 0 || limit > Self::MAX_LIMIT {
            return Err(SessionStateError::InvalidLimit {
                limit,
                max: Self::MAX_LIMIT,
            });
        }
        Ok(Self {
            asked: HashSet::new(),
            current: None,
            score: 0,
            streak: 0,
            best_streak: 0,
            answered: 0,
            limit,
        })
    }

    /// Make `question` the pending one and remember it as served.
    pub fn present(&mut self, question: Question) {
        self.asked.insert(question.id().clone());
        self.current = Some(question);
    }

    /// Remove and return the pending question, if any.
    pub fn take_current(&mut self) -> Option<Question> {
        self.current.take()
    }

    /// Forget which questions were served so an exhausted pool can be reused.
    pub fn reset_asked(&mut self) {
        self.asked.clear();
    }

    #[must_use]
    pub fn asked(&self) -> &HashSet<QuestionId> {
        &self.asked
    }

    #[must_use]
    pub fn current(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    #[must_use]
    pub fn answered(&self) -> u32 {
        self.answered
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.answered)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.answered >= self.limit
    }

    /// `score / answered`, or zero before the first answer.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.answered == 0 {
            return 0.0;
        }
        f64::from(self.score) / f64::from(self.answered)
    }

    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.score,
            answered: self.answered,
            accuracy: self.accuracy(),
            best_streak: self.best_streak,
        }
    }
}

/// Result reported when a session completes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    pub score: u32,
    pub answered: u32,
    pub accuracy: f64,
    pub best_streak: u32,
}

impl SessionSummary {
    /// Accuracy rounded to a whole percentage.
    #[must_use]
    pub fn accuracy_percent(&self) -> u32 {
        // accuracy is always within [0, 1]
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = (self.accuracy * 100.0).round() as u32;
        percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_and_oversized_limits() {
        assert!(SessionState::new(0).is_err());
        assert!(SessionState::new(SessionState::MAX_LIMIT + 1).is_err());
        let state = SessionState::new(SessionState::DEFAULT_LIMIT).unwrap();
        assert_eq!(state.remaining(), 5);
        assert!(!state.is_complete());
    }

    #[test]
    fn accuracy_is_zero_without_answers() {
        let state = SessionState::new(3).unwrap();
        assert_eq!(state.accuracy(), 0.0);
        assert_eq!(state.summary().accuracy_percent(), 0);
    }
}
