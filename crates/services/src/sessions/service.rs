use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::model::{
    EarnedBadge, Locale, PlayerId, Question, QuestionId, QuestionPool, SessionState,
    SessionSummary,
};

use super::phase::SessionPhase;

//
// ─── FEEDBACK ──────────────────────────────────────────────────────────────────
//

/// What the player sees after answering.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerFeedback {
    pub is_correct: bool,
    pub correct_answer: String,
    pub explanation: String,
    pub score: u32,
    pub streak: u32,
    pub answered: u32,
    pub remaining: u32,
    pub newly_earned: Vec<EarnedBadge>,
    /// False when the progression update could not be stored locally.
    pub persisted: bool,
}

/// Emitted once the session limit is reached.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCompletion {
    pub summary: SessionSummary,
    /// Badges unlocked by the final answer.
    pub newly_earned: Vec<EarnedBadge>,
}

/// Outcome of moving on from feedback.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Question(Question),
    Completed(SessionCompletion),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One player's quiz run. Lives in memory only; dropping it abandons the run.
pub struct QuizSession {
    player: PlayerId,
    locale: Locale,
    started_at: DateTime<Utc>,
    pub(crate) phase: SessionPhase,
    pub(crate) state: SessionState,
    pub(crate) pool: QuestionPool,
    pub(crate) last_answered: Option<QuestionId>,
    pub(crate) last_badges: Vec<EarnedBadge>,
}

impl QuizSession {
    pub(crate) fn new(
        player: PlayerId,
        locale: Locale,
        state: SessionState,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            player,
            locale,
            started_at,
            phase: SessionPhase::Idle,
            state,
            pool: QuestionPool::empty(locale, started_at),
            last_answered: None,
            last_badges: Vec::new(),
        }
    }

    #[must_use]
    pub fn player(&self) -> &PlayerId {
        &self.player
    }

    #[must_use]
    pub fn locale(&self) -> Locale {
        self.locale
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The question waiting for an answer, if any.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.state.current()
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn pool(&self) -> &QuestionPool {
        &self.pool
    }

    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        self.state.summary()
    }

    pub(crate) fn present(&mut self, question: Question) {
        self.state.present(question);
        self.phase = SessionPhase::AwaitingAnswer;
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("player", &self.player)
            .field("locale", &self.locale)
            .field("phase", &self.phase)
            .field("answered", &self.state.answered())
            .field("score", &self.state.score())
            .field("pool_len", &self.pool.len())
            .finish_non_exhaustive()
    }
}
