use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use quiz_core::model::{Locale, Question, QuestionPool, SessionState};
use quiz_core::scoring;
use quiz_core::selector::{self, Selection};

use super::phase::SessionPhase;
use super::service::{Advance, AnswerFeedback, QuizSession, SessionCompletion};
use crate::Clock;
use crate::config::QuizSettings;
use crate::error::SessionError;
use crate::pool_builder::{PoolBuilder, build_fallback_question};
use crate::progression_service::ProgressionService;

/// Releases the warm-up flag when session start finishes or is abandoned.
struct WarmUpGuard<'a>(&'a AtomicBool);

impl<'a> WarmUpGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for WarmUpGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives quiz sessions: pool warm-up, question draws, answer evaluation and
/// progression updates.
pub struct QuizLoopService {
    clock: Clock,
    settings: QuizSettings,
    pool_builder: PoolBuilder,
    progression: Arc<ProgressionService>,
    pool_max_age: Duration,
    warming: AtomicBool,
    pool: Mutex<Option<QuestionPool>>,
}

impl QuizLoopService {
    /// Pools older than this are rebuilt when a session starts.
    pub const DEFAULT_POOL_MAX_AGE_MINUTES: i64 = 30;

    #[must_use]
    pub fn new(
        clock: Clock,
        settings: QuizSettings,
        pool_builder: PoolBuilder,
        progression: Arc<ProgressionService>,
    ) -> Self {
        Self {
            clock,
            settings,
            pool_builder,
            progression,
            pool_max_age: Duration::minutes(Self::DEFAULT_POOL_MAX_AGE_MINUTES),
            warming: AtomicBool::new(false),
            pool: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_pool_max_age(mut self, max_age: Duration) -> Self {
        self.pool_max_age = max_age;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn progression(&self) -> Arc<ProgressionService> {
        Arc::clone(&self.progression)
    }

    /// Start a session in `locale` and draw its first question.
    ///
    /// Remote progression is merged in first, bounded by the configured sync
    /// timeout; sync failures and timeouts are logged and the session starts
    /// from local state. Content failures degrade to the
    /// fallback question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::WarmUpInProgress` if another start is still
    /// warming up, or `SessionError::State` for an invalid session limit.
    pub async fn start_session(&self, locale: Locale) -> Result<QuizSession, SessionError> {
        let state = SessionState::new(self.settings.session_limit)?;
        let _guard = WarmUpGuard::acquire(&self.warming).ok_or(SessionError::WarmUpInProgress)?;

        let player = self.progression.identity().player_id;
        let mut session = QuizSession::new(player, locale, state, self.clock.now());
        session.phase = SessionPhase::Loading;

        match tokio::time::timeout(self.settings.sync_timeout, self.progression.pull_and_merge())
            .await
        {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => {
                warn!(error = %err, "remote progression unavailable, continuing locally");
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.settings.sync_timeout.as_millis(),
                    "remote progression timed out, continuing locally"
                );
            }
        }

        session.pool = self.warm_pool(locale, false).await;
        let question = self.draw(&mut session).await;
        session.present(question);
        info!(
            player = %session.player(),
            locale = %locale,
            limit = session.state().limit(),
            "quiz session started"
        );
        Ok(session)
    }

    /// Evaluate `answer` against the pending question and update progression.
    ///
    /// Returns `None` when no question is awaiting an answer; the submission
    /// is ignored in that case.
    pub async fn submit_answer(
        &self,
        session: &mut QuizSession,
        answer: &str,
    ) -> Option<AnswerFeedback> {
        if !session.phase.accepts_answer() {
            debug!(phase = ?session.phase, "ignoring answer outside of a question");
            return None;
        }
        let question = session.state.take_current()?;
        session.phase = SessionPhase::Evaluating;

        let is_correct = scoring::evaluate(answer, &question);
        let update = session.state.apply_result(is_correct);
        let recorded = self
            .progression
            .record_answer(is_correct, question.category(), update.streak)
            .await;
        if !recorded.persisted {
            warn!(question = %question.id(), "progression kept in memory only");
        }

        session.last_answered = Some(question.id().clone());
        session.last_badges.clone_from(&recorded.newly_earned);
        session.phase = SessionPhase::Feedback;

        Some(AnswerFeedback {
            is_correct,
            correct_answer: question.correct_answer().to_string(),
            explanation: question.explanation().to_string(),
            score: update.score,
            streak: update.streak,
            answered: update.answered,
            remaining: session.state.remaining(),
            newly_earned: recorded.newly_earned,
            persisted: recorded.persisted,
        })
    }

    /// Leave feedback: draw the next question, or complete the session once
    /// the limit is reached.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after completion and
    /// `SessionError::NoFeedbackPending` from any phase other than feedback.
    pub async fn advance(&self, session: &mut QuizSession) -> Result<Advance, SessionError> {
        match session.phase {
            SessionPhase::Feedback => {}
            SessionPhase::Completed => return Err(SessionError::Completed),
            other => return Err(SessionError::NoFeedbackPending(other)),
        }

        if session.state.is_complete() {
            session.phase = SessionPhase::Completed;
            let summary = session.summary();
            info!(
                player = %session.player(),
                score = summary.score,
                answered = summary.answered,
                "quiz session completed"
            );
            return Ok(Advance::Completed(SessionCompletion {
                summary,
                newly_earned: std::mem::take(&mut session.last_badges),
            }));
        }

        let question = self.draw(session).await;
        session.present(question.clone());
        Ok(Advance::Question(question))
    }

    /// Drop the cached pool so the next session rebuilds it.
    pub async fn invalidate_pool(&self) {
        self.pool.lock().await.take();
    }

    async fn warm_pool(&self, locale: Locale, force: bool) -> QuestionPool {
        let mut cached = self.pool.lock().await;
        let reusable = cached.as_ref().filter(|pool| {
            !force
                && !pool.is_empty()
                && pool.locale() == locale
                && !pool.is_stale(self.clock.now(), self.pool_max_age)
        });
        if let Some(pool) = reusable {
            debug!(locale = %locale, "reusing cached question pool");
            return pool.clone();
        }

        let pool = self
            .pool_builder
            .build_pool(&self.settings.categories, locale)
            .await;
        // An outage pool is never cached; the next warm-up retries the sources.
        *cached = (!pool.is_empty()).then(|| pool.clone());
        pool
    }

    /// Next unserved question. Rebuilds the pool once when it is empty or runs
    /// low, then takes the last unserved question, then starts over after
    /// resetting the asked set. Falls back to the built-in question when the
    /// pool is still empty after the rebuild.
    async fn draw(&self, session: &mut QuizSession) -> Question {
        let selection = selector::next(&session.pool, session.state.asked(), &mut rand::rng());
        match selection {
            Selection::Next(question) => return question,
            Selection::Exhausted => {
                info!(locale = %session.locale(), "question pool empty, rebuilding");
            }
            Selection::NeedsRefill { remaining } => {
                info!(remaining, "question pool running low, rebuilding");
            }
        }

        session.pool = self.warm_pool(session.locale(), true).await;
        let selection = selector::next(&session.pool, session.state.asked(), &mut rand::rng());
        if let Selection::Next(question) = selection {
            return question;
        }

        if let Some(question) =
            selector::take_remaining(&session.pool, session.state.asked(), &mut rand::rng())
        {
            return question;
        }

        if !session.pool.is_empty() {
            info!("every pooled question served, resetting asked set");
            session.state.reset_asked();
            if let Some(question) = selector::draw_after_reset(
                &session.pool,
                session.last_answered.as_ref(),
                &mut rand::rng(),
            ) {
                return question;
            }
        }

        warn!(locale = %session.locale(), "no pooled question available");
        build_fallback_question(session.locale())
    }
}
