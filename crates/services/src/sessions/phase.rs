/// Where a quiz session is in its question/answer loop.
///
/// `Idle → Loading → AwaitingAnswer → Evaluating → Feedback`, then back to
/// `AwaitingAnswer` or on to `Completed` once the limit is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    Idle,
    Loading,
    AwaitingAnswer,
    Evaluating,
    Feedback,
    Completed,
}

impl SessionPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionPhase::Completed)
    }

    #[must_use]
    pub fn accepts_answer(self) -> bool {
        matches!(self, SessionPhase::AwaitingAnswer)
    }
}
