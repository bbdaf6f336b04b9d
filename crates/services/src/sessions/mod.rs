mod phase;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use phase::SessionPhase;
pub use service::{Advance, AnswerFeedback, QuizSession, SessionCompletion};
pub use workflow::QuizLoopService;
