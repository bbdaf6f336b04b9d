#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod content;
pub mod error;
pub mod identity;
pub mod pool_builder;
pub mod progression_service;
pub mod sessions;
pub mod sync;
pub mod translate;

pub use quiz_core::Clock;

pub use app_services::{AppServices, Collaborators};
pub use config::{NasaConfig, QuizSettings, TranslatorConfig};
pub use error::{
    AppServicesError, ContentError, ProgressionServiceError, SessionError, SyncError,
    TranslationError,
};
pub use pool_builder::{PoolBuilder, build_fallback_question};
pub use progression_service::{AnswerRecorded, PlayerProgress, ProgressionService, StreakView};
pub use sessions::{
    Advance, AnswerFeedback, QuizLoopService, QuizSession, SessionCompletion, SessionPhase,
};
