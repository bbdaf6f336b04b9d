mod badge;
mod category;
mod ids;
mod locale;
mod pool;
mod progression;
mod question;
mod session;
mod share;

pub use badge::{
    BadgeDef, BadgeProgress, EarnedBadge, EarnedBadges, NextBadgeProgress, catalog,
    check_newly_earned, find_badge, progress_to_next_badge,
};
pub use category::{Category, ParseCategoryError};
pub use ids::{ParseIdError, PlayerId, QuestionId};
pub use locale::{Locale, LocaleError};
pub use pool::QuestionPool;
pub use progression::{ProgressionError, ProgressionRecord, ProgressionSnapshot, StreakStatus};
pub use question::{Media, MediaError, MediaKind, Question, QuestionDraft, QuestionError};
pub use session::{SessionState, SessionStateError, SessionSummary};
pub use share::share_message;
