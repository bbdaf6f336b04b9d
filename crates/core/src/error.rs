use thiserror::Error;

use crate::model::{LocaleError, MediaError, ProgressionError, QuestionError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error(transparent)]
    Progression(#[from] ProgressionError),
    #[error(transparent)]
    Locale(#[from] LocaleError),
}
