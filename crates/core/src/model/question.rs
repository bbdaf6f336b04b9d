use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::category::Category;
use crate::model::ids::QuestionId;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MediaError {
    #[error("media url cannot be empty")]
    EmptyUrl,

    #[error("invalid media url: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question id cannot be empty")]
    EmptyId,

    #[error("question id {id} is not namespaced by category {category}")]
    IdNotNamespaced { id: String, category: Category },

    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("correct answer cannot be empty")]
    EmptyAnswer,

    #[error("correct answer is not one of the options")]
    AnswerNotInOptions,

    #[error(transparent)]
    Media(#[from] MediaError),
}

//
// ─── MEDIA ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Image or video attached to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    url: String,
    kind: MediaKind,
}

impl Media {
    /// # Errors
    ///
    /// Returns `MediaError` if the url is blank or cannot be parsed.
    pub fn new(url: impl AsRef<str>, kind: MediaKind) -> Result<Self, MediaError> {
        let raw = url.as_ref().trim();
        if raw.is_empty() {
            return Err(MediaError::EmptyUrl);
        }
        let parsed = Url::parse(raw).map_err(|_| MediaError::InvalidUrl(raw.to_string()))?;
        Ok(Self {
            url: parsed.to_string(),
            kind,
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn kind(&self) -> MediaKind {
        self.kind
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// Unvalidated question fields, as produced by a content generator.
#[derive(Debug, Clone)]
pub struct QuestionDraft {
    pub id: String,
    pub category: Category,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
    pub media: Option<Media>,
}

impl QuestionDraft {
    /// Validate the draft into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the id is blank or not prefixed by the category,
    /// if prompt or answer are blank, or if options are present but do not
    /// contain the answer.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(QuestionError::EmptyId);
        }
        if !id.starts_with(&self.category.id_prefix()) {
            return Err(QuestionError::IdNotNamespaced {
                id: id.to_string(),
                category: self.category,
            });
        }
        if self.prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        let correct_answer = self.correct_answer.trim().to_string();
        if correct_answer.is_empty() {
            return Err(QuestionError::EmptyAnswer);
        }

        let options: Vec<String> = self
            .options
            .into_iter()
            .map(|opt| opt.trim().to_string())
            .filter(|opt| !opt.is_empty())
            .collect();
        if !options.is_empty() && !options.iter().any(|opt| *opt == correct_answer) {
            return Err(QuestionError::AnswerNotInOptions);
        }

        Ok(Question {
            id: QuestionId::new(id),
            category: self.category,
            prompt: self.prompt.trim().to_string(),
            options,
            correct_answer,
            explanation: self.explanation.trim().to_string(),
            media: self.media,
        })
    }
}

/// A quiz question. Immutable once validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    id: QuestionId,
    category: Category,
    prompt: String,
    options: Vec<String>,
    correct_answer: String,
    explanation: String,
    media: Option<Media>,
}

impl Question {
    /// Build a question from literals already known to be valid.
    pub(crate) fn from_trusted(
        id: &str,
        category: Category,
        prompt: &str,
        options: &[&str],
        correct_answer: &str,
        explanation: &str,
    ) -> Self {
        Self {
            id: QuestionId::new(id),
            category,
            prompt: prompt.to_string(),
            options: options.iter().map(|opt| (*opt).to_string()).collect(),
            correct_answer: correct_answer.to_string(),
            explanation: explanation.to_string(),
            media: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Choices in display order. Empty for free-text questions.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn is_free_text(&self) -> bool {
        self.options.is_empty()
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn media(&self) -> Option<&Media> {
        self.media.as_ref()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> QuestionDraft {
        QuestionDraft {
            id: "mars_rover_102693".into(),
            category: Category::MarsRover,
            prompt: "Which NASA rover captured this Martian landscape photo?".into(),
            options: vec!["Curiosity".into(), "Spirit".into(), " ".into()],
            correct_answer: "Curiosity".into(),
            explanation: "Taken by Curiosity.".into(),
            media: None,
        }
    }

    #[test]
    fn valid_draft_drops_blank_options() {
        let question = draft().validate().unwrap();
        assert_eq!(question.options(), ["Curiosity", "Spirit"]);
        assert!(!question.is_free_text());
        assert_eq!(question.id().as_str(), "mars_rover_102693");
    }

    #[test]
    fn id_must_carry_category_prefix() {
        let mut d = draft();
        d.id = "apod_102693".into();
        let err = d.validate().unwrap_err();
        assert!(matches!(err, QuestionError::IdNotNamespaced { .. }));
    }

    #[test]
    fn answer_must_be_one_of_the_options() {
        let mut d = draft();
        d.correct_answer = "Perseverance".into();
        assert_eq!(d.validate().unwrap_err(), QuestionError::AnswerNotInOptions);
    }

    #[test]
    fn free_text_questions_have_no_options() {
        let mut d = draft();
        d.options.clear();
        d.correct_answer = "Perseverance".into();
        assert!(d.validate().unwrap().is_free_text());
    }

    #[test]
    fn media_rejects_relative_urls() {
        assert_eq!(Media::new("  ", MediaKind::Image), Err(MediaError::EmptyUrl));
        assert!(matches!(
            Media::new("images/mars.jpg", MediaKind::Image),
            Err(MediaError::InvalidUrl(_))
        ));
        let media = Media::new("https://apod.nasa.gov/image.jpg", MediaKind::Image).unwrap();
        assert_eq!(media.kind(), MediaKind::Image);
    }
}
