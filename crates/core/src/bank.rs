//! Built-in general-knowledge questions.
//!
//! These never touch the network, so they back the pool when every remote
//! source is down and provide the last-resort fallback question.

use crate::model::{Category, Question, QuestionDraft};

struct BankEntry {
    id: &'static str,
    prompt: &'static str,
    options: [&'static str; 4],
    answer: &'static str,
    explanation: &'static str,
}

const BANK: [BankEntry; 4] = [
    BankEntry {
        id: "apod_local_planet_count",
        prompt: "How many planets are in our solar system?",
        options: ["6", "7", "8", "9"],
        answer: "8",
        explanation: "Our solar system has 8 planets: Mercury, Venus, Earth, Mars, Jupiter, Saturn, Uranus, and Neptune.",
    },
    BankEntry {
        id: "apod_local_red_planet",
        prompt: "Which planet is known as the Red Planet?",
        options: ["Venus", "Mars", "Jupiter", "Saturn"],
        answer: "Mars",
        explanation: "Mars looks red because iron oxide, or rust, covers much of its surface.",
    },
    BankEntry {
        id: "apod_local_largest_planet",
        prompt: "What is the largest planet in our solar system?",
        options: ["Saturn", "Neptune", "Jupiter", "Uranus"],
        answer: "Jupiter",
        explanation: "Jupiter is more than twice as massive as all the other planets combined.",
    },
    BankEntry {
        id: "apod_local_light_travel",
        prompt: "About how long does sunlight take to reach Earth?",
        options: ["8 seconds", "8 minutes", "8 hours", "8 days"],
        answer: "8 minutes",
        explanation: "Sunlight covers the roughly 150 million km to Earth in about 8 minutes and 20 seconds.",
    },
];

impl BankEntry {
    fn question(&self) -> Question {
        Question::from_trusted(
            self.id,
            Category::Apod,
            self.prompt,
            &self.options,
            self.answer,
            self.explanation,
        )
    }

    fn draft(&self) -> QuestionDraft {
        QuestionDraft {
            id: self.id.to_string(),
            category: Category::Apod,
            prompt: self.prompt.to_string(),
            options: self.options.iter().map(|opt| (*opt).to_string()).collect(),
            correct_answer: self.answer.to_string(),
            explanation: self.explanation.to_string(),
            media: None,
        }
    }
}

/// Every bank question as a draft, for callers that localize before validating.
#[must_use]
pub fn drafts() -> Vec<QuestionDraft> {
    BANK.iter().map(BankEntry::draft).collect()
}

/// Every bank question, ready to serve.
#[must_use]
pub fn questions() -> Vec<Question> {
    BANK.iter().map(BankEntry::question).collect()
}

/// The last-resort question served when nothing else is available.
#[must_use]
pub fn fallback_question() -> Question {
    BANK[0].question()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_entries_pass_validation() {
        for (draft, question) in drafts().into_iter().zip(questions()) {
            assert_eq!(draft.validate().unwrap(), question);
        }
    }

    #[test]
    fn fallback_is_the_planet_count_question() {
        let q = fallback_question();
        assert_eq!(q.id().as_str(), "apod_local_planet_count");
        assert_eq!(q.correct_answer(), "8");
        assert_eq!(fallback_question(), q);
    }
}
