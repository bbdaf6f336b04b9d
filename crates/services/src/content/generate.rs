//! Turns raw content items into question drafts in the source locale.

use std::collections::HashMap;

use futures::future::join_all;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use quiz_core::model::{Category, Locale, Media, MediaKind, QuestionDraft};

use super::{ApodEntry, MarsPhoto, NearEarthObject};
use crate::translate::{Translator, translate_or_source};

const APOD_DISTRACTORS: [&str; 3] = [
    "A supernova explosion",
    "The Andromeda Galaxy",
    "A black hole visualization",
];
const EXPLANATION_LIMIT: usize = 200;
const ROVER_NAMES: [&str; 6] = [
    "Perseverance",
    "Ingenuity",
    "Sojourner",
    "Spirit",
    "Opportunity",
    "Curiosity",
];
const QUESTIONS_PER_ROVER: usize = 2;
const NEO_QUESTIONS: usize = 3;
const NEO_WINDOW: usize = 3;
const NEO_DECOY: &str = "Apophis";
const MAX_OPTIONS: usize = 4;

fn media(url: &str, kind: MediaKind) -> Option<Media> {
    Media::new(url, kind)
        .inspect_err(|err| debug!(url, error = %err, "dropping unusable media"))
        .ok()
}

fn truncate_explanation(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= EXPLANATION_LIMIT {
        return text.to_string();
    }
    let mut short: String = text.chars().take(EXPLANATION_LIMIT).collect();
    short.push_str("...");
    short
}

/// Picture-of-the-day question: identify the featured object by its title.
#[must_use]
pub fn apod_draft(entry: &ApodEntry) -> QuestionDraft {
    let (prompt, media) = if entry.is_video {
        (
            "What does today's NASA video show?",
            media(&entry.url, MediaKind::Video),
        )
    } else {
        let url = entry.hd_url.as_deref().unwrap_or(&entry.url);
        (
            "What astronomical object or phenomenon is featured in today's NASA image?",
            media(url, MediaKind::Image),
        )
    };

    let mut options = vec![entry.title.clone()];
    options.extend(APOD_DISTRACTORS.iter().map(|d| (*d).to_string()));

    QuestionDraft {
        id: format!("{}{}", Category::Apod.id_prefix(), entry.date),
        category: Category::Apod,
        prompt: prompt.to_string(),
        options,
        correct_answer: entry.title.clone(),
        explanation: truncate_explanation(&entry.explanation),
        media,
    }
}

/// Rover-identification questions, at most two per rover.
#[must_use]
pub fn mars_drafts(photos: &[MarsPhoto]) -> Vec<QuestionDraft> {
    let mut per_rover: HashMap<&str, usize> = HashMap::new();
    photos
        .iter()
        .filter(|&photo| {
            let taken = per_rover.entry(photo.rover.as_str()).or_insert(0);
            *taken += 1;
            *taken <= QUESTIONS_PER_ROVER
        })
        .map(mars_draft)
        .collect()
}

fn mars_draft(photo: &MarsPhoto) -> QuestionDraft {
    let mut options = vec![photo.rover.clone()];
    options.extend(
        ROVER_NAMES
            .iter()
            .filter(|name| !name.eq_ignore_ascii_case(&photo.rover))
            .take(MAX_OPTIONS - 1)
            .map(|name| (*name).to_string()),
    );

    QuestionDraft {
        id: format!("{}{}", Category::MarsRover.id_prefix(), photo.id),
        category: Category::MarsRover,
        prompt: "Which NASA rover captured this Martian landscape photo?".to_string(),
        options,
        correct_answer: photo.rover.clone(),
        explanation: format!(
            "This photo was taken by the {} rover using the {} on Sol {} ({}).",
            photo.rover, photo.camera, photo.sol, photo.earth_date
        ),
        media: media(&photo.img_src, MediaKind::Image),
    }
}

/// Asteroid questions built from sliding windows over the objects, largest first.
///
/// Each window's first object is the answer; the rest of the window and a
/// well-known decoy fill the options.
#[must_use]
pub fn neo_drafts(objects: &[NearEarthObject]) -> Vec<QuestionDraft> {
    (0..objects.len().min(NEO_QUESTIONS))
        .map(|start| {
            let end = (start + NEO_WINDOW).min(objects.len());
            neo_draft(&objects[start], &objects[start + 1..end])
        })
        .collect()
}

fn neo_draft(target: &NearEarthObject, others: &[NearEarthObject]) -> QuestionDraft {
    let mut options = vec![target.name.clone()];
    for name in others
        .iter()
        .map(|o| o.name.as_str())
        .chain(std::iter::once(NEO_DECOY))
    {
        if options.len() == MAX_OPTIONS {
            break;
        }
        if !options.iter().any(|existing| existing == name) {
            options.push(name.to_string());
        }
    }

    QuestionDraft {
        id: format!("{}{}", Category::Neo.id_prefix(), target.id),
        category: Category::Neo,
        prompt: format!(
            "Which asteroid is passing near Earth this week with a diameter of approximately {:.0} km?",
            target.max_diameter_km
        ),
        options,
        correct_answer: target.name.clone(),
        explanation: format!(
            "{} is passing near Earth with a closest approach distance of {:.0} kilometers.",
            target.name, target.miss_distance_km
        ),
        media: None,
    }
}

/// Translate the draft's text into `locale`, keeping source text where
/// translation fails. The answer follows its option so it stays selectable.
pub async fn localize(
    draft: QuestionDraft,
    translator: &dyn Translator,
    locale: Locale,
) -> QuestionDraft {
    if locale.is_source() {
        return draft;
    }

    let answer_index = draft
        .options
        .iter()
        .position(|opt| opt.trim() == draft.correct_answer.trim());

    let (prompt, explanation, options) = futures::join!(
        translate_or_source(translator, &draft.prompt, locale),
        translate_or_source(translator, &draft.explanation, locale),
        join_all(
            draft
                .options
                .iter()
                .map(|opt| translate_or_source(translator, opt, locale)),
        ),
    );

    let correct_answer = match answer_index.and_then(|i| options.get(i)) {
        Some(translated) => translated.clone(),
        None => translate_or_source(translator, &draft.correct_answer, locale).await,
    };

    QuestionDraft {
        prompt,
        explanation,
        options,
        correct_answer,
        ..draft
    }
}

/// Randomize option order so the answer is not always first.
#[must_use]
pub fn shuffle_options<R: Rng + ?Sized>(mut draft: QuestionDraft, rng: &mut R) -> QuestionDraft {
    draft.options.shuffle(rng);
    draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::error::TranslationError;

    fn apod(is_video: bool) -> ApodEntry {
        ApodEntry {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            title: "The Horsehead Nebula".into(),
            explanation: "x".repeat(250),
            url: "https://apod.nasa.gov/apod/image/horsehead.jpg".into(),
            hd_url: Some("https://apod.nasa.gov/apod/image/horsehead_hd.jpg".into()),
            is_video,
        }
    }

    fn photo(id: u64, rover: &str) -> MarsPhoto {
        MarsPhoto {
            id,
            rover: rover.into(),
            camera: "Mast Camera".into(),
            sol: 1000,
            earth_date: "2015-05-30".into(),
            img_src: format!("https://mars.nasa.gov/{id}.jpg"),
        }
    }

    fn neo(id: &str, name: &str, diameter: f64) -> NearEarthObject {
        NearEarthObject {
            id: id.into(),
            name: name.into(),
            max_diameter_km: diameter,
            miss_distance_km: 7_423_312.6,
        }
    }

    #[test]
    fn apod_image_question_prefers_hd_media() {
        let draft = apod_draft(&apod(false));
        assert_eq!(draft.id, "apod_2024-03-01");
        assert_eq!(draft.options.len(), 4);
        assert_eq!(draft.options[0], "The Horsehead Nebula");
        assert!(draft.explanation.ends_with("..."));
        assert_eq!(draft.explanation.chars().count(), 203);
        let media = draft.media.clone().unwrap();
        assert_eq!(media.kind(), MediaKind::Image);
        assert!(media.url().ends_with("horsehead_hd.jpg"));
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn apod_video_question_uses_video_prompt() {
        let draft = apod_draft(&apod(true));
        assert_eq!(draft.prompt, "What does today's NASA video show?");
        assert_eq!(draft.media.unwrap().kind(), MediaKind::Video);
    }

    #[test]
    fn mars_questions_cap_each_rover_at_two() {
        let photos = [
            photo(1, "Curiosity"),
            photo(2, "Curiosity"),
            photo(3, "Curiosity"),
            photo(4, "Spirit"),
        ];
        let drafts = mars_drafts(&photos);
        let ids: Vec<_> = drafts.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["mars_rover_1", "mars_rover_2", "mars_rover_4"]);

        let first = &drafts[0];
        assert_eq!(first.options.len(), 4);
        assert_eq!(
            first.options.iter().filter(|o| *o == "Curiosity").count(),
            1
        );
        assert_eq!(
            first.explanation,
            "This photo was taken by the Curiosity rover using the Mast Camera on Sol 1000 (2015-05-30)."
        );
    }

    #[test]
    fn neo_questions_use_sliding_windows() {
        let objects = [
            neo("1", "(2001 AA)", 1.4),
            neo("2", "(2002 BB)", 0.9),
            neo("3", "(2003 CC)", 0.5),
            neo("4", "(2004 DD)", 0.2),
        ];
        let drafts = neo_drafts(&objects);
        assert_eq!(drafts.len(), 3);
        assert_eq!(
            drafts[0].options,
            ["(2001 AA)", "(2002 BB)", "(2003 CC)", "Apophis"]
        );
        assert_eq!(
            drafts[0].prompt,
            "Which asteroid is passing near Earth this week with a diameter of approximately 1 km?"
        );
        assert_eq!(drafts[2].correct_answer, "(2003 CC)");
        assert_eq!(drafts[2].options, ["(2003 CC)", "(2004 DD)", "Apophis"]);
        assert!(drafts[0].explanation.ends_with("7423313 kilometers."));
    }

    #[test]
    fn shuffled_options_keep_the_answer() {
        let mut rng = StdRng::seed_from_u64(3);
        let draft = shuffle_options(apod_draft(&apod(false)), &mut rng);
        assert!(draft.options.contains(&draft.correct_answer));
        assert!(draft.validate().is_ok());
    }

    struct Tagging;

    #[async_trait]
    impl Translator for Tagging {
        async fn translate(
            &self,
            text: &str,
            _source: Locale,
            target: Locale,
        ) -> Result<String, TranslationError> {
            Ok(format!("[{}] {text}", target.code()))
        }
    }

    #[tokio::test]
    async fn localize_keeps_answer_among_options() {
        let draft = localize(apod_draft(&apod(false)), &Tagging, Locale::Hindi).await;
        assert_eq!(draft.correct_answer, "[hi-IN] The Horsehead Nebula");
        assert!(draft.options.contains(&draft.correct_answer));
        assert!(draft.prompt.starts_with("[hi-IN]"));
        assert!(draft.validate().is_ok());
    }
}
