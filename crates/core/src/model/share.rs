use crate::model::locale::Locale;
use crate::model::progression::ProgressionRecord;

/// A one-line brag about overall accuracy and best streak, in `locale`.
#[must_use]
pub fn share_message(record: &ProgressionRecord, locale: Locale) -> String {
    let accuracy = accuracy_percent(record);
    let best = record.best_streak();
    match locale {
        Locale::English => format!(
            "I played the space quiz today with {accuracy}% accuracy! My best streak is {best}. Can you beat me? 🚀"
        ),
        Locale::Hindi => format!(
            "मैंने आज {accuracy}% सटीकता के साथ अंतरिक्ष क्विज़ खेला! मेरा बेस्ट स्ट्रीक {best} है। क्या तुम इसे हरा सकते हो? 🚀"
        ),
        Locale::Tamil => format!(
            "இன்று நான் {accuracy}% துல்லியத்துடன் விண்வெளி வினாடி வினா விளையாடினேன்! என் சிறந்த தொடர் {best}. நீங்கள் என்னை வெல்ல முடியுமா? 🚀"
        ),
        Locale::Bengali => format!(
            "আজ আমি {accuracy}% নির্ভুলতার সাথে স্পেস কুইজ খেলেছি! আমার সেরা স্ট্রিক {best}। তুমি কি আমাকে হারাতে পারবে? 🚀"
        ),
        Locale::Marathi => format!(
            "आज मी {accuracy}% अचूकतेसह स्पेस क्विझ खेळला! माझा बेस्ट स्ट्रीक {best} आहे. तुम्ही मला हरवू शकता का? 🚀"
        ),
        Locale::Malayalam => format!(
            "ഇന്ന് ഞാൻ {accuracy}% കൃത്യതയോടെ സ്പേസ് ക്വിസ് കളിച്ചു! എന്റെ ബെസ്റ്റ് സ്ട്രീക്ക് {best} ആണ്. നിങ്ങൾക്ക് എന്നെ തോൽപ്പിക്കാൻ കഴിയുമോ? 🚀"
        ),
    }
}

fn accuracy_percent(record: &ProgressionRecord) -> u32 {
    // accuracy is always within [0, 1]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = (record.accuracy() * 100.0).round() as u32;
    percent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProgressionSnapshot;

    fn two_of_three_best_four() -> ProgressionRecord {
        ProgressionRecord::from_persisted(ProgressionSnapshot {
            total_questions: 3,
            correct_answers: 2,
            current_streak: 1,
            best_streak: 4,
            ..ProgressionSnapshot::default()
        })
        .unwrap()
    }

    #[test]
    fn every_locale_carries_rounded_accuracy_and_best_streak() {
        let record = two_of_three_best_four();
        let markers = [
            (Locale::English, "accuracy"),
            (Locale::Hindi, "सटीकता"),
            (Locale::Tamil, "துல்லியத்துடன்"),
            (Locale::Bengali, "নির্ভুলতার"),
            (Locale::Marathi, "अचूकतेसह"),
            (Locale::Malayalam, "കൃത്യതയോടെ"),
        ];
        for (locale, marker) in markers {
            let message = share_message(&record, locale);
            assert!(message.contains("67%"), "{locale}: {message}");
            assert!(message.contains('4'), "{locale}: {message}");
            assert!(message.contains(marker), "{locale}: {message}");
        }
    }

    #[test]
    fn unknown_language_shares_in_english() {
        let message = share_message(
            &two_of_three_best_four(),
            Locale::parse_or_default("klingon"),
        );
        assert_eq!(
            message,
            "I played the space quiz today with 67% accuracy! My best streak is 4. Can you beat me? 🚀"
        );
    }

    #[test]
    fn fresh_player_shares_zero_accuracy() {
        let message = share_message(&ProgressionRecord::default(), Locale::English);
        assert!(message.contains("0% accuracy"));
        assert!(message.contains("best streak is 0"));
    }
}
