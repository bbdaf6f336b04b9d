use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LocaleError {
    #[error("unsupported locale: {0}")]
    Unsupported(String),
}

/// Languages the quiz can be played in.
///
/// Question content is authored in English and translated on demand; English is
/// therefore the source locale for every generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    English,
    Hindi,
    Tamil,
    Bengali,
    Marathi,
    Malayalam,
}

impl Locale {
    pub const SOURCE: Locale = Locale::English;

    pub const ALL: [Locale; 6] = [
        Locale::English,
        Locale::Hindi,
        Locale::Tamil,
        Locale::Bengali,
        Locale::Marathi,
        Locale::Malayalam,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Locale::English => "english",
            Locale::Hindi => "hindi",
            Locale::Tamil => "tamil",
            Locale::Bengali => "bengali",
            Locale::Marathi => "marathi",
            Locale::Malayalam => "malayalam",
        }
    }

    /// Language code understood by the translation service.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Locale::English => "en-IN",
            Locale::Hindi => "hi-IN",
            Locale::Tamil => "ta-IN",
            Locale::Bengali => "bn-IN",
            Locale::Marathi => "mr-IN",
            Locale::Malayalam => "ml-IN",
        }
    }

    #[must_use]
    pub fn is_source(self) -> bool {
        self == Self::SOURCE
    }

    /// Parses a locale name or code, falling back to English for unknown input.
    #[must_use]
    pub fn parse_or_default(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Locale::ALL
            .into_iter()
            .find(|locale| locale.name() == needle || locale.code().eq_ignore_ascii_case(&needle))
            .ok_or(LocaleError::Unsupported(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_codes() {
        assert_eq!("Hindi".parse::<Locale>().unwrap(), Locale::Hindi);
        assert_eq!("ta-IN".parse::<Locale>().unwrap(), Locale::Tamil);
        assert!("klingon".parse::<Locale>().is_err());
    }

    #[test]
    fn unknown_locale_defaults_to_english() {
        assert_eq!(Locale::parse_or_default("klingon"), Locale::English);
        assert!(Locale::parse_or_default("").is_source());
    }
}
