use std::env;
use std::time::Duration;

use quiz_core::model::{Category, SessionState};

#[derive(Clone, Debug)]
pub struct NasaConfig {
    pub base_url: String,
    pub api_key: String,
}

impl NasaConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.nasa.gov";
    pub const DEMO_KEY: &'static str = "DEMO_KEY";

    /// Read `ASTRO_NASA_API_KEY` and `ASTRO_NASA_BASE_URL`, defaulting to the
    /// public demo key and endpoint.
    #[must_use]
    pub fn from_env() -> Self {
        let api_key = env::var("ASTRO_NASA_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .unwrap_or_else(|| Self::DEMO_KEY.into());
        let base_url =
            env::var("ASTRO_NASA_BASE_URL").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.into());
        Self { base_url, api_key }
    }
}

impl Default for NasaConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.into(),
            api_key: Self::DEMO_KEY.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TranslatorConfig {
    pub base_url: String,
    pub api_key: String,
}

impl TranslatorConfig {
    /// `None` when no API key is configured; callers then fall back to the
    /// identity translator.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("ASTRO_TRANSLATE_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("ASTRO_TRANSLATE_BASE_URL")
            .unwrap_or_else(|_| "https://api.sarvam.ai".into());
        Some(Self { base_url, api_key })
    }
}

/// Per-run quiz options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizSettings {
    pub session_limit: u32,
    pub categories: Vec<Category>,
    pub include_local_bank: bool,
    /// Longest a session start waits on the remote pull before playing from
    /// local progression.
    pub sync_timeout: Duration,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            session_limit: SessionState::DEFAULT_LIMIT,
            categories: Category::ALL.to_vec(),
            include_local_bank: false,
            sync_timeout: Duration::from_secs(Self::DEFAULT_SYNC_TIMEOUT_SECS),
        }
    }
}

impl QuizSettings {
    pub const DEFAULT_SYNC_TIMEOUT_SECS: u64 = 3;

    #[must_use]
    pub fn with_session_limit(mut self, limit: u32) -> Self {
        self.session_limit = limit;
        self
    }

    #[must_use]
    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    #[must_use]
    pub fn with_local_bank(mut self, include: bool) -> Self {
        self.include_local_bank = include;
        self
    }

    #[must_use]
    pub fn with_sync_timeout(mut self, timeout: Duration) -> Self {
        self.sync_timeout = timeout;
        self
    }
}
