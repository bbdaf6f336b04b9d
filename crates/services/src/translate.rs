use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use quiz_core::model::Locale;

use crate::config::TranslatorConfig;
use crate::error::TranslationError;

/// Translates question text between locales.
#[async_trait]
pub trait Translator: Send + Sync {
    /// # Errors
    ///
    /// Returns `TranslationError` when the provider cannot produce a translation.
    async fn translate(
        &self,
        text: &str,
        source: Locale,
        target: Locale,
    ) -> Result<String, TranslationError>;
}

/// Returns the text unchanged. Used when no provider is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

#[async_trait]
impl Translator for IdentityTranslator {
    async fn translate(
        &self,
        text: &str,
        _source: Locale,
        _target: Locale,
    ) -> Result<String, TranslationError> {
        Ok(text.to_string())
    }
}

/// Translator backed by an HTTP translation API.
#[derive(Clone)]
pub struct HttpTranslator {
    client: Client,
    config: TranslatorConfig,
}

impl HttpTranslator {
    #[must_use]
    pub fn new(config: TranslatorConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(
        &self,
        text: &str,
        source: Locale,
        target: Locale,
    ) -> Result<String, TranslationError> {
        let url = format!("{}/translate", self.config.base_url.trim_end_matches('/'));
        let payload = TranslateRequest {
            input: text,
            source_language_code: source.code(),
            target_language_code: target.code(),
        };

        let response = self
            .client
            .post(url)
            .header("API-Subscription-Key", &self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TranslationError::HttpStatus(response.status()));
        }

        let body: TranslateResponse = response.json().await?;
        body.translated_text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(TranslationError::EmptyResponse)
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    input: &'a str,
    source_language_code: &'static str,
    target_language_code: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translated_text: Option<String>,
}

/// Translate from the source locale, keeping the source text on any failure.
///
/// Blank text and source-locale targets skip the provider entirely.
pub async fn translate_or_source(
    translator: &dyn Translator,
    text: &str,
    target: Locale,
) -> String {
    if target.is_source() || text.trim().is_empty() {
        return text.to_string();
    }
    match translator.translate(text, Locale::SOURCE, target).await {
        Ok(translated) if !translated.trim().is_empty() => translated,
        Ok(_) => {
            debug!(locale = %target, "empty translation, keeping source text");
            text.to_string()
        }
        Err(err) => {
            warn!(locale = %target, error = %err, "translation unavailable, keeping source text");
            text.to_string()
        }
    }
}
