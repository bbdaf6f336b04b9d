use std::sync::Arc;

use storage::repository::Storage;
use tracing::info;

use crate::Clock;
use crate::config::{QuizSettings, TranslatorConfig};
use crate::content::{ContentSource, NasaClient, OfflineSource};
use crate::error::AppServicesError;
use crate::identity::IdentityProvider;
use crate::pool_builder::PoolBuilder;
use crate::progression_service::ProgressionService;
use crate::sessions::QuizLoopService;
use crate::sync::RemoteStore;
use crate::translate::{HttpTranslator, IdentityTranslator, Translator};

/// Collaborators injected into the quiz services.
#[derive(Clone)]
pub struct Collaborators {
    pub source: Arc<dyn ContentSource>,
    pub translator: Arc<dyn Translator>,
    pub identity: Arc<dyn IdentityProvider>,
    pub remote: Option<Arc<dyn RemoteStore>>,
}

impl Collaborators {
    /// NASA content (or none when `offline`) and the environment-configured
    /// translator. No remote store.
    #[must_use]
    pub fn from_env(identity: Arc<dyn IdentityProvider>, offline: bool) -> Self {
        let source: Arc<dyn ContentSource> = if offline {
            Arc::new(OfflineSource)
        } else {
            Arc::new(NasaClient::from_env())
        };
        let translator: Arc<dyn Translator> = match TranslatorConfig::from_env() {
            Some(config) => Arc::new(HttpTranslator::new(config)),
            None => {
                info!("no translation key configured, questions stay in English");
                Arc::new(IdentityTranslator)
            }
        };
        Self {
            source,
            translator,
            identity,
            remote: None,
        }
    }
}

/// Assembles app-facing services.
#[derive(Clone)]
pub struct AppServices {
    quiz: Arc<QuizLoopService>,
    progression: Arc<ProgressionService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        settings: QuizSettings,
        collaborators: Collaborators,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(&storage, clock, settings, collaborators))
    }

    #[must_use]
    pub fn new(
        storage: &Storage,
        clock: Clock,
        settings: QuizSettings,
        collaborators: Collaborators,
    ) -> Self {
        let mut progression = ProgressionService::new(clock, storage, collaborators.identity);
        if let Some(remote) = collaborators.remote {
            progression = progression.with_remote(remote);
        }
        let progression = Arc::new(progression);

        let pool_builder = PoolBuilder::new(clock, collaborators.source, collaborators.translator)
            .with_local_bank(settings.include_local_bank);
        let quiz = Arc::new(QuizLoopService::new(
            clock,
            settings,
            pool_builder,
            Arc::clone(&progression),
        ));

        Self { quiz, progression }
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn progression(&self) -> Arc<ProgressionService> {
        Arc::clone(&self.progression)
    }
}
