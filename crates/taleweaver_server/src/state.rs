//! Wiring configuration into a running engine.

use crate::{StorageBackend, TaleweaverConfig, TokenAuthenticator};
use async_trait::async_trait;
use std::sync::Arc;
use taleweaver_core::{CompletionRequest, CompletionResponse};
use taleweaver_error::{CompletionError, CompletionErrorKind, TaleweaverResult};
use taleweaver_interface::{CompletionDriver, PersonaStore, StoryStore};
use taleweaver_models::{OpenAiClient, ResilientDriver};
use taleweaver_narrative::{FileStore, InMemoryStore, StoryEngine, StorySupervisor};
use taleweaver_rate_limit::RequestLimiter;

/// Stand-in driver used when the provider credential is absent.
///
/// The server still starts; every completion fails with `MissingApiKey`.
#[derive(Debug, Clone)]
struct UnconfiguredDriver {
    api_key_env: String,
    model: String,
}

#[async_trait]
impl CompletionDriver for UnconfiguredDriver {
    async fn complete(&self, _req: &CompletionRequest) -> TaleweaverResult<CompletionResponse> {
        Err(CompletionError::new(CompletionErrorKind::MissingApiKey(self.api_key_env.clone())).into())
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Shared state handed to every route.
#[derive(Debug, Clone)]
pub struct AppState {
    auth: Arc<TokenAuthenticator>,
    stories: StorySupervisor,
}

impl AppState {
    /// Assemble state from parts.
    pub fn new(auth: TokenAuthenticator, stories: StorySupervisor) -> Self {
        Self {
            auth: Arc::new(auth),
            stories,
        }
    }

    /// Build the completion driver, stores and supervisor described by `config`.
    ///
    /// A missing API key is not fatal here; it surfaces per request.
    pub fn from_config(config: &TaleweaverConfig) -> TaleweaverResult<Self> {
        let driver: Arc<dyn CompletionDriver> = match config.completion.api_key() {
            Ok(key) => {
                let client = OpenAiClient::new(config.completion.clone(), key);
                Arc::new(ResilientDriver::new(
                    client,
                    RequestLimiter::new(&config.limits),
                    config.retry,
                    config.completion.timeout(),
                ))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Completion provider is not configured");
                Arc::new(UnconfiguredDriver {
                    api_key_env: config.completion.api_key_env.clone(),
                    model: config.completion.model.clone(),
                })
            }
        };

        let (stories, personas): (Arc<dyn StoryStore>, Arc<dyn PersonaStore>) =
            match config.storage.backend {
                StorageBackend::Memory => {
                    let store = Arc::new(InMemoryStore::new());
                    (store.clone(), store)
                }
                StorageBackend::File => {
                    let store = Arc::new(FileStore::new(&config.storage.dir)?);
                    (store.clone(), store)
                }
            };

        tracing::info!(
            provider = driver.provider_name(),
            model = driver.model_name(),
            storage = ?config.storage.backend,
            users = config.server.users.len(),
            "Story engine ready"
        );

        let engine = StoryEngine::new(driver, stories, personas);
        Ok(Self::new(
            TokenAuthenticator::new(&config.server.users),
            StorySupervisor::new(engine),
        ))
    }

    /// Caller authentication.
    pub fn auth(&self) -> &TokenAuthenticator {
        &self.auth
    }

    /// Story operations.
    pub fn stories(&self) -> &StorySupervisor {
        &self.stories
    }

    /// Stop background actors.
    pub async fn shutdown(&self) {
        self.stories.shutdown().await;
    }
}
