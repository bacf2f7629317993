//! OpenAI-compatible chat-completions client.

use crate::{ChatCompletionRequest, ChatCompletionResponse, CompletionConfig};
use async_trait::async_trait;
use taleweaver_core::{CompletionRequest, CompletionResponse};
use taleweaver_error::{CompletionError, CompletionErrorKind, TaleweaverResult};
use taleweaver_interface::CompletionDriver;
use tracing::instrument;

/// Client for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    config: CompletionConfig,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client with an explicit API key.
    #[instrument(skip(config, api_key), fields(base_url = %config.base_url, model = %config.model))]
    pub fn new(config: CompletionConfig, api_key: impl Into<String>) -> Self {
        tracing::debug!("Creating completion client");
        Self {
            config,
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client reading the key from the configured environment variable.
    ///
    /// Fails with a configuration error when the variable is unset.
    pub fn from_config(config: CompletionConfig) -> TaleweaverResult<Self> {
        let api_key = config.api_key()?;
        Ok(Self::new(config, api_key))
    }

    /// Get the client configuration.
    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Send a chat completion request.
    #[instrument(skip(self, request), fields(model = %request.model, messages = request.messages.len()))]
    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> TaleweaverResult<ChatCompletionResponse> {
        let url = self.endpoint();
        tracing::debug!(url = %url, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Completion request failed");
                CompletionError::new(CompletionErrorKind::Request(e.to_string()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %message, "Provider returned error");
            return Err(CompletionError::new(CompletionErrorKind::Http {
                status_code: status.as_u16(),
                message,
            })
            .into());
        }

        let parsed = response.json::<ChatCompletionResponse>().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse completion response");
            CompletionError::new(CompletionErrorKind::Parse(e.to_string()))
        })?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion successful"
            );
        }
        Ok(parsed)
    }
}

#[async_trait]
impl CompletionDriver for OpenAiClient {
    async fn complete(&self, req: &CompletionRequest) -> TaleweaverResult<CompletionResponse> {
        let request = ChatCompletionRequest::from_request(
            req,
            &self.config.model,
            self.config.max_tokens,
            self.config.temperature,
        )?;
        let text = self.chat_completion(&request).await?.into_text()?;
        Ok(CompletionResponse::new(text))
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
