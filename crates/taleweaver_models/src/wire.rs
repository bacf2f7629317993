//! OpenAI-compatible chat-completions wire types.

use serde::{Deserialize, Serialize};
use taleweaver_core::{CompletionRequest, Message};
use taleweaver_error::{BuilderError, CompletionError, CompletionErrorKind, TaleweaverResult};

/// Chat completion request body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, derive_builder::Builder)]
#[builder(setter(into))]
pub struct ChatCompletionRequest {
    /// Model identifier
    pub model: String,
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub max_tokens: Option<u32>,
    /// Temperature for sampling (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub temperature: Option<f32>,
}

impl ChatCompletionRequest {
    /// Translate a core request, falling back to the given defaults.
    pub fn from_request(
        request: &CompletionRequest,
        model: &str,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> TaleweaverResult<Self> {
        let messages = request.messages().iter().map(ChatMessage::from).collect::<Vec<_>>();

        let built = ChatCompletionRequestBuilder::default()
            .model(request.model().clone().unwrap_or_else(|| model.to_string()))
            .messages(messages)
            .max_tokens(request.max_tokens().or(max_tokens))
            .temperature(request.temperature().or(temperature))
            .build()
            .map_err(|e| BuilderError::from(e.to_string()))?;
        Ok(built)
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Message content
    pub content: String,
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.to_string(),
            content: message.text.clone(),
        }
    }
}

/// Chat completion response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionResponse {
    /// Unique identifier for the completion
    #[serde(default)]
    pub id: String,
    /// Model used for completion
    #[serde(default)]
    pub model: String,
    /// Generated completions
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Token usage statistics
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatCompletionResponse {
    /// Text of the first choice; blank output is an error.
    pub fn into_text(self) -> TaleweaverResult<String> {
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| CompletionError::new(CompletionErrorKind::EmptyResponse))?;
        Ok(text)
    }
}

/// A completion choice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Choice {
    /// Index of this choice
    #[serde(default)]
    pub index: u32,
    /// The generated message
    pub message: ChoiceMessage,
    /// Reason why generation finished
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Message in a choice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ChoiceMessage {
    /// Role of the message (typically "assistant")
    #[serde(default)]
    pub role: String,
    /// Generated content; some servers send `null` on refusals
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Usage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,
    /// Tokens in the completion
    pub completion_tokens: u32,
    /// Total tokens used
    pub total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use taleweaver_error::TaleweaverErrorKind;

    #[test]
    fn test_request_defaults_fill_missing_fields() {
        let request = CompletionRequest::from_messages(vec![
            Message::system("You are a Game Master."),
            Message::user("Begin."),
        ]);
        let wire = ChatCompletionRequest::from_request(&request, "gpt-4o-mini", Some(900), None)
            .unwrap();

        assert_eq!(wire.model, "gpt-4o-mini");
        assert_eq!(wire.max_tokens, Some(900));
        assert_eq!(wire.messages[0].role, "system");
        assert_eq!(wire.messages[1].content, "Begin.");

        let json = serde_json::to_value(&wire).unwrap();
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_request_overrides_win_over_defaults() {
        let request = CompletionRequest::builder()
            .messages(vec![Message::user("Hi")])
            .model("local-llama")
            .temperature(0.2f32)
            .build()
            .unwrap();
        let wire =
            ChatCompletionRequest::from_request(&request, "gpt-4o-mini", None, Some(0.9)).unwrap();
        assert_eq!(wire.model, "local-llama");
        assert_eq!(wire.temperature, Some(0.2));
    }

    #[test]
    fn test_response_text_comes_from_first_choice() {
        let body = r#"{
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Once upon a time"}, "finish_reason": "stop"}]
        }"#;
        let response: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.into_text().unwrap(), "Once upon a time");
    }

    #[test]
    fn test_blank_response_is_an_empty_response_error() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let response: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        let err = response.into_text().unwrap_err();
        match err.kind() {
            TaleweaverErrorKind::Completion(e) => {
                assert_eq!(e.kind, CompletionErrorKind::EmptyResponse)
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
