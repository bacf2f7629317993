//! Request and response types for text completion.

use crate::Message;
use serde::{Deserialize, Serialize};

/// Completion request: an ordered list of role-tagged messages.
///
/// # Examples
///
/// ```
/// use taleweaver_core::{CompletionRequest, Message};
///
/// let request = CompletionRequest::builder()
///     .messages(vec![Message::system("You are a Game Master."), Message::user("Begin.")])
///     .max_tokens(800u32)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages().len(), 2);
/// assert_eq!(*request.max_tokens(), Some(800));
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    Default,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into), default)]
pub struct CompletionRequest {
    /// The conversation messages to send
    messages: Vec<Message>,
    /// Maximum number of tokens to generate
    #[builder(setter(into, strip_option))]
    max_tokens: Option<u32>,
    /// Sampling temperature
    #[builder(setter(into, strip_option))]
    temperature: Option<f32>,
    /// Model identifier override
    #[builder(setter(into, strip_option))]
    model: Option<String>,
}

impl CompletionRequest {
    /// Creates a new request builder.
    pub fn builder() -> CompletionRequestBuilder {
        CompletionRequestBuilder::default()
    }

    /// Shorthand for a request carrying only messages.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }
}

/// The text blob returned by the completion collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text
    pub text: String,
}

impl CompletionResponse {
    /// Wrap generated text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
