//! Completion provider integrations for Taleweaver.
//!
//! [`OpenAiClient`] speaks the OpenAI-compatible chat-completions protocol, which
//! covers OpenAI itself and most self-hosted inference servers. [`ResilientDriver`]
//! wraps any [`CompletionDriver`](taleweaver_interface::CompletionDriver) with the
//! request limiter, bounded retry and a per-call timeout.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod resilient;
mod wire;

pub use client::OpenAiClient;
pub use config::CompletionConfig;
pub use resilient::ResilientDriver;
pub use wire::{
    ChatCompletionRequest, ChatCompletionRequestBuilder, ChatCompletionResponse, ChatMessage,
    Choice, ChoiceMessage, Usage,
};
