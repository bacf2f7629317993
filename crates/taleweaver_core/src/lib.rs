//! Core data types for Taleweaver.
//!
//! This crate provides the plain data shared by every other crate: completion
//! messages, stories and their turn history, personas, and the immutable
//! [`StoryContext`] handed to the prompt composer.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod asset;
mod context;
mod ids;
mod message;
mod persona;
mod request;
mod role;
mod story;
mod turn;

pub use asset::{Asset, StoryAssets};
pub use context::{StoryContext, StoryContextBuilder};
pub use ids::{PersonaId, StoryId, UserId};
pub use message::Message;
pub use persona::{NewPersona, Persona, PersonaView};
pub use request::{CompletionRequest, CompletionRequestBuilder, CompletionResponse};
pub use role::Role;
pub use story::{NewStory, Story, StoryMode};
pub use turn::{ChapterMetadata, Turn, TurnRole, VersionDirection};
