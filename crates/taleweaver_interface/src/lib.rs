//! Trait definitions for Taleweaver's external collaborators.
//!
//! The narrative engine talks to the outside world through three seams:
//! a [`CompletionDriver`] that turns role-tagged messages into text, a
//! [`StoryStore`] holding story documents, and a [`PersonaStore`] holding
//! personas and each user's default pointer.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod patch;
mod traits;

pub use patch::StoryPatch;
pub use traits::{CompletionDriver, PersonaStore, StoryStore};
