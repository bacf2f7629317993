//! Immutable story context consumed by the prompt composer.

use crate::{Persona, Story, StoryAssets, StoryMode, Turn};
use std::collections::BTreeSet;

/// Read-only snapshot of everything the prompt composer needs.
///
/// Built once per request from the persisted [`Story`] and its resolved persona.
/// Nothing downstream mutates it; stages derive new values instead.
///
/// # Examples
///
/// ```
/// use taleweaver_core::{StoryContext, StoryMode};
///
/// let context = StoryContext::builder()
///     .mode(StoryMode::Adventure)
///     .title("The Sunken Crown")
///     .initial_prompt("A diver finds a crown beneath the harbor.")
///     .build()
///     .unwrap();
///
/// assert_eq!(*context.current_chapter(), 1);
/// assert!(context.history().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, derive_getters::Getters, derive_builder::Builder)]
#[builder(setter(into), default)]
pub struct StoryContext {
    mode: StoryMode,
    title: String,
    initial_prompt: String,
    genres: BTreeSet<String>,
    style: String,
    assets: StoryAssets,
    #[builder(setter(into, strip_option))]
    persona: Option<Persona>,
    memories: Vec<String>,
    current_chapter: u32,
    history: Vec<Turn>,
}

impl Default for StoryContext {
    fn default() -> Self {
        Self {
            mode: StoryMode::default(),
            title: String::new(),
            initial_prompt: String::new(),
            genres: BTreeSet::new(),
            style: String::new(),
            assets: StoryAssets::default(),
            persona: None,
            memories: Vec::new(),
            current_chapter: 1,
            history: Vec::new(),
        }
    }
}

impl StoryContext {
    /// Creates a new context builder.
    pub fn builder() -> StoryContextBuilder {
        StoryContextBuilder::default()
    }

    /// Snapshot a story and its resolved persona.
    pub fn from_story(story: &Story, persona: Option<Persona>) -> Self {
        Self {
            mode: story.mode,
            title: story.title.clone(),
            initial_prompt: story.initial_prompt.clone(),
            genres: story.genres.clone(),
            style: story.story_style.clone(),
            assets: story.assets.clone(),
            persona,
            memories: story.memories.clone(),
            current_chapter: story.current_chapter,
            history: story.history.clone(),
        }
    }

    /// Same context with the history cut to `len` turns.
    ///
    /// Used when regenerating a turn from the state that preceded it.
    pub fn with_history_prefix(&self, len: usize) -> Self {
        let mut derived = self.clone();
        derived.history.truncate(len);
        derived
    }

    /// Name of the active persona, if any.
    pub fn persona_name(&self) -> Option<&str> {
        self.persona.as_ref().map(|p| p.name.as_str())
    }
}
