//! Story documents.

use crate::{PersonaId, StoryAssets, StoryId, Turn, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How the model participates in the story.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoryMode {
    /// Game Master narration with chapters and numbered choices
    #[default]
    Adventure,
    /// First-person chat with a single character
    Character,
}

/// Fields a caller supplies to create a story.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewStory {
    /// Story title, or the character's name in character mode
    #[serde(default)]
    pub title: String,
    /// Premise text
    #[serde(default)]
    pub initial_prompt: String,
    /// Genre tags
    #[serde(default)]
    pub genres: BTreeSet<String>,
    /// Free-text style guidance
    #[serde(default)]
    pub story_style: String,
    /// Adventure or character chat
    #[serde(default)]
    pub mode: StoryMode,
    /// World assets
    #[serde(default)]
    pub assets: StoryAssets,
    /// Persona to play as
    #[serde(default)]
    pub active_persona_id: Option<PersonaId>,
}

/// A persisted story with its full turn history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    /// Document identifier
    pub id: StoryId,
    /// Owning account
    pub owner: UserId,
    /// Story title, or the character's name in character mode
    pub title: String,
    /// Premise text
    pub initial_prompt: String,
    /// Genre tags
    #[serde(default)]
    pub genres: BTreeSet<String>,
    /// Free-text style guidance
    #[serde(default)]
    pub story_style: String,
    /// Adventure or character chat
    #[serde(default)]
    pub mode: StoryMode,
    /// Chapter the story is currently in, starting at 1
    pub current_chapter: u32,
    /// World assets
    #[serde(default)]
    pub assets: StoryAssets,
    /// Persona to play as
    #[serde(default)]
    pub active_persona_id: Option<PersonaId>,
    /// Durable facts retained across turns, append and delete only
    #[serde(default)]
    pub memories: Vec<String>,
    /// Ordered turns
    #[serde(default)]
    pub history: Vec<Turn>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Story {
    /// Create an empty story from caller-supplied fields.
    pub fn new(id: StoryId, owner: UserId, fields: NewStory) -> Self {
        let now = Utc::now();
        Self {
            id,
            owner,
            title: fields.title,
            initial_prompt: fields.initial_prompt,
            genres: fields.genres,
            story_style: fields.story_style,
            mode: fields.mode,
            current_chapter: 1,
            assets: fields.assets,
            active_persona_id: fields.active_persona_id,
            memories: Vec::new(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of AI turns in the history.
    pub fn ai_turn_count(&self) -> usize {
        self.history.iter().filter(|t| t.is_ai()).count()
    }
}
