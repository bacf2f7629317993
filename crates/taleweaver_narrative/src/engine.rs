//! Story engine: compose, complete, parse, apply memory, persist.

use crate::composer::{compose_choices_messages, compose_turn_messages};
use crate::protocol::{
    MemoryDelta, apply_memory_directives, parse_choice_lines, parse_response,
    reapply_memory_directives,
};
use crate::turns;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use taleweaver_core::{
    ChapterMetadata, CompletionRequest, NewPersona, NewStory, Persona, PersonaId, PersonaView,
    Story, StoryContext, StoryId, StoryMode, Turn, UserId, VersionDirection,
};
use taleweaver_error::{StorageError, StorageErrorKind, TaleweaverResult, ValidationError};
use taleweaver_interface::{CompletionDriver, PersonaStore, StoryPatch, StoryStore};
use tracing::{debug, error, info, instrument, warn};

/// Result of any operation that produces or changes an AI turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Story after the operation
    pub story: Story,
    /// Choices of the affected turn
    pub choices: Vec<String>,
    /// Chapter opened by the affected turn
    pub chapter: Option<ChapterMetadata>,
    /// Memory list after the operation
    pub memories: Vec<String>,
}

impl TurnOutcome {
    fn new(story: Story, turn: &Turn) -> Self {
        Self {
            choices: turn.choices.clone(),
            chapter: turn.chapter.clone(),
            memories: story.memories.clone(),
            story,
        }
    }
}

/// A freshly generated AI turn and the memory changes it carried.
struct Generated {
    turn: Turn,
    delta: MemoryDelta,
}

fn required_text(value: &str, what: &str) -> TaleweaverResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::new(format!("{what} is required")))?
    }
    Ok(trimmed.to_string())
}

/// Orchestrates turn generation against the collaborator traits.
///
/// Holds no per-story state; concurrent mutations of one story must be
/// serialized by the caller (see [`StorySupervisor`](crate::StorySupervisor)).
#[derive(Clone)]
pub struct StoryEngine {
    driver: Arc<dyn CompletionDriver>,
    stories: Arc<dyn StoryStore>,
    personas: Arc<dyn PersonaStore>,
}

impl fmt::Debug for StoryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoryEngine")
            .field("provider", &self.driver.provider_name())
            .field("model", &self.driver.model_name())
            .finish()
    }
}

impl StoryEngine {
    /// Wire an engine to its collaborators.
    pub fn new(
        driver: Arc<dyn CompletionDriver>,
        stories: Arc<dyn StoryStore>,
        personas: Arc<dyn PersonaStore>,
    ) -> Self {
        Self {
            driver,
            stories,
            personas,
        }
    }

    /// The story store.
    pub fn stories(&self) -> &Arc<dyn StoryStore> {
        &self.stories
    }

    /// The persona store.
    pub fn personas(&self) -> &Arc<dyn PersonaStore> {
        &self.personas
    }

    async fn load_owned(&self, owner: &UserId, id: &StoryId) -> TaleweaverResult<Story> {
        match self.stories.get_story(id).await? {
            Some(story) if story.owner == *owner => Ok(story),
            Some(_) => {
                debug!(story_id = %id, owner = %owner, "Story belongs to another user");
                Err(StorageError::new(StorageErrorKind::NotFound(format!("story {id}"))).into())
            }
            None => {
                Err(StorageError::new(StorageErrorKind::NotFound(format!("story {id}"))).into())
            }
        }
    }

    /// Persona for a story: its active persona, else the owner's default.
    pub async fn resolve_persona(&self, story: &Story) -> TaleweaverResult<Option<Persona>> {
        if let Some(id) = &story.active_persona_id {
            if let Some(persona) = self.personas.get_persona(&story.owner, id).await? {
                return Ok(Some(persona));
            }
            debug!(persona_id = %id, "Active persona missing, falling back to default");
        }
        match self.personas.default_persona_id(&story.owner).await? {
            Some(id) => self.personas.get_persona(&story.owner, &id).await,
            None => Ok(None),
        }
    }

    async fn complete(&self, request: CompletionRequest) -> TaleweaverResult<String> {
        match self.driver.complete(&request).await {
            Ok(response) => {
                info!(
                    provider = self.driver.provider_name(),
                    model = self.driver.model_name(),
                    chars = response.text.len(),
                    "Completion received"
                );
                Ok(response.text)
            }
            Err(e) => {
                error!(error = %e, provider = self.driver.provider_name(), "Completion failed");
                Err(e)
            }
        }
    }

    async fn generate(
        &self,
        context: &StoryContext,
        action: Option<&str>,
        memories: &[String],
    ) -> TaleweaverResult<Generated> {
        self.generate_with(context, action, memories, apply_memory_directives)
            .await
    }

    async fn generate_with(
        &self,
        context: &StoryContext,
        action: Option<&str>,
        memories: &[String],
        directives: fn(&str, &[String]) -> MemoryDelta,
    ) -> TaleweaverResult<Generated> {
        let messages = compose_turn_messages(context, action);
        let raw = self.complete(CompletionRequest::from_messages(messages)).await?;

        // Directives may trail the choice list, so strip them before splitting
        let delta = directives(&raw, memories);
        let parsed = parse_response(&delta.cleaned_text);
        let turn = Turn::ai(parsed.story, parsed.choices, parsed.chapter);
        Ok(Generated { turn, delta })
    }

    /// Write memory and chapter changes. Failures are logged, never surfaced.
    async fn record_side_effects(
        &self,
        story: &mut Story,
        delta: &MemoryDelta,
        chapter: Option<&ChapterMetadata>,
    ) {
        let mut patch = StoryPatch::default();
        if delta.changed {
            story.memories = delta.memories.clone();
            patch = patch.with_memories(delta.memories.clone());
        }
        if let Some(chapter) = chapter {
            story.current_chapter = chapter.number.max(1);
            patch = patch.with_current_chapter(story.current_chapter);
        }
        story.updated_at = Utc::now();

        if patch.is_empty() {
            return;
        }
        if let Err(e) = self.stories.update_story(&story.id, patch).await {
            warn!(
                story_id = %story.id,
                error = %e,
                "Failed to persist memory or chapter update, continuing"
            );
        }
    }

    /// Create a story. Adventure stories get their opening turn generated
    /// before anything is stored.
    #[instrument(skip(self, new_story), fields(owner = %owner, mode = %new_story.mode))]
    pub async fn create_story(
        &self,
        owner: &UserId,
        new_story: NewStory,
    ) -> TaleweaverResult<Story> {
        let title = required_text(&new_story.title, "Title")?;
        let premise = required_text(&new_story.initial_prompt, "Initial prompt")?;

        let mut story = Story::new(
            StoryId::generate(),
            owner.clone(),
            NewStory {
                title,
                initial_prompt: premise,
                ..new_story
            },
        );

        if story.mode == StoryMode::Adventure {
            let persona = self.resolve_persona(&story).await?;
            let context = StoryContext::from_story(&story, persona);
            let generated = self.generate(&context, None, &story.memories).await?;
            if generated.delta.changed {
                story.memories = generated.delta.memories;
            }
            if let Some(chapter) = &generated.turn.chapter {
                story.current_chapter = chapter.number.max(1);
            }
            story.history.push(generated.turn);
        }

        self.stories.create_story(&story).await?;
        info!(story_id = %story.id, turns = story.history.len(), "Story created");
        Ok(story)
    }

    /// Fetch one of the caller's stories.
    pub async fn get_story(&self, owner: &UserId, id: &StoryId) -> TaleweaverResult<Story> {
        self.load_owned(owner, id).await
    }

    /// Record a player action and generate the AI response to it.
    ///
    /// The player turn is persisted before the completion call, so a failed
    /// completion leaves it in the history.
    #[instrument(skip(self, action), fields(owner = %owner, story_id = %id))]
    pub async fn take_turn(
        &self,
        owner: &UserId,
        id: &StoryId,
        action: &str,
    ) -> TaleweaverResult<TurnOutcome> {
        let action = required_text(action, "Player action")?;
        let mut story = self.load_owned(owner, id).await?;
        let persona = self.resolve_persona(&story).await?;
        let context = StoryContext::from_story(&story, persona);

        let player = Turn::player(action.clone());
        self.stories.append_turn(&story.id, player.clone()).await?;
        story.history.push(player);

        let generated = self.generate(&context, Some(&action), &story.memories).await?;
        self.stories
            .append_turn(&story.id, generated.turn.clone())
            .await?;
        story.history.push(generated.turn.clone());

        self.record_side_effects(&mut story, &generated.delta, generated.turn.chapter.as_ref())
            .await;
        info!(turns = story.history.len(), "Turn taken");
        Ok(TurnOutcome::new(story, &generated.turn))
    }

    /// Generate a new version of the AI turn at `index` from the history before it.
    #[instrument(skip(self), fields(owner = %owner, story_id = %id))]
    pub async fn regenerate_turn(
        &self,
        owner: &UserId,
        id: &StoryId,
        index: usize,
    ) -> TaleweaverResult<TurnOutcome> {
        let mut story = self.load_owned(owner, id).await?;
        turns::ai_turn(&story.history, index)?;

        let persona = self.resolve_persona(&story).await?;
        let context = StoryContext::from_story(&story, persona).with_history_prefix(index);
        let generated = self
            .generate_with(&context, None, &story.memories, reapply_memory_directives)
            .await?;
        let Turn {
            content,
            choices,
            chapter,
            ..
        } = generated.turn;

        turns::regenerate(&mut story.history, index, content, choices, chapter.clone())?;
        self.stories
            .replace_history(&story.id, story.history.clone())
            .await?;

        // An older turn's chapter must not rewind the story's progress
        let is_latest_ai = !story.history[index + 1..].iter().any(Turn::is_ai);
        let chapter = chapter.filter(|_| is_latest_ai);
        self.record_side_effects(&mut story, &generated.delta, chapter.as_ref())
            .await;

        let turn = story.history[index].clone();
        Ok(TurnOutcome::new(story, &turn))
    }

    /// Ask for three fresh choices for the AI turn at `index`.
    ///
    /// Content, versions and memories are left alone. A response without any
    /// numbered lines keeps the existing choices.
    #[instrument(skip(self), fields(owner = %owner, story_id = %id))]
    pub async fn regenerate_choices(
        &self,
        owner: &UserId,
        id: &StoryId,
        index: usize,
    ) -> TaleweaverResult<TurnOutcome> {
        let mut story = self.load_owned(owner, id).await?;
        turns::ai_turn(&story.history, index)?;

        let persona = self.resolve_persona(&story).await?;
        let context = StoryContext::from_story(&story, persona).with_history_prefix(index + 1);
        let raw = self
            .complete(CompletionRequest::from_messages(compose_choices_messages(
                &context,
            )))
            .await?;

        // Directives are stripped but never applied here
        let cleaned = apply_memory_directives(&raw, &[]).cleaned_text;
        let mut choices = parse_response(&cleaned).choices;
        if choices.is_empty() {
            choices = parse_choice_lines(&cleaned);
        }

        if choices.is_empty() {
            warn!(index, "No choices found in response, keeping existing ones");
        } else {
            turns::replace_choices(&mut story.history, index, choices)?;
            self.stories
                .replace_history(&story.id, story.history.clone())
                .await?;
            story.updated_at = Utc::now();
        }

        let turn = story.history[index].clone();
        Ok(TurnOutcome::new(story, &turn))
    }

    /// Select the previous or next version of an AI turn.
    ///
    /// Stepping past either end returns the story unchanged.
    #[instrument(skip(self), fields(owner = %owner, story_id = %id))]
    pub async fn switch_version(
        &self,
        owner: &UserId,
        id: &StoryId,
        index: usize,
        direction: VersionDirection,
    ) -> TaleweaverResult<Story> {
        let mut story = self.load_owned(owner, id).await?;
        if turns::switch_version(&mut story.history, index, direction)? {
            self.stories
                .replace_history(&story.id, story.history.clone())
                .await?;
            story.updated_at = Utc::now();
        }
        Ok(story)
    }

    /// Replace the player turn at `index`, drop everything after it, and
    /// generate a fresh continuation.
    ///
    /// The truncated history is persisted before the completion call and
    /// stays durable if that call fails.
    #[instrument(skip(self, content), fields(owner = %owner, story_id = %id))]
    pub async fn edit_and_regenerate(
        &self,
        owner: &UserId,
        id: &StoryId,
        index: usize,
        content: &str,
    ) -> TaleweaverResult<TurnOutcome> {
        let content = required_text(content, "Edited action")?;
        let mut story = self.load_owned(owner, id).await?;

        turns::truncate_for_edit(&mut story.history, index, content)?;
        self.stories
            .replace_history(&story.id, story.history.clone())
            .await?;

        let persona = self.resolve_persona(&story).await?;
        let context = StoryContext::from_story(&story, persona);
        let generated = self.generate(&context, None, &story.memories).await?;
        self.stories
            .append_turn(&story.id, generated.turn.clone())
            .await?;
        story.history.push(generated.turn.clone());

        self.record_side_effects(&mut story, &generated.delta, generated.turn.chapter.as_ref())
            .await;
        Ok(TurnOutcome::new(story, &generated.turn))
    }

    /// Create a persona, optionally making it the owner's default.
    #[instrument(skip(self, new_persona), fields(owner = %owner))]
    pub async fn create_persona(
        &self,
        owner: &UserId,
        new_persona: NewPersona,
    ) -> TaleweaverResult<PersonaView> {
        let is_default = new_persona.is_default;
        let name = required_text(&new_persona.name, "Persona name")?;
        let persona = Persona::new(owner.clone(), &NewPersona { name, ..new_persona });
        self.personas.save_persona(&persona).await?;
        if is_default {
            self.personas
                .set_default_persona(owner, Some(persona.id.clone()))
                .await?;
        }
        info!(persona_id = %persona.id, is_default, "Persona created");
        Ok(PersonaView {
            persona,
            is_default,
        })
    }

    /// The owner's personas with their default flag.
    pub async fn list_personas(&self, owner: &UserId) -> TaleweaverResult<Vec<PersonaView>> {
        self.personas.list_persona_views(owner).await
    }

    /// Point the owner's default at one of their personas, or clear it.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn set_default_persona(
        &self,
        owner: &UserId,
        id: Option<PersonaId>,
    ) -> TaleweaverResult<()> {
        if let Some(id) = &id {
            if self.personas.get_persona(owner, id).await?.is_none() {
                Err(StorageError::new(StorageErrorKind::NotFound(format!(
                    "persona {id}"
                ))))?
            }
        }
        self.personas.set_default_persona(owner, id).await
    }

    /// Delete one of the owner's personas.
    pub async fn delete_persona(&self, owner: &UserId, id: &PersonaId) -> TaleweaverResult<bool> {
        self.personas.delete_persona(owner, id).await
    }
}
