//! Collaborator traits.

use crate::StoryPatch;
use async_trait::async_trait;
use taleweaver_core::{
    CompletionRequest, CompletionResponse, Persona, PersonaId, PersonaView, Story, StoryId, Turn,
    UserId,
};
use taleweaver_error::TaleweaverResult;

/// Opaque text-completion backend.
///
/// Takes an ordered list of role-tagged messages and returns one text blob.
#[async_trait]
pub trait CompletionDriver: Send + Sync {
    /// Generate a completion for the request.
    async fn complete(&self, req: &CompletionRequest) -> TaleweaverResult<CompletionResponse>;

    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &'static str;

    /// Model identifier.
    fn model_name(&self) -> &str;
}

/// Story document persistence. Every operation is atomic per document.
#[async_trait]
pub trait StoryStore: Send + Sync {
    /// Fetch a story, `None` when absent.
    async fn get_story(&self, id: &StoryId) -> TaleweaverResult<Option<Story>>;

    /// Insert a new story document.
    async fn create_story(&self, story: &Story) -> TaleweaverResult<()>;

    /// Push one turn at the end of the history.
    async fn append_turn(&self, id: &StoryId, turn: Turn) -> TaleweaverResult<()>;

    /// Overwrite the whole history.
    async fn replace_history(&self, id: &StoryId, history: Vec<Turn>) -> TaleweaverResult<()>;

    /// Apply a partial update to top-level fields.
    async fn update_story(&self, id: &StoryId, patch: StoryPatch) -> TaleweaverResult<()>;
}

/// Persona persistence plus the per-user default pointer.
#[async_trait]
pub trait PersonaStore: Send + Sync {
    /// Insert or replace a persona.
    async fn save_persona(&self, persona: &Persona) -> TaleweaverResult<()>;

    /// Fetch one of the owner's personas.
    async fn get_persona(&self, owner: &UserId, id: &PersonaId)
    -> TaleweaverResult<Option<Persona>>;

    /// All personas owned by a user.
    async fn list_personas(&self, owner: &UserId) -> TaleweaverResult<Vec<Persona>>;

    /// Remove a persona. Returns whether it existed.
    ///
    /// Implementations clear the owner's default pointer when it targets the
    /// removed persona.
    async fn delete_persona(&self, owner: &UserId, id: &PersonaId) -> TaleweaverResult<bool>;

    /// The owner's default persona, if one is set.
    async fn default_persona_id(&self, owner: &UserId) -> TaleweaverResult<Option<PersonaId>>;

    /// Point the owner's default at a persona, or clear it with `None`.
    async fn set_default_persona(
        &self,
        owner: &UserId,
        id: Option<PersonaId>,
    ) -> TaleweaverResult<()>;

    /// Personas with their `is_default` flag.
    async fn list_persona_views(&self, owner: &UserId) -> TaleweaverResult<Vec<PersonaView>> {
        let default = self.default_persona_id(owner).await?;
        let personas = self.list_personas(owner).await?;
        Ok(personas
            .into_iter()
            .map(|persona| {
                let is_default = default.as_ref() == Some(&persona.id);
                PersonaView {
                    persona,
                    is_default,
                }
            })
            .collect())
    }
}
