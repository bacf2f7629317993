//! In-memory implementation of the story and persona stores.
//!
//! HashMaps behind `RwLock`s. All data is lost when the store is dropped,
//! which makes it the default for tests and single-process deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use taleweaver_core::{Persona, PersonaId, Story, StoryId, Turn, UserId};
use taleweaver_error::{StorageError, StorageErrorKind, TaleweaverResult};
use taleweaver_interface::{PersonaStore, StoryPatch, StoryStore};
use tokio::sync::RwLock;

fn story_not_found(id: &StoryId) -> StorageError {
    StorageError::new(StorageErrorKind::NotFound(format!("story {id}")))
}

/// In-memory store for stories, personas and default persona pointers.
///
/// Clones share the same underlying maps.
///
/// # Example
/// ```
/// use taleweaver_core::{NewStory, Story, StoryId, UserId};
/// use taleweaver_interface::StoryStore;
/// use taleweaver_narrative::InMemoryStore;
///
/// #[tokio::main]
/// async fn main() {
///     let store = InMemoryStore::new();
///     let story = Story::new(StoryId::from("s1"), UserId::from("ada"), NewStory::default());
///     store.create_story(&story).await.unwrap();
///     assert!(store.get_story(&story.id).await.unwrap().is_some());
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    stories: Arc<RwLock<HashMap<StoryId, Story>>>,
    personas: Arc<RwLock<HashMap<UserId, Vec<Persona>>>>,
    defaults: Arc<RwLock<HashMap<UserId, PersonaId>>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored stories.
    pub async fn story_count(&self) -> usize {
        self.stories.read().await.len()
    }

    async fn modify_story<F>(&self, id: &StoryId, f: F) -> TaleweaverResult<()>
    where
        F: FnOnce(&mut Story) + Send,
    {
        let mut stories = self.stories.write().await;
        let story = stories.get_mut(id).ok_or_else(|| story_not_found(id))?;
        f(story);
        Ok(())
    }
}

#[async_trait]
impl StoryStore for InMemoryStore {
    async fn get_story(&self, id: &StoryId) -> TaleweaverResult<Option<Story>> {
        Ok(self.stories.read().await.get(id).cloned())
    }

    async fn create_story(&self, story: &Story) -> TaleweaverResult<()> {
        let mut stories = self.stories.write().await;
        if stories.contains_key(&story.id) {
            Err(StorageError::new(StorageErrorKind::Write(format!(
                "story {} already exists",
                story.id
            ))))?
        }
        stories.insert(story.id.clone(), story.clone());
        Ok(())
    }

    async fn append_turn(&self, id: &StoryId, turn: Turn) -> TaleweaverResult<()> {
        self.modify_story(id, |story| {
            story.history.push(turn);
            story.updated_at = chrono::Utc::now();
        })
        .await
    }

    async fn replace_history(&self, id: &StoryId, history: Vec<Turn>) -> TaleweaverResult<()> {
        self.modify_story(id, |story| {
            story.history = history;
            story.updated_at = chrono::Utc::now();
        })
        .await
    }

    async fn update_story(&self, id: &StoryId, patch: StoryPatch) -> TaleweaverResult<()> {
        self.modify_story(id, |story| patch.apply(story)).await
    }
}

#[async_trait]
impl PersonaStore for InMemoryStore {
    async fn save_persona(&self, persona: &Persona) -> TaleweaverResult<()> {
        let mut personas = self.personas.write().await;
        let owned = personas.entry(persona.owner.clone()).or_default();
        match owned.iter_mut().find(|p| p.id == persona.id) {
            Some(existing) => *existing = persona.clone(),
            None => owned.push(persona.clone()),
        }
        Ok(())
    }

    async fn get_persona(
        &self,
        owner: &UserId,
        id: &PersonaId,
    ) -> TaleweaverResult<Option<Persona>> {
        Ok(self
            .personas
            .read()
            .await
            .get(owner)
            .and_then(|owned| owned.iter().find(|p| p.id == *id).cloned()))
    }

    async fn list_personas(&self, owner: &UserId) -> TaleweaverResult<Vec<Persona>> {
        Ok(self
            .personas
            .read()
            .await
            .get(owner)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_persona(&self, owner: &UserId, id: &PersonaId) -> TaleweaverResult<bool> {
        let removed = {
            let mut personas = self.personas.write().await;
            match personas.get_mut(owner) {
                Some(owned) => {
                    let before = owned.len();
                    owned.retain(|p| p.id != *id);
                    owned.len() != before
                }
                None => false,
            }
        };

        let mut defaults = self.defaults.write().await;
        if defaults.get(owner) == Some(id) {
            defaults.remove(owner);
        }
        Ok(removed)
    }

    async fn default_persona_id(&self, owner: &UserId) -> TaleweaverResult<Option<PersonaId>> {
        Ok(self.defaults.read().await.get(owner).cloned())
    }

    async fn set_default_persona(
        &self,
        owner: &UserId,
        id: Option<PersonaId>,
    ) -> TaleweaverResult<()> {
        let mut defaults = self.defaults.write().await;
        match id {
            Some(id) => defaults.insert(owner.clone(), id),
            None => defaults.remove(owner),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taleweaver_core::{NewPersona, NewStory};

    fn story(id: &str) -> Story {
        Story::new(StoryId::from(id), UserId::from("ada"), NewStory::default())
    }

    #[tokio::test]
    async fn test_append_and_replace_history() {
        let store = InMemoryStore::new();
        let s = story("s1");
        store.create_story(&s).await.unwrap();

        store.append_turn(&s.id, Turn::player("look")).await.unwrap();
        store
            .append_turn(&s.id, Turn::ai("A hall.", vec![], None))
            .await
            .unwrap();
        assert_eq!(store.get_story(&s.id).await.unwrap().unwrap().history.len(), 2);

        store.replace_history(&s.id, vec![]).await.unwrap();
        assert!(store.get_story(&s.id).await.unwrap().unwrap().history.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_story_rejected() {
        let store = InMemoryStore::new();
        let s = story("s1");
        store.create_story(&s).await.unwrap();
        assert!(store.create_story(&s).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_story_operations_fail() {
        let store = InMemoryStore::new();
        let id = StoryId::from("ghost");
        assert!(store.get_story(&id).await.unwrap().is_none());
        assert!(store.append_turn(&id, Turn::player("hi")).await.is_err());
        assert!(store.update_story(&id, StoryPatch::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_update_story_applies_patch() {
        let store = InMemoryStore::new();
        let s = story("s1");
        store.create_story(&s).await.unwrap();
        store
            .update_story(
                &s.id,
                StoryPatch::default()
                    .with_memories(vec!["The gate is locked".to_string()])
                    .with_current_chapter(3),
            )
            .await
            .unwrap();

        let stored = store.get_story(&s.id).await.unwrap().unwrap();
        assert_eq!(stored.memories, vec!["The gate is locked"]);
        assert_eq!(stored.current_chapter, 3);
    }

    #[tokio::test]
    async fn test_delete_persona_clears_default() {
        let store = InMemoryStore::new();
        let owner = UserId::from("ada");
        let persona = Persona::new(
            owner.clone(),
            &NewPersona {
                name: "Mira".to_string(),
                ..NewPersona::default()
            },
        );
        store.save_persona(&persona).await.unwrap();
        store
            .set_default_persona(&owner, Some(persona.id.clone()))
            .await
            .unwrap();

        assert!(store.delete_persona(&owner, &persona.id).await.unwrap());
        assert!(store.default_persona_id(&owner).await.unwrap().is_none());
        assert!(!store.delete_persona(&owner, &persona.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_personas_scoped_to_owner() {
        let store = InMemoryStore::new();
        let persona = Persona::new(
            UserId::from("ada"),
            &NewPersona {
                name: "Mira".to_string(),
                ..NewPersona::default()
            },
        );
        store.save_persona(&persona).await.unwrap();

        let other = UserId::from("bob");
        assert!(store.get_persona(&other, &persona.id).await.unwrap().is_none());
        assert!(store.list_personas(&other).await.unwrap().is_empty());
    }
}
