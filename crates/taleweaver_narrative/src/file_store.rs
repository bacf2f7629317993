//! JSON-file implementation of the story and persona stores.
//!
//! Layout under the root directory:
//!
//! ```text
//! {root}/
//! ├── stories/
//! │   └── {story_id}.json
//! └── personas/
//!     └── {hex(owner)}.json      personas plus the default pointer
//! ```
//!
//! Writes go to a temp file first and are renamed into place. A single
//! mutex serializes read-modify-write cycles within the process.

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use taleweaver_core::{Persona, PersonaId, Story, StoryId, Turn, UserId};
use taleweaver_error::{StorageError, StorageErrorKind, TaleweaverResult};
use taleweaver_interface::{PersonaStore, StoryPatch, StoryStore};
use tokio::sync::Mutex;

/// Persona document for one owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersonaDocument {
    #[serde(default)]
    personas: Vec<Persona>,
    #[serde(default)]
    default_persona_id: Option<PersonaId>,
}

/// Filesystem store backed by one JSON document per story and per owner.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    /// Open a store rooted at `root`, creating its directories.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the directories cannot be created.
    #[tracing::instrument(skip(root))]
    pub fn new(root: impl Into<PathBuf>) -> TaleweaverResult<Self> {
        let root = root.into();
        for dir in [root.join("stories"), root.join("personas")] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                StorageError::new(StorageErrorKind::InvalidConfig(format!(
                    "{}: {}",
                    dir.display(),
                    e
                )))
            })?;
        }
        tracing::info!(path = %root.display(), "Opened file store");
        Ok(Self {
            root,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a story document. Ids outside `[A-Za-z0-9_-]` never map to a file.
    fn story_path(&self, id: &StoryId) -> Option<PathBuf> {
        let raw = id.as_str();
        let safe = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        safe.then(|| self.root.join("stories").join(format!("{raw}.json")))
    }

    fn persona_path(&self, owner: &UserId) -> PathBuf {
        let encoded: String = owner
            .as_str()
            .bytes()
            .map(|b| format!("{b:02x}"))
            .collect();
        self.root.join("personas").join(format!("{encoded}.json"))
    }

    fn require_story_path(&self, id: &StoryId) -> TaleweaverResult<PathBuf> {
        self.story_path(id).ok_or_else(|| {
            StorageError::new(StorageErrorKind::NotFound(format!("story {id}"))).into()
        })
    }

    async fn read_document<T: DeserializeOwned>(path: &Path) -> TaleweaverResult<Option<T>> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::Read(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
                .into());
            }
        };
        let document = serde_json::from_slice(&bytes).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialize(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;
        Ok(Some(document))
    }

    async fn write_document<T: Serialize>(path: &Path, document: &T) -> TaleweaverResult<()> {
        let bytes = serde_json::to_vec_pretty(document).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialize(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;

        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &bytes).await.map_err(|e| {
            StorageError::new(StorageErrorKind::Write(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;
        tokio::fs::rename(&temp_path, path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::Write(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "Wrote document");
        Ok(())
    }

    async fn modify_story<F>(&self, id: &StoryId, f: F) -> TaleweaverResult<()>
    where
        F: FnOnce(&mut Story) + Send,
    {
        let path = self.require_story_path(id)?;
        let _guard = self.write_lock.lock().await;
        let mut story: Story = Self::read_document(&path).await?.ok_or_else(|| {
            StorageError::new(StorageErrorKind::NotFound(format!("story {id}")))
        })?;
        f(&mut story);
        Self::write_document(&path, &story).await
    }

    async fn load_personas(&self, owner: &UserId) -> TaleweaverResult<PersonaDocument> {
        Ok(Self::read_document(&self.persona_path(owner))
            .await?
            .unwrap_or_default())
    }

    async fn modify_personas<F, R>(&self, owner: &UserId, f: F) -> TaleweaverResult<R>
    where
        F: FnOnce(&mut PersonaDocument) -> R + Send,
    {
        let path = self.persona_path(owner);
        let _guard = self.write_lock.lock().await;
        let mut document: PersonaDocument = Self::read_document(&path).await?.unwrap_or_default();
        let result = f(&mut document);
        Self::write_document(&path, &document).await?;
        Ok(result)
    }
}

#[async_trait]
impl StoryStore for FileStore {
    async fn get_story(&self, id: &StoryId) -> TaleweaverResult<Option<Story>> {
        match self.story_path(id) {
            Some(path) => Self::read_document(&path).await,
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip(self, story), fields(story_id = %story.id))]
    async fn create_story(&self, story: &Story) -> TaleweaverResult<()> {
        let path = self.story_path(&story.id).ok_or_else(|| {
            StorageError::new(StorageErrorKind::Write(format!(
                "story id {} is not file-safe",
                story.id
            )))
        })?;
        let _guard = self.write_lock.lock().await;
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            Err(StorageError::new(StorageErrorKind::Write(format!(
                "story {} already exists",
                story.id
            ))))?
        }
        Self::write_document(&path, story).await
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
impl PersonaStore for FileStore {
    async fn save_persona(&self, persona: &Persona) -> TaleweaverResult<()> {
        let owner = persona.owner.clone();
        let persona = persona.clone();
        self.modify_personas(&owner, move |document| {
            match document.personas.iter_mut().find(|p| p.id == persona.id) {
                Some(existing) => *existing = persona,
                None => document.personas.push(persona),
            }
        })
        .await
    }

    async fn get_persona(
        &self,
        owner: &UserId,
        id: &PersonaId,
    ) -> TaleweaverResult<Option<Persona>> {
        Ok(self
            .load_personas(owner)
            .await?
            .personas
            .into_iter()
            .find(|p| p.id == *id))
    }

    async fn list_personas(&self, owner: &UserId) -> TaleweaverResult<Vec<Persona>> {
        Ok(self.load_personas(owner).await?.personas)
    }

    async fn delete_persona(&self, owner: &UserId, id: &PersonaId) -> TaleweaverResult<bool> {
        self.modify_personas(owner, |document| {
            let before = document.personas.len();
            document.personas.retain(|p| p.id != *id);
            if document.default_persona_id.as_ref() == Some(id) {
                document.default_persona_id = None;
            }
            document.personas.len() != before
        })
        .await
    }

    async fn default_persona_id(&self, owner: &UserId) -> TaleweaverResult<Option<PersonaId>> {
        Ok(self.load_personas(owner).await?.default_persona_id)
    }

    async fn set_default_persona(
        &self,
        owner: &UserId,
        id: Option<PersonaId>,
    ) -> TaleweaverResult<()> {
        self.modify_personas(owner, |document| document.default_persona_id = id)
            .await
    }
}
