#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use taleweaver_core::{
    CompletionRequest, CompletionResponse, NewStory, Story, StoryId, StoryMode, Turn, UserId,
};
use taleweaver_error::{
    CompletionError, CompletionErrorKind, StorageError, StorageErrorKind, TaleweaverResult,
};
use taleweaver_interface::{CompletionDriver, StoryPatch, StoryStore};
use taleweaver_narrative::{InMemoryStore, StoryEngine};

/// Completion driver replaying canned replies in order.
#[derive(Default)]
pub struct ScriptedDriver {
    replies: Mutex<VecDeque<Result<String, CompletionErrorKind>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    delay: Option<Duration>,
}

impl ScriptedDriver {
    pub fn new<'a>(replies: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.to_string())).collect()),
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_reply(&self, reply: &str) {
        self.replies.lock().unwrap().push_back(Ok(reply.to_string()));
    }

    pub fn push_failure(&self, kind: CompletionErrorKind) {
        self.replies.lock().unwrap().push_back(Err(kind));
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionDriver for ScriptedDriver {
    async fn complete(&self, req: &CompletionRequest) -> TaleweaverResult<CompletionResponse> {
        self.requests.lock().unwrap().push(req.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(CompletionResponse::new(text)),
            Some(Err(kind)) => Err(CompletionError::new(kind).into()),
            None => Err(CompletionError::new(CompletionErrorKind::Request(
                "script exhausted".to_string(),
            ))
            .into()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

/// Story store whose partial updates always fail.
#[derive(Default)]
pub struct FailingUpdateStore {
    pub inner: InMemoryStore,
}

#[async_trait]
impl StoryStore for FailingUpdateStore {
    async fn get_story(&self, id: &StoryId) -> TaleweaverResult<Option<Story>> {
        self.inner.get_story(id).await
    }

    async fn create_story(&self, story: &Story) -> TaleweaverResult<()> {
        self.inner.create_story(story).await
    }

    async fn append_turn(&self, id: &StoryId, turn: Turn) -> TaleweaverResult<()> {
        self.inner.append_turn(id, turn).await
    }

    async fn replace_history(&self, id: &StoryId, history: Vec<Turn>) -> TaleweaverResult<()> {
        self.inner.replace_history(id, history).await
    }

    async fn update_story(&self, _id: &StoryId, _patch: StoryPatch) -> TaleweaverResult<()> {
        Err(StorageError::new(StorageErrorKind::Unavailable("disk full".to_string())).into())
    }
}

pub const OPENING: &str = "### Chapter 1: The Harbor\n\
    The harbor is quiet under a bruised sky.\n\n\
    **Choices:**\n\
    1. Dive beneath the pier\n\
    2. Ask the fisherman\n\
    3. Wait for nightfall\n\
    [[MEMORY_ADD: A crown lies beneath the pier]]";

pub fn owner() -> UserId {
    UserId::from("ada")
}

pub fn adventure() -> NewStory {
    NewStory {
        title: "The Sunken Crown".to_string(),
        initial_prompt: "{user} hears of a crown beneath the harbor.".to_string(),
        mode: StoryMode::Adventure,
        ..NewStory::default()
    }
}

pub fn engine_with(driver: Arc<ScriptedDriver>, store: Arc<InMemoryStore>) -> StoryEngine {
    StoryEngine::new(driver, store.clone(), store)
}
