//! Per-story actors using Ractor.
//!
//! Every mutation of a story runs inside that story's actor, so two requests
//! against the same story never interleave their read-modify-write cycles.
//! Different stories proceed in parallel.

use crate::engine::{StoryEngine, TurnOutcome};
use async_trait::async_trait;
use ractor::{
    Actor, ActorProcessingErr, ActorRef, ActorStatus, MessagingErr, RpcReplyPort, rpc::CallResult,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use taleweaver_core::{
    NewPersona, NewStory, PersonaId, PersonaView, Story, StoryId, UserId, VersionDirection,
};
use taleweaver_error::{StoryError, StoryErrorKind, TaleweaverResult};
use tokio::sync::Mutex;

/// Helper to unwrap Ractor's CallResult into a standard Result
fn unwrap_call_result<T>(
    result: Result<CallResult<TaleweaverResult<T>>, MessagingErr<StoryMessage>>,
) -> TaleweaverResult<T> {
    match result {
        Ok(CallResult::Success(inner)) => inner,
        Ok(CallResult::Timeout) => Err(StoryError::new(StoryErrorKind::ActorUnavailable(
            "story actor call timed out".to_string(),
        ))
        .into()),
        Ok(CallResult::SenderError) => Err(StoryError::new(StoryErrorKind::ActorUnavailable(
            "story actor dropped the reply".to_string(),
        ))
        .into()),
        Err(e) => Err(StoryError::new(StoryErrorKind::ActorUnavailable(format!(
            "failed to send message to story actor: {}",
            e
        )))
        .into()),
    }
}

/// Messages a story actor handles.
#[derive(Debug)]
pub enum StoryMessage {
    /// Record a player action and generate the response.
    TakeTurn {
        /// Caller
        owner: UserId,
        /// Player action text
        action: String,
        /// Reply port for RPC response.
        reply: RpcReplyPort<TaleweaverResult<TurnOutcome>>,
    },
    /// Generate a new version of an AI turn.
    RegenerateTurn {
        /// Caller
        owner: UserId,
        /// History index of the AI turn
        index: usize,
        /// Reply port for RPC response.
        reply: RpcReplyPort<TaleweaverResult<TurnOutcome>>,
    },
    /// Replace the choices of an AI turn.
    RegenerateChoices {
        /// Caller
        owner: UserId,
        /// History index of the AI turn
        index: usize,
        /// Reply port for RPC response.
        reply: RpcReplyPort<TaleweaverResult<TurnOutcome>>,
    },
    /// Step through the versions of an AI turn.
    SwitchVersion {
        /// Caller
        owner: UserId,
        /// History index of the AI turn
        index: usize,
        /// Which way to step
        direction: VersionDirection,
        /// Reply port for RPC response.
        reply: RpcReplyPort<TaleweaverResult<Story>>,
    },
    /// Edit a player turn and regenerate from there.
    EditAndRegenerate {
        /// Caller
        owner: UserId,
        /// History index of the player turn
        index: usize,
        /// Replacement action text
        content: String,
        /// Reply port for RPC response.
        reply: RpcReplyPort<TaleweaverResult<TurnOutcome>>,
    },
}

/// Arguments and state of a story actor.
pub struct StoryActorState {
    engine: StoryEngine,
    story_id: StoryId,
}

/// Actor owning all mutations of one story.
pub struct StoryActor;

#[async_trait]
impl Actor for StoryActor {
    type Msg = StoryMessage;
    type State = StoryActorState;
    type Arguments = StoryActorState;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::debug!(story_id = %args.story_id, "StoryActor started");
        Ok(args)
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        tracing::debug!(story_id = %state.story_id, "StoryActor stopped");
        Ok(())
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let engine = &state.engine;
        let id = &state.story_id;
        match message {
            StoryMessage::TakeTurn {
                owner,
                action,
                reply,
            } => {
                let result = engine.take_turn(&owner, id, &action).await;
                let _ = reply.send(result);
            }
            StoryMessage::RegenerateTurn {
                owner,
                index,
                reply,
            } => {
                let result = engine.regenerate_turn(&owner, id, index).await;
                let _ = reply.send(result);
            }
            StoryMessage::RegenerateChoices {
                owner,
                index,
                reply,
            } => {
                let result = engine.regenerate_choices(&owner, id, index).await;
                let _ = reply.send(result);
            }
            StoryMessage::SwitchVersion {
                owner,
                index,
                direction,
                reply,
            } => {
                let result = engine.switch_version(&owner, id, index, direction).await;
                let _ = reply.send(result);
            }
            StoryMessage::EditAndRegenerate {
                owner,
                index,
                content,
                reply,
            } => {
                let result = engine
                    .edit_and_regenerate(&owner, id, index, &content)
                    .await;
                let _ = reply.send(result);
            }
        }
        Ok(())
    }
}

/// Idle time after which a story actor is stopped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// A live actor plus the bookkeeping used for idle eviction.
///
/// Callers hold a clone of `lease` for the duration of a call, so an entry
/// whose lease is unshared has no call in flight.
#[derive(Debug)]
struct ActorEntry {
    actor: ActorRef<StoryMessage>,
    lease: Arc<()>,
    last_used: Instant,
}

impl ActorEntry {
    fn is_alive(&self) -> bool {
        !matches!(
            self.actor.get_status(),
            ActorStatus::Stopping | ActorStatus::Stopped
        )
    }

    fn is_idle(&self, idle_timeout: Duration) -> bool {
        Arc::strong_count(&self.lease) == 1 && self.last_used.elapsed() >= idle_timeout
    }

    fn checkout(&mut self) -> (ActorRef<StoryMessage>, Arc<()>) {
        self.last_used = Instant::now();
        (self.actor.clone(), self.lease.clone())
    }
}

/// Routes story mutations to one lazily spawned actor per story.
///
/// Actors are only spawned for stories the caller owns, and are stopped once
/// they sit idle longer than the idle timeout. Reads and creations go
/// straight to the engine since they never race with an existing story's
/// history.
#[derive(Debug, Clone)]
pub struct StorySupervisor {
    engine: StoryEngine,
    actors: Arc<Mutex<HashMap<StoryId, ActorEntry>>>,
    call_timeout: Option<Duration>,
    idle_timeout: Duration,
}

impl StorySupervisor {
    /// Create a supervisor with no call timeout and the default idle timeout.
    pub fn new(engine: StoryEngine) -> Self {
        Self {
            engine,
            actors: Arc::new(Mutex::new(HashMap::new())),
            call_timeout: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    /// Bound how long a caller waits on a story actor.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Stop actors that have been idle for at least `timeout`.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &StoryEngine {
        &self.engine
    }

    /// Number of live story actors.
    pub async fn actor_count(&self) -> usize {
        self.actors.lock().await.len()
    }

    /// Stop and forget every actor idle past the idle timeout.
    ///
    /// Returns how many actors were stopped.
    pub async fn evict_idle(&self) -> usize {
        let mut actors = self.actors.lock().await;
        Self::sweep(&mut actors, self.idle_timeout)
    }

    fn sweep(actors: &mut HashMap<StoryId, ActorEntry>, idle_timeout: Duration) -> usize {
        let before = actors.len();
        actors.retain(|id, entry| {
            if !entry.is_alive() {
                return false;
            }
            if entry.is_idle(idle_timeout) {
                tracing::debug!(story_id = %id, "Stopping idle story actor");
                entry.actor.stop(None);
                return false;
            }
            true
        });
        before - actors.len()
    }

    /// Live actor for a story the caller owns, spawning one if needed.
    ///
    /// The returned lease must be held until the call completes.
    async fn actor_for(
        &self,
        owner: &UserId,
        id: &StoryId,
    ) -> TaleweaverResult<(ActorRef<StoryMessage>, Arc<()>)> {
        {
            let mut actors = self.actors.lock().await;
            Self::sweep(&mut actors, self.idle_timeout);
            if let Some(entry) = actors.get_mut(id) {
                return Ok(entry.checkout());
            }
        }

        // Unknown or foreign stories never get an actor.
        self.engine.get_story(owner, id).await?;

        let mut actors = self.actors.lock().await;
        if let Some(entry) = actors.get_mut(id).filter(|entry| entry.is_alive()) {
            return Ok(entry.checkout());
        }

        let args = StoryActorState {
            engine: self.engine.clone(),
            story_id: id.clone(),
        };
        let (actor, _handle) = Actor::spawn(None, StoryActor, args).await.map_err(|e| {
            StoryError::new(StoryErrorKind::ActorUnavailable(format!(
                "failed to spawn story actor: {}",
                e
            )))
        })?;
        tracing::debug!(story_id = %id, live = actors.len() + 1, "Spawned story actor");
        let mut entry = ActorEntry {
            actor,
            lease: Arc::new(()),
            last_used: Instant::now(),
        };
        let checkout = entry.checkout();
        actors.insert(id.clone(), entry);
        Ok(checkout)
    }

    /// Create a story (generates the opening in adventure mode).
    pub async fn create_story(&self, owner: &UserId, new_story: NewStory) -> TaleweaverResult<Story> {
        self.engine.create_story(owner, new_story).await
    }

    /// Fetch one of the caller's stories.
    pub async fn get_story(&self, owner: &UserId, id: &StoryId) -> TaleweaverResult<Story> {
        self.engine.get_story(owner, id).await
    }

    /// See [`StoryEngine::take_turn`].
    pub async fn take_turn(
        &self,
        owner: &UserId,
        id: &StoryId,
        action: impl Into<String>,
    ) -> TaleweaverResult<TurnOutcome> {
        let (actor, _lease) = self.actor_for(owner, id).await?;
        let owner = owner.clone();
        let action = action.into();
        unwrap_call_result(
            actor
                .call(
                    |reply| StoryMessage::TakeTurn {
                        owner,
                        action,
                        reply,
                    },
                    self.call_timeout,
                )
                .await,
        )
    }

    /// See [`StoryEngine::regenerate_turn`].
    pub async fn regenerate_turn(
        &self,
        owner: &UserId,
        id: &StoryId,
        index: usize,
    ) -> TaleweaverResult<TurnOutcome> {
        let (actor, _lease) = self.actor_for(owner, id).await?;
        let owner = owner.clone();
        unwrap_call_result(
            actor
                .call(
                    |reply| StoryMessage::RegenerateTurn {
                        owner,
                        index,
                        reply,
                    },
                    self.call_timeout,
                )
                .await,
        )
    }

    /// See [`StoryEngine::regenerate_choices`].
    pub async fn regenerate_choices(
        &self,
        owner: &UserId,
        id: &StoryId,
        index: usize,
    ) -> TaleweaverResult<TurnOutcome> {
        let (actor, _lease) = self.actor_for(owner, id).await?;
        let owner = owner.clone();
        unwrap_call_result(
            actor
                .call(
                    |reply| StoryMessage::RegenerateChoices {
                        owner,
                        index,
                        reply,
                    },
                    self.call_timeout,
                )
                .await,
        )
    }

    /// See [`StoryEngine::switch_version`].
    pub async fn switch_version(
        &self,
        owner: &UserId,
        id: &StoryId,
        index: usize,
        direction: VersionDirection,
    ) -> TaleweaverResult<Story> {
        let (actor, _lease) = self.actor_for(owner, id).await?;
        let owner = owner.clone();
        unwrap_call_result(
            actor
                .call(
                    |reply| StoryMessage::SwitchVersion {
                        owner,
                        index,
                        direction,
                        reply,
                    },
                    self.call_timeout,
                )
                .await,
        )
    }

    /// See [`StoryEngine::edit_and_regenerate`].
    pub async fn edit_and_regenerate(
        &self,
        owner: &UserId,
        id: &StoryId,
        index: usize,
        content: impl Into<String>,
    ) -> TaleweaverResult<TurnOutcome> {
        let (actor, _lease) = self.actor_for(owner, id).await?;
        let owner = owner.clone();
        let content = content.into();
        unwrap_call_result(
            actor
                .call(
                    |reply| StoryMessage::EditAndRegenerate {
                        owner,
                        index,
                        content,
                        reply,
                    },
                    self.call_timeout,
                )
                .await,
        )
    }

    /// See [`StoryEngine::create_persona`].
    pub async fn create_persona(
        &self,
        owner: &UserId,
        new_persona: NewPersona,
    ) -> TaleweaverResult<PersonaView> {
        self.engine.create_persona(owner, new_persona).await
    }

    /// See [`StoryEngine::list_personas`].
    pub async fn list_personas(&self, owner: &UserId) -> TaleweaverResult<Vec<PersonaView>> {
        self.engine.list_personas(owner).await
    }

    /// See [`StoryEngine::set_default_persona`].
    pub async fn set_default_persona(
        &self,
        owner: &UserId,
        id: Option<PersonaId>,
    ) -> TaleweaverResult<()> {
        self.engine.set_default_persona(owner, id).await
    }

    /// See [`StoryEngine::delete_persona`].
    pub async fn delete_persona(&self, owner: &UserId, id: &PersonaId) -> TaleweaverResult<bool> {
        self.engine.delete_persona(owner, id).await
    }

    /// Stop every story actor.
    pub async fn shutdown(&self) {
        let mut actors = self.actors.lock().await;
        for (id, entry) in actors.drain() {
            tracing::debug!(story_id = %id, "Stopping story actor");
            entry.actor.stop(None);
        }
    }
}
