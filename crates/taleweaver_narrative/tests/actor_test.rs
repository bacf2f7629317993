mod common;

use common::{OPENING, ScriptedDriver, adventure, engine_with, owner};
use std::sync::Arc;
use std::time::Duration;
use taleweaver_core::{StoryId, TurnRole, UserId, VersionDirection};
use taleweaver_error::{CompletionErrorKind, StorageErrorKind, TaleweaverErrorKind};
use taleweaver_interface::StoryStore;
use taleweaver_models::ResilientDriver;
use taleweaver_narrative::{InMemoryStore, StoryEngine, StorySupervisor};
use taleweaver_rate_limit::{RequestLimiter, RetryConfig};

#[tokio::test]
async fn test_concurrent_turns_on_one_story_are_serialized() {
    let driver = Arc::new(
        ScriptedDriver::new([OPENING, "The rope holds.", "The lantern flickers."])
            .with_delay(Duration::from_millis(50)),
    );
    let store = Arc::new(InMemoryStore::new());
    let supervisor = StorySupervisor::new(engine_with(driver, store.clone()));
    let story = supervisor.create_story(&owner(), adventure()).await.unwrap();

    let first = {
        let supervisor = supervisor.clone();
        let id = story.id.clone();
        tokio::spawn(async move { supervisor.take_turn(&owner(), &id, "Climb down").await })
    };
    let second = {
        let supervisor = supervisor.clone();
        let id = story.id.clone();
        tokio::spawn(async move { supervisor.take_turn(&owner(), &id, "Light a lantern").await })
    };
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    let stored = store.get_story(&story.id).await.unwrap().unwrap();
    let roles: Vec<TurnRole> = stored.history.iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![
            TurnRole::Ai,
            TurnRole::Player,
            TurnRole::Ai,
            TurnRole::Player,
            TurnRole::Ai
        ]
    );
    assert_eq!(supervisor.actor_count().await, 1);
}

#[tokio::test]
async fn test_supervisor_respawns_after_shutdown() {
    let driver = Arc::new(ScriptedDriver::new([OPENING, "Fog.", "More fog."]));
    let store = Arc::new(InMemoryStore::new());
    let supervisor = StorySupervisor::new(engine_with(driver, store));
    let story = supervisor.create_story(&owner(), adventure()).await.unwrap();

    supervisor
        .take_turn(&owner(), &story.id, "Wait")
        .await
        .unwrap();
    supervisor.shutdown().await;
    assert_eq!(supervisor.actor_count().await, 0);

    let outcome = supervisor
        .take_turn(&owner(), &story.id, "Keep waiting")
        .await
        .unwrap();
    assert_eq!(outcome.story.history.len(), 5);
}

#[tokio::test]
async fn test_supervisor_routes_version_switch() {
    let driver = Arc::new(ScriptedDriver::new([OPENING, "A second opening."]));
    let store = Arc::new(InMemoryStore::new());
    let supervisor = StorySupervisor::new(engine_with(driver, store));
    let story = supervisor.create_story(&owner(), adventure()).await.unwrap();

    supervisor
        .regenerate_turn(&owner(), &story.id, 0)
        .await
        .unwrap();
    let switched = supervisor
        .switch_version(&owner(), &story.id, 0, VersionDirection::Prev)
        .await
        .unwrap();
    assert_eq!(switched.history[0].current_version_index, 0);
}

#[tokio::test]
async fn test_slow_provider_times_out_through_resilient_driver() {
    let slow = ScriptedDriver::new(["Too late."]).with_delay(Duration::from_millis(500));
    let driver = ResilientDriver::new(
        slow,
        RequestLimiter::unlimited(),
        RetryConfig::disabled(),
        Duration::from_millis(20),
    );
    let store = Arc::new(InMemoryStore::new());
    let engine = StoryEngine::new(Arc::new(driver), store.clone(), store.clone());

    let err = engine.create_story(&owner(), adventure()).await.unwrap_err();
    match err.kind() {
        TaleweaverErrorKind::Completion(e) => {
            assert!(matches!(e.kind, CompletionErrorKind::Timeout(20)))
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.story_count().await, 0);
}

#[tokio::test]
async fn test_unknown_stories_never_spawn_actors() {
    let driver = Arc::new(ScriptedDriver::default());
    let store = Arc::new(InMemoryStore::new());
    let supervisor = StorySupervisor::new(engine_with(driver.clone(), store));

    for n in 0..50 {
        let id = StoryId::from(format!("missing-{n}").as_str());
        let err = supervisor.take_turn(&owner(), &id, "Look around").await.unwrap_err();
        assert!(matches!(
            err.kind(),
            TaleweaverErrorKind::Storage(e) if matches!(e.kind, StorageErrorKind::NotFound(_))
        ));
    }
    assert!(
        supervisor
            .regenerate_turn(&owner(), &StoryId::from("missing"), 0)
            .await
            .is_err()
    );
    assert_eq!(supervisor.actor_count().await, 0);
    assert_eq!(driver.call_count(), 0);
}

#[tokio::test]
async fn test_foreign_story_does_not_spawn_an_actor() {
    let driver = Arc::new(ScriptedDriver::new([OPENING]));
    let store = Arc::new(InMemoryStore::new());
    let supervisor = StorySupervisor::new(engine_with(driver, store));
    let story = supervisor.create_story(&owner(), adventure()).await.unwrap();

    let intruder = UserId::from("mallory");
    assert!(
        supervisor
            .take_turn(&intruder, &story.id, "Steal the crown")
            .await
            .is_err()
    );
    assert_eq!(supervisor.actor_count().await, 0);
}

#[tokio::test]
async fn test_idle_actors_are_evicted() {
    let driver = Arc::new(ScriptedDriver::new([OPENING, "Gulls cry.", "The tide turns."]));
    let store = Arc::new(InMemoryStore::new());
    let supervisor =
        StorySupervisor::new(engine_with(driver, store)).with_idle_timeout(Duration::ZERO);
    let story = supervisor.create_story(&owner(), adventure()).await.unwrap();

    supervisor
        .take_turn(&owner(), &story.id, "Listen")
        .await
        .unwrap();
    assert_eq!(supervisor.actor_count().await, 1);
    assert_eq!(supervisor.evict_idle().await, 1);
    assert_eq!(supervisor.actor_count().await, 0);

    let outcome = supervisor
        .take_turn(&owner(), &story.id, "Wait for the tide")
        .await
        .unwrap();
    assert_eq!(outcome.story.history.len(), 5);
}

#[tokio::test]
async fn test_busy_actors_survive_eviction() {
    let driver = Arc::new(
        ScriptedDriver::new([OPENING, "The bell tolls."]).with_delay(Duration::from_millis(100)),
    );
    let store = Arc::new(InMemoryStore::new());
    let supervisor =
        StorySupervisor::new(engine_with(driver, store)).with_idle_timeout(Duration::ZERO);
    let story = supervisor.create_story(&owner(), adventure()).await.unwrap();

    let turn = {
        let supervisor = supervisor.clone();
        let id = story.id.clone();
        tokio::spawn(async move { supervisor.take_turn(&owner(), &id, "Ring back").await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(supervisor.evict_idle().await, 0);
    turn.await.unwrap().unwrap();
}
