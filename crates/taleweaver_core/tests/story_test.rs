use std::str::FromStr;
use taleweaver_core::{
    Asset, ChapterMetadata, NewStory, Persona, PersonaId, Story, StoryAssets, StoryContext,
    StoryId, StoryMode, Turn, TurnRole, UserId, VersionDirection,
};

fn sample_story() -> Story {
    Story::new(
        StoryId::from("story-1"),
        UserId::from("alice"),
        NewStory {
            title: "The Sunken Crown".into(),
            initial_prompt: "{user} dives into the harbor.".into(),
            ..Default::default()
        },
    )
}

#[test]
fn test_new_story_starts_in_chapter_one() {
    let story = sample_story();
    assert_eq!(story.current_chapter, 1);
    assert_eq!(story.mode, StoryMode::Adventure);
    assert!(story.history.is_empty());
    assert!(story.memories.is_empty());
    assert_eq!(story.created_at, story.updated_at);
}

#[test]
fn test_ai_turn_count_ignores_player_turns() {
    let mut story = sample_story();
    story.history.push(Turn::ai("Opening", vec![], None));
    story.history.push(Turn::player("Look around"));
    story.history.push(Turn::ai("You see a door", vec!["Open it".into()], None));
    assert_eq!(story.ai_turn_count(), 2);
}

#[test]
fn test_turn_serialization_omits_empty_fields() {
    let turn = Turn::player("Hello");
    let json = serde_json::to_value(&turn).unwrap();
    assert_eq!(json["role"], "player");
    assert!(json.get("choices").is_none());
    assert!(json.get("versions").is_none());
    assert!(json.get("chapter").is_none());

    let restored: Turn = serde_json::from_value(json).unwrap();
    assert_eq!(restored, turn);
    assert_eq!(restored.role, TurnRole::Player);
}

#[test]
fn test_turn_consistency_tracks_selected_version() {
    let mut turn = Turn::ai("first", vec![], Some(ChapterMetadata::new(1, "Dawn")));
    turn.versions = vec!["first".into(), "second".into()];
    turn.current_version_index = 0;
    assert!(turn.is_consistent());

    turn.current_version_index = 1;
    assert!(!turn.is_consistent());

    turn.content = "second".into();
    assert!(turn.is_consistent());
}

#[test]
fn test_version_direction_parses_case_insensitively() {
    assert_eq!(
        VersionDirection::from_str("prev").unwrap(),
        VersionDirection::Prev
    );
    assert_eq!(
        VersionDirection::from_str("Next").unwrap(),
        VersionDirection::Next
    );
    assert!(VersionDirection::from_str("sideways").is_err());
}

#[test]
fn test_story_mode_deserializes_lowercase() {
    let mode: StoryMode = serde_json::from_str("\"character\"").unwrap();
    assert_eq!(mode, StoryMode::Character);
    assert_eq!(StoryMode::Adventure.to_string(), "adventure");
}

#[test]
fn test_assets_sections_skip_empty_lists() {
    let assets = StoryAssets {
        characters: vec![Asset::new("Mara", "A salvage captain")],
        ..Default::default()
    };
    let sections: Vec<_> = assets.sections().map(|(name, _)| name).collect();
    assert_eq!(sections, vec!["Characters"]);
    assert!(StoryAssets::default().is_empty());
}

#[test]
fn test_context_snapshots_story_and_persona() {
    let mut story = sample_story();
    story.current_chapter = 3;
    story.memories.push("The crown is cursed".into());
    story.history.push(Turn::ai("Opening", vec![], None));
    story.history.push(Turn::player("Swim down"));

    let persona = Persona {
        id: PersonaId::from("p1"),
        owner: UserId::from("alice"),
        name: "Rin".into(),
        description: "A reckless diver".into(),
        photo_url: None,
    };

    let context = StoryContext::from_story(&story, Some(persona));
    assert_eq!(*context.current_chapter(), 3);
    assert_eq!(context.memories().len(), 1);
    assert_eq!(context.persona_name(), Some("Rin"));

    let trimmed = context.with_history_prefix(1);
    assert_eq!(trimmed.history().len(), 1);
    assert_eq!(context.history().len(), 2);
}

#[test]
fn test_context_builder_defaults_to_chapter_one() {
    let context = StoryContext::builder()
        .title("Untitled")
        .build()
        .unwrap();
    assert_eq!(*context.current_chapter(), 1);
    assert!(context.persona().is_none());
}
