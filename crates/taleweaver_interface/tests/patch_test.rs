use taleweaver_core::{NewStory, Story, StoryId, UserId};
use taleweaver_interface::StoryPatch;

fn story() -> Story {
    Story::new(
        StoryId::from("s1"),
        UserId::from("alice"),
        NewStory {
            title: "Ashes".into(),
            initial_prompt: "A city burns.".into(),
            ..Default::default()
        },
    )
}

#[test]
fn test_empty_patch_changes_nothing_but_timestamp() {
    let mut target = story();
    let before = target.clone();
    assert!(StoryPatch::default().is_empty());
    StoryPatch::default().apply(&mut target);
    assert_eq!(target.memories, before.memories);
    assert_eq!(target.current_chapter, before.current_chapter);
    assert_eq!(target.title, before.title);
}

#[test]
fn test_patch_overwrites_selected_fields() {
    let mut target = story();
    StoryPatch::default()
        .with_memories(vec!["Mara owes the player a favor".to_string()])
        .with_current_chapter(4)
        .apply(&mut target);

    assert_eq!(target.memories, vec!["Mara owes the player a favor"]);
    assert_eq!(target.current_chapter, 4);
    assert_eq!(target.title, "Ashes");
}

#[test]
fn test_patch_never_drops_chapter_below_one() {
    let mut target = story();
    StoryPatch::default().with_current_chapter(0).apply(&mut target);
    assert_eq!(target.current_chapter, 1);
}
