//! Turn history and regeneration version stacks.
//!
//! Pure operations on a history slice; the engine persists the results.

use taleweaver_core::{ChapterMetadata, Turn, VersionDirection};
use taleweaver_error::{StoryError, StoryErrorKind, TaleweaverResult};
use tracing::debug;

fn turn_at(history: &[Turn], index: usize) -> TaleweaverResult<&Turn> {
    history.get(index).ok_or_else(|| {
        StoryError::new(StoryErrorKind::TurnOutOfRange {
            index,
            len: history.len(),
        })
        .into()
    })
}

fn turn_at_mut(history: &mut [Turn], index: usize) -> TaleweaverResult<&mut Turn> {
    let len = history.len();
    history.get_mut(index).ok_or_else(|| {
        StoryError::new(StoryErrorKind::TurnOutOfRange { index, len }).into()
    })
}

/// The AI turn at `index`, or an error for a missing or player turn.
pub fn ai_turn(history: &[Turn], index: usize) -> TaleweaverResult<&Turn> {
    let turn = turn_at(history, index)?;
    if !turn.is_ai() {
        Err(StoryError::new(StoryErrorKind::NotAiTurn(index)))?
    }
    Ok(turn)
}

/// The player turn at `index`, or an error for a missing or AI turn.
pub fn player_turn(history: &[Turn], index: usize) -> TaleweaverResult<&Turn> {
    let turn = turn_at(history, index)?;
    if !turn.is_player() {
        Err(StoryError::new(StoryErrorKind::NotPlayerTurn(index)))?
    }
    Ok(turn)
}

/// Replace the live content of an AI turn with a new version.
///
/// The first regeneration seeds `versions` with the original content. The new
/// content is pushed, selected, and its choices and chapter replace the old.
pub fn regenerate(
    history: &mut [Turn],
    index: usize,
    content: String,
    choices: Vec<String>,
    chapter: Option<ChapterMetadata>,
) -> TaleweaverResult<()> {
    ai_turn(history, index)?;
    let turn = turn_at_mut(history, index)?;

    if turn.versions.is_empty() {
        turn.versions.push(turn.content.clone());
    }
    turn.versions.push(content.clone());
    turn.current_version_index = turn.versions.len() - 1;
    turn.content = content;
    turn.choices = choices;
    turn.chapter = chapter;

    debug!(
        index,
        versions = turn.versions.len(),
        "Regenerated turn"
    );
    Ok(())
}

/// Step the selected version of an AI turn by one.
///
/// Returns whether anything changed; stepping past either end is a no-op.
pub fn switch_version(
    history: &mut [Turn],
    index: usize,
    direction: VersionDirection,
) -> TaleweaverResult<bool> {
    ai_turn(history, index)?;
    let turn = turn_at_mut(history, index)?;

    let target = match direction {
        VersionDirection::Prev => turn.current_version_index.checked_sub(1),
        VersionDirection::Next => Some(turn.current_version_index + 1),
    };
    let Some(target) = target.filter(|t| *t < turn.versions.len()) else {
        debug!(index, ?direction, "Version switch at bound, nothing to do");
        return Ok(false);
    };
    let Some(content) = turn.versions.get(target).cloned() else {
        return Ok(false);
    };

    turn.current_version_index = target;
    turn.content = content;
    debug!(index, version = target, "Switched turn version");
    Ok(true)
}

/// Cut the history to `[0, index)` and push the edited player turn at `index`.
pub fn truncate_for_edit(
    history: &mut Vec<Turn>,
    index: usize,
    content: impl Into<String>,
) -> TaleweaverResult<()> {
    player_turn(history, index)?;
    let discarded = history.len() - index - 1;
    history.truncate(index);
    history.push(Turn::player(content));
    debug!(index, discarded, "Truncated history for edit");
    Ok(())
}

/// Replace only the choices of an AI turn.
pub fn replace_choices(
    history: &mut [Turn],
    index: usize,
    choices: Vec<String>,
) -> TaleweaverResult<()> {
    ai_turn(history, index)?;
    turn_at_mut(history, index)?.choices = choices;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use taleweaver_error::TaleweaverErrorKind;

    fn history() -> Vec<Turn> {
        vec![
            Turn::ai("Opening", vec!["Look".into()], None),
            Turn::player("Look around"),
            Turn::ai("A door", vec!["Open".into()], None),
            Turn::player("Open it"),
            Turn::ai("A hall", vec![], None),
        ]
    }

    fn story_kind(err: taleweaver_error::TaleweaverError) -> StoryErrorKind {
        match err.kind() {
            TaleweaverErrorKind::Story(e) => e.kind.clone(),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_first_regeneration_seeds_versions_with_original() {
        let mut turns = history();
        regenerate(&mut turns, 2, "A window".into(), vec!["Climb".into()], None).unwrap();

        let turn = &turns[2];
        assert_eq!(turn.versions, vec!["A door", "A window"]);
        assert_eq!(turn.current_version_index, 1);
        assert_eq!(turn.content, "A window");
        assert_eq!(turn.choices, vec!["Climb"]);
        assert!(turn.is_consistent());

        regenerate(&mut turns, 2, "A stair".into(), vec![], None).unwrap();
        assert_eq!(turns[2].versions.len(), 3);
        assert_eq!(turns[2].current_version_index, 2);
    }

    #[test]
    fn test_regenerating_a_player_turn_is_rejected() {
        let mut turns = history();
        let err = regenerate(&mut turns, 1, "x".into(), vec![], None).unwrap_err();
        assert_eq!(story_kind(err), StoryErrorKind::NotAiTurn(1));
        assert_eq!(turns, history());
    }

    #[test]
    fn test_switching_walks_versions_and_stops_at_bounds() {
        let mut turns = history();
        regenerate(&mut turns, 0, "Second".into(), vec![], None).unwrap();

        // already at the last version
        assert!(!switch_version(&mut turns, 0, VersionDirection::Next).unwrap());
        assert_eq!(turns[0].content, "Second");

        assert!(switch_version(&mut turns, 0, VersionDirection::Prev).unwrap());
        assert_eq!(turns[0].content, "Opening");
        assert_eq!(turns[0].current_version_index, 0);

        // already at the first version
        assert!(!switch_version(&mut turns, 0, VersionDirection::Prev).unwrap());
        assert_eq!(turns[0].content, "Opening");
        assert!(turns[0].is_consistent());
    }

    #[test]
    fn test_switching_without_versions_is_a_noop() {
        let mut turns = history();
        assert!(!switch_version(&mut turns, 4, VersionDirection::Next).unwrap());
        assert!(!switch_version(&mut turns, 4, VersionDirection::Prev).unwrap());
        assert_eq!(turns, history());
    }

    #[test]
    fn test_edit_discards_later_turns_and_replaces_the_edited_one() {
        let mut turns = history();
        truncate_for_edit(&mut turns, 1, "Run away").unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].content, "Opening");
        assert_eq!(turns[1], Turn::player("Run away"));
    }

    #[test]
    fn test_edit_requires_a_player_turn_in_range() {
        let mut turns = history();
        assert_eq!(
            story_kind(truncate_for_edit(&mut turns, 2, "x").unwrap_err()),
            StoryErrorKind::NotPlayerTurn(2)
        );
        assert_eq!(
            story_kind(truncate_for_edit(&mut turns, 9, "x").unwrap_err()),
            StoryErrorKind::TurnOutOfRange { index: 9, len: 5 }
        );
        assert_eq!(turns, history());
    }

    #[test]
    fn test_replacing_choices_leaves_content_and_versions() {
        let mut turns = history();
        replace_choices(&mut turns, 2, vec!["Knock".into(), "Wait".into()]).unwrap();
        assert_eq!(turns[2].content, "A door");
        assert_eq!(turns[2].choices, vec!["Knock", "Wait"]);
        assert!(turns[2].versions.is_empty());
    }
}
