//! Chapter pacing for adventure stories.

use crate::protocol::contains_chapter_marker;
use taleweaver_core::Turn;

/// Fewest AI turns a chapter runs before a new one is allowed.
pub const MIN_CHAPTER_TURNS: usize = 7;
/// Most AI turns a chapter runs before a new one is required.
pub const MAX_CHAPTER_TURNS: usize = 12;

/// What the model is told about chapter boundaries this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterCadence {
    /// No AI turns yet: open with chapter 1
    OpenFirstChapter,
    /// Chapter is young: do not start a new one
    Forbid,
    /// Chapter may end at a fitting moment
    Permit {
        /// Number to use if a chapter starts
        next: u32,
    },
    /// Chapter has run long: close it and start the next now
    Mandate {
        /// Number of the chapter to start
        next: u32,
    },
}

impl ChapterCadence {
    /// Derive the cadence from the history and the current chapter number.
    pub fn from_history(history: &[Turn], current_chapter: u32) -> Self {
        let ai_turns = history.iter().filter(|t| t.is_ai()).count();
        if ai_turns == 0 {
            return ChapterCadence::OpenFirstChapter;
        }

        let next = current_chapter.max(1) + 1;
        match turns_since_chapter(history) {
            n if n < MIN_CHAPTER_TURNS => ChapterCadence::Forbid,
            n if n <= MAX_CHAPTER_TURNS => ChapterCadence::Permit { next },
            _ => ChapterCadence::Mandate { next },
        }
    }

    /// Prompt text for this cadence.
    pub fn instruction(&self) -> String {
        match self {
            ChapterCadence::OpenFirstChapter => {
                "CHAPTER: This is the opening of the story. Begin your response with the line \
                 \"### CHAPTER 1: <title>\" followed by the narrative."
                    .to_string()
            }
            ChapterCadence::Forbid => {
                "CHAPTER: The current chapter has only just begun. Do NOT start a new chapter \
                 and do NOT write a chapter heading."
                    .to_string()
            }
            ChapterCadence::Permit { next } => format!(
                "CHAPTER: If the scene reaches a natural turning point, you may begin a new \
                 chapter by starting your response with \"### CHAPTER {next}: <title>\". \
                 Otherwise continue the current chapter without a heading."
            ),
            ChapterCadence::Mandate { next } => format!(
                "CHAPTER: The current chapter has run long. Close the current scene and begin a \
                 new chapter in this response, starting with \"### CHAPTER {next}: <title>\"."
            ),
        }
    }
}

/// AI turns after the most recent one that opened a chapter.
///
/// A turn opened a chapter when its content still contains the tag or it
/// carries parsed chapter metadata. Without any such turn every AI turn counts.
pub fn turns_since_chapter(history: &[Turn]) -> usize {
    history
        .iter()
        .rev()
        .filter(|t| t.is_ai())
        .take_while(|t| t.chapter.is_none() && !contains_chapter_marker(&t.content))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use taleweaver_core::ChapterMetadata;

    fn ai_turns(n: usize) -> Vec<Turn> {
        (0..n)
            .flat_map(|i| {
                [
                    Turn::ai(format!("Narrative {i}"), vec![], None),
                    Turn::player(format!("Action {i}")),
                ]
            })
            .collect()
    }

    #[test]
    fn test_empty_history_mandates_chapter_one() {
        let cadence = ChapterCadence::from_history(&[], 1);
        assert_eq!(cadence, ChapterCadence::OpenFirstChapter);
        assert!(cadence.instruction().contains("### CHAPTER 1"));
    }

    #[test]
    fn test_thirteen_unmarked_turns_mandate_a_new_chapter() {
        let cadence = ChapterCadence::from_history(&ai_turns(13), 1);
        assert_eq!(cadence, ChapterCadence::Mandate { next: 2 });
        assert!(cadence.instruction().contains("### CHAPTER 2"));
    }

    #[test]
    fn test_boundaries_follow_the_pacing_table() {
        assert_eq!(
            ChapterCadence::from_history(&ai_turns(6), 1),
            ChapterCadence::Forbid
        );
        assert_eq!(
            ChapterCadence::from_history(&ai_turns(7), 3),
            ChapterCadence::Permit { next: 4 }
        );
        assert_eq!(
            ChapterCadence::from_history(&ai_turns(12), 3),
            ChapterCadence::Permit { next: 4 }
        );
    }

    #[test]
    fn test_counting_restarts_at_chapter_metadata() {
        let mut history = ai_turns(10);
        history[0].chapter = Some(ChapterMetadata::new(1, "Dawn"));
        // ten AI turns, the first opened the chapter
        assert_eq!(turns_since_chapter(&history), 9);

        history[16].chapter = Some(ChapterMetadata::new(2, "Noon"));
        assert_eq!(turns_since_chapter(&history), 1);
        assert_eq!(
            ChapterCadence::from_history(&history, 2),
            ChapterCadence::Forbid
        );
    }

    #[test]
    fn test_counting_restarts_at_a_raw_marker() {
        let mut history = ai_turns(9);
        history[10].content = "### Chapter 2: Noon\nText".into();
        assert_eq!(turns_since_chapter(&history), 3);
    }
}
