//! Splitting a raw completion into narrative, choices and chapter metadata.

use super::{CHAPTER_TAG, CHOICE_LINE, SEPARATOR};
use serde::{Deserialize, Serialize};
use taleweaver_core::ChapterMetadata;
use tracing::debug;

/// Structured view of one model response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedTurn {
    /// Visible narrative with the chapter tag removed
    pub story: String,
    /// Offered actions without their numbering
    pub choices: Vec<String>,
    /// Chapter opened by this response
    pub chapter: Option<ChapterMetadata>,
}

/// Parse a raw completion.
///
/// Never fails: text without a separator is all story, malformed numbering
/// yields no choices, and a missing chapter tag yields no chapter.
///
/// # Examples
///
/// ```
/// use taleweaver_narrative::parse_response;
///
/// let parsed = parse_response("### CHAPTER 2: Low Tide\nThe water pulls back.\n\nChoices:\n1. Wade out\n2) Wait");
/// assert_eq!(parsed.story, "The water pulls back.");
/// assert_eq!(parsed.choices, vec!["Wade out", "Wait"]);
/// assert_eq!(parsed.chapter.unwrap().number, 2);
/// ```
pub fn parse_response(raw: &str) -> ParsedTurn {
    let (story_part, choices) = match SEPARATOR.find(raw) {
        Some(separator) => (
            &raw[..separator.start()],
            parse_choice_lines(&raw[separator.end()..]),
        ),
        None => (raw, Vec::new()),
    };

    let (story, chapter) = extract_chapter(story_part);
    debug!(
        story_len = story.len(),
        choices = choices.len(),
        chapter = ?chapter.as_ref().map(|c| c.number),
        "Parsed completion"
    );

    ParsedTurn {
        story,
        choices,
        chapter,
    }
}

/// Numbered lines (`1.` or `1)`) with the marker stripped, in order.
pub fn parse_choice_lines(block: &str) -> Vec<String> {
    CHOICE_LINE
        .captures_iter(block)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|choice| !choice.is_empty())
        .collect()
}

/// Pull the first chapter tag out of `text`, returning the trimmed remainder.
fn extract_chapter(text: &str) -> (String, Option<ChapterMetadata>) {
    let Some(caps) = CHAPTER_TAG.captures(text) else {
        return (text.trim().to_string(), None);
    };

    let number = caps
        .get(1)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|n| *n > 0);
    let Some(number) = number else {
        return (text.trim().to_string(), None);
    };
    let title = caps
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let story = CHAPTER_TAG.replace(text, "").trim().to_string();
    (story, Some(ChapterMetadata::new(number, title)))
}
