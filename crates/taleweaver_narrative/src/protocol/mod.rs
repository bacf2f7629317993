//! Text markers exchanged with the model.
//!
//! Every piece of marker knowledge lives here: the choice separator, numbered
//! choice lines, the chapter tag and the memory directives. The rest of the
//! crate only sees [`ParsedTurn`] and [`MemoryDelta`].

mod memory;
mod response;

pub use memory::{MemoryDelta, apply_memory_directives, reapply_memory_directives};
pub use response::{ParsedTurn, parse_choice_lines, parse_response};

use regex::Regex;
use std::sync::LazyLock;

/// Prefix of the chapter tag, matched case-insensitively.
pub const CHAPTER_MARKER: &str = "### CHAPTER";

/// Label line introducing the choice list, e.g. `**Choices:**` or `## Pilihan:`.
static SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*[#*_]*[ \t]*(?:choices|pilihan|options|actions)[ \t]*[*_]*[ \t]*:")
        .expect("Valid separator regex")
});

/// `1. text` or `1) text`
static CHOICE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*\d+[.)][ \t]*(.*)$")
        .expect("Valid choice regex")
});

/// `### CHAPTER 4: The Siege`
static CHAPTER_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*###[ \t]*chapter[ \t]+(\d+)[ \t]*:[ \t]*([^\r\n]*?)[ \t]*\r?$\n?")
        .expect("Valid chapter regex")
});

/// `[[MEMORY_ADD: text]]`; payload may not span lines or contain brackets.
static MEMORY_ADD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[\[[ \t]*MEMORY_ADD[ \t]*:[ \t]*([^\[\]\r\n]*?)[ \t]*\]\]")
        .expect("Valid memory add regex")
});

/// `[[MEMORY_DELETE: n]]`; non-numeric payloads are stripped and ignored.
static MEMORY_DELETE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[\[[ \t]*MEMORY_DELETE[ \t]*:[ \t]*([^\[\]\r\n]*?)[ \t]*\]\]")
        .expect("Valid memory delete regex")
});

/// `###chapter` anywhere in the text, with the spacing [`CHAPTER_TAG`] accepts.
static CHAPTER_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)###[ \t]*chapter\b").expect("Valid chapter mention regex")
});

/// Whether text carries a chapter tag.
pub fn contains_chapter_marker(text: &str) -> bool {
    CHAPTER_MENTION.is_match(text)
}
