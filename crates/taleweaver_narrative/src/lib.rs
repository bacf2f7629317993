//! Turn generation engine for Taleweaver.
//!
//! This crate turns a story and a player action into the next AI turn:
//! it composes the prompt, calls the completion driver, applies memory
//! directives, splits the reply into prose, choices and chapter metadata,
//! and persists the result through the store traits.
//!
//! # Features
//!
//! - **Prompt composition**: Adventure and character modes, chapter pacing, personas
//! - **Marker protocol**: Choice separator, chapter tag and memory directives
//! - **Turn history**: Versions, regeneration, edit-and-truncate
//! - **Per-story actors**: Ractor actors serialize mutations of one story
//! - **Stores**: In-memory and JSON-file backends
//!
//! # Example
//!
//! ```
//! use taleweaver_narrative::{apply_memory_directives, parse_response};
//!
//! let raw = "The gate creaks open.\n\n**Choices:**\n1. Step inside\n2. Turn back\n\
//!            [[MEMORY_ADD: The gate is open]]";
//!
//! let delta = apply_memory_directives(raw, &[]);
//! assert_eq!(delta.memories, vec!["The gate is open"]);
//!
//! let parsed = parse_response(&delta.cleaned_text);
//! assert_eq!(parsed.story, "The gate creaks open.");
//! assert_eq!(parsed.choices, vec!["Step inside", "Turn back"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod actor;
mod composer;
mod engine;
mod file_store;
mod in_memory_store;
mod protocol;
pub mod turns;

pub use actor::{StoryActor, StoryActorState, StoryMessage, StorySupervisor};
pub use composer::{
    ChapterCadence, MAX_CHAPTER_TURNS, MEMORY_INSTRUCTIONS, MIN_CHAPTER_TURNS, PREMISE_PREFIX,
    compose_choices_messages, compose_turn_messages, substitute_placeholders, system_prompt,
    turns_since_chapter,
};
pub use engine::{StoryEngine, TurnOutcome};
pub use file_store::FileStore;
pub use in_memory_store::InMemoryStore;
pub use protocol::{
    CHAPTER_MARKER, MemoryDelta, ParsedTurn, apply_memory_directives, contains_chapter_marker,
    parse_choice_lines, parse_response, reapply_memory_directives,
};
