//! Prompt composition.
//!
//! Turns an immutable [`StoryContext`] into the ordered role-tagged messages
//! sent to the completion driver. Branches on story mode; adventure prompts
//! also carry chapter pacing, world assets, persona and memory sections.

mod adventure;
mod cadence;
mod character;
mod placeholder;

pub use adventure::MEMORY_INSTRUCTIONS;
pub use cadence::{ChapterCadence, MAX_CHAPTER_TURNS, MIN_CHAPTER_TURNS, turns_since_chapter};
pub use placeholder::substitute_placeholders;

use taleweaver_core::{Message, StoryContext, StoryMode, TurnRole};
use tracing::debug;

/// Opening line of the synthetic first user message.
pub const PREMISE_PREFIX: &str = "Start the story with this premise: ";

/// System prompt for the context's mode.
pub fn system_prompt(context: &StoryContext) -> String {
    match context.mode() {
        StoryMode::Adventure => adventure::system_prompt(context),
        StoryMode::Character => character::system_prompt(context),
    }
}

/// Messages for generating the next AI turn.
///
/// The system prompt comes first. With no history and a non-empty premise a
/// synthetic premise message stands in for the replay; otherwise prior turns
/// are replayed as user/assistant messages. A supplied player action is the
/// final user message.
///
/// # Examples
///
/// ```
/// use taleweaver_core::{Role, StoryContext};
/// use taleweaver_narrative::compose_turn_messages;
///
/// let context = StoryContext::builder()
///     .title("The Sunken Crown")
///     .initial_prompt("A diver finds a crown beneath the harbor.")
///     .build()
///     .unwrap();
///
/// let messages = compose_turn_messages(&context, None);
/// assert_eq!(messages[0].role, Role::System);
/// assert!(messages[1].text.starts_with("Start the story with this premise:"));
/// ```
pub fn compose_turn_messages(context: &StoryContext, action: Option<&str>) -> Vec<Message> {
    let mut messages = vec![Message::system(system_prompt(context))];

    if context.history().is_empty() {
        let premise = substitute_placeholders(context.initial_prompt(), context.persona_name());
        if !premise.trim().is_empty() {
            messages.push(Message::user(format!("{PREMISE_PREFIX}{}", premise.trim())));
        }
    } else {
        messages.extend(replay(context));
    }

    if let Some(action) = action.map(str::trim).filter(|a| !a.is_empty()) {
        messages.push(Message::user(action));
    }

    debug!(
        mode = %context.mode(),
        messages = messages.len(),
        history = context.history().len(),
        "Composed turn messages"
    );
    messages
}

/// Messages asking for a fresh choice list for the last turn of the context.
pub fn compose_choices_messages(context: &StoryContext) -> Vec<Message> {
    let mut messages = vec![Message::system(adventure::choices_prompt(context))];
    messages.extend(replay(context));
    messages.push(Message::user(
        "Give me 3 new choices for what to do next.",
    ));
    messages
}

fn replay(context: &StoryContext) -> impl Iterator<Item = Message> + '_ {
    context.history().iter().map(|turn| match turn.role {
        TurnRole::Player => Message::user(turn.content.clone()),
        TurnRole::Ai => Message::assistant(turn.content.clone()),
    })
}
