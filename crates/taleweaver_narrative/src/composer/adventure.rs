//! Game Master system prompt.

use super::cadence::ChapterCadence;
use super::placeholder::substitute_placeholders;
use taleweaver_core::StoryContext;

/// Fixed wording of the memory directive instructions.
pub const MEMORY_INSTRUCTIONS: &str = "MEMORY: You keep a long-term memory for this story. \
When something happens that must be remembered later (a durable fact, a promise, a key item \
gained or lost, a location that is resolved, or a change in a relationship), record it with \
[[MEMORY_ADD: short fact]]. When a numbered memory below is no longer true, remove it with \
[[MEMORY_DELETE: number]]. Put each directive on its own line at the very end of your \
response. Directives are never shown to the player, so never refer to them in the narrative.";

/// Build the adventure-mode system prompt.
pub fn system_prompt(context: &StoryContext) -> String {
    let mut sections = Vec::new();

    let genres = if context.genres().is_empty() {
        String::from("interactive")
    } else {
        context
            .genres()
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };
    sections.push(format!(
        "You are the Game Master of an interactive {genres} story titled \"{}\". You narrate the \
         world and every character in it, and the player decides what their character does.",
        context.title()
    ));

    let premise = substitute_placeholders(context.initial_prompt(), context.persona_name());
    if !premise.trim().is_empty() {
        sections.push(format!("PREMISE: {}", premise.trim()));
    }

    if !context.style().trim().is_empty() {
        sections.push(format!("STYLE: {}", context.style().trim()));
    }

    sections.push(
        "NARRATIVE: Write 150-250 words of narrative per response. Never decide the player's \
         actions for them."
            .to_string(),
    );
    sections.push(
        "LANGUAGE: Detect the language of the premise and of the player's messages and write \
         the narrative, chapter titles and choices strictly in that same language."
            .to_string(),
    );
    sections.push("DIALOGUE: Always put spoken dialogue in double quotes (\"...\").".to_string());
    sections.push(
        "VARIETY: Do not repeat descriptions, events or phrasing from the last 2-3 turns. Move \
         the story forward every turn."
            .to_string(),
    );

    let cadence = ChapterCadence::from_history(context.history(), *context.current_chapter());
    sections.push(cadence.instruction());

    sections.push(
        "CHOICES: After the narrative, write a line \"Choices:\" followed by exactly 3 numbered \
         actions the player could take next, one per line (\"1. ...\", \"2. ...\", \"3. ...\")."
            .to_string(),
    );

    if !context.assets().is_empty() {
        let mut assets = String::from(
            "WORLD: Use these established story elements when they fit the scene. When a listed \
             character appears, keep them in character and consistent with their description.",
        );
        for (section, entries) in context.assets().sections() {
            assets.push_str(&format!("\n{section}:"));
            for asset in entries {
                if asset.description.trim().is_empty() {
                    assets.push_str(&format!("\n- {}", asset.name));
                } else {
                    assets.push_str(&format!("\n- {}: {}", asset.name, asset.description.trim()));
                }
            }
        }
        sections.push(assets);
    }

    if let Some(persona) = context.persona() {
        let mut text = format!("PLAYER: The player's character is {}.", persona.name);
        if !persona.description.trim().is_empty() {
            text.push_str(&format!(" {}", persona.description.trim()));
        }
        text.push_str(
            " Non-player characters should recognize and react to the player's traits and \
             appearance.",
        );
        sections.push(text);
    }

    sections.push(MEMORY_INSTRUCTIONS.to_string());

    if !context.memories().is_empty() {
        let mut memories = String::from("CURRENT MEMORIES:");
        for (i, memory) in context.memories().iter().enumerate() {
            memories.push_str(&format!("\n{}. {}", i + 1, memory));
        }
        sections.push(memories);
    }

    sections.join("\n\n")
}

/// System prompt asking only for a fresh choice list.
pub fn choices_prompt(context: &StoryContext) -> String {
    format!(
        "You are the Game Master of the interactive story \"{}\". Read the story so far and \
         offer the player new options for what to do next. Reply with a line \"Choices:\" \
         followed by exactly 3 numbered actions (\"1. ...\", \"2. ...\", \"3. ...\"), one per \
         line, in the same language as the story. Do not continue the narrative and do not \
         write anything else.",
        context.title()
    )
}
