//! First-person character chat system prompt.

use super::placeholder::substitute_placeholders;
use taleweaver_core::StoryContext;

/// Build the character-mode system prompt.
///
/// `title` is the character's name and the premise is their description.
pub fn system_prompt(context: &StoryContext) -> String {
    let character = context.title().trim();
    let user = context.persona_name().unwrap_or("the user");
    let description = substitute_placeholders(context.initial_prompt(), context.persona_name());

    let mut sections = vec![format!(
        "You are {character}. Stay in character at all times and speak in the first person \
         directly to {user}."
    )];

    if !description.trim().is_empty() {
        sections.push(format!("ABOUT YOU: {}", description.trim()));
    }
    if !context.style().trim().is_empty() {
        sections.push(format!("STYLE: {}", context.style().trim()));
    }
    if let Some(persona) = context.persona() {
        if !persona.description.trim().is_empty() {
            sections.push(format!(
                "ABOUT {}: {}",
                persona.name,
                persona.description.trim()
            ));
        }
    }

    sections.push(format!(
        "RULES: Never narrate, describe or decide {user}'s actions, thoughts or words. Keep each \
         reply between 50 and 150 words. Put spoken dialogue in double quotes (\"...\"). Detect \
         the dominant language of your description and of the conversation and always reply in \
         it. Do not write chapter headings and do not offer lists of choices."
    ));

    if !context.memories().is_empty() {
        let mut memories = String::from("THINGS YOU REMEMBER:");
        for (i, memory) in context.memories().iter().enumerate() {
            memories.push_str(&format!("\n{}. {}", i + 1, memory));
        }
        sections.push(memories);
    }

    sections.join("\n\n")
}
