//! Persona name substitution in premises.

use regex::{NoExpand, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\{\{user\}\}|\{(?:user|you|player|name)\}|\[(?:user|you|player|name)\]")
        .expect("Valid placeholder regex")
});

/// Replace `{user}`-style tokens with the persona's name.
///
/// Recognized tokens: `{user}`, `{{user}}`, `[user]`, `{you}`, `[you]`,
/// `{player}`, `[player]`, `{name}`, `[name]`, in any letter case. Without a
/// name the text is returned unchanged.
pub fn substitute_placeholders(text: &str, name: Option<&str>) -> String {
    match name {
        Some(name) if !name.trim().is_empty() => {
            PLACEHOLDER.replace_all(text, NoExpand(name.trim())).into_owned()
        }
        _ => text.to_string(),
    }
}
