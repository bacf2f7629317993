//! Memory add/delete directives embedded in model output.

use super::{MEMORY_ADD, MEMORY_DELETE};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of applying the directives in one response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryDelta {
    /// Text with every directive stripped
    pub cleaned_text: String,
    /// Memory list after additions and deletions
    pub memories: Vec<String>,
    /// Whether the list differs from the input
    pub changed: bool,
    /// Entries appended, in order
    pub added: Vec<String>,
    /// Entries removed, highest index first
    pub deleted: Vec<String>,
}

/// Apply `[[MEMORY_ADD: ..]]` and `[[MEMORY_DELETE: n]]` directives.
///
/// Additions are appended first, in order of appearance. Deletions use 1-based
/// positions into the list after those additions; they are deduplicated and
/// applied from the highest index down so earlier removals never shift later
/// ones. Out-of-range or non-numeric positions are ignored. Unterminated
/// markers are left in the text untouched.
///
/// # Examples
///
/// ```
/// use taleweaver_narrative::apply_memory_directives;
///
/// let delta = apply_memory_directives(
///     "The hero found a sword. [[MEMORY_ADD: Hero acquired a magic sword]]",
///     &[],
/// );
/// assert_eq!(delta.memories, vec!["Hero acquired a magic sword"]);
/// assert_eq!(delta.cleaned_text, "The hero found a sword.");
/// assert!(delta.changed);
/// ```
pub fn apply_memory_directives(text: &str, memories: &[String]) -> MemoryDelta {
    apply(text, memories, false)
}

/// Like [`apply_memory_directives`], but additions already in the list are
/// skipped.
///
/// Used when a turn is regenerated: the list already holds what the replaced
/// version added, and a new version restating the same fact must not store
/// it twice.
///
/// # Examples
///
/// ```
/// use taleweaver_narrative::reapply_memory_directives;
///
/// let known = vec!["The gate is open".to_string()];
/// let delta = reapply_memory_directives(
///     "[[MEMORY_ADD: The gate is open]]\n[[MEMORY_ADD: Guards are asleep]]",
///     &known,
/// );
/// assert_eq!(delta.memories, vec!["The gate is open", "Guards are asleep"]);
/// assert_eq!(delta.added, vec!["Guards are asleep"]);
/// ```
pub fn reapply_memory_directives(text: &str, memories: &[String]) -> MemoryDelta {
    apply(text, memories, true)
}

fn apply(text: &str, memories: &[String], skip_known: bool) -> MemoryDelta {
    let mut list = memories.to_vec();

    let mut added: Vec<String> = Vec::new();
    for entry in MEMORY_ADD
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|entry| !entry.is_empty())
    {
        if skip_known && (memories.contains(&entry) || added.contains(&entry)) {
            debug!(entry = %entry, "Skipping memory already recorded");
            continue;
        }
        added.push(entry);
    }
    list.extend(added.iter().cloned());
    let without_adds = MEMORY_ADD.replace_all(text, "");

    let mut positions: Vec<usize> = MEMORY_DELETE
        .captures_iter(&without_adds)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().trim().parse::<usize>().ok())
        .collect();
    positions.sort_unstable_by(|a, b| b.cmp(a));
    positions.dedup();

    let mut deleted = Vec::new();
    for position in positions {
        if position >= 1 && position <= list.len() {
            deleted.push(list.remove(position - 1));
        }
    }
    let cleaned = MEMORY_DELETE.replace_all(&without_adds, "");

    let changed = !added.is_empty() || !deleted.is_empty();
    if changed {
        debug!(
            added = added.len(),
            deleted = deleted.len(),
            total = list.len(),
            "Applied memory directives"
        );
    }

    MemoryDelta {
        cleaned_text: cleaned.trim_end().to_string(),
        memories: list,
        changed,
        added,
        deleted,
    }
}
