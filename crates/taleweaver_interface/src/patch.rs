//! Partial story updates.

use chrono::Utc;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use taleweaver_core::Story;

/// Memory and chapter fields to overwrite. `None` leaves a field untouched.
///
/// # Examples
///
/// ```
/// use taleweaver_interface::StoryPatch;
///
/// let patch = StoryPatch::default()
///     .with_memories(vec!["The bridge is out".to_string()])
///     .with_current_chapter(2);
/// assert!(!patch.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Setters)]
#[setters(prefix = "with_", strip_option)]
pub struct StoryPatch {
    /// Replacement memory list
    pub memories: Option<Vec<String>>,
    /// New chapter number
    pub current_chapter: Option<u32>,
}

impl StoryPatch {
    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.memories.is_none() && self.current_chapter.is_none()
    }

    /// Write the patched fields into a story and bump `updated_at`.
    pub fn apply(self, story: &mut Story) {
        if let Some(memories) = self.memories {
            story.memories = memories;
        }
        if let Some(chapter) = self.current_chapter {
            story.current_chapter = chapter.max(1);
        }
        story.updated_at = Utc::now();
    }
}
