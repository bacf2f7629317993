//! Turn history types.

use serde::{Deserialize, Serialize};

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TurnRole {
    /// The human player
    Player,
    /// The model
    Ai,
}

/// Chapter opened by an AI turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChapterMetadata {
    /// Chapter number, starting at 1
    pub number: u32,
    /// Chapter title
    pub title: String,
}

impl ChapterMetadata {
    /// Create chapter metadata.
    pub fn new(number: u32, title: impl Into<String>) -> Self {
        Self {
            number,
            title: title.into(),
        }
    }
}

/// Direction for stepping through regenerated versions.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum VersionDirection {
    /// Towards older versions
    Prev,
    /// Towards newer versions
    Next,
}

/// One exchange unit in a story's history.
///
/// `versions` stays empty until the turn is first regenerated. From then on
/// `content` always equals `versions[current_version_index]`.
///
/// # Examples
///
/// ```
/// use taleweaver_core::{Turn, TurnRole};
///
/// let turn = Turn::ai("The gate creaks open.", vec!["Enter".into(), "Wait".into()], None);
/// assert_eq!(turn.role, TurnRole::Ai);
/// assert!(turn.versions.is_empty());
/// assert!(turn.is_consistent());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who authored the turn
    pub role: TurnRole,
    /// Visible text
    pub content: String,
    /// Offered actions, empty for player turns
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    /// Every generated content, oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<String>,
    /// Selected entry of `versions`
    #[serde(default)]
    pub current_version_index: usize,
    /// Chapter opened by this turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<ChapterMetadata>,
}

impl Turn {
    /// A player turn.
    pub fn player(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Player,
            content: content.into(),
            choices: Vec::new(),
            versions: Vec::new(),
            current_version_index: 0,
            chapter: None,
        }
    }

    /// An AI turn.
    pub fn ai(
        content: impl Into<String>,
        choices: Vec<String>,
        chapter: Option<ChapterMetadata>,
    ) -> Self {
        Self {
            role: TurnRole::Ai,
            content: content.into(),
            choices,
            versions: Vec::new(),
            current_version_index: 0,
            chapter,
        }
    }

    /// True for AI-authored turns.
    pub fn is_ai(&self) -> bool {
        self.role == TurnRole::Ai
    }

    /// True for player-authored turns.
    pub fn is_player(&self) -> bool {
        self.role == TurnRole::Player
    }

    /// Whether the turn has been regenerated at least once.
    pub fn has_versions(&self) -> bool {
        !self.versions.is_empty()
    }

    /// Checks the `content == versions[current_version_index]` invariant.
    pub fn is_consistent(&self) -> bool {
        if !self.has_versions() {
            return true;
        }
        self.versions
            .get(self.current_version_index)
            .is_some_and(|selected| *selected == self.content)
    }
}
