//! Story assets: named places, characters and customs the model should reuse.

use serde::{Deserialize, Serialize};

/// A named world element with a short description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    /// Display name, e.g. "Captain Mara"
    pub name: String,
    /// What the model needs to know about it
    #[serde(default)]
    pub description: String,
}

impl Asset {
    /// Create a new asset.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Asset lists attached to a story.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoryAssets {
    /// Places
    #[serde(default)]
    pub locations: Vec<Asset>,
    /// Non-player characters
    #[serde(default)]
    pub characters: Vec<Asset>,
    /// Customs, factions, lore
    #[serde(default)]
    pub customs: Vec<Asset>,
}

impl StoryAssets {
    /// True when every list is empty.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty() && self.characters.is_empty() && self.customs.is_empty()
    }

    /// Named, non-empty lists in a fixed order.
    pub fn sections(&self) -> impl Iterator<Item = (&'static str, &[Asset])> {
        [
            ("Locations", self.locations.as_slice()),
            ("Characters", self.characters.as_slice()),
            ("Customs", self.customs.as_slice()),
        ]
        .into_iter()
        .filter(|(_, assets)| !assets.is_empty())
    }
}
