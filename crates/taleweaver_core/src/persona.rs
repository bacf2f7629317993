//! Player personas.

use crate::{PersonaId, UserId};
use serde::{Deserialize, Serialize};

/// A reusable player identity that shapes how NPCs react.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Persona identifier
    pub id: PersonaId,
    /// Owning account
    pub owner: UserId,
    /// Name substituted into premises and addressed by characters
    pub name: String,
    /// Traits the model should reflect
    #[serde(default)]
    pub description: String,
    /// Avatar location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Fields a caller supplies to create a persona.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewPersona {
    /// Persona name
    #[serde(default)]
    pub name: String,
    /// Traits
    #[serde(default)]
    pub description: String,
    /// Avatar location
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Make this the owner's default persona
    #[serde(default)]
    pub is_default: bool,
}

impl Persona {
    /// Create a persona with a fresh identifier.
    pub fn new(owner: UserId, fields: &NewPersona) -> Self {
        Self {
            id: PersonaId::generate(),
            owner,
            name: fields.name.clone(),
            description: fields.description.clone(),
            photo_url: fields.photo_url.clone(),
        }
    }
}

/// A persona together with whether it is its owner's default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaView {
    /// The persona
    #[serde(flatten)]
    pub persona: Persona,
    /// Whether the owner's default pointer targets it
    pub is_default: bool,
}
