//! Characters of a music-video roster

use serde::{Deserialize, Serialize};

use super::{CharacterId, ImageData, ReferenceImage};

/// Name and description of a character, as proposed by the generation
/// service or typed by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterOutline {
    pub name: String,
    pub description: String,
}

impl CharacterOutline {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A member of the session's character roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub description: String,
    /// Images the user uploaded as the canonical appearance reference
    #[serde(default)]
    pub reference_images: Vec<ReferenceImage>,
    /// Generated character-sheet images
    #[serde(default)]
    pub sheet_images: Vec<ImageData>,
}

impl Character {
    /// Create a character with empty reference and sheet image sequences
    pub fn from_outline(outline: CharacterOutline) -> Self {
        Self {
            id: CharacterId::new(),
            name: outline.name,
            description: outline.description,
            reference_images: Vec::new(),
            sheet_images: Vec::new(),
        }
    }

    /// A character is sheet-ready once it has at least one sheet image
    pub fn is_sheet_ready(&self) -> bool {
        !self.sheet_images.is_empty()
    }

    pub fn outline(&self) -> CharacterOutline {
        CharacterOutline::new(self.name.clone(), self.description.clone())
    }
}
