//! Classes of generation calls
//!
//! At most one call per class may be outstanding at a time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Purpose class of a generation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    InitialCharacters,
    CharacterSheet,
    Concept,
    ScenePrompts,
    SceneImage,
    NameSuggestion,
    DraftSheet,
}

impl Purpose {
    pub const ALL: [Purpose; 7] = [
        Purpose::InitialCharacters,
        Purpose::CharacterSheet,
        Purpose::Concept,
        Purpose::ScenePrompts,
        Purpose::SceneImage,
        Purpose::NameSuggestion,
        Purpose::DraftSheet,
    ];
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InitialCharacters => "initial characters",
            Self::CharacterSheet => "character sheet",
            Self::Concept => "concept",
            Self::ScenePrompts => "scene prompts",
            Self::SceneImage => "scene image",
            Self::NameSuggestion => "name suggestion",
            Self::DraftSheet => "new character sheet",
        };
        f.write_str(label)
    }
}
