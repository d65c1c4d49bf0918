//! Persisted project snapshot, wizard steps and aspect ratios

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Character, Concept, ProjectId, Scene};
use crate::error::MvDirectorError;

/// Steps of the wizard, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Input,
    CharacterSheet,
    Concept,
    Scenes,
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Input => "input",
            Self::CharacterSheet => "character_sheet",
            Self::Concept => "concept",
            Self::Scenes => "scenes",
        };
        f.write_str(label)
    }
}

/// Output frame format for scene images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Widescreen,
    #[serde(rename = "9:16")]
    Vertical,
    #[serde(rename = "4:3")]
    Landscape,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "1:1")]
    Square,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Widescreen,
        AspectRatio::Vertical,
        AspectRatio::Landscape,
        AspectRatio::Portrait,
        AspectRatio::Square,
    ];

    /// Ratio notation, e.g. `16:9`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Widescreen => "16:9",
            Self::Vertical => "9:16",
            Self::Landscape => "4:3",
            Self::Portrait => "3:4",
            Self::Square => "1:1",
        }
    }

    /// Plain-language description used when prompting for an image
    pub fn description(&self) -> &'static str {
        match self {
            Self::Widescreen => "a standard widescreen cinematic format (16:9)",
            Self::Vertical => "a tall vertical format, like a smartphone screen (9:16)",
            Self::Landscape => "a classic landscape format (4:3)",
            Self::Portrait => "a standard portrait format (3:4)",
            Self::Square => "a perfect square format (1:1)",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = MvDirectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|ratio| ratio.as_str() == s.trim())
            .ok_or_else(|| {
                MvDirectorError::Validation(format!(
                    "Unsupported aspect ratio: {}. Must be one of: {}",
                    s,
                    Self::ALL.map(|r| r.as_str()).join(", ")
                ))
            })
    }
}

/// A saved session as stored in the project catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub song_title: String,
    pub lyrics: String,
    pub characters: Vec<Character>,
    pub concept: Option<Concept>,
    pub scenes: Vec<Scene>,
    pub aspect_ratio: AspectRatio,
    pub step: WizardStep,
    pub last_saved: DateTime<Utc>,
}

impl Project {
    pub fn sheet_ready_count(&self) -> usize {
        self.characters.iter().filter(|c| c.is_sheet_ready()).count()
    }

    pub fn thumbnail_count(&self) -> usize {
        self.scenes.iter().filter(|s| s.image.is_some()).count()
    }
}
