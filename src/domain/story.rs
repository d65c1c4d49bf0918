//! Concept and storyboard scenes

use serde::{Deserialize, Serialize};

use super::ImageData;

/// Music-video concept produced from the roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub aesthetic: String,
    pub story: String,
    pub song_relation: String,
}

/// One storyboard scene; order in the scene list is narrative order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub prompt: String,
    /// `None` until a thumbnail was generated for this scene
    #[serde(default)]
    pub image: Option<ImageData>,
}

impl Scene {
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
        }
    }
}
