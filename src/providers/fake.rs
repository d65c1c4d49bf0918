//! Scripted in-process gateway
//!
//! `FakeGateway` answers every generation call from canned data so the
//! workflow and the CLI can be exercised without a network. Failures can be
//! injected per [`Purpose`], calls can be held open to observe in-flight
//! behavior, and every call is recorded.
//!
//! Character-sheet calls for roster characters and for the
//! secondary-character draft both go through [`Purpose::CharacterSheet`].

use crate::domain::{
    AspectRatio, Character, CharacterOutline, Concept, ImageData, Purpose, ReferenceImage,
};
use crate::error::{MvDirectorError, Result};
use crate::providers::GenerationGateway;

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Semaphore;

/// A call received by the fake gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    InitialCharacters {
        song_title: String,
    },
    CharacterName {
        description: String,
    },
    CharacterSheet {
        name: String,
        reference_count: usize,
    },
    Concept {
        character_names: Vec<String>,
    },
    ScenePrompts {
        character_names: Vec<String>,
        count: usize,
    },
    SceneImage {
        prompt: String,
        character_names: Vec<String>,
        aspect_ratio: AspectRatio,
    },
}

impl FakeCall {
    /// Class of generation this call belongs to
    pub fn purpose(&self) -> Purpose {
        match self {
            Self::InitialCharacters { .. } => Purpose::InitialCharacters,
            Self::CharacterName { .. } => Purpose::NameSuggestion,
            Self::CharacterSheet { .. } => Purpose::CharacterSheet,
            Self::Concept { .. } => Purpose::Concept,
            Self::ScenePrompts { .. } => Purpose::ScenePrompts,
            Self::SceneImage { .. } => Purpose::SceneImage,
        }
    }
}

struct FakeState {
    characters: Vec<CharacterOutline>,
    character_name: String,
    sheet_images: Vec<ImageData>,
    concept: Concept,
    scene_prompts: Vec<String>,
    scene_image: ImageData,
    failing: HashSet<Purpose>,
    gates: HashMap<Purpose, Arc<Semaphore>>,
    calls: Vec<FakeCall>,
}

/// Gateway returning canned results
///
/// # Examples
///
/// ```
/// use mvdirector::domain::Purpose;
/// use mvdirector::providers::{FakeGateway, GenerationGateway};
///
/// # #[tokio::main]
/// # async fn main() {
/// let gateway = FakeGateway::new();
/// gateway.fail(Purpose::Concept);
///
/// let outlines = gateway
///     .generate_initial_characters("Echoes", "la la")
///     .await
///     .unwrap();
/// assert_eq!(outlines.len(), 3);
/// # }
/// ```
pub struct FakeGateway {
    state: Mutex<FakeState>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGateway {
    /// Fake with a three-character roster, a three-image sheet, a concept,
    /// twenty scene prompts and one scene image
    pub fn new() -> Self {
        let scene_prompts = (1..=20)
            .map(|n| {
                if n % 2 == 0 {
                    format!("Scene {}: Mara and Ike run through neon rain", n)
                } else {
                    format!("Scene {}: empty streets at dawn", n)
                }
            })
            .collect();

        Self {
            state: Mutex::new(FakeState {
                characters: vec![
                    CharacterOutline::new("Mara", "A restless drifter in a red coat"),
                    CharacterOutline::new("Ike", "A quiet mechanic with oil-stained hands"),
                    CharacterOutline::new("Sol", "A street preacher who sings at night"),
                ],
                character_name: "Juniper".to_string(),
                sheet_images: vec![
                    ImageData::new(b"sheet-front".to_vec()),
                    ImageData::new(b"sheet-side".to_vec()),
                    ImageData::new(b"sheet-back".to_vec()),
                ],
                concept: Concept {
                    aesthetic: "Rain-soaked neon noir".to_string(),
                    story: "Two strangers chase the same fading signal across the city".to_string(),
                    song_relation: "The chorus marks each time they almost meet".to_string(),
                },
                scene_prompts,
                scene_image: ImageData::new(b"scene-image".to_vec()),
                failing: HashSet::new(),
                gates: HashMap::new(),
                calls: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn with_characters(self, characters: Vec<CharacterOutline>) -> Self {
        self.lock().characters = characters;
        self
    }

    pub fn with_character_name(self, name: impl Into<String>) -> Self {
        self.lock().character_name = name.into();
        self
    }

    pub fn with_sheet_images(self, images: Vec<ImageData>) -> Self {
        self.lock().sheet_images = images;
        self
    }

    pub fn with_concept(self, concept: Concept) -> Self {
        self.lock().concept = concept;
        self
    }

    pub fn with_scene_prompts(self, prompts: Vec<String>) -> Self {
        self.lock().scene_prompts = prompts;
        self
    }

    pub fn with_scene_image(self, image: ImageData) -> Self {
        self.lock().scene_image = image;
        self
    }

    /// Make every call of this purpose fail until [`FakeGateway::recover`]
    pub fn fail(&self, purpose: Purpose) {
        self.lock().failing.insert(purpose);
    }

    pub fn recover(&self, purpose: Purpose) {
        self.lock().failing.remove(&purpose);
    }

    /// Block calls of this purpose until [`FakeGateway::release`]
    pub fn hold(&self, purpose: Purpose) {
        self.lock()
            .gates
            .insert(purpose, Arc::new(Semaphore::new(0)));
    }

    /// Let one held call of this purpose complete and stop holding new ones
    pub fn release(&self, purpose: Purpose) {
        if let Some(gate) = self.lock().gates.remove(&purpose) {
            gate.add_permits(1);
        }
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<FakeCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, purpose: Purpose) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.purpose() == purpose)
            .count()
    }

    /// Record the call, wait at the gate if one is set, then apply any
    /// injected failure
    async fn enter(&self, call: FakeCall) -> Result<()> {
        let purpose = call.purpose();
        let gate = {
            let mut state = self.lock();
            state.calls.push(call);
            state.gates.get(&purpose).cloned()
        };

        if let Some(gate) = gate {
            let permit = gate.acquire().await.map_err(|e| {
                MvDirectorError::Generation(format!("Fake gate closed: {}", e))
            })?;
            permit.forget();
        }

        if self.lock().failing.contains(&purpose) {
            return Err(MvDirectorError::Generation(format!(
                "Injected {} failure",
                purpose
            ))
            .into());
        }
        Ok(())
    }
}

fn names(characters: &[Character]) -> Vec<String> {
    characters.iter().map(|c| c.name.clone()).collect()
}

#[async_trait]
impl GenerationGateway for FakeGateway {
    async fn generate_initial_characters(
        &self,
        song_title: &str,
        _lyrics: &str,
    ) -> Result<Vec<CharacterOutline>> {
        self.enter(FakeCall::InitialCharacters {
            song_title: song_title.to_string(),
        })
        .await?;

        let characters = self.lock().characters.clone();
        if characters.is_empty() {
            return Err(MvDirectorError::Generation(
                "Failed to generate initial characters.".to_string(),
            )
            .into());
        }
        Ok(characters)
    }

    async fn generate_character_name(&self, description: &str) -> Result<String> {
        self.enter(FakeCall::CharacterName {
            description: description.to_string(),
        })
        .await?;
        Ok(self.lock().character_name.clone())
    }

    async fn generate_character_sheet(
        &self,
        character: &CharacterOutline,
        reference_images: &[ReferenceImage],
    ) -> Result<Vec<ImageData>> {
        self.enter(FakeCall::CharacterSheet {
            name: character.name.clone(),
            reference_count: reference_images.len(),
        })
        .await?;

        let images = self.lock().sheet_images.clone();
        if images.is_empty() {
            return Err(MvDirectorError::Generation(
                "Failed to generate the character sheet from reference images.".to_string(),
            )
            .into());
        }
        Ok(images)
    }

    async fn generate_concept(
        &self,
        _song_title: &str,
        _lyrics: &str,
        characters: &[Character],
    ) -> Result<Concept> {
        self.enter(FakeCall::Concept {
            character_names: names(characters),
        })
        .await?;
        Ok(self.lock().concept.clone())
    }

    async fn generate_scene_prompts(
        &self,
        _song_title: &str,
        characters: &[Character],
        _concept: &Concept,
        count: usize,
    ) -> Result<Vec<String>> {
        self.enter(FakeCall::ScenePrompts {
            character_names: names(characters),
            count,
        })
        .await?;
        Ok(self.lock().scene_prompts.clone())
    }

    async fn generate_scene_image(
        &self,
        prompt: &str,
        _concept: &Concept,
        characters: &[Character],
        aspect_ratio: AspectRatio,
    ) -> Result<ImageData> {
        self.enter(FakeCall::SceneImage {
            prompt: prompt.to_string(),
            character_names: names(characters),
            aspect_ratio,
        })
        .await?;
        Ok(self.lock().scene_image.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_responses() {
        let gateway = FakeGateway::new();
        let outlines = gateway
            .generate_initial_characters("Echoes", "lyrics")
            .await
            .unwrap();
        assert_eq!(outlines.len(), 3);
        assert_eq!(outlines[0].name, "Mara");

        let concept = gateway.generate_concept("Echoes", "lyrics", &[]).await.unwrap();
        let prompts = gateway
            .generate_scene_prompts("Echoes", &[], &concept, 20)
            .await
            .unwrap();
        assert_eq!(prompts.len(), 20);
    }

    #[tokio::test]
    async fn test_fail_and_recover() {
        let gateway = FakeGateway::new();
        gateway.fail(Purpose::NameSuggestion);
        assert!(gateway.generate_character_name("tall").await.is_err());

        gateway.recover(Purpose::NameSuggestion);
        assert_eq!(
            gateway.generate_character_name("tall").await.unwrap(),
            "Juniper"
        );
        assert_eq!(gateway.call_count(Purpose::NameSuggestion), 2);
    }

    #[tokio::test]
    async fn test_empty_sheet_is_an_error() {
        let gateway = FakeGateway::new().with_sheet_images(Vec::new());
        let outline = CharacterOutline::new("Mara", "drifter");
        assert!(gateway
            .generate_character_sheet(&outline, &[])
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_hold_blocks_until_release() {
        let gateway = Arc::new(FakeGateway::new());
        gateway.hold(Purpose::NameSuggestion);

        let pending = {
            let gateway = Arc::clone(&gateway);
            tokio::spawn(async move { gateway.generate_character_name("tall").await })
        };

        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        gateway.release(Purpose::NameSuggestion);
        let name = pending.await.unwrap().unwrap();
        assert_eq!(name, "Juniper");
    }

    #[tokio::test]
    async fn test_calls_are_recorded_in_order() {
        let gateway = FakeGateway::new();
        gateway.generate_character_name("tall").await.unwrap();
        gateway
            .generate_initial_characters("Echoes", "la")
            .await
            .unwrap();

        let calls = gateway.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].purpose(), Purpose::NameSuggestion);
        assert_eq!(
            calls[1],
            FakeCall::InitialCharacters {
                song_title: "Echoes".to_string()
            }
        );
    }
}
