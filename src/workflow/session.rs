//! Session aggregate
//!
//! The active editing context: the persisted project fields plus transient
//! state that never reaches the catalog (error slots, in-flight markers, the
//! secondary-character draft and the counters used to recognise stale
//! completions).

use crate::domain::{
    AspectRatio, Character, CharacterId, Concept, Project, ProjectId, Purpose, ReferenceImage,
    Scene, WizardStep,
};
use crate::error::{MvDirectorError, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// What an in-flight call is working on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The session as a whole (initial characters, concept, scene prompts)
    Session,
    /// One roster character
    Character(CharacterId),
    /// The secondary-character draft with this prospective id
    Draft(CharacterId),
    /// One scene by position
    Scene(usize),
}

/// Single-slot markers, one per [`Purpose`]
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    active: BTreeMap<Purpose, Target>,
}

impl InFlight {
    /// Claim the slot for `purpose`
    ///
    /// # Errors
    ///
    /// Returns `MvDirectorError::OperationInFlight` if the slot is taken
    pub fn begin(&mut self, purpose: Purpose, target: Target) -> Result<()> {
        if self.active.contains_key(&purpose) {
            return Err(MvDirectorError::OperationInFlight(purpose).into());
        }
        self.active.insert(purpose, target);
        Ok(())
    }

    /// Free the slot, but only if it still belongs to `target`
    pub fn finish(&mut self, purpose: Purpose, target: Target) {
        if self.active.get(&purpose) == Some(&target) {
            self.active.remove(&purpose);
        }
    }

    pub fn is_active(&self, purpose: Purpose) -> bool {
        self.active.contains_key(&purpose)
    }

    pub fn target(&self, purpose: Purpose) -> Option<Target> {
        self.active.get(&purpose).copied()
    }

    /// Character whose sheet is being generated, if any
    pub fn generating_character(&self) -> Option<CharacterId> {
        match self.target(Purpose::CharacterSheet) {
            Some(Target::Character(id)) => Some(id),
            _ => None,
        }
    }

    /// Scene whose thumbnail is being generated, if any
    pub fn generating_scene(&self) -> Option<usize> {
        match self.target(Purpose::SceneImage) {
            Some(Target::Scene(index)) => Some(index),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }
}

/// Local state of the "add a secondary character" overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterDraft {
    /// Id the character receives once committed
    pub id: CharacterId,
    pub name: String,
    pub description: String,
    pub reference_images: Vec<ReferenceImage>,
    pub error: Option<String>,
}

impl CharacterDraft {
    pub fn new() -> Self {
        Self {
            id: CharacterId::new(),
            name: String::new(),
            description: String::new(),
            reference_images: Vec::new(),
            error: None,
        }
    }
}

impl Default for CharacterDraft {
    fn default() -> Self {
        Self::new()
    }
}

/// The active editing session
#[derive(Debug, Clone)]
pub struct Session {
    pub id: ProjectId,
    pub song_title: String,
    pub lyrics: String,
    pub characters: Vec<Character>,
    pub concept: Option<Concept>,
    pub scenes: Vec<Scene>,
    pub aspect_ratio: AspectRatio,
    pub step: WizardStep,
    /// Set only by an explicit save
    pub last_saved: Option<DateTime<Utc>>,

    /// Error slot for the input, roster and concept steps
    pub error: Option<String>,
    /// Error slot for the scene grid
    pub scene_error: Option<String>,
    /// Present while the secondary-character overlay is open
    pub draft: Option<CharacterDraft>,
    pub in_flight: InFlight,

    /// Bumped on every reset; completions from an older epoch are dropped
    pub(crate) epoch: u64,
    /// Bumped whenever the scene list is replaced or cleared
    pub(crate) scenes_revision: u64,
}

impl Session {
    /// Empty session with a fresh identity token
    pub fn new(aspect_ratio: AspectRatio) -> Self {
        Self {
            id: ProjectId::new(),
            song_title: String::new(),
            lyrics: String::new(),
            characters: Vec::new(),
            concept: None,
            scenes: Vec::new(),
            aspect_ratio,
            step: WizardStep::Input,
            last_saved: None,
            error: None,
            scene_error: None,
            draft: None,
            in_flight: InFlight::default(),
            epoch: 0,
            scenes_revision: 0,
        }
    }

    /// Replace every field with `next`, moving to a new epoch
    pub(crate) fn reset_to(&mut self, next: Session) {
        let epoch = self.epoch + 1;
        let scenes_revision = self.scenes_revision + 1;
        *self = next;
        self.epoch = epoch;
        self.scenes_revision = scenes_revision;
    }

    /// Session restored from a catalog snapshot; transient state starts clear
    pub fn from_project(project: Project) -> Self {
        Self {
            id: project.id,
            song_title: project.song_title,
            lyrics: project.lyrics,
            characters: project.characters,
            concept: project.concept,
            scenes: project.scenes,
            aspect_ratio: project.aspect_ratio,
            step: project.step,
            last_saved: Some(project.last_saved),
            ..Self::new(project.aspect_ratio)
        }
    }

    /// Persistable snapshot stamped with `last_saved`
    pub fn to_project(&self, last_saved: DateTime<Utc>) -> Project {
        Project {
            id: self.id,
            song_title: self.song_title.clone(),
            lyrics: self.lyrics.clone(),
            characters: self.characters.clone(),
            concept: self.concept.clone(),
            scenes: self.scenes.clone(),
            aspect_ratio: self.aspect_ratio,
            step: self.step,
            last_saved,
        }
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub(crate) fn character_mut(&mut self, id: CharacterId) -> Result<&mut Character> {
        self.characters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| MvDirectorError::NotFound(format!("character {}", id)).into())
    }

    /// Characters with at least one sheet image, in roster order
    pub fn sheet_ready_characters(&self) -> Vec<Character> {
        self.characters
            .iter()
            .filter(|c| c.is_sheet_ready())
            .cloned()
            .collect()
    }

    pub fn has_sheet_ready_character(&self) -> bool {
        self.characters.iter().any(Character::is_sheet_ready)
    }

    /// Whether any transient flag is set
    pub fn is_busy(&self) -> bool {
        !self.in_flight.is_idle()
    }
}
