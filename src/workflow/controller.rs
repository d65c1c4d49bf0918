//! Wizard controller
//!
//! [`Workflow`] owns the [`Session`] and is the only thing that mutates it.
//! Operations that call the generation gateway run in three phases:
//!
//! 1. validate and claim the in-flight slot under the session lock,
//! 2. release the lock and await the gateway,
//! 3. re-lock and apply the result, unless the session moved on meanwhile.
//!
//! The lock is never held across an `.await`.

use crate::config::WorkflowConfig;
use crate::domain::{
    AspectRatio, Character, CharacterId, CharacterOutline, Concept, ImageData, Project, ProjectId,
    Purpose, ReferenceImage, Scene, WizardStep,
};
use crate::error::{user_message, MvDirectorError, Result};
use crate::providers::GenerationGateway;
use crate::workflow::catalog::ProjectCatalog;
use crate::workflow::session::{CharacterDraft, Session, Target};

use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};

/// Fate of a generation result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result was written into the session
    Applied,
    /// The session was reset or the target went away while the call was
    /// outstanding; the result was dropped
    Discarded,
}

/// Error slot an operation reports into
#[derive(Debug, Clone, Copy)]
enum Slot {
    Editor,
    Scenes,
    Draft,
}

impl Slot {
    fn set(self, session: &mut Session, message: Option<String>) {
        match self {
            Slot::Editor => session.error = message,
            Slot::Scenes => session.scene_error = message,
            Slot::Draft => {
                if let Some(draft) = session.draft.as_mut() {
                    draft.error = message;
                }
            }
        }
    }
}

/// Claim on an in-flight slot, remembering what the session looked like
struct Ticket {
    purpose: Purpose,
    target: Target,
    slot: Slot,
    epoch: u64,
    scenes_revision: u64,
}

impl Ticket {
    fn claim(session: &mut Session, purpose: Purpose, target: Target, slot: Slot) -> Result<Self> {
        session.in_flight.begin(purpose, target)?;
        Ok(Self {
            purpose,
            target,
            slot,
            epoch: session.epoch,
            scenes_revision: session.scenes_revision,
        })
    }

    fn target_exists(&self, session: &Session) -> bool {
        match self.target {
            Target::Session => true,
            Target::Character(id) => session.character(id).is_some(),
            Target::Draft(id) => session.draft.as_ref().map(|d| d.id) == Some(id),
            Target::Scene(index) => {
                session.scenes_revision == self.scenes_revision && index < session.scenes.len()
            }
        }
    }
}

fn require_step(session: &Session, step: WizardStep, action: &str) -> Result<()> {
    if session.step != step {
        return Err(MvDirectorError::InvalidTransition {
            from: session.step,
            action: action.to_string(),
        }
        .into());
    }
    Ok(())
}

fn validation(message: &str) -> anyhow::Error {
    MvDirectorError::Validation(message.to_string()).into()
}

const NEED_SHEET: &str =
    "Please generate a character sheet for at least one character before proceeding.";

/// Pick the characters a scene image request should reference
///
/// Sheet-ready characters whose exact name occurs in `prompt` are selected.
/// When none occurs, the first sheet-ready character in roster order is used.
///
/// # Errors
///
/// Returns a validation error when no character is sheet-ready
///
/// # Examples
///
/// ```
/// use mvdirector::domain::{Character, CharacterOutline, ImageData};
/// use mvdirector::workflow::select_scene_characters;
///
/// let mut mara = Character::from_outline(CharacterOutline::new("Mara", "drifter"));
/// mara.sheet_images.push(ImageData::new(vec![1]));
/// let mut ike = Character::from_outline(CharacterOutline::new("Ike", "mechanic"));
/// ike.sheet_images.push(ImageData::new(vec![2]));
/// let roster = vec![mara, ike];
///
/// let picked = select_scene_characters("Ike fixes a car", &roster).unwrap();
/// assert_eq!(picked[0].name, "Ike");
///
/// let fallback = select_scene_characters("an empty street", &roster).unwrap();
/// assert_eq!(fallback[0].name, "Mara");
/// ```
pub fn select_scene_characters<'a>(
    prompt: &str,
    characters: &'a [Character],
) -> Result<Vec<&'a Character>> {
    let ready: Vec<&Character> = characters.iter().filter(|c| c.is_sheet_ready()).collect();

    let named: Vec<&Character> = ready
        .iter()
        .copied()
        .filter(|c| !c.name.is_empty() && prompt.contains(c.name.as_str()))
        .collect();
    if !named.is_empty() {
        return Ok(named);
    }

    ready
        .first()
        .map(|c| vec![*c])
        .ok_or_else(|| validation(NEED_SHEET))
}

/// Step workflow controller for one editing session
pub struct Workflow {
    gateway: Arc<dyn GenerationGateway>,
    settings: WorkflowConfig,
    session: Mutex<Session>,
}

impl Workflow {
    /// Create a controller with an empty session
    pub fn new(gateway: Arc<dyn GenerationGateway>, settings: WorkflowConfig) -> Self {
        let session = Session::new(settings.default_aspect_ratio);
        Self {
            gateway,
            settings,
            session: Mutex::new(session),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of the current session for display
    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    pub fn step(&self) -> WizardStep {
        self.lock().step
    }

    pub fn settings(&self) -> &WorkflowConfig {
        &self.settings
    }

    /// Run a synchronous phase under the lock, maintaining the error slot
    ///
    /// A successful phase clears the slot; a failed one records its message.
    fn prepare<T>(&self, slot: Slot, phase: impl FnOnce(&mut Session) -> Result<T>) -> Result<T> {
        let mut session = self.lock();
        match phase(&mut *session) {
            Ok(value) => {
                slot.set(&mut session, None);
                Ok(value)
            }
            Err(e) => {
                slot.set(&mut session, Some(user_message(&e)));
                Err(e)
            }
        }
    }

    /// Apply a gateway outcome if the ticket is still current
    fn complete<T>(
        &self,
        ticket: Ticket,
        outcome: Result<T>,
        apply: impl FnOnce(&mut Session, T) -> Result<()>,
    ) -> Result<Completion> {
        let mut session = self.lock();
        if session.epoch != ticket.epoch {
            tracing::warn!(
                "Discarding {} result that arrived after the session was reset",
                ticket.purpose
            );
            return Ok(Completion::Discarded);
        }

        session.in_flight.finish(ticket.purpose, ticket.target);

        if !ticket.target_exists(&session) {
            tracing::warn!(
                "Discarding {} result for {:?}, which no longer exists",
                ticket.purpose,
                ticket.target
            );
            return Ok(Completion::Discarded);
        }

        match outcome.and_then(|value| apply(&mut *session, value)) {
            Ok(()) => Ok(Completion::Applied),
            Err(e) => {
                tracing::warn!("{} request failed: {:#}", ticket.purpose, e);
                ticket.slot.set(&mut session, Some(user_message(&e)));
                Err(e)
            }
        }
    }

    // ----- song input -----

    /// Set the song title and lyrics while at the input step
    pub fn set_song(&self, song_title: &str, lyrics: &str) -> Result<()> {
        self.prepare(Slot::Editor, |session| {
            require_step(session, WizardStep::Input, "edit the song")?;
            session.song_title = song_title.to_string();
            session.lyrics = lyrics.to_string();
            Ok(())
        })
    }

    /// Propose the main characters and advance to the character-sheet step
    ///
    /// At most `max_initial_characters` outlines are kept, each starting
    /// without reference or sheet images.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty title or lyrics, and a
    /// generation error if the gateway fails or proposes nobody. The step
    /// stays at input on any failure.
    pub async fn generate_initial_characters(
        &self,
        song_title: &str,
        lyrics: &str,
    ) -> Result<Completion> {
        let ticket = self.prepare(Slot::Editor, |session| {
            require_step(session, WizardStep::Input, "generate characters")?;
            if song_title.trim().is_empty() || lyrics.trim().is_empty() {
                return Err(validation("Please enter a song title and lyrics."));
            }
            let ticket = Ticket::claim(
                session,
                Purpose::InitialCharacters,
                Target::Session,
                Slot::Editor,
            )?;
            session.song_title = song_title.to_string();
            session.lyrics = lyrics.to_string();
            Ok(ticket)
        })?;

        tracing::info!("Generating initial characters for '{}'", song_title);
        let outcome = self
            .gateway
            .generate_initial_characters(song_title, lyrics)
            .await;

        let max = self.settings.max_initial_characters;
        self.complete(ticket, outcome, |session, outlines| {
            let characters: Vec<Character> = outlines
                .into_iter()
                .take(max)
                .map(Character::from_outline)
                .collect();
            if characters.is_empty() {
                return Err(MvDirectorError::Generation(
                    "Failed to generate initial characters.".to_string(),
                )
                .into());
            }

            tracing::info!(
                "Roster created with {} characters; moving to {}",
                characters.len(),
                WizardStep::CharacterSheet
            );
            session.characters = characters;
            session.step = WizardStep::CharacterSheet;
            Ok(())
        })
    }

    // ----- roster -----

    /// Generate (or regenerate) a character's sheet from reference images
    ///
    /// On success the sheet images are replaced and `reference_images`
    /// becomes the character's canonical reference set. Only one sheet
    /// generation may be outstanding across the whole roster.
    pub async fn generate_sheet(
        &self,
        character_id: CharacterId,
        reference_images: Vec<ReferenceImage>,
    ) -> Result<Completion> {
        let (ticket, outline) = self.prepare(Slot::Editor, |session| {
            let outline = session
                .character(character_id)
                .map(Character::outline)
                .ok_or_else(|| MvDirectorError::NotFound(format!("character {}", character_id)))?;
            if reference_images.is_empty() {
                return Err(validation("Please upload at least one reference image."));
            }
            let ticket = Ticket::claim(
                session,
                Purpose::CharacterSheet,
                Target::Character(character_id),
                Slot::Editor,
            )?;
            Ok((ticket, outline))
        })?;

        tracing::info!(
            "Generating character sheet for {} from {} reference image(s)",
            outline.name,
            reference_images.len()
        );
        let outcome = self
            .gateway
            .generate_character_sheet(&outline, &reference_images)
            .await;

        self.complete(ticket, outcome, |session, images| {
            if images.is_empty() {
                return Err(MvDirectorError::Generation(
                    "Failed to generate the character sheet from reference images.".to_string(),
                )
                .into());
            }
            let character = session.character_mut(character_id)?;
            tracing::debug!(
                "Character {} now has {} sheet image(s)",
                character.name,
                images.len()
            );
            character.sheet_images = images;
            character.reference_images = reference_images;
            Ok(())
        })
    }

    /// Append a character directly, without generating a sheet
    pub fn add_secondary_character(
        &self,
        name: &str,
        description: &str,
        reference_images: Vec<ReferenceImage>,
    ) -> Result<CharacterId> {
        self.prepare(Slot::Editor, |session| {
            if name.trim().is_empty() || description.trim().is_empty() || reference_images.is_empty()
            {
                return Err(validation(
                    "Please provide a name, description, and at least one reference image.",
                ));
            }
            let mut character =
                Character::from_outline(CharacterOutline::new(name.trim(), description));
            character.reference_images = reference_images;
            let id = character.id;
            session.characters.push(character);
            tracing::info!("Added character {}", name.trim());
            Ok(id)
        })
    }

    /// Remove a character from the roster
    ///
    /// Concept and scene prompts that mention the character are left as they
    /// are.
    pub fn delete_character(&self, character_id: CharacterId) -> Result<()> {
        self.prepare(Slot::Editor, |session| {
            let index = session
                .characters
                .iter()
                .position(|c| c.id == character_id)
                .ok_or_else(|| MvDirectorError::NotFound(format!("character {}", character_id)))?;
            let removed = session.characters.remove(index);
            tracing::info!("Removed character {}", removed.name);
            Ok(())
        })
    }

    pub fn update_description(&self, character_id: CharacterId, description: &str) -> Result<()> {
        self.prepare(Slot::Editor, |session| {
            session.character_mut(character_id)?.description = description.to_string();
            Ok(())
        })
    }

    /// Drop one reference image by position; the sheet is untouched
    pub fn delete_reference_image(&self, character_id: CharacterId, index: usize) -> Result<()> {
        self.prepare(Slot::Editor, |session| {
            let character = session.character_mut(character_id)?;
            if index >= character.reference_images.len() {
                return Err(MvDirectorError::NotFound(format!(
                    "reference image {} of {}",
                    index, character.name
                ))
                .into());
            }
            character.reference_images.remove(index);
            Ok(())
        })
    }

    /// Suggest a name for a character description
    pub async fn suggest_character_name(&self, description: &str) -> Result<String> {
        let ticket = self.prepare(Slot::Editor, |session| {
            if description.trim().is_empty() {
                return Err(validation("Please provide a character description first."));
            }
            Ticket::claim(session, Purpose::NameSuggestion, Target::Session, Slot::Editor)
        })?;

        let outcome = self.gateway.generate_character_name(description).await;

        let mut suggested = None;
        self.complete(ticket, outcome, |_, name| {
            suggested = Some(name);
            Ok(())
        })?;
        suggested.ok_or_else(|| {
            MvDirectorError::Generation("The name suggestion arrived too late.".to_string()).into()
        })
    }

    // ----- secondary-character draft -----

    /// Open the add-character overlay with an empty draft
    pub fn begin_adding_character(&self) -> Result<CharacterId> {
        self.prepare(Slot::Editor, |session| {
            require_step(session, WizardStep::CharacterSheet, "add a character")?;
            let draft = CharacterDraft::new();
            let id = draft.id;
            session.draft = Some(draft);
            Ok(id)
        })
    }

    pub fn update_draft(&self, name: &str, description: &str) -> Result<()> {
        self.prepare(Slot::Draft, |session| {
            let draft = draft_mut(session)?;
            draft.name = name.to_string();
            draft.description = description.to_string();
            Ok(())
        })
    }

    /// Replace the draft's staged reference images
    pub fn stage_draft_images(&self, images: Vec<ReferenceImage>) -> Result<()> {
        self.prepare(Slot::Draft, |session| {
            draft_mut(session)?.reference_images = images;
            Ok(())
        })
    }

    /// Fill the draft's name from its description
    pub async fn suggest_draft_name(&self) -> Result<Completion> {
        let (ticket, description) = self.prepare(Slot::Draft, |session| {
            let draft = draft_mut(session)?;
            if draft.description.trim().is_empty() {
                return Err(validation("Please provide a character description first."));
            }
            let target = Target::Draft(draft.id);
            let description = draft.description.clone();
            let ticket = Ticket::claim(session, Purpose::NameSuggestion, target, Slot::Draft)?;
            Ok((ticket, description))
        })?;

        let outcome = self.gateway.generate_character_name(&description).await;

        self.complete(ticket, outcome, |session, name| {
            draft_mut(session)?.name = name;
            Ok(())
        })
    }

    /// Generate the draft's sheet and, on success, add it to the roster
    ///
    /// The draft stays open with its error set if generation fails.
    pub async fn commit_draft(&self) -> Result<Completion> {
        let (ticket, outline, reference_images) = self.prepare(Slot::Draft, |session| {
            let draft = draft_mut(session)?;
            if draft.name.trim().is_empty()
                || draft.description.trim().is_empty()
                || draft.reference_images.is_empty()
            {
                return Err(validation(
                    "Please provide a name, description, and at least one reference image.",
                ));
            }
            let target = Target::Draft(draft.id);
            let outline = CharacterOutline::new(draft.name.trim(), draft.description.clone());
            let reference_images = draft.reference_images.clone();
            let ticket = Ticket::claim(session, Purpose::DraftSheet, target, Slot::Draft)?;
            Ok((ticket, outline, reference_images))
        })?;

        tracing::info!("Generating character sheet for new character {}", outline.name);
        let outcome = self
            .gateway
            .generate_character_sheet(&outline, &reference_images)
            .await;

        self.complete(ticket, outcome, |session, images| {
            if images.is_empty() {
                return Err(MvDirectorError::Generation(
                    "Failed to generate the character sheet from reference images.".to_string(),
                )
                .into());
            }
            let draft = session
                .draft
                .take()
                .ok_or_else(|| validation("No character is being added."))?;
            session.characters.push(Character {
                id: draft.id,
                name: outline.name,
                description: outline.description,
                reference_images,
                sheet_images: images,
            });
            tracing::info!("Committed new character; roster has {}", session.characters.len());
            Ok(())
        })
    }

    pub fn cancel_adding_character(&self) {
        self.lock().draft = None;
    }

    // ----- concept -----

    /// Generate the concept from the sheet-ready characters and advance
    pub async fn generate_concept(&self) -> Result<Completion> {
        let (ticket, song_title, lyrics, characters) = self.prepare(Slot::Editor, |session| {
            require_step(session, WizardStep::CharacterSheet, "generate the concept")?;
            let characters = session.sheet_ready_characters();
            if characters.is_empty() {
                return Err(validation(NEED_SHEET));
            }
            let ticket = Ticket::claim(session, Purpose::Concept, Target::Session, Slot::Editor)?;
            Ok((
                ticket,
                session.song_title.clone(),
                session.lyrics.clone(),
                characters,
            ))
        })?;

        tracing::info!(
            "Generating concept with {} sheet-ready character(s)",
            characters.len()
        );
        let outcome = self
            .gateway
            .generate_concept(&song_title, &lyrics, &characters)
            .await;

        self.complete(ticket, outcome, |session, concept| {
            session.concept = Some(concept);
            session.step = WizardStep::Concept;
            tracing::info!("Concept ready; moving to {}", WizardStep::Concept);
            Ok(())
        })
    }

    /// Replace the concept's story arc
    pub fn update_story(&self, story: &str) -> Result<()> {
        self.prepare(Slot::Editor, |session| {
            let concept = session
                .concept
                .as_mut()
                .ok_or_else(|| validation("There is no concept to edit yet."))?;
            concept.story = story.to_string();
            Ok(())
        })
    }

    pub fn set_aspect_ratio(&self, aspect_ratio: AspectRatio) {
        self.lock().aspect_ratio = aspect_ratio;
    }

    // ----- scenes -----

    /// Generate the storyboard prompts and advance to the scenes step
    ///
    /// Exactly `scene_count` prompts are kept; a shorter answer is a failure
    /// and leaves the scene list and step untouched.
    pub async fn generate_scene_prompts(&self) -> Result<Completion> {
        let (ticket, song_title, characters, concept) = self.prepare(Slot::Editor, |session| {
            require_step(session, WizardStep::Concept, "generate scene prompts")?;
            let concept = session
                .concept
                .clone()
                .ok_or_else(|| validation("Please generate a concept first."))?;
            let characters = session.sheet_ready_characters();
            if characters.is_empty() {
                return Err(validation(NEED_SHEET));
            }
            let ticket =
                Ticket::claim(session, Purpose::ScenePrompts, Target::Session, Slot::Editor)?;
            Ok((ticket, session.song_title.clone(), characters, concept))
        })?;

        let count = self.settings.scene_count;
        tracing::info!("Generating {} scene prompts", count);
        let outcome = self
            .gateway
            .generate_scene_prompts(&song_title, &characters, &concept, count)
            .await;

        self.complete(ticket, outcome, |session, prompts| {
            if prompts.len() < count {
                return Err(MvDirectorError::Generation(format!(
                    "Failed to generate storyboard prompts: expected {} scenes but received {}.",
                    count,
                    prompts.len()
                ))
                .into());
            }
            session.scenes = prompts
                .into_iter()
                .take(count)
                .map(Scene::from_prompt)
                .collect();
            session.scenes_revision += 1;
            session.scene_error = None;
            session.step = WizardStep::Scenes;
            tracing::info!("Storyboard ready; moving to {}", WizardStep::Scenes);
            Ok(())
        })
    }

    /// Replace one scene's prompt; its image is kept as is
    pub fn update_prompt(&self, index: usize, prompt: &str) -> Result<()> {
        self.prepare(Slot::Scenes, |session| {
            let scene = session
                .scenes
                .get_mut(index)
                .ok_or_else(|| MvDirectorError::NotFound(format!("scene {}", index)))?;
            scene.prompt = prompt.to_string();
            Ok(())
        })
    }

    /// Generate the thumbnail for one scene
    ///
    /// Uses the prompt as it is when the call starts. Only one thumbnail may
    /// be outstanding across the whole grid; failures go to the scene-grid
    /// error slot and leave every scene unchanged.
    pub async fn generate_thumbnail(&self, index: usize) -> Result<Completion> {
        let request = self.prepare(Slot::Scenes, |session| {
            let prompt = session
                .scenes
                .get(index)
                .map(|s| s.prompt.clone())
                .ok_or_else(|| MvDirectorError::NotFound(format!("scene {}", index)))?;
            let concept = session
                .concept
                .clone()
                .ok_or_else(|| validation("Please generate a concept first."))?;
            let characters: Vec<Character> = select_scene_characters(&prompt, &session.characters)?
                .into_iter()
                .cloned()
                .collect();
            let ticket =
                Ticket::claim(session, Purpose::SceneImage, Target::Scene(index), Slot::Scenes)?;
            Ok(ThumbnailRequest {
                ticket,
                prompt,
                concept,
                characters,
                aspect_ratio: session.aspect_ratio,
            })
        })?;

        tracing::info!(
            "Generating thumbnail for scene {} with {} character(s)",
            index + 1,
            request.characters.len()
        );
        let outcome = self
            .gateway
            .generate_scene_image(
                &request.prompt,
                &request.concept,
                &request.characters,
                request.aspect_ratio,
            )
            .await;

        self.complete(request.ticket, outcome, |session, image| {
            if let Some(scene) = session.scenes.get_mut(index) {
                scene.image = Some(image);
            }
            Ok(())
        })
    }

    /// Image of one scene, for download
    pub fn scene_image(&self, index: usize) -> Result<ImageData> {
        let session = self.lock();
        let scene = session
            .scenes
            .get(index)
            .ok_or_else(|| MvDirectorError::NotFound(format!("scene {}", index)))?;
        scene.image.clone().ok_or_else(|| {
            MvDirectorError::NotFound(format!("image for scene {}", index + 1)).into()
        })
    }

    /// Go back to the concept step, discarding every scene
    pub fn back_to_concept(&self) -> Result<()> {
        self.prepare(Slot::Editor, |session| {
            require_step(session, WizardStep::Scenes, "go back to the concept")?;
            session.scenes.clear();
            session.scenes_revision += 1;
            session.scene_error = None;
            session.step = WizardStep::Concept;
            tracing::info!("Back to {}; scenes discarded", WizardStep::Concept);
            Ok(())
        })
    }

    // ----- projects -----

    /// Reset to an empty session with a fresh identity token
    ///
    /// The catalog is not touched until the first save.
    pub fn create_new(&self) -> ProjectId {
        let mut session = self.lock();
        session.reset_to(Session::new(self.settings.default_aspect_ratio));
        tracing::info!("Started new project {}", session.id);
        session.id
    }

    /// Leave the editor; outstanding results will be discarded
    pub fn go_to_projects(&self) {
        let mut session = self.lock();
        tracing::debug!("Leaving project {}", session.id);
        session.reset_to(Session::new(self.settings.default_aspect_ratio));
    }

    /// Save the session into the catalog, stamping `last_saved`
    ///
    /// # Errors
    ///
    /// Returns a validation error if the song title is empty
    pub fn save_into(&self, catalog: &mut ProjectCatalog) -> Result<Project> {
        let project = {
            let mut session = self.lock();
            if session.song_title.trim().is_empty() {
                return Err(validation("Please enter a song title before saving."));
            }
            let now = Utc::now();
            session.last_saved = Some(now);
            session.to_project(now)
        };

        catalog.upsert(project.clone());
        tracing::info!("Saved project {} ({})", project.id, project.song_title);
        Ok(project)
    }

    /// Replace the session with a saved project
    ///
    /// # Errors
    ///
    /// Returns `MvDirectorError::NotFound` if the catalog has no such project
    pub fn load_from(&self, catalog: &ProjectCatalog, id: ProjectId) -> Result<()> {
        let project = catalog
            .get(id)
            .cloned()
            .ok_or_else(|| MvDirectorError::NotFound(format!("project {}", id)))?;

        let mut session = self.lock();
        session.reset_to(Session::from_project(project));
        tracing::info!(
            "Loaded project {} ({}) at step {}",
            session.id,
            session.song_title,
            session.step
        );
        Ok(())
    }
}

struct ThumbnailRequest {
    ticket: Ticket,
    prompt: String,
    concept: Concept,
    characters: Vec<Character>,
    aspect_ratio: AspectRatio,
}

fn draft_mut(session: &mut Session) -> Result<&mut CharacterDraft> {
    session
        .draft
        .as_mut()
        .ok_or_else(|| validation("No character is being added."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CharacterOutline;

    fn character(name: &str, ready: bool) -> Character {
        let mut c = Character::from_outline(CharacterOutline::new(name, "someone"));
        if ready {
            c.sheet_images.push(ImageData::new(vec![7]));
        }
        c
    }

    #[test]
    fn test_select_matches_every_named_character() {
        let roster = vec![
            character("Mara", true),
            character("Ike", true),
            character("Sol", true),
        ];
        let picked = select_scene_characters("Sol watches Mara leave", &roster).unwrap();
        let names: Vec<_> = picked.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Mara", "Sol"]);
    }

    #[test]
    fn test_select_ignores_characters_without_sheet() {
        let roster = vec![character("Mara", false), character("Ike", true)];
        let picked = select_scene_characters("Mara alone", &roster).unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].name, "Ike");
    }

    #[test]
    fn test_select_is_case_sensitive() {
        let roster = vec![character("Ike", true), character("Mara", true)];
        let picked = select_scene_characters("mara in the rain", &roster).unwrap();
        assert_eq!(picked[0].name, "Ike");
    }

    #[test]
    fn test_select_fails_without_sheet_ready_characters() {
        let roster = vec![character("Mara", false)];
        let err = select_scene_characters("Mara", &roster).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MvDirectorError>(),
            Some(MvDirectorError::Validation(_))
        ));
        assert!(select_scene_characters("anything", &[]).is_err());
    }

    #[test]
    fn test_require_step_reports_current_step() {
        let session = Session::new(AspectRatio::default());
        let err = require_step(&session, WizardStep::Scenes, "go back").unwrap_err();
        assert_eq!(err.to_string(), "Cannot go back while at step input");
    }
}
