//! Generation gateway trait
//!
//! This module defines the [`GenerationGateway`] trait that every generative
//! backend implements. Each operation is a single request/response call with
//! no retry; any failure is returned to the workflow, which decides what the
//! user sees.

use crate::domain::{AspectRatio, Character, CharacterOutline, Concept, ImageData, ReferenceImage};
use crate::error::Result;
use async_trait::async_trait;

/// Facade over a remote generative-AI service
///
/// Implementations must be cheap to share (`Send + Sync`); the workflow
/// holds them behind an `Arc` and calls them without holding any session
/// lock.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Propose the main characters for a song
    ///
    /// Returns every outline the service produced; the caller decides how
    /// many to keep. An empty list is an error.
    async fn generate_initial_characters(
        &self,
        song_title: &str,
        lyrics: &str,
    ) -> Result<Vec<CharacterOutline>>;

    /// Suggest a single-line name for a character description
    async fn generate_character_name(&self, description: &str) -> Result<String>;

    /// Render a character sheet (full body, medium shot, close-up) from the
    /// user's reference images
    ///
    /// # Errors
    ///
    /// Fails if the service returns no image at all
    async fn generate_character_sheet(
        &self,
        character: &CharacterOutline,
        reference_images: &[ReferenceImage],
    ) -> Result<Vec<ImageData>>;

    /// Write the aesthetic, story arc and song relation for the video
    async fn generate_concept(
        &self,
        song_title: &str,
        lyrics: &str,
        characters: &[Character],
    ) -> Result<Concept>;

    /// Produce chronological scene prompts, asking for `count` of them
    ///
    /// Returns what the service produced; the caller enforces the exact
    /// count. An empty list is an error.
    async fn generate_scene_prompts(
        &self,
        song_title: &str,
        characters: &[Character],
        concept: &Concept,
        count: usize,
    ) -> Result<Vec<String>>;

    /// Render one storyboard frame featuring `characters`
    ///
    /// # Errors
    ///
    /// Fails if the service returns no image
    async fn generate_scene_image(
        &self,
        prompt: &str,
        concept: &Concept,
        characters: &[Character],
        aspect_ratio: AspectRatio,
    ) -> Result<ImageData>;
}
