//! Wizard commands
//!
//! One handler per editing action. Handlers load the project, run the
//! workflow action and save the project back when the action succeeded.

use crate::commands::Context;
use crate::domain::{AspectRatio, CharacterId, ImageData, ProjectId, ReferenceImage, WizardStep};
use crate::error::{MvDirectorError, Result};
use crate::workflow::{Completion, Session};
use anyhow::Context as _;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Create a project and generate its main characters
///
/// The project is saved even when generation fails, so it can be retried
/// with the `characters` command.
pub async fn new_project(
    ctx: &mut Context,
    title: &str,
    lyrics_file: &Path,
    aspect: Option<AspectRatio>,
) -> Result<()> {
    let lyrics = std::fs::read_to_string(lyrics_file)
        .with_context(|| format!("Failed to read lyrics from {}", lyrics_file.display()))?;

    let workflow = ctx.workflow(true)?;
    workflow.create_new();
    if let Some(aspect) = aspect {
        workflow.set_aspect_ratio(aspect);
    }
    workflow.set_song(title, &lyrics)?;

    println!("{}", "Dreaming up your characters...".dimmed());
    let generated = workflow.generate_initial_characters(title, &lyrics).await;
    let project = ctx.save(&workflow)?;
    println!(
        "{} {}",
        "Created project".green(),
        project.id.to_string().cyan()
    );

    generated?;
    print_roster(&workflow.snapshot());
    Ok(())
}

/// Generate the main characters for a project still at the input step
pub async fn retry_characters(ctx: &mut Context, id: ProjectId) -> Result<()> {
    let workflow = ctx.load(id, true)?;
    let session = workflow.snapshot();

    println!("{}", "Dreaming up your characters...".dimmed());
    applied(
        workflow
            .generate_initial_characters(&session.song_title, &session.lyrics)
            .await?,
    )?;
    ctx.save(&workflow)?;
    print_roster(&workflow.snapshot());
    Ok(())
}

pub async fn generate_sheet(
    ctx: &mut Context,
    id: ProjectId,
    character: CharacterId,
    images: &[PathBuf],
) -> Result<()> {
    let reference_images = read_reference_images(images)?;
    let workflow = ctx.load(id, true)?;

    println!("{}", "Generating character sheet...".dimmed());
    applied(workflow.generate_sheet(character, reference_images).await?)?;
    ctx.save(&workflow)?;

    if let Some(updated) = workflow.snapshot().character(character) {
        println!(
            "{}",
            format!(
                "Character sheet for {} ready ({} images)",
                updated.name,
                updated.sheet_images.len()
            )
            .green()
        );
    }
    Ok(())
}

/// Add a secondary character through the draft overlay
///
/// The character joins the roster only once its sheet has been generated.
pub async fn add_character(
    ctx: &mut Context,
    id: ProjectId,
    description: &str,
    name: Option<&str>,
    images: &[PathBuf],
) -> Result<()> {
    let reference_images = read_reference_images(images)?;
    let workflow = ctx.load(id, true)?;

    let character_id = workflow.begin_adding_character()?;
    workflow.update_draft(name.unwrap_or_default(), description)?;
    workflow.stage_draft_images(reference_images)?;

    if name.map_or(true, |n| n.trim().is_empty()) {
        applied(workflow.suggest_draft_name().await?)?;
        if let Some(draft) = workflow.snapshot().draft {
            println!("Suggested name: {}", draft.name.bold());
        }
    }

    println!("{}", "Generating character sheet...".dimmed());
    applied(workflow.commit_draft().await?)?;
    ctx.save(&workflow)?;

    if let Some(added) = workflow.snapshot().character(character_id) {
        println!(
            "{} {} ({})",
            "Added character".green(),
            added.name.bold(),
            character_id.to_string().cyan()
        );
    }
    Ok(())
}

pub fn describe_character(
    ctx: &mut Context,
    id: ProjectId,
    character: CharacterId,
    text: &str,
) -> Result<()> {
    let workflow = ctx.load(id, false)?;
    workflow.update_description(character, text)?;
    ctx.save(&workflow)?;
    println!("{}", "Description updated".green());
    Ok(())
}

pub fn remove_character(ctx: &mut Context, id: ProjectId, character: CharacterId) -> Result<()> {
    let workflow = ctx.load(id, false)?;
    workflow.delete_character(character)?;
    ctx.save(&workflow)?;
    println!("{}", format!("Removed character {}", character).green());
    Ok(())
}

pub fn remove_reference(
    ctx: &mut Context,
    id: ProjectId,
    character: CharacterId,
    number: usize,
) -> Result<()> {
    let index = position(number, "Reference image")?;
    let workflow = ctx.load(id, false)?;
    workflow.delete_reference_image(character, index)?;
    ctx.save(&workflow)?;
    println!("{}", format!("Removed reference image {}", number).green());
    Ok(())
}

pub async fn generate_concept(ctx: &mut Context, id: ProjectId) -> Result<()> {
    let workflow = ctx.load(id, true)?;

    println!("{}", "Developing the video concept...".dimmed());
    applied(workflow.generate_concept().await?)?;
    ctx.save(&workflow)?;

    if let Some(concept) = workflow.snapshot().concept {
        println!("{} {}", "Aesthetic:".bold(), concept.aesthetic);
        println!("{} {}", "Story:".bold(), concept.story);
        println!("{} {}", "Song relation:".bold(), concept.song_relation);
    }
    Ok(())
}

pub fn update_story(ctx: &mut Context, id: ProjectId, text: &str) -> Result<()> {
    let workflow = ctx.load(id, false)?;
    workflow.update_story(text)?;
    ctx.save(&workflow)?;
    println!("{}", "Story updated".green());
    Ok(())
}

pub fn set_aspect(ctx: &mut Context, id: ProjectId, aspect: AspectRatio) -> Result<()> {
    let workflow = ctx.load(id, false)?;
    workflow.set_aspect_ratio(aspect);
    ctx.save(&workflow)?;
    println!(
        "{}",
        format!("Aspect ratio set to {} ({})", aspect, aspect.description()).green()
    );
    Ok(())
}

pub async fn generate_scenes(ctx: &mut Context, id: ProjectId) -> Result<()> {
    let workflow = ctx.load(id, true)?;

    println!("{}", "Generating scene prompts...".dimmed());
    applied(workflow.generate_scene_prompts().await?)?;
    ctx.save(&workflow)?;

    for (i, scene) in workflow.snapshot().scenes.iter().enumerate() {
        println!("{:>3}. {}", i + 1, scene.prompt);
    }
    Ok(())
}

pub fn update_prompt(ctx: &mut Context, id: ProjectId, number: usize, text: &str) -> Result<()> {
    let index = position(number, "Scene")?;
    let workflow = ctx.load(id, false)?;
    workflow.update_prompt(index, text)?;
    ctx.save(&workflow)?;
    println!("{}", format!("Prompt for scene {} updated", number).green());
    Ok(())
}

pub async fn generate_thumbnail(ctx: &mut Context, id: ProjectId, number: usize) -> Result<()> {
    let index = position(number, "Scene")?;
    let workflow = ctx.load(id, true)?;

    println!("{}", format!("Generating image for scene {}...", number).dimmed());
    applied(workflow.generate_thumbnail(index).await?)?;
    ctx.save(&workflow)?;
    println!(
        "{}",
        format!("Scene {} image ready; export it with `mvdirector export`", number).green()
    );
    Ok(())
}

pub fn back_to_concept(ctx: &mut Context, id: ProjectId) -> Result<()> {
    let workflow = ctx.load(id, false)?;
    workflow.back_to_concept()?;
    ctx.save(&workflow)?;
    println!(
        "{}",
        format!("Back at step {}; all scenes were discarded", WizardStep::Concept).yellow()
    );
    Ok(())
}

/// Write a scene image to `out`, or `scene_<n>.jpg` in the current directory
pub fn export_scene(ctx: &Context, id: ProjectId, number: usize, out: Option<&Path>) -> Result<()> {
    let index = position(number, "Scene")?;
    let workflow = ctx.load(id, false)?;
    let image = workflow.scene_image(index)?;

    let path = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_export_name(number));
    std::fs::write(&path, image.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "{}",
        format!("Wrote scene {} to {}", number, path.display()).green()
    );
    Ok(())
}

fn default_export_name(number: usize) -> PathBuf {
    PathBuf::from(format!("scene_{}.jpg", number))
}

/// Convert a 1-based number from the command line into an index
fn position(number: usize, what: &str) -> Result<usize> {
    number.checked_sub(1).ok_or_else(|| {
        MvDirectorError::Validation(format!("{} numbers start at 1", what)).into()
    })
}

/// Treat a discarded result as an error; the CLI never resets mid-call
fn applied(completion: Completion) -> Result<()> {
    match completion {
        Completion::Applied => Ok(()),
        Completion::Discarded => Err(MvDirectorError::Generation(
            "The result arrived after the project changed and was discarded.".to_string(),
        )
        .into()),
    }
}

fn read_reference_images(paths: &[PathBuf]) -> Result<Vec<ReferenceImage>> {
    paths.iter().map(|p| read_reference_image(p)).collect()
}

/// Read an image file, taking the MIME type from its extension or contents
fn read_reference_image(path: &Path) -> Result<ReferenceImage> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read image {}", path.display()))?;

    let format = image::ImageFormat::from_path(path)
        .or_else(|_| image::guess_format(&bytes))
        .map_err(|_| {
            MvDirectorError::Validation(format!("{} is not a supported image", path.display()))
        })?;

    tracing::debug!(
        "Read reference image {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        format.to_mime_type()
    );
    Ok(ReferenceImage::new(
        ImageData::new(bytes),
        format.to_mime_type(),
    ))
}

fn print_roster(session: &Session) {
    if session.step != WizardStep::CharacterSheet {
        return;
    }
    println!("\n{}", "Characters:".bold());
    for character in &session.characters {
        println!(
            "  {} {} - {}",
            character.id.to_string().cyan(),
            character.name.bold(),
            character.description
        );
    }
    println!(
        "\nUpload reference images with {}",
        format!("mvdirector sheet {} --character <ID> --image <FILE>", session.id).cyan()
    );
}
