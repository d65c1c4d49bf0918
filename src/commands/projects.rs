//! Project catalog commands
//!
//! Listing, deleting and displaying saved projects.

use crate::commands::Context;
use crate::domain::{Project, ProjectId, WizardStep};
use crate::error::{MvDirectorError, Result};
use colored::Colorize;
use prettytable::{format, row, Table};

/// Print every saved project, most recently saved first
pub fn list_projects(ctx: &Context) -> Result<()> {
    let projects = ctx.catalog().list();

    if projects.is_empty() {
        println!("{}", "No saved projects found.".yellow());
        println!(
            "Use {} to start one.",
            "mvdirector new --title <TITLE> --lyrics-file <FILE>".cyan()
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row![
        "ID".bold(),
        "Song".bold(),
        "Step".bold(),
        "Characters".bold(),
        "Scenes".bold(),
        "Last Saved".bold()
    ]);

    for project in projects {
        table.add_row(row![
            project.id.to_string().cyan(),
            truncate(&project.song_title, 40),
            step_label(project.step),
            format!("{}/{}", project.sheet_ready_count(), project.characters.len()),
            format!("{}/{}", project.thumbnail_count(), project.scenes.len()),
            project.last_saved.format("%Y-%m-%d %H:%M").to_string()
        ]);
    }

    println!("\nMy Projects:");
    table.printstd();
    println!();
    Ok(())
}

/// Delete a saved project
///
/// # Errors
///
/// Returns `MvDirectorError::NotFound` if the id is not in the catalog
pub fn delete_project(ctx: &mut Context, id: ProjectId) -> Result<()> {
    let removed = ctx.catalog_mut().remove(id)?;
    println!(
        "{}",
        format!("Deleted project {} ({})", id, removed.song_title).green()
    );
    Ok(())
}

/// Print one project in detail
pub fn show_project(ctx: &Context, id: ProjectId) -> Result<()> {
    let project = ctx
        .catalog()
        .get(id)
        .ok_or_else(|| MvDirectorError::NotFound(format!("project {}", id)))?;
    print_project(project);
    Ok(())
}

/// Detailed, human-readable rendering of a project
pub fn print_project(project: &Project) {
    println!();
    println!("{} {}", "Project:".bold(), project.song_title.bold());
    println!("  ID:           {}", project.id.to_string().cyan());
    println!("  Step:         {}", step_label(project.step));
    println!("  Aspect ratio: {}", project.aspect_ratio);
    println!(
        "  Last saved:   {}",
        project.last_saved.format("%Y-%m-%d %H:%M:%S")
    );

    if !project.characters.is_empty() {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
        table.add_row(row![
            "ID".bold(),
            "Name".bold(),
            "References".bold(),
            "Sheet".bold(),
            "Description".bold()
        ]);
        for character in &project.characters {
            let sheet = if character.is_sheet_ready() {
                format!("{} images", character.sheet_images.len()).green()
            } else {
                "none".yellow()
            };
            table.add_row(row![
                character.id.to_string().cyan(),
                character.name,
                character.reference_images.len(),
                sheet,
                truncate(&character.description, 50)
            ]);
        }
        println!("\n{}", "Characters:".bold());
        table.printstd();
    }

    if let Some(concept) = &project.concept {
        println!("\n{}", "Concept:".bold());
        println!("  Aesthetic:     {}", concept.aesthetic);
        println!("  Story:         {}", concept.story);
        println!("  Song relation: {}", concept.song_relation);
    }

    if !project.scenes.is_empty() {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
        table.add_row(row!["#".bold(), "Image".bold(), "Prompt".bold()]);
        for (i, scene) in project.scenes.iter().enumerate() {
            let image = if scene.image.is_some() {
                "yes".green()
            } else {
                "-".normal()
            };
            table.add_row(row![i + 1, image, truncate(&scene.prompt, 70)]);
        }
        println!("\n{}", "Scenes:".bold());
        table.printstd();
    }
    println!();
}

fn step_label(step: WizardStep) -> String {
    match step {
        WizardStep::Input => "1 input".to_string(),
        WizardStep::CharacterSheet => "2 characters".to_string(),
        WizardStep::Concept => "3 concept".to_string(),
        WizardStep::Scenes => "4 scenes".to_string(),
    }
}

/// Shorten to at most `max` characters, marking the cut with `...`
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
