//! Command-line interface definition for MV Director
//!
//! This module defines the CLI structure using clap's derive API. Every
//! editing command names the project it works on; the project is loaded
//! from the catalog, changed by one workflow action and saved back.

use crate::domain::{AspectRatio, CharacterId, ProjectId};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// MV Director - music-video concept wizard
///
/// Generate characters, a story concept and a storyboard for a song.
#[derive(Parser, Debug, Clone)]
#[command(name = "mvdirector")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the project catalog database path
    #[arg(long, env = "MVDIRECTOR_DB")]
    pub db: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage saved projects
    Projects {
        #[command(subcommand)]
        command: ProjectCommand,
    },

    /// Show a project in detail
    Show {
        /// Project id
        project: ProjectId,
    },

    /// Start a project and generate its main characters
    New {
        /// Song title
        #[arg(short, long)]
        title: String,

        /// File containing the lyrics
        #[arg(short, long)]
        lyrics_file: PathBuf,

        /// Aspect ratio for scene images (16:9, 9:16, 4:3, 3:4, 1:1)
        #[arg(short, long)]
        aspect: Option<AspectRatio>,
    },

    /// Retry main character generation for a project still at the input step
    Characters {
        /// Project id
        project: ProjectId,
    },

    /// Generate or regenerate a character's sheet from reference images
    Sheet {
        /// Project id
        project: ProjectId,

        /// Character id
        #[arg(short, long)]
        character: CharacterId,

        /// Reference image files
        #[arg(short, long = "image", required = true)]
        images: Vec<PathBuf>,
    },

    /// Add a secondary character (its sheet is generated before it joins)
    AddCharacter {
        /// Project id
        project: ProjectId,

        /// Character description
        #[arg(short, long)]
        description: String,

        /// Character name; suggested from the description when omitted
        #[arg(short, long)]
        name: Option<String>,

        /// Reference image files
        #[arg(short, long = "image", required = true)]
        images: Vec<PathBuf>,
    },

    /// Replace a character's description
    Describe {
        /// Project id
        project: ProjectId,

        /// Character id
        #[arg(short, long)]
        character: CharacterId,

        /// New description
        #[arg(short, long)]
        text: String,
    },

    /// Remove a character from the roster
    RemoveCharacter {
        /// Project id
        project: ProjectId,

        /// Character id
        #[arg(short, long)]
        character: CharacterId,
    },

    /// Remove one of a character's reference images
    RemoveReference {
        /// Project id
        project: ProjectId,

        /// Character id
        #[arg(short, long)]
        character: CharacterId,

        /// Reference image number, starting at 1
        #[arg(short, long)]
        index: usize,
    },

    /// Generate the music-video concept
    Concept {
        /// Project id
        project: ProjectId,
    },

    /// Replace the concept's story arc
    Story {
        /// Project id
        project: ProjectId,

        /// New story text
        #[arg(short, long)]
        text: String,
    },

    /// Change the aspect ratio used for scene images
    Aspect {
        /// Project id
        project: ProjectId,

        /// One of 16:9, 9:16, 4:3, 3:4, 1:1
        ratio: AspectRatio,
    },

    /// Generate the storyboard scene prompts
    Scenes {
        /// Project id
        project: ProjectId,
    },

    /// Replace one scene's prompt
    Prompt {
        /// Project id
        project: ProjectId,

        /// Scene number, starting at 1
        #[arg(short, long)]
        index: usize,

        /// New prompt text
        #[arg(short, long)]
        text: String,
    },

    /// Generate the thumbnail image for one scene
    Thumbnail {
        /// Project id
        project: ProjectId,

        /// Scene number, starting at 1
        #[arg(short, long)]
        index: usize,
    },

    /// Go back to the concept step, discarding all scenes
    Back {
        /// Project id
        project: ProjectId,
    },

    /// Write a scene's image to a file
    Export {
        /// Project id
        project: ProjectId,

        /// Scene number, starting at 1
        #[arg(short, long)]
        index: usize,

        /// Output path (defaults to scene_<n>.jpg)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

/// Project catalog subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ProjectCommand {
    /// List saved projects, most recently saved first
    List,

    /// Delete a saved project
    Delete {
        /// Project id
        id: ProjectId,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            db: None,
            command: Commands::Projects {
                command: ProjectCommand::List,
            },
        }
    }
}
