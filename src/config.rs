//! Configuration management for MV Director
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::domain::AspectRatio;
use crate::error::{MvDirectorError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for MV Director
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Generative service settings
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Wizard limits and defaults
    #[serde(default)]
    pub workflow: WorkflowConfig,
    /// Project catalog location
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Gemini generation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL of the Generative Language API (useful for tests and local mocks)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// API key; usually supplied through the environment rather than the file
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for text and structured JSON output
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// Model used for character sheets and scene images
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_image_model() -> String {
    "gemini-2.5-flash-image-preview".to_string()
}

fn default_timeout_seconds() -> u64 {
    120
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            text_model: default_text_model(),
            image_model: default_image_model(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Wizard behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Maximum number of characters kept from initial roster generation
    #[serde(default = "default_max_initial_characters")]
    pub max_initial_characters: usize,

    /// Exact number of storyboard scenes required from prompt generation
    #[serde(default = "default_scene_count")]
    pub scene_count: usize,

    /// Aspect ratio for newly created sessions
    #[serde(default)]
    pub default_aspect_ratio: AspectRatio,
}

fn default_max_initial_characters() -> usize {
    3
}

fn default_scene_count() -> usize {
    20
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_initial_characters: default_max_initial_characters(),
            scene_count: default_scene_count(),
            default_aspect_ratio: AspectRatio::default(),
        }
    }
}

/// Project catalog storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// SQLite file holding the catalog; the user data directory when unset
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MvDirectorError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| MvDirectorError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(api_base) = std::env::var("MVDIRECTOR_GEMINI_API_BASE") {
            self.gemini.api_base = api_base;
        }

        if let Ok(api_key) = std::env::var("GEMINI_API_KEY").or_else(|_| std::env::var("API_KEY"))
        {
            self.gemini.api_key = Some(api_key);
        }

        if let Ok(model) = std::env::var("MVDIRECTOR_TEXT_MODEL") {
            self.gemini.text_model = model;
        }

        if let Ok(model) = std::env::var("MVDIRECTOR_IMAGE_MODEL") {
            self.gemini.image_model = model;
        }

        if let Ok(timeout) = std::env::var("MVDIRECTOR_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.gemini.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid MVDIRECTOR_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(count) = std::env::var("MVDIRECTOR_SCENE_COUNT") {
            if let Ok(value) = count.parse() {
                self.workflow.scene_count = value;
            } else {
                tracing::warn!("Invalid MVDIRECTOR_SCENE_COUNT: {}", count);
            }
        }

        if let Ok(db_path) = std::env::var("MVDIRECTOR_DB") {
            self.storage.db_path = Some(PathBuf::from(db_path));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(db_path) = &cli.db {
            tracing::debug!("Using catalog DB override from CLI: {}", db_path.display());
            self.storage.db_path = Some(db_path.clone());
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set. The API key is not
    /// checked here; it is only needed once a generation call is made.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.gemini.api_base.trim().is_empty() {
            return Err(MvDirectorError::Config("gemini.api_base cannot be empty".to_string()).into());
        }

        if let Err(e) = url::Url::parse(&self.gemini.api_base) {
            return Err(MvDirectorError::Config(format!(
                "gemini.api_base is not a valid URL: {}",
                e
            ))
            .into());
        }

        if self.gemini.text_model.trim().is_empty() || self.gemini.image_model.trim().is_empty() {
            return Err(
                MvDirectorError::Config("gemini model names cannot be empty".to_string()).into(),
            );
        }

        if self.gemini.timeout_seconds == 0 {
            return Err(MvDirectorError::Config(
                "gemini.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.workflow.max_initial_characters == 0 {
            return Err(MvDirectorError::Config(
                "workflow.max_initial_characters must be greater than 0".to_string(),
            )
            .into());
        }

        if self.workflow.scene_count == 0 {
            return Err(MvDirectorError::Config(
                "workflow.scene_count must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
