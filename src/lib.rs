//! MV Director - music-video concept wizard library
//!
//! This library walks a song through four steps: main characters, a story
//! concept, storyboard scene prompts and scene thumbnails. The creative work
//! is delegated to a generative service; the library owns the session state,
//! the step rules and the project catalog.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `domain`: Projects, characters, concepts, scenes and identity tokens
//! - `workflow`: Session state, the step controller and the project catalog
//! - `providers`: Generation gateway trait, Gemini client and a scripted fake
//! - `prompts`: Prompt text sent to the generative service
//! - `storage`: Persistence of the project catalog
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface and its handlers
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mvdirector::config::WorkflowConfig;
//! use mvdirector::domain::WizardStep;
//! use mvdirector::providers::FakeGateway;
//! use mvdirector::workflow::Workflow;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let workflow = Workflow::new(Arc::new(FakeGateway::new()), WorkflowConfig::default());
//!     workflow.generate_initial_characters("Echoes", "I hear you in the static").await?;
//!     assert_eq!(workflow.step(), WizardStep::CharacterSheet);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod prompts;
pub mod providers;
pub mod storage;
pub mod workflow;

// Re-export commonly used types
pub use config::Config;
pub use error::{MvDirectorError, Result};
pub use workflow::{ProjectCatalog, Session, Workflow};
