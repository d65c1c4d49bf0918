//! Command handlers for the CLI
//!
//! The CLI is the view layer over the workflow. Each invocation opens the
//! project catalog, loads (or creates) one session, runs a single workflow
//! action and saves the session back on success.
//!
//! - `projects` - catalog listing, deletion and the detailed project view
//! - `editor`   - every wizard action on a single project

use crate::cli::{Cli, Commands, ProjectCommand};
use crate::config::Config;
use crate::domain::{Project, ProjectId};
use crate::error::Result;
use crate::providers::{self, GeminiGateway, GenerationGateway};
use crate::storage::SqliteProjectStore;
use crate::workflow::{ProjectCatalog, Workflow};
use std::sync::Arc;

pub mod editor;
pub mod projects;

/// Everything a command handler needs
pub struct Context {
    config: Config,
    catalog: ProjectCatalog,
    gateway: Option<Arc<dyn GenerationGateway>>,
}

impl Context {
    /// Open the catalog configured in `config`
    ///
    /// # Errors
    ///
    /// Returns error if the catalog database cannot be created
    pub fn open(config: Config) -> Result<Self> {
        let store = match &config.storage.db_path {
            Some(path) => SqliteProjectStore::new_with_path(path.clone())?,
            None => SqliteProjectStore::new()?,
        };
        tracing::debug!("Using project catalog at {}", store.db_path().display());

        Ok(Self {
            config,
            catalog: ProjectCatalog::open(store),
            gateway: None,
        })
    }

    /// Context with an explicit catalog and gateway
    pub fn with_gateway(
        config: Config,
        catalog: ProjectCatalog,
        gateway: Arc<dyn GenerationGateway>,
    ) -> Self {
        Self {
            config,
            catalog,
            gateway: Some(gateway),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &ProjectCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut ProjectCatalog {
        &mut self.catalog
    }

    /// Build a workflow with an empty session
    ///
    /// Only commands that generate content need credentials; the others get a
    /// gateway that is never called.
    fn workflow(&self, generates: bool) -> Result<Workflow> {
        let gateway: Arc<dyn GenerationGateway> = match (&self.gateway, generates) {
            (Some(gateway), _) => Arc::clone(gateway),
            (None, true) => providers::create_gateway(&self.config.gemini)?,
            (None, false) => Arc::new(GeminiGateway::new(self.config.gemini.clone())?),
        };
        Ok(Workflow::new(gateway, self.config.workflow.clone()))
    }

    /// Build a workflow with a saved project loaded
    fn load(&self, id: ProjectId, generates: bool) -> Result<Workflow> {
        let workflow = self.workflow(generates)?;
        workflow.load_from(&self.catalog, id)?;
        Ok(workflow)
    }

    fn save(&mut self, workflow: &Workflow) -> Result<Project> {
        workflow.save_into(&mut self.catalog)
    }
}

/// Execute a parsed command
///
/// # Errors
///
/// Returns whatever error the workflow action produced; nothing is saved in
/// that case
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let mut ctx = Context::open(config)?;

    match cli.command {
        Commands::Projects { command } => match command {
            ProjectCommand::List => projects::list_projects(&ctx),
            ProjectCommand::Delete { id } => projects::delete_project(&mut ctx, id),
        },
        Commands::Show { project } => projects::show_project(&ctx, project),
        Commands::New {
            title,
            lyrics_file,
            aspect,
        } => editor::new_project(&mut ctx, &title, &lyrics_file, aspect).await,
        Commands::Characters { project } => editor::retry_characters(&mut ctx, project).await,
        Commands::Sheet {
            project,
            character,
            images,
        } => editor::generate_sheet(&mut ctx, project, character, &images).await,
        Commands::AddCharacter {
            project,
            description,
            name,
            images,
        } => {
            editor::add_character(&mut ctx, project, &description, name.as_deref(), &images).await
        }
        Commands::Describe {
            project,
            character,
            text,
        } => editor::describe_character(&mut ctx, project, character, &text),
        Commands::RemoveCharacter { project, character } => {
            editor::remove_character(&mut ctx, project, character)
        }
        Commands::RemoveReference {
            project,
            character,
            index,
        } => editor::remove_reference(&mut ctx, project, character, index),
        Commands::Concept { project } => editor::generate_concept(&mut ctx, project).await,
        Commands::Story { project, text } => editor::update_story(&mut ctx, project, &text),
        Commands::Aspect { project, ratio } => editor::set_aspect(&mut ctx, project, ratio),
        Commands::Scenes { project } => editor::generate_scenes(&mut ctx, project).await,
        Commands::Prompt {
            project,
            index,
            text,
        } => editor::update_prompt(&mut ctx, project, index, &text),
        Commands::Thumbnail { project, index } => {
            editor::generate_thumbnail(&mut ctx, project, index).await
        }
        Commands::Back { project } => editor::back_to_concept(&mut ctx, project),
        Commands::Export {
            project,
            index,
            out,
        } => editor::export_scene(&ctx, project, index, out.as_deref()),
    }
}
