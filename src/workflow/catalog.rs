//! Project catalog
//!
//! In-memory view of all saved projects, kept sorted by `last_saved`
//! descending. Every mutation writes the whole catalog through the
//! [`ProjectStore`].

use crate::domain::{Project, ProjectId};
use crate::error::{MvDirectorError, Result};
use crate::storage::{sort_by_last_saved, ProjectStore};

pub struct ProjectCatalog {
    store: Box<dyn ProjectStore>,
    projects: Vec<Project>,
}

impl ProjectCatalog {
    /// Open the catalog, loading whatever the store holds
    pub fn open(store: impl ProjectStore + 'static) -> Self {
        let mut projects = store.load();
        sort_by_last_saved(&mut projects);
        tracing::debug!("Opened project catalog with {} entries", projects.len());
        Self {
            store: Box::new(store),
            projects,
        }
    }

    /// Saved projects, most recently saved first
    pub fn list(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn get(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Insert or replace by identity token, re-sort and persist
    pub fn upsert(&mut self, project: Project) {
        match self.projects.iter().position(|p| p.id == project.id) {
            Some(index) => self.projects[index] = project,
            None => self.projects.push(project),
        }
        sort_by_last_saved(&mut self.projects);
        self.store.save(&self.projects);
    }

    /// Remove by identity token and persist
    ///
    /// # Errors
    ///
    /// Returns `MvDirectorError::NotFound` if no project has this id
    pub fn remove(&mut self, id: ProjectId) -> Result<Project> {
        let index = self
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| MvDirectorError::NotFound(format!("project {}", id)))?;
        let removed = self.projects.remove(index);
        self.store.save(&self.projects);
        tracing::info!("Deleted project {} ({})", id, removed.song_title);
        Ok(removed)
    }
}
