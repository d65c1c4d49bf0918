//! Persistence adapter for the project catalog
//!
//! The catalog is persisted as a whole: every save overwrites the complete
//! list of projects under a single key. Neither loading nor saving surfaces
//! errors to the caller; failures are logged and an absent or corrupt
//! catalog loads as empty.

use crate::domain::Project;
use crate::error::{MvDirectorError, Result};
use anyhow::Context;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::Mutex;

/// Key under which the catalog document is stored
pub const PROJECTS_KEY: &str = "mvDirectorAiProjects";

/// Opaque key-value persistence for the whole project catalog
pub trait ProjectStore: Send + Sync {
    /// Load every saved project; empty on absence or corruption
    fn load(&self) -> Vec<Project>;

    /// Overwrite the stored catalog with `projects` (best effort)
    fn save(&self, projects: &[Project]);
}

/// SQLite-backed catalog store
pub struct SqliteProjectStore {
    db_path: PathBuf,
}

impl SqliteProjectStore {
    /// Create a store in the user's data directory
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "mvdirector", "mvdirector")
            .ok_or_else(|| MvDirectorError::Storage("Could not determine data directory".into()))?;

        Self::new_with_path(proj_dirs.data_dir().join("projects.db"))
    }

    /// Create a store that uses the specified database path.
    ///
    /// # Examples
    ///
    /// ```
    /// use mvdirector::storage::{ProjectStore, SqliteProjectStore};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = SqliteProjectStore::new_with_path(dir.path().join("projects.db")).unwrap();
    /// assert!(store.load().is_empty());
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| MvDirectorError::Storage(e.to_string()))?;
        }

        let store = Self { db_path };
        store.init()?;
        Ok(store)
    }

    pub fn db_path(&self) -> &PathBuf {
        &self.db_path
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| MvDirectorError::Storage(e.to_string()).into())
    }

    fn init(&self) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| MvDirectorError::Storage(e.to_string()))?;
        Ok(())
    }

    fn read_catalog(&self) -> Result<Vec<Project>> {
        let conn = self.open()?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?",
                params![PROJECTS_KEY],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query catalog")
            .map_err(|e| MvDirectorError::Storage(e.to_string()))?;

        match value {
            Some(json) => {
                let mut projects: Vec<Project> = serde_json::from_str(&json)
                    .context("Failed to deserialize catalog")
                    .map_err(|e| MvDirectorError::Storage(e.to_string()))?;
                sort_by_last_saved(&mut projects);
                Ok(projects)
            }
            None => Ok(Vec::new()),
        }
    }

    fn write_catalog(&self, projects: &[Project]) -> Result<()> {
        let json = serde_json::to_string(projects)
            .context("Failed to serialize catalog")
            .map_err(|e| MvDirectorError::Storage(e.to_string()))?;

        let conn = self.open()?;
        conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![PROJECTS_KEY, json],
        )
        .context("Failed to write catalog")
        .map_err(|e| MvDirectorError::Storage(e.to_string()))?;
        Ok(())
    }
}

impl ProjectStore for SqliteProjectStore {
    fn load(&self) -> Vec<Project> {
        match self.read_catalog() {
            Ok(projects) => projects,
            Err(e) => {
                tracing::error!("Error loading projects from {}: {}", self.db_path.display(), e);
                Vec::new()
            }
        }
    }

    fn save(&self, projects: &[Project]) {
        if let Err(e) = self.write_catalog(projects) {
            tracing::error!("Error saving projects to {}: {}", self.db_path.display(), e);
        }
    }
}

/// In-memory catalog store for tests and throwaway sessions
#[derive(Default)]
pub struct MemoryProjectStore {
    projects: Mutex<Vec<Project>>,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projects(projects: Vec<Project>) -> Self {
        Self {
            projects: Mutex::new(projects),
        }
    }
}

impl ProjectStore for MemoryProjectStore {
    fn load(&self) -> Vec<Project> {
        match self.projects.lock() {
            Ok(guard) => {
                let mut projects = guard.clone();
                sort_by_last_saved(&mut projects);
                projects
            }
            Err(_) => {
                tracing::error!("In-memory project store lock poisoned");
                Vec::new()
            }
        }
    }

    fn save(&self, projects: &[Project]) {
        match self.projects.lock() {
            Ok(mut guard) => *guard = projects.to_vec(),
            Err(_) => tracing::error!("In-memory project store lock poisoned"),
        }
    }
}

/// Most recently saved first
pub(crate) fn sort_by_last_saved(projects: &mut [Project]) {
    projects.sort_by(|a, b| b.last_saved.cmp(&a.last_saved));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AspectRatio, ProjectId, WizardStep};
    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    fn project(title: &str, age_minutes: i64) -> Project {
        Project {
            id: ProjectId::new(),
            song_title: title.to_string(),
            lyrics: "la la".to_string(),
            characters: Vec::new(),
            concept: None,
            scenes: Vec::new(),
            aspect_ratio: AspectRatio::Square,
            step: WizardStep::Input,
            last_saved: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    fn create_test_store() -> (SqliteProjectStore, tempfile::TempDir) {
        let dir = tempdir().expect("failed to create tempdir");
        let store = SqliteProjectStore::new_with_path(dir.path().join("projects.db"))
            .expect("failed to create store");
        (store, dir)
    }

    #[test]
    fn test_sqlite_store_init_creates_table() {
        let (store, _dir) = create_test_store();
        let conn = Connection::open(store.db_path()).expect("open connection");
        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name='kv_store'",
                [],
                |r| r.get(0),
            )
            .expect("query row");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_load_empty_store_returns_empty_catalog() {
        let (store, _dir) = create_test_store();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let (store, _dir) = create_test_store();
        let projects = vec![project("Echoes", 0)];
        store.save(&projects);
        assert_eq!(store.load(), projects);
    }

    #[test]
    fn test_save_overwrites_whole_catalog() {
        let (store, _dir) = create_test_store();
        store.save(&[project("A", 1), project("B", 2)]);
        store.save(&[project("C", 0)]);

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].song_title, "C");
    }

    #[test]
    fn test_load_sorts_by_last_saved_descending() {
        let (store, _dir) = create_test_store();
        store.save(&[project("old", 30), project("new", 1), project("mid", 10)]);

        let titles: Vec<_> = store.load().into_iter().map(|p| p.song_title).collect();
        assert_eq!(titles, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_corrupt_catalog_loads_empty() {
        let (store, _dir) = create_test_store();
        let conn = Connection::open(store.db_path()).unwrap();
        conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?, ?)",
            params![PROJECTS_KEY, "{not json"],
        )
        .unwrap();

        assert!(store.load().is_empty());
    }

    #[test]
    fn test_new_with_path_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("projects.db");
        let store = SqliteProjectStore::new_with_path(&db_path).unwrap();
        assert_eq!(store.db_path(), &db_path);
        assert!(db_path.parent().unwrap().exists());
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryProjectStore::new();
        let projects = vec![project("Echoes", 0)];
        store.save(&projects);
        assert_eq!(store.load(), projects);
    }
}
