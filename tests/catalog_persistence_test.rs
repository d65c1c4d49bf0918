//! Project catalog persistence tests
//!
//! Saves sessions through the workflow into a SQLite-backed catalog,
//! reopens the database and loads them back.

mod common;

use chrono::Utc;
use common::{create_temp_store, fake_workflow, workflow_at_scenes};
use mvdirector::domain::{AspectRatio, ProjectId, WizardStep};
use mvdirector::error::MvDirectorError;
use mvdirector::storage::{SqliteProjectStore, PROJECTS_KEY};
use mvdirector::workflow::ProjectCatalog;

#[tokio::test]
async fn test_saved_project_loads_back_identically() {
    let (store, tmp) = create_temp_store();
    let db_path = store.db_path().clone();
    let mut catalog = ProjectCatalog::open(store);

    let (workflow, _gateway) = workflow_at_scenes().await;
    workflow.set_aspect_ratio(AspectRatio::Landscape);
    workflow.generate_thumbnail(1).await.unwrap();
    workflow.update_prompt(4, "Mara watches the tide").unwrap();
    let saved = workflow.save_into(&mut catalog).unwrap();

    let reopened = ProjectCatalog::open(SqliteProjectStore::new_with_path(db_path).unwrap());
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.get(saved.id), Some(&saved));

    let (other, _gateway) = fake_workflow();
    other.load_from(&reopened, saved.id).unwrap();

    let stamp = Utc::now();
    assert_eq!(
        other.snapshot().to_project(stamp),
        workflow.snapshot().to_project(stamp)
    );
    let loaded = other.snapshot();
    assert_eq!(loaded.step, WizardStep::Scenes);
    assert_eq!(loaded.aspect_ratio, AspectRatio::Landscape);
    assert!(loaded.scenes[1].image.is_some());
    assert_eq!(loaded.last_saved, Some(saved.last_saved));
    drop(tmp);
}

#[tokio::test]
async fn test_saving_twice_keeps_one_entry() {
    let (store, _tmp) = create_temp_store();
    let mut catalog = ProjectCatalog::open(store);
    let (workflow, _gateway) = workflow_at_scenes().await;

    let first = workflow.save_into(&mut catalog).unwrap();
    workflow.update_prompt(0, "A new opening shot").unwrap();
    let second = workflow.save_into(&mut catalog).unwrap();

    assert_eq!(catalog.len(), 1);
    assert_eq!(first.id, second.id);
    assert!(second.last_saved >= first.last_saved);
    assert_eq!(catalog.list()[0].scenes[0].prompt, "A new opening shot");
}

#[tokio::test]
async fn test_catalog_lists_most_recent_first() {
    let (store, _tmp) = create_temp_store();
    let mut catalog = ProjectCatalog::open(store);
    let (workflow, _gateway) = fake_workflow();

    let mut ids = Vec::new();
    for title in ["First", "Second", "Third"] {
        workflow.create_new();
        workflow.set_song(title, "la la").unwrap();
        ids.push(workflow.save_into(&mut catalog).unwrap().id);
    }

    let listed: Vec<ProjectId> = catalog.list().iter().map(|p| p.id).collect();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0], ids[2]);
    assert_eq!(catalog.list()[0].song_title, "Third");
    let saved: Vec<_> = catalog.list().iter().map(|p| p.last_saved).collect();
    assert!(saved.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_save_requires_song_title() {
    let (store, _tmp) = create_temp_store();
    let mut catalog = ProjectCatalog::open(store);
    let (workflow, _gateway) = fake_workflow();

    let err = workflow.save_into(&mut catalog).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MvDirectorError>(),
        Some(MvDirectorError::Validation(_))
    ));
    assert!(catalog.is_empty());
}

#[tokio::test]
async fn test_new_project_does_not_touch_catalog() {
    let (store, _tmp) = create_temp_store();
    let mut catalog = ProjectCatalog::open(store);
    let (workflow, _gateway) = workflow_at_scenes().await;
    let saved = workflow.save_into(&mut catalog).unwrap();

    let fresh = workflow.create_new();

    assert_ne!(fresh, saved.id);
    assert_eq!(catalog.len(), 1);
    assert!(catalog.get(fresh).is_none());
    assert!(workflow.snapshot().last_saved.is_none());
}

#[tokio::test]
async fn test_loading_drops_transient_state() {
    let (store, _tmp) = create_temp_store();
    let mut catalog = ProjectCatalog::open(store);
    let (workflow, gateway) = workflow_at_scenes().await;
    let saved = workflow.save_into(&mut catalog).unwrap();

    gateway.fail(mvdirector::domain::Purpose::SceneImage);
    assert!(workflow.generate_thumbnail(0).await.is_err());
    assert!(workflow.snapshot().scene_error.is_some());

    workflow.load_from(&catalog, saved.id).unwrap();

    let session = workflow.snapshot();
    assert!(session.scene_error.is_none());
    assert!(session.error.is_none());
    assert!(session.draft.is_none());
    assert!(session.in_flight.is_idle());
}

#[tokio::test]
async fn test_load_unknown_project_is_not_found() {
    let (store, _tmp) = create_temp_store();
    let catalog = ProjectCatalog::open(store);
    let (workflow, _gateway) = fake_workflow();

    let err = workflow.load_from(&catalog, ProjectId::new()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MvDirectorError>(),
        Some(MvDirectorError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_persists_across_reopen() {
    let (store, _tmp) = create_temp_store();
    let db_path = store.db_path().clone();
    let mut catalog = ProjectCatalog::open(store);
    let (workflow, _gateway) = fake_workflow();

    workflow.set_song("Keep", "la la").unwrap();
    let keep = workflow.save_into(&mut catalog).unwrap();
    workflow.create_new();
    workflow.set_song("Drop", "la la").unwrap();
    let drop_me = workflow.save_into(&mut catalog).unwrap();

    let removed = catalog.remove(drop_me.id).unwrap();
    assert_eq!(removed.song_title, "Drop");
    assert!(catalog.remove(drop_me.id).is_err());

    let reopened = ProjectCatalog::open(SqliteProjectStore::new_with_path(db_path).unwrap());
    assert_eq!(reopened.len(), 1);
    assert!(reopened.get(keep.id).is_some());
}

#[test]
fn test_corrupt_catalog_loads_empty() {
    let (store, _tmp) = create_temp_store();
    let db_path = store.db_path().clone();

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    conn.execute(
        "INSERT INTO kv_store (key, value) VALUES (?1, ?2)",
        rusqlite::params![PROJECTS_KEY, "{ not json"],
    )
    .unwrap();
    drop(conn);

    let catalog = ProjectCatalog::open(store);
    assert!(catalog.is_empty());
}
