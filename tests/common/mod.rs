use mvdirector::config::WorkflowConfig;
use mvdirector::domain::{ImageData, ReferenceImage};
use mvdirector::providers::FakeGateway;
use mvdirector::storage::SqliteProjectStore;
use mvdirector::workflow::Workflow;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn create_temp_store() -> (SqliteProjectStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("projects.db");
    let store =
        SqliteProjectStore::new_with_path(db_path).expect("failed to create sqlite store with path");
    (store, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Workflow backed by a shared fake gateway
#[allow(dead_code)]
pub fn fake_workflow() -> (Workflow, Arc<FakeGateway>) {
    fake_workflow_with(FakeGateway::new())
}

#[allow(dead_code)]
pub fn fake_workflow_with(gateway: FakeGateway) -> (Workflow, Arc<FakeGateway>) {
    let gateway = Arc::new(gateway);
    let workflow = Workflow::new(gateway.clone(), WorkflowConfig::default());
    (workflow, gateway)
}

#[allow(dead_code)]
pub fn reference_images(count: usize) -> Vec<ReferenceImage> {
    (0..count)
        .map(|i| ReferenceImage::new(ImageData::new(vec![i as u8; 4]), "image/png"))
        .collect()
}

/// Drive a fresh workflow to the character-sheet step with Mara sheet-ready
#[allow(dead_code)]
pub async fn workflow_at_character_sheet() -> (Workflow, Arc<FakeGateway>) {
    let (workflow, gateway) = fake_workflow();
    workflow
        .generate_initial_characters("Echoes", "I hear you in the static")
        .await
        .expect("initial characters");
    let mara = workflow.snapshot().characters[0].id;
    workflow
        .generate_sheet(mara, reference_images(2))
        .await
        .expect("sheet");
    (workflow, gateway)
}

/// Drive a fresh workflow all the way to the scenes step
#[allow(dead_code)]
pub async fn workflow_at_scenes() -> (Workflow, Arc<FakeGateway>) {
    let (workflow, gateway) = workflow_at_character_sheet().await;
    workflow.generate_concept().await.expect("concept");
    workflow.generate_scene_prompts().await.expect("scene prompts");
    (workflow, gateway)
}
