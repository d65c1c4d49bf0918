//! End-to-end tests for the `mvdirector` binary

mod common;

use assert_cmd::Command;
use common::temp_config_file;
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONFIG: &str = "workflow:\n  scene_count: 20\n";

/// Command with an isolated config, catalog and environment
fn mvdirector(config: &Path, db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mvdirector").unwrap();
    cmd.env_remove("GEMINI_API_KEY")
        .env_remove("API_KEY")
        .env_remove("MVDIRECTOR_DB")
        .env_remove("MVDIRECTOR_GEMINI_API_BASE")
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg(config)
        .arg("--db")
        .arg(db);
    cmd
}

fn lyrics_file(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("lyrics.txt");
    std::fs::write(&path, "I hear you in the static\nCalling out my name").unwrap();
    path
}

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("mvdirector").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("projects"))
        .stdout(predicate::str::contains("thumbnail"));
}

#[test]
fn test_projects_list_on_empty_catalog() {
    let (dir, config) = temp_config_file(CONFIG);
    let db = dir.path().join("projects.db");

    mvdirector(&config, &db)
        .args(["projects", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved projects found."));
}

#[test]
fn test_malformed_project_id_is_rejected() {
    let (dir, config) = temp_config_file(CONFIG);
    let db = dir.path().join("projects.db");

    mvdirector(&config, &db)
        .args(["show", "not-a-project"])
        .assert()
        .failure();
}

#[test]
fn test_unknown_project_is_reported() {
    let (dir, config) = temp_config_file(CONFIG);
    let db = dir.path().join("projects.db");

    mvdirector(&config, &db)
        .args(["show", "01HZX3J4K5M6N7P8Q9R0S1T2V3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));
}

#[test]
fn test_new_without_api_key_fails_with_message() {
    let (dir, config) = temp_config_file(CONFIG);
    let db = dir.path().join("projects.db");
    let lyrics = lyrics_file(&dir);

    mvdirector(&config, &db)
        .args(["new", "--title", "Echoes", "--lyrics-file"])
        .arg(&lyrics)
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key not set"));
}

#[test]
fn test_new_with_missing_lyrics_file_fails() {
    let (dir, config) = temp_config_file(CONFIG);
    let db = dir.path().join("projects.db");

    mvdirector(&config, &db)
        .env("GEMINI_API_KEY", "test-key")
        .args(["new", "--title", "Echoes", "--lyrics-file"])
        .arg(dir.path().join("missing.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read lyrics"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let (dir, config) = temp_config_file("gemini:\n  api_base: \"not a url\"\n");
    let db = dir.path().join("projects.db");

    mvdirector(&config, &db)
        .args(["projects", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_new_project_is_saved_and_listed() {
    let server = MockServer::start().await;
    let payload = json!({
        "characters": [
            { "name": "Mara", "description": "A restless drifter" },
            { "name": "Ike", "description": "A quiet mechanic" }
        ]
    });
    Mock::given(method("POST"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": payload.to_string() }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (dir, config) = temp_config_file(CONFIG);
    let db = dir.path().join("projects.db");
    let lyrics = lyrics_file(&dir);

    mvdirector(&config, &db)
        .env("GEMINI_API_KEY", "test-key")
        .env("MVDIRECTOR_GEMINI_API_BASE", server.uri())
        .args(["new", "--title", "Echoes", "--aspect", "9:16", "--lyrics-file"])
        .arg(&lyrics)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created project"))
        .stdout(predicate::str::contains("Mara"));

    mvdirector(&config, &db)
        .args(["projects", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Echoes"))
        .stdout(predicate::str::contains("2 characters"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_generation_still_saves_project() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (dir, config) = temp_config_file(CONFIG);
    let db = dir.path().join("projects.db");
    let lyrics = lyrics_file(&dir);

    mvdirector(&config, &db)
        .env("GEMINI_API_KEY", "test-key")
        .env("MVDIRECTOR_GEMINI_API_BASE", server.uri())
        .args(["new", "--title", "Static", "--lyrics-file"])
        .arg(&lyrics)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Created project"))
        .stderr(predicate::str::contains("Failed to generate initial characters."));

    mvdirector(&config, &db)
        .args(["projects", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Static"))
        .stdout(predicate::str::contains("1 input"));
}
