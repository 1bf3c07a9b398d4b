use std::sync::Arc;

use chrono::Utc;
use querycraft_core::config::StoreConfig;
use querycraft_core::conversation::MessageRole;
use querycraft_core::project::NewUploadedFile;
use querycraft_core::ConversationStore;
use querycraft_infrastructure::JsonStateRepository;
use tempfile::TempDir;

fn open_store(temp_dir: &TempDir) -> ConversationStore {
    let repo = Arc::new(JsonStateRepository::with_data_dir(temp_dir.path()));
    ConversationStore::load(repo, StoreConfig::default()).expect("Should load store")
}

#[test]
fn test_fresh_directory_starts_empty() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir);

    assert!(store.conversations().is_empty());
    assert!(store.projects().is_empty());
    assert!(store.current_conversation_id().is_none());
}

#[test]
fn test_every_mutation_is_written_through() {
    let temp_dir = TempDir::new().unwrap();

    let snapshot = {
        let mut store = open_store(&temp_dir);
        let project_id = store.create_project("Cohort", "PRS study");
        let conv_id = store.create_conversation(Some(project_id.as_str())).unwrap();
        store.add_message(&conv_id, "hello", MessageRole::User);
        store.add_message(&conv_id, "Hello! How can I help you today?", MessageRole::Bot);
        store
            .add_file(NewUploadedFile {
                name: "cohort.vcf".to_string(),
                file_type: "text/plain".to_string(),
                size: 4096,
                url: "file:///data/cohort.vcf".to_string(),
                project_id: Some(project_id.clone()),
                upload_date: Utc::now(),
            })
            .unwrap();
        store.snapshot()
    };

    // No explicit flush: the last mutation must already be on disk.
    let reopened = open_store(&temp_dir);

    assert_eq!(reopened.snapshot(), snapshot);
    assert_eq!(reopened.files().len(), 1);
    assert_eq!(reopened.conversations()[0].messages.len(), 2);
    assert!(reopened.check_consistency().is_empty());
}

#[test]
fn test_deletions_survive_reload() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut store = open_store(&temp_dir);
        let project_id = store.create_project("P", "");
        store.create_conversation(Some(project_id.as_str())).unwrap();
        store.delete_project(&project_id);
    }

    let reopened = open_store(&temp_dir);
    assert!(reopened.projects().is_empty());
    assert_eq!(reopened.conversations().len(), 1);
    assert!(reopened.conversations()[0].project_id.is_none());
    assert!(reopened.selected_project_id().is_none());
}

#[test]
fn test_unreadable_state_fails_load() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("query-craft-storage.json"),
        r#"{"version":"9.9.9"}"#,
    )
    .unwrap();

    let repo = Arc::new(JsonStateRepository::with_data_dir(temp_dir.path()));
    let result = ConversationStore::load(repo, StoreConfig::default());

    assert!(result.is_err_and(|e| e.is_migration()));
}
