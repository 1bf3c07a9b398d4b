use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use querycraft_core::config::{LinkPolicy, StoreConfig};
use querycraft_core::conversation::MessageRole;
use querycraft_core::error::Result;
use querycraft_core::state::{StateRepository, StoreState};
use querycraft_core::ConversationStore;

/// Keeps the last saved state as serialized JSON, like a storage slot.
#[derive(Default)]
struct SlotRepository {
    slot: Mutex<Option<String>>,
}

impl StateRepository for SlotRepository {
    fn load(&self) -> Result<Option<StoreState>> {
        match self.slot.lock().unwrap().as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, state: &StoreState) -> Result<()> {
        *self.slot.lock().unwrap() = Some(serde_json::to_string(state)?);
        Ok(())
    }
}

fn open(repo: &Arc<SlotRepository>) -> ConversationStore {
    ConversationStore::load(repo.clone(), StoreConfig::default()).expect("Should load store")
}

#[test]
fn test_created_ids_are_unique() {
    let repo = Arc::new(SlotRepository::default());
    let mut store = open(&repo);

    let mut conversation_ids = HashSet::new();
    let mut project_ids = HashSet::new();
    for i in 0..50 {
        assert!(conversation_ids.insert(store.create_conversation(None).unwrap()));
        assert!(project_ids.insert(store.create_project(format!("P{}", i), "")));
    }

    assert_eq!(store.conversations().len(), 50);
    assert_eq!(store.projects().len(), 50);
}

#[test]
fn test_project_with_conversation_scenario() {
    let repo = Arc::new(SlotRepository::default());
    let mut store = open(&repo);

    let project_id = store.create_project("P1", "d");
    let conv_id = store.create_conversation(Some(project_id.as_str())).unwrap();

    assert_eq!(store.projects().len(), 1);
    assert_eq!(store.projects()[0].name, "P1");
    assert_eq!(store.projects()[0].description, "d");
    assert_eq!(store.projects()[0].conversations, vec![conv_id]);
    assert_eq!(
        store.conversations()[0].project_id.as_deref(),
        Some(project_id.as_str())
    );
}

#[test]
fn test_message_order_scenario() {
    let repo = Arc::new(SlotRepository::default());
    let mut store = open(&repo);

    let conv_id = store.create_conversation(None).unwrap();
    store.add_message(&conv_id, "hello", MessageRole::User);
    store.add_message(&conv_id, "hi", MessageRole::Bot);

    let messages = &store.conversations()[0].messages;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[1].role, MessageRole::Bot);
    assert_eq!(messages[1].content, "hi");
}

#[test]
fn test_delete_project_scenario() {
    let repo = Arc::new(SlotRepository::default());
    let mut store = open(&repo);

    let project_id = store.create_project("P", "");
    let conv_id = store.create_conversation(Some(project_id.as_str())).unwrap();
    store.add_message(&conv_id, "keep me", MessageRole::User);

    store.delete_project(&project_id);

    let conversation = &store.conversations()[0];
    assert_eq!(conversation.id, conv_id);
    assert!(conversation.project_id.is_none());
    assert_eq!(conversation.messages.len(), 1);
    assert_eq!(conversation.messages[0].content, "keep me");
    assert!(store.projects().iter().all(|p| p.id != project_id));
}

#[test]
fn test_state_survives_reopen() {
    let repo = Arc::new(SlotRepository::default());
    let snapshot = {
        let mut store = open(&repo);
        let project_id = store.create_project("Cohort", "UK Biobank subset");
        let conv_id = store.create_conversation(Some(project_id.as_str())).unwrap();
        store.add_message(&conv_id, "what is a prs?", MessageRole::User);
        store.create_conversation(None).unwrap();
        store.snapshot()
    };

    let reopened = open(&repo);

    assert_eq!(reopened.snapshot(), snapshot);
    assert_eq!(
        reopened.current_conversation_id(),
        snapshot.current_conversation_id.as_deref()
    );
    assert!(reopened.check_consistency().is_empty());
}

#[test]
fn test_mixed_sequence_keeps_invariants() {
    let repo = Arc::new(SlotRepository::default());
    let mut store = open(&repo);

    let a = store.create_project("A", "");
    let b = store.create_project("B", "");
    let c1 = store.create_conversation(Some(a.as_str())).unwrap();
    let c2 = store.create_conversation(Some(a.as_str())).unwrap();
    let c3 = store.create_conversation(None).unwrap();
    assert!(store.check_consistency().is_empty());

    store.link_conversation_to_project(&c3, &b).unwrap();
    store.link_conversation_to_project(&c1, &b).unwrap();
    assert!(store.check_consistency().is_empty());

    store.delete_conversation(&c2);
    store.delete_project(&b);
    assert!(store.check_consistency().is_empty());

    assert!(store.project(&a).unwrap().conversations.is_empty());
    assert!(store.conversation(&c1).unwrap().project_id.is_none());
    assert!(store.conversation(&c3).unwrap().project_id.is_none());
    assert_eq!(store.selected_project_id(), Some(a.as_str()));
}

#[test]
fn test_strict_policy_never_opens_inconsistency() {
    let repo = Arc::new(SlotRepository::default());
    let mut store = ConversationStore::load(
        repo.clone(),
        StoreConfig {
            link_policy: LinkPolicy::Strict,
        },
    )
    .unwrap();

    let conv_id = store.create_conversation(None).unwrap();
    let before = store.snapshot();

    assert!(store.link_conversation_to_project(&conv_id, "missing").is_err());
    assert!(store.create_conversation(Some("missing")).is_err());

    assert_eq!(store.snapshot(), before);
    assert!(store.check_consistency().is_empty());
}
