//! Conversation domain model.

use super::message::Message;
use crate::id::short_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat thread between the user and the reply generator.
///
/// `project_id` is a weak back reference: it names a project, but the
/// conversation does not own that project's lifecycle. The store keeps it in
/// sync with the project's own `conversations` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Unique conversation identifier (UUID format)
    pub id: String,
    /// Human-readable conversation name
    pub name: String,
    /// Messages in chronological (insertion) order
    pub messages: Vec<Message>,
    /// Project this conversation is linked to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Creation time
    pub created: DateTime<Utc>,
    /// Time of the last change to this conversation
    pub last_updated: DateTime<Utc>,
}

impl Conversation {
    /// Name shown in listings; falls back to a short id when the name is empty.
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("Conversation {}", short_id(&self.id))
        } else {
            self.name.clone()
        }
    }

    /// Returns the most recent message, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// Partial update applied by `ConversationStore::update_conversation`.
///
/// Only fields set to `Some` are merged. `project_id` is routed through the
/// store's link/unlink operations: `Some(Some(id))` links, `Some(None)` unlinks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationUpdate {
    pub name: Option<String>,
    pub project_id: Option<Option<String>>,
}

impl ConversationUpdate {
    /// Update that only renames the conversation.
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}
