//! Store state domain model.
//!
//! The full state is persisted as one blob: both collections plus both
//! selection pointers. Uploaded files live inside their owning project.

use serde::{Deserialize, Serialize};

use crate::conversation::Conversation;
use crate::project::Project;

/// Everything the store owns, in the shape it is saved and restored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    /// All conversations, in creation order.
    #[serde(default)]
    pub conversations: Vec<Conversation>,
    /// All projects, in creation order.
    #[serde(default)]
    pub projects: Vec<Project>,
    /// ID of the conversation shown in the chat view.
    pub current_conversation_id: Option<String>,
    /// ID of the project selected in the sidebar.
    pub selected_project_id: Option<String>,
}

impl StoreState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there is nothing worth persisting.
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
            && self.projects.is_empty()
            && self.current_conversation_id.is_none()
            && self.selected_project_id.is_none()
    }
}
