use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::short_id;

/// A named container for related conversations and files.
///
/// `conversations` lists conversation ids without owning them: deleting a
/// project unlinks its conversations but never deletes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project identifier (UUID format)
    pub id: String,
    /// Project name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Creation time
    pub created: DateTime<Utc>,
    /// Time of the last change to this project
    pub last_updated: DateTime<Utc>,
    /// Ids of the conversations linked to this project
    pub conversations: Vec<String>,
    /// Files owned by this project, in upload order
    pub files: Vec<UploadedFile>,
}

impl Project {
    /// Name shown in listings; falls back to a short id when the name is empty.
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("Project {}", short_id(&self.id))
        } else {
            self.name.clone()
        }
    }

    /// Returns true if the project lists the given conversation.
    pub fn has_conversation(&self, conversation_id: &str) -> bool {
        self.conversations.iter().any(|id| id == conversation_id)
    }
}

/// Partial update applied by `ConversationStore::update_project`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Represents a file attached to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Unique identifier for the uploaded file
    pub id: String,
    /// Original filename
    pub name: String,
    /// MIME type of the file
    #[serde(rename = "type")]
    pub file_type: String,
    /// File size in bytes
    pub size: u64,
    /// Location of the file contents
    pub url: String,
    /// Owning project, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Timestamp when the file was uploaded
    pub upload_date: DateTime<Utc>,
}

/// An uploaded file before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUploadedFile {
    pub name: String,
    pub file_type: String,
    pub size: u64,
    pub url: String,
    pub project_id: Option<String>,
    pub upload_date: DateTime<Utc>,
}

impl NewUploadedFile {
    pub(crate) fn with_id(self, id: String) -> UploadedFile {
        UploadedFile {
            id,
            name: self.name,
            file_type: self.file_type,
            size: self.size,
            url: self.url,
            project_id: self.project_id,
            upload_date: self.upload_date,
        }
    }
}
