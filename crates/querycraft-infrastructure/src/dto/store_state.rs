//! StoreState DTOs and migrations
//!
//! The persisted blob holds both collections and both selection pointers.
//! Nested entities have their own DTOs so the on-disk shape does not move
//! when the domain models do.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use version_migrate::{IntoDomain, Versioned};

use querycraft_core::conversation::{Conversation, Message, MessageRole};
use querycraft_core::project::{Project, UploadedFile};
use querycraft_core::state::StoreState;

/// Message role as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRoleDTO {
    User,
    Bot,
}

impl From<MessageRoleDTO> for MessageRole {
    fn from(dto: MessageRoleDTO) -> Self {
        match dto {
            MessageRoleDTO::User => MessageRole::User,
            MessageRoleDTO::Bot => MessageRole::Bot,
        }
    }
}

impl From<MessageRole> for MessageRoleDTO {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => MessageRoleDTO::User,
            MessageRole::Bot => MessageRoleDTO::Bot,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDTO {
    pub id: String,
    pub content: String,
    pub role: MessageRoleDTO,
    pub timestamp: DateTime<Utc>,
}

impl From<MessageDTO> for Message {
    fn from(dto: MessageDTO) -> Self {
        Message {
            id: dto.id,
            content: dto.content,
            role: dto.role.into(),
            timestamp: dto.timestamp,
        }
    }
}

impl From<Message> for MessageDTO {
    fn from(message: Message) -> Self {
        MessageDTO {
            id: message.id,
            content: message.content,
            role: message.role.into(),
            timestamp: message.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDTO {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub messages: Vec<MessageDTO>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub created: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl From<ConversationDTO> for Conversation {
    fn from(dto: ConversationDTO) -> Self {
        Conversation {
            id: dto.id,
            name: dto.name,
            messages: dto.messages.into_iter().map(Into::into).collect(),
            project_id: dto.project_id,
            created: dto.created,
            last_updated: dto.last_updated,
        }
    }
}

impl From<Conversation> for ConversationDTO {
    fn from(conversation: Conversation) -> Self {
        ConversationDTO {
            id: conversation.id,
            name: conversation.name,
            messages: conversation.messages.into_iter().map(Into::into).collect(),
            project_id: conversation.project_id,
            created: conversation.created,
            last_updated: conversation.last_updated,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFileDTO {
    pub id: String,
    pub name: String,
    /// MIME type
    #[serde(rename = "type")]
    pub file_type: String,
    pub size: u64,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub upload_date: DateTime<Utc>,
}

impl From<UploadedFileDTO> for UploadedFile {
    fn from(dto: UploadedFileDTO) -> Self {
        UploadedFile {
            id: dto.id,
            name: dto.name,
            file_type: dto.file_type,
            size: dto.size,
            url: dto.url,
            project_id: dto.project_id,
            upload_date: dto.upload_date,
        }
    }
}

impl From<UploadedFile> for UploadedFileDTO {
    fn from(file: UploadedFile) -> Self {
        UploadedFileDTO {
            id: file.id,
            name: file.name,
            file_type: file.file_type,
            size: file.size,
            url: file.url,
            project_id: file.project_id,
            upload_date: file.upload_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDTO {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub conversations: Vec<String>,
    #[serde(default)]
    pub files: Vec<UploadedFileDTO>,
}

impl From<ProjectDTO> for Project {
    fn from(dto: ProjectDTO) -> Self {
        Project {
            id: dto.id,
            name: dto.name,
            description: dto.description,
            created: dto.created,
            last_updated: dto.last_updated,
            conversations: dto.conversations,
            files: dto.files.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Project> for ProjectDTO {
    fn from(project: Project) -> Self {
        ProjectDTO {
            id: project.id,
            name: project.name,
            description: project.description,
            created: project.created,
            last_updated: project.last_updated,
            conversations: project.conversations,
            files: project.files.into_iter().map(Into::into).collect(),
        }
    }
}

/// Store state V1.0.0 (initial version).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
#[serde(rename_all = "camelCase")]
pub struct StoreStateV1_0_0 {
    #[serde(default)]
    pub conversations: Vec<ConversationDTO>,
    #[serde(default)]
    pub projects: Vec<ProjectDTO>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_project_id: Option<String>,
}

// ============================================================================
// Domain model conversions
// ============================================================================

impl IntoDomain<StoreState> for StoreStateV1_0_0 {
    fn into_domain(self) -> StoreState {
        StoreState {
            conversations: self.conversations.into_iter().map(Into::into).collect(),
            projects: self.projects.into_iter().map(Into::into).collect(),
            current_conversation_id: self.current_conversation_id,
            selected_project_id: self.selected_project_id,
        }
    }
}

impl version_migrate::FromDomain<StoreState> for StoreStateV1_0_0 {
    fn from_domain(state: StoreState) -> Self {
        StoreStateV1_0_0 {
            conversations: state.conversations.into_iter().map(Into::into).collect(),
            projects: state.projects.into_iter().map(Into::into).collect(),
            current_conversation_id: state.current_conversation_id,
            selected_project_id: state.selected_project_id,
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Schema versions the store_state migration path can read.
///
/// Files tagged with anything else were written by a newer build and must
/// not be loaded, since the next save would drop the fields this build
/// does not know.
pub const STORE_STATE_VERSIONS: &[&str] = &[StoreStateV1_0_0::VERSION];

/// Creates and configures a Migrator instance for StoreState entities.
///
/// # Migration Path
///
/// - V1.0.0 → StoreState: Converts DTO to domain model
///
/// # Example
///
/// ```ignore
/// let migrator = create_store_state_migrator();
/// let state: StoreState = migrator.load_flat_from("store_state", json_value)?;
/// ```
pub fn create_store_state_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let store_state_path = version_migrate::Migrator::define("store_state")
        .from::<StoreStateV1_0_0>()
        .into_with_save::<StoreState>();

    migrator
        .register(store_state_path)
        .expect("Failed to register store_state migration path");

    migrator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_state_migration_v1_0_0_to_domain() {
        let migrator = create_store_state_migrator();

        let json = serde_json::json!({
            "version": "1.0.0",
            "conversations": [{
                "id": "c1",
                "name": "New Conversation 1",
                "messages": [{
                    "id": "m1",
                    "content": "hello",
                    "role": "user",
                    "timestamp": "2024-05-01T10:00:00Z"
                }],
                "projectId": "p1",
                "created": "2024-05-01T09:59:00Z",
                "lastUpdated": "2024-05-01T10:00:00Z"
            }],
            "projects": [{
                "id": "p1",
                "name": "P1",
                "description": "d",
                "created": "2024-05-01T09:58:00Z",
                "lastUpdated": "2024-05-01T09:59:00Z",
                "conversations": ["c1"],
                "files": [{
                    "id": "f1",
                    "name": "cohort.vcf",
                    "type": "text/plain",
                    "size": 2048,
                    "url": "file:///data/cohort.vcf",
                    "projectId": "p1",
                    "uploadDate": "2024-05-01T09:59:30Z"
                }]
            }],
            "currentConversationId": "c1",
            "selectedProjectId": "p1"
        });

        let result: Result<StoreState, _> = migrator.load_flat_from("store_state", json);

        assert!(result.is_ok(), "Migration failed: {:?}", result.err());
        let state = result.unwrap();
        assert_eq!(state.conversations.len(), 1);
        assert_eq!(state.conversations[0].messages[0].role, MessageRole::User);
        assert_eq!(state.conversations[0].project_id.as_deref(), Some("p1"));
        assert_eq!(state.projects[0].conversations, vec!["c1".to_string()]);
        assert_eq!(state.projects[0].files[0].file_type, "text/plain");
        assert_eq!(state.current_conversation_id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_store_state_save_includes_version() {
        let migrator = create_store_state_migrator();

        let json_str = migrator
            .save_domain_flat("store_state", StoreState::default())
            .unwrap();

        assert!(json_str.contains("\"version\":\"1.0.0\""));
        assert!(json_str.contains("\"conversations\":[]"));
    }

    #[test]
    fn test_missing_pointers_load_as_none() {
        let migrator = create_store_state_migrator();
        let json = serde_json::json!({ "version": "1.0.0" });

        let state: StoreState = migrator.load_flat_from("store_state", json).unwrap();

        assert!(state.is_empty());
    }
}
