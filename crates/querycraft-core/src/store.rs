//! The conversation/project store.
//!
//! `ConversationStore` is the single source of truth for conversations,
//! projects and their files, plus the two selection pointers. Every mutating
//! operation runs to completion, keeps the conversation <-> project links
//! consistent, and then writes the whole state through the injected
//! [`StateRepository`].
//!
//! Operations that target a missing id are silent no-ops. The one exception
//! is [`LinkPolicy::Strict`], under which linking or attaching a file to a
//! missing target is rejected instead of leaving a half-applied link.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::config::{LinkPolicy, StoreConfig};
use crate::conversation::{Conversation, ConversationUpdate, Message, MessageRole};
use crate::error::{QueryCraftError, Result};
use crate::id::new_id;
use crate::project::{NewUploadedFile, Project, ProjectUpdate, UploadedFile};
use crate::state::{StateRepository, StoreState};

/// Owns all entity collections and keeps them consistent.
///
/// Constructed once at startup and passed by reference to whatever drives
/// it; there is no global instance.
pub struct ConversationStore {
    state: StoreState,
    repository: Arc<dyn StateRepository>,
    config: StoreConfig,
}

impl ConversationStore {
    /// Loads the saved state from `repository`, starting empty if nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the saved state exists but cannot be read.
    pub fn load(repository: Arc<dyn StateRepository>, config: StoreConfig) -> Result<Self> {
        let state = repository.load()?.unwrap_or_default();
        info!(
            conversations = state.conversations.len(),
            projects = state.projects.len(),
            "Loaded store state"
        );

        let store = Self::with_state(state, repository, config);
        for problem in store.check_consistency() {
            warn!("Inconsistent stored state: {}", problem);
        }
        Ok(store)
    }

    /// Wraps an existing state without reading from the repository.
    pub fn with_state(
        state: StoreState,
        repository: Arc<dyn StateRepository>,
        config: StoreConfig,
    ) -> Self {
        Self {
            state,
            repository,
            config,
        }
    }

    // ============================================================================
    // Read access
    // ============================================================================

    /// Returns a copy of the full state.
    pub fn snapshot(&self) -> StoreState {
        self.state.clone()
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.state.conversations
    }

    pub fn projects(&self) -> &[Project] {
        &self.state.projects
    }

    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.state.conversations.iter().find(|c| c.id == id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.state.projects.iter().find(|p| p.id == id)
    }

    pub fn current_conversation_id(&self) -> Option<&str> {
        self.state.current_conversation_id.as_deref()
    }

    pub fn selected_project_id(&self) -> Option<&str> {
        self.state.selected_project_id.as_deref()
    }

    pub fn current_conversation(&self) -> Option<&Conversation> {
        self.current_conversation_id()
            .and_then(|id| self.conversation(id))
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.selected_project_id().and_then(|id| self.project(id))
    }

    /// Conversations whose `project_id` points at `project_id`, in collection order.
    pub fn project_conversations(&self, project_id: &str) -> Vec<&Conversation> {
        self.state
            .conversations
            .iter()
            .filter(|c| c.project_id.as_deref() == Some(project_id))
            .collect()
    }

    /// All stored files across every project.
    pub fn files(&self) -> Vec<&UploadedFile> {
        self.state
            .projects
            .iter()
            .flat_map(|p| p.files.iter())
            .collect()
    }

    /// Up to `limit` projects, most recently updated first.
    pub fn recent_projects(&self, limit: usize) -> Vec<&Project> {
        let mut projects: Vec<&Project> = self.state.projects.iter().collect();
        projects.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        projects.truncate(limit);
        projects
    }

    /// Lists every violation of the link and selection invariants.
    ///
    /// An empty result means the state is consistent.
    pub fn check_consistency(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for conversation in &self.state.conversations {
            if let Some(project_id) = &conversation.project_id {
                match self.project(project_id) {
                    None => problems.push(format!(
                        "conversation '{}' points at missing project '{}'",
                        conversation.id, project_id
                    )),
                    Some(project) => {
                        let listed = project
                            .conversations
                            .iter()
                            .filter(|id| **id == conversation.id)
                            .count();
                        if listed != 1 {
                            problems.push(format!(
                                "project '{}' lists conversation '{}' {} times",
                                project.id, conversation.id, listed
                            ));
                        }
                    }
                }
            }
        }

        for project in &self.state.projects {
            for conversation_id in &project.conversations {
                let linked = self
                    .conversation(conversation_id)
                    .is_some_and(|c| c.project_id.as_deref() == Some(project.id.as_str()));
                if !linked {
                    problems.push(format!(
                        "project '{}' lists conversation '{}' which does not link back",
                        project.id, conversation_id
                    ));
                }
            }
        }

        if let Some(id) = self.current_conversation_id() {
            if self.conversation(id).is_none() {
                problems.push(format!("current conversation '{}' does not exist", id));
            }
        }
        if let Some(id) = self.selected_project_id() {
            if self.project(id).is_none() {
                problems.push(format!("selected project '{}' does not exist", id));
            }
        }

        problems
    }

    // ============================================================================
    // Conversations
    // ============================================================================

    /// Creates a conversation, makes it current and optionally links it to a project.
    ///
    /// The default name is `"New Conversation N"` where N is the collection
    /// size plus one; names can repeat after deletions.
    ///
    /// # Errors
    ///
    /// Only under [`LinkPolicy::Strict`], when `project_id` names a missing project.
    pub fn create_conversation(&mut self, project_id: Option<&str>) -> Result<String> {
        if let Some(project_id) = project_id {
            if self.config.link_policy == LinkPolicy::Strict && self.project(project_id).is_none() {
                return Err(QueryCraftError::not_found("project", project_id));
            }
        }

        let id = new_id();
        let now = Utc::now();
        let conversation = Conversation {
            id: id.clone(),
            name: format!("New Conversation {}", self.state.conversations.len() + 1),
            messages: Vec::new(),
            project_id: None,
            created: now,
            last_updated: now,
        };

        self.state.conversations.push(conversation);
        self.state.current_conversation_id = Some(id.clone());
        info!("Created conversation {}", id);

        if let Some(project_id) = project_id {
            self.link(&id, project_id)?;
        }

        self.persist();
        Ok(id)
    }

    /// Merges `update` into the conversation and refreshes its `last_updated`.
    ///
    /// A `project_id` in the update goes through link/unlink so both sides
    /// stay in sync. Silent no-op when the conversation does not exist.
    pub fn update_conversation(&mut self, id: &str, update: ConversationUpdate) {
        let Some(conversation) = self.conversation_mut(id) else {
            debug!("update_conversation: conversation {} not found", id);
            return;
        };

        if let Some(name) = update.name {
            conversation.name = name;
        }
        conversation.last_updated = Utc::now();

        match update.project_id {
            Some(Some(project_id)) => {
                if let Err(e) = self.link(id, &project_id) {
                    warn!("update_conversation: project change skipped: {}", e);
                }
            }
            Some(None) => {
                self.unlink(id);
            }
            None => {}
        }

        self.persist();
    }

    /// Removes a conversation and repairs every reference to it.
    ///
    /// If it was current, the first remaining conversation becomes current
    /// (or none if the collection is now empty).
    pub fn delete_conversation(&mut self, id: &str) {
        let Some(position) = self.state.conversations.iter().position(|c| c.id == id) else {
            debug!("delete_conversation: conversation {} not found", id);
            return;
        };

        let removed = self.state.conversations.remove(position);

        if self.state.current_conversation_id.as_deref() == Some(id) {
            self.state.current_conversation_id =
                self.state.conversations.first().map(|c| c.id.clone());
        }

        let now = Utc::now();
        for project in &mut self.state.projects {
            let before = project.conversations.len();
            project.conversations.retain(|c| c != id);
            if project.conversations.len() != before {
                project.last_updated = now;
            }
        }

        info!(
            "Deleted conversation {} ({} messages, project {:?})",
            id,
            removed.messages.len(),
            removed.project_id
        );
        self.persist();
    }

    /// Sets the current conversation pointer without validating it.
    pub fn set_current_conversation(&mut self, id: Option<&str>) {
        self.state.current_conversation_id = id.map(str::to_string);
        debug!("Current conversation set to {:?}", id);
        self.persist();
    }

    /// Appends a message to a conversation.
    ///
    /// Returns the new message id, or `None` if the conversation does not exist.
    pub fn add_message(
        &mut self,
        conversation_id: &str,
        content: impl Into<String>,
        role: MessageRole,
    ) -> Option<String> {
        let Some(conversation) = self.conversation_mut(conversation_id) else {
            debug!("add_message: conversation {} not found", conversation_id);
            return None;
        };

        let now = Utc::now();
        let message = Message {
            id: new_id(),
            content: content.into(),
            role,
            timestamp: now,
        };
        let message_id = message.id.clone();

        conversation.messages.push(message);
        conversation.last_updated = now;
        debug!(
            "Appended {} message {} to conversation {}",
            role, message_id, conversation_id
        );

        self.persist();
        Some(message_id)
    }

    // ============================================================================
    // Projects
    // ============================================================================

    /// Creates an empty project and selects it.
    pub fn create_project(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> String {
        let id = new_id();
        let now = Utc::now();
        let project = Project {
            id: id.clone(),
            name: name.into(),
            description: description.into(),
            created: now,
            last_updated: now,
            conversations: Vec::new(),
            files: Vec::new(),
        };

        info!("Created project {} ({})", id, project.name);
        self.state.projects.push(project);
        self.state.selected_project_id = Some(id.clone());

        self.persist();
        id
    }

    /// Merges `update` into the project and refreshes its `last_updated`.
    pub fn update_project(&mut self, id: &str, update: ProjectUpdate) {
        let Some(project) = self.project_mut(id) else {
            debug!("update_project: project {} not found", id);
            return;
        };

        if let Some(name) = update.name {
            project.name = name;
        }
        if let Some(description) = update.description {
            project.description = description;
        }
        project.last_updated = Utc::now();

        self.persist();
    }

    /// Removes a project, unlinking (not deleting) its conversations.
    pub fn delete_project(&mut self, id: &str) {
        let Some(position) = self.state.projects.iter().position(|p| p.id == id) else {
            debug!("delete_project: project {} not found", id);
            return;
        };

        let removed = self.state.projects.remove(position);

        let now = Utc::now();
        let mut unlinked = 0;
        for conversation in &mut self.state.conversations {
            if conversation.project_id.as_deref() == Some(id) {
                conversation.project_id = None;
                conversation.last_updated = now;
                unlinked += 1;
            }
        }

        if self.state.selected_project_id.as_deref() == Some(id) {
            self.state.selected_project_id = self.state.projects.first().map(|p| p.id.clone());
        }

        info!(
            "Deleted project {} ({} files dropped, {} conversations unlinked)",
            id,
            removed.files.len(),
            unlinked
        );
        self.persist();
    }

    /// Sets the selected project pointer without validating it.
    pub fn set_selected_project(&mut self, id: Option<&str>) {
        self.state.selected_project_id = id.map(str::to_string);
        debug!("Selected project set to {:?}", id);
        self.persist();
    }

    /// Links a conversation to a project on both sides.
    ///
    /// Idempotent. Moving a conversation to another project removes it from
    /// the previous project's list.
    ///
    /// # Errors
    ///
    /// Only under [`LinkPolicy::Strict`], when either side is missing.
    pub fn link_conversation_to_project(
        &mut self,
        conversation_id: &str,
        project_id: &str,
    ) -> Result<()> {
        self.link(conversation_id, project_id)?;
        self.persist();
        Ok(())
    }

    /// Clears a conversation's project link on both sides.
    ///
    /// Returns false if the conversation does not exist or was not linked.
    pub fn unlink_conversation_from_project(&mut self, conversation_id: &str) -> bool {
        let changed = self.unlink(conversation_id);
        if changed {
            self.persist();
        }
        changed
    }

    // ============================================================================
    // Files
    // ============================================================================

    /// Assigns an id to `file` and stores it in its project.
    ///
    /// Files without a project, or (leniently) naming a missing project, are
    /// not stored anywhere; the id is returned regardless.
    ///
    /// # Errors
    ///
    /// Only under [`LinkPolicy::Strict`], when `project_id` names a missing project.
    pub fn add_file(&mut self, file: NewUploadedFile) -> Result<String> {
        let id = new_id();

        let Some(project_id) = file.project_id.clone() else {
            debug!("add_file: file {} has no project, not stored", id);
            return Ok(id);
        };

        let strict = self.config.link_policy == LinkPolicy::Strict;
        let Some(project) = self.project_mut(&project_id) else {
            if strict {
                return Err(QueryCraftError::not_found("project", project_id));
            }
            warn!(
                "add_file: project {} not found, file {} ({}) dropped",
                project_id, id, file.name
            );
            return Ok(id);
        };

        info!("Added file {} ({}) to project {}", id, file.name, project_id);
        project.files.push(file.with_id(id.clone()));
        project.last_updated = Utc::now();

        self.persist();
        Ok(id)
    }

    /// Removes the file from every project that holds it.
    ///
    /// Returns true if anything was removed.
    pub fn remove_file(&mut self, file_id: &str) -> bool {
        let now = Utc::now();
        let mut removed = false;

        for project in &mut self.state.projects {
            let before = project.files.len();
            project.files.retain(|f| f.id != file_id);
            if project.files.len() != before {
                project.last_updated = now;
                removed = true;
            }
        }

        if removed {
            info!("Removed file {}", file_id);
            self.persist();
        } else {
            debug!("remove_file: file {} not found", file_id);
        }
        removed
    }

    // ============================================================================
    // Persistence
    // ============================================================================

    /// Writes the current state now and reports the outcome.
    pub fn flush(&self) -> Result<()> {
        self.repository.save(&self.state)
    }

    /// Write-back after a mutation. Failures leave the in-memory state intact.
    fn persist(&self) {
        if let Err(e) = self.repository.save(&self.state) {
            error!("Failed to persist store state: {}", e);
        }
    }

    // ============================================================================
    // Internal helpers
    // ============================================================================

    fn conversation_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.state.conversations.iter_mut().find(|c| c.id == id)
    }

    fn project_mut(&mut self, id: &str) -> Option<&mut Project> {
        self.state.projects.iter_mut().find(|p| p.id == id)
    }

    /// Two independent updates: the conversation side, then the project side.
    fn link(&mut self, conversation_id: &str, project_id: &str) -> Result<()> {
        if self.config.link_policy == LinkPolicy::Strict {
            if self.conversation(conversation_id).is_none() {
                return Err(QueryCraftError::not_found("conversation", conversation_id));
            }
            if self.project(project_id).is_none() {
                return Err(QueryCraftError::not_found("project", project_id));
            }
        }

        let now = Utc::now();

        let previous = match self.conversation_mut(conversation_id) {
            Some(conversation) => {
                let previous = conversation.project_id.replace(project_id.to_string());
                conversation.last_updated = now;
                previous
            }
            None => {
                warn!(
                    "link: conversation {} not found, project side only",
                    conversation_id
                );
                None
            }
        };

        if let Some(previous) = previous.filter(|p| p != project_id) {
            if let Some(old_project) = self.project_mut(&previous) {
                old_project.conversations.retain(|c| c != conversation_id);
                old_project.last_updated = now;
            }
        }

        match self.project_mut(project_id) {
            Some(project) => {
                if !project.has_conversation(conversation_id) {
                    project.conversations.push(conversation_id.to_string());
                    project.last_updated = now;
                }
            }
            None => warn!(
                "link: project {} not found, conversation {} keeps a dangling project reference",
                project_id, conversation_id
            ),
        }

        debug!("Linked conversation {} to project {}", conversation_id, project_id);
        Ok(())
    }

    fn unlink(&mut self, conversation_id: &str) -> bool {
        let now = Utc::now();
        let Some(project_id) = self
            .conversation_mut(conversation_id)
            .and_then(|c| {
                let previous = c.project_id.take();
                if previous.is_some() {
                    c.last_updated = now;
                }
                previous
            })
        else {
            return false;
        };

        if let Some(project) = self.project_mut(&project_id) {
            project.conversations.retain(|c| c != conversation_id);
            project.last_updated = now;
        }

        debug!(
            "Unlinked conversation {} from project {}",
            conversation_id, project_id
        );
        true
    }
}
