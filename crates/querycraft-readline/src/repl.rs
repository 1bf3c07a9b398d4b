//! Executes parsed commands against the store.
//!
//! Rendering is left to the caller: every command produces a list of
//! [`Output`] lines, which keeps this module free of terminal concerns.

use querycraft_application::ChatUseCase;
use querycraft_core::ConversationStore;
use querycraft_core::conversation::MessageRole;
use querycraft_core::error::{QueryCraftError, Result};
use querycraft_core::id::short_id;

use crate::command::{self, Command};

/// One line of REPL output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Message from the bot.
    Reply(String),
    /// Message typed by the user (history replay).
    User(String),
    /// Status or confirmation text.
    Info(String),
    /// Row of a listing; `active` marks the current/selected entry.
    Entry { active: bool, text: String },
    Quit,
}

pub struct Repl {
    store: ConversationStore,
    chat: ChatUseCase,
}

impl Repl {
    pub fn new(store: ConversationStore, chat: ChatUseCase) -> Self {
        Self { store, chat }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Prompt showing the current conversation and selected project.
    pub fn prompt(&self) -> String {
        let conversation = self
            .store
            .current_conversation()
            .map(|c| c.display_name())
            .unwrap_or_else(|| "no conversation".to_string());
        match self.store.selected_project() {
            Some(project) => format!("[{} | {}] >> ", project.display_name(), conversation),
            None => format!("[{}] >> ", conversation),
        }
    }

    /// Picks or creates a conversation so plain text has somewhere to go.
    pub fn start(&mut self) -> Result<String> {
        self.chat.ensure_active_conversation(&mut self.store)
    }

    pub async fn execute(&mut self, command: Command) -> Result<Vec<Output>> {
        match command {
            Command::Say(text) => {
                let exchange = self.chat.send_message(&mut self.store, &text).await?;
                Ok(vec![Output::Reply(exchange.reply)])
            }
            Command::New { project } => {
                let project_id = project
                    .map(|prefix| self.resolve_project(&prefix))
                    .transpose()?;
                let id = self.store.create_conversation(project_id.as_deref())?;
                Ok(vec![info(format!("Started conversation {}", short_id(&id)))])
            }
            Command::List => Ok(self.list_conversations()),
            Command::Switch(prefix) => {
                let id = self.resolve_conversation(&prefix)?;
                self.store.set_current_conversation(Some(id.as_str()));
                Ok(vec![info(format!("Switched to {}", self.conversation_name(&id)))])
            }
            Command::Rename(name) => {
                let id = self.current_conversation_id()?;
                self.chat.rename_conversation(&mut self.store, &id, &name)?;
                Ok(vec![info(format!("Renamed to {}", name.trim()))])
            }
            Command::Delete(prefix) => {
                let id = match prefix {
                    Some(prefix) => self.resolve_conversation(&prefix)?,
                    None => self.current_conversation_id()?,
                };
                let name = self.conversation_name(&id);
                self.store.delete_conversation(&id);
                Ok(vec![info(format!("Deleted {}", name))])
            }
            Command::History => self.history(),
            Command::ProjectNew { name, description } => {
                let id = self.chat.create_project(&mut self.store, &name, &description)?;
                Ok(vec![info(format!(
                    "Created project {} ({})",
                    name.trim(),
                    short_id(&id)
                ))])
            }
            Command::ProjectDelete(prefix) => {
                let id = self.resolve_project(&prefix)?;
                let linked = self.store.project_conversations(&id).len();
                self.store.delete_project(&id);
                Ok(vec![info(format!(
                    "Deleted project {} ({} conversations unlinked)",
                    short_id(&id),
                    linked
                ))])
            }
            Command::Projects => Ok(self.list_projects()),
            Command::Select(prefix) => {
                let id = self.resolve_project(&prefix)?;
                self.store.set_selected_project(Some(id.as_str()));
                Ok(vec![info(format!("Selected project {}", self.project_name(&id)))])
            }
            Command::Link(prefix) => {
                let conversation_id = self.current_conversation_id()?;
                let project_id = self.resolve_project(&prefix)?;
                self.store
                    .link_conversation_to_project(&conversation_id, &project_id)?;
                Ok(vec![info(format!(
                    "Linked to project {}",
                    self.project_name(&project_id)
                ))])
            }
            Command::Unlink => {
                let id = self.current_conversation_id()?;
                let message = if self.store.unlink_conversation_from_project(&id) {
                    "Unlinked from project"
                } else {
                    "Conversation is not linked to a project"
                };
                Ok(vec![info(message)])
            }
            Command::FileAdd { name, size, url } => {
                let project_id = self.selected_project_id()?;
                let id = self
                    .chat
                    .upload_file(&mut self.store, &project_id, &name, size, &url)?;
                Ok(vec![info(format!("Added {} ({})", name, short_id(&id)))])
            }
            Command::FileRemove(prefix) => {
                let id = resolve_prefix(
                    "file",
                    self.store.files().iter().map(|f| f.id.as_str()),
                    &prefix,
                )?;
                self.store.remove_file(&id);
                Ok(vec![info(format!("Removed file {}", short_id(&id)))])
            }
            Command::Files => self.list_files(),
            Command::Help => Ok(command::help_lines().into_iter().map(info).collect()),
            Command::Quit => Ok(vec![Output::Quit]),
        }
    }

    fn list_conversations(&self) -> Vec<Output> {
        if self.store.conversations().is_empty() {
            return vec![info("No conversations")];
        }
        let current = self.store.current_conversation_id();
        self.store
            .conversations()
            .iter()
            .map(|c| {
                let project = c
                    .project_id
                    .as_deref()
                    .map(|id| format!(" [{}]", self.project_name(id)))
                    .unwrap_or_default();
                let last = c
                    .last_message()
                    .map(|m| format!("  {}", preview(&m.content)))
                    .unwrap_or_default();
                Output::Entry {
                    active: current == Some(c.id.as_str()),
                    text: format!(
                        "{}  {}{}  ({} messages){}",
                        short_id(&c.id),
                        c.display_name(),
                        project,
                        c.messages.len(),
                        last
                    ),
                }
            })
            .collect()
    }

    fn list_projects(&self) -> Vec<Output> {
        if self.store.projects().is_empty() {
            return vec![info("No projects")];
        }
        let selected = self.store.selected_project_id();
        self.store
            .projects()
            .iter()
            .map(|p| Output::Entry {
                active: selected == Some(p.id.as_str()),
                text: format!(
                    "{}  {}  ({} conversations, {} files){}",
                    short_id(&p.id),
                    p.display_name(),
                    p.conversations.len(),
                    p.files.len(),
                    if p.description.is_empty() {
                        String::new()
                    } else {
                        format!(" - {}", p.description)
                    }
                ),
            })
            .collect()
    }

    fn list_files(&self) -> Result<Vec<Output>> {
        let project_id = self.selected_project_id()?;
        let files = self
            .store
            .project(&project_id)
            .map(|p| p.files.as_slice())
            .unwrap_or_default();
        if files.is_empty() {
            return Ok(vec![info("No files")]);
        }
        Ok(files
            .iter()
            .map(|f| Output::Entry {
                active: false,
                text: format!(
                    "{}  {}  {}  {} bytes  {}",
                    short_id(&f.id),
                    f.name,
                    f.file_type,
                    f.size,
                    f.upload_date.format("%Y-%m-%d %H:%M")
                ),
            })
            .collect())
    }

    fn history(&self) -> Result<Vec<Output>> {
        let conversation = self
            .store
            .current_conversation()
            .ok_or_else(|| QueryCraftError::validation("No current conversation"))?;
        if conversation.messages.is_empty() {
            return Ok(vec![info("No messages yet")]);
        }
        Ok(conversation
            .messages
            .iter()
            .map(|m| match m.role {
                MessageRole::User => Output::User(m.content.clone()),
                MessageRole::Bot => Output::Reply(m.content.clone()),
            })
            .collect())
    }

    fn current_conversation_id(&self) -> Result<String> {
        self.store
            .current_conversation()
            .map(|c| c.id.clone())
            .ok_or_else(|| QueryCraftError::validation("No current conversation"))
    }

    fn selected_project_id(&self) -> Result<String> {
        self.store
            .selected_project()
            .map(|p| p.id.clone())
            .ok_or_else(|| QueryCraftError::validation("No project selected. Use /select <id>"))
    }

    fn resolve_conversation(&self, prefix: &str) -> Result<String> {
        resolve_prefix(
            "conversation",
            self.store.conversations().iter().map(|c| c.id.as_str()),
            prefix,
        )
    }

    fn resolve_project(&self, prefix: &str) -> Result<String> {
        resolve_prefix(
            "project",
            self.store.projects().iter().map(|p| p.id.as_str()),
            prefix,
        )
    }

    fn conversation_name(&self, id: &str) -> String {
        self.store
            .conversation(id)
            .map(|c| c.display_name())
            .unwrap_or_else(|| short_id(id))
    }

    fn project_name(&self, id: &str) -> String {
        self.store
            .project(id)
            .map(|p| p.display_name())
            .unwrap_or_else(|| short_id(id))
    }
}

fn info(text: impl Into<String>) -> Output {
    Output::Info(text.into())
}

/// First line of a message, cut to fit a listing row.
fn preview(content: &str) -> String {
    const MAX_CHARS: usize = 40;
    let line = content.lines().next().unwrap_or_default();
    if line.chars().count() > MAX_CHARS {
        format!("{}...", line.chars().take(MAX_CHARS).collect::<String>())
    } else {
        line.to_string()
    }
}

/// Exact id match wins; otherwise the prefix must match exactly one id.
fn resolve_prefix<'a>(
    entity_type: &'static str,
    ids: impl Iterator<Item = &'a str>,
    prefix: &str,
) -> Result<String> {
    let matches: Vec<&str> = ids.filter(|id| id.starts_with(prefix)).collect();
    if let Some(exact) = matches.iter().find(|id| **id == prefix) {
        return Ok(exact.to_string());
    }
    match matches.as_slice() {
        [] => Err(QueryCraftError::not_found(entity_type, prefix)),
        [only] => Ok(only.to_string()),
        _ => Err(QueryCraftError::validation(format!(
            "'{}' matches {} {}s, type more characters",
            prefix,
            matches.len(),
            entity_type
        ))),
    }
}
