//! Chat use case implementation.
//!
//! `ChatUseCase` is what a front-end calls instead of poking the store
//! directly when user input is involved. The store accepts anything; this
//! layer rejects empty names and messages and unsupported uploads.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use querycraft_core::ConversationStore;
use querycraft_core::config::ReplyConfig;
use querycraft_core::conversation::{ConversationUpdate, MessageRole};
use querycraft_core::error::{QueryCraftError, Result};
use querycraft_core::project::NewUploadedFile;
use querycraft_core::reply::ReplyGenerator;
use querycraft_interaction::reply_generator_for;
use tracing::{debug, info};

/// Extensions accepted by [`ChatUseCase::upload_file`] (genomic data formats).
pub const ALLOWED_FILE_EXTENSIONS: &[&str] = &[
    "vcf", "bed", "bim", "fam", "plink", "pgen", "psam", "pvar", "csv", "txt",
];

/// Result of one send/reply round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatExchange {
    pub conversation_id: String,
    pub user_message_id: String,
    pub bot_message_id: String,
    pub reply: String,
}

/// Use case for chatting and managing conversations from a front-end.
pub struct ChatUseCase {
    reply_generator: Arc<dyn ReplyGenerator>,
    reply_delay: Duration,
}

impl ChatUseCase {
    pub fn new(reply_generator: Arc<dyn ReplyGenerator>, reply_delay: Duration) -> Self {
        Self {
            reply_generator,
            reply_delay,
        }
    }

    /// Builds the use case with the configured reply style and delay.
    pub fn from_config(config: &ReplyConfig) -> Self {
        Self::new(
            reply_generator_for(config.style),
            Duration::from_millis(config.delay_ms),
        )
    }

    /// Makes sure there is a current conversation and returns its id.
    ///
    /// Creates one when the store is empty; otherwise selects the first
    /// conversation if nothing valid is current.
    pub fn ensure_active_conversation(&self, store: &mut ConversationStore) -> Result<String> {
        if let Some(current) = store.current_conversation() {
            return Ok(current.id.clone());
        }

        match store.conversations().first().map(|c| c.id.clone()) {
            Some(first) => {
                debug!("No current conversation, selecting {}", first);
                store.set_current_conversation(Some(first.as_str()));
                Ok(first)
            }
            None => store.create_conversation(None),
        }
    }

    /// Appends the user's message, waits for the reply and appends it too.
    ///
    /// If the generator fails, the user message stays in the conversation.
    ///
    /// # Errors
    ///
    /// `Validation` for empty or whitespace-only text, or whatever the
    /// reply generator returns.
    pub async fn send_message(
        &self,
        store: &mut ConversationStore,
        text: &str,
    ) -> Result<ChatExchange> {
        if text.trim().is_empty() {
            return Err(QueryCraftError::validation("Message cannot be empty"));
        }

        let conversation_id = self.ensure_active_conversation(store)?;
        let user_message_id = store
            .add_message(&conversation_id, text, MessageRole::User)
            .ok_or_else(|| QueryCraftError::not_found("conversation", conversation_id.as_str()))?;

        if !self.reply_delay.is_zero() {
            tokio::time::sleep(self.reply_delay).await;
        }

        let reply = self.reply_generator.generate_reply(text).await?;
        let bot_message_id = store
            .add_message(&conversation_id, reply.as_str(), MessageRole::Bot)
            .ok_or_else(|| QueryCraftError::not_found("conversation", conversation_id.as_str()))?;

        debug!("Exchange completed in conversation {}", conversation_id);
        Ok(ChatExchange {
            conversation_id,
            user_message_id,
            bot_message_id,
            reply,
        })
    }

    /// Renames a conversation after trimming the new name.
    pub fn rename_conversation(
        &self,
        store: &mut ConversationStore,
        conversation_id: &str,
        name: &str,
    ) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QueryCraftError::validation("Conversation name cannot be empty"));
        }
        if store.conversation(conversation_id).is_none() {
            return Err(QueryCraftError::not_found("conversation", conversation_id));
        }

        store.update_conversation(conversation_id, ConversationUpdate::rename(name));
        info!("Renamed conversation {} to '{}'", conversation_id, name);
        Ok(())
    }

    /// Creates a project with a trimmed, non-empty name.
    pub fn create_project(
        &self,
        store: &mut ConversationStore,
        name: &str,
        description: &str,
    ) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QueryCraftError::validation("Project name cannot be empty"));
        }
        Ok(store.create_project(name, description.trim()))
    }

    /// Registers an uploaded file with a project.
    ///
    /// Only genomic data extensions are accepted; the MIME type is guessed
    /// from the name.
    pub fn upload_file(
        &self,
        store: &mut ConversationStore,
        project_id: &str,
        name: &str,
        size: u64,
        url: &str,
    ) -> Result<String> {
        let extension = Path::new(name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if !ALLOWED_FILE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(QueryCraftError::validation(format!(
                "Unsupported file type for '{}'. Allowed: {}",
                name,
                ALLOWED_FILE_EXTENSIONS.join(", ")
            )));
        }
        if store.project(project_id).is_none() {
            return Err(QueryCraftError::not_found("project", project_id));
        }

        let file_type = mime_guess::from_path(name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        store.add_file(NewUploadedFile {
            name: name.to_string(),
            file_type,
            size,
            url: url.to_string(),
            project_id: Some(project_id.to_string()),
            upload_date: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use querycraft_core::config::{ReplyStyle, StoreConfig};
    use querycraft_core::state::StoreState;
    use querycraft_infrastructure::MemoryStateRepository;
    use std::time::Instant;

    struct FixedReply(&'static str);

    #[async_trait]
    impl ReplyGenerator for FixedReply {
        async fn generate_reply(&self, _user_text: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingReply;

    #[async_trait]
    impl ReplyGenerator for FailingReply {
        async fn generate_reply(&self, _user_text: &str) -> Result<String> {
            Err(QueryCraftError::internal("generator offline"))
        }
    }

    fn empty_store() -> ConversationStore {
        ConversationStore::with_state(
            StoreState::new(),
            Arc::new(MemoryStateRepository::new()),
            StoreConfig::default(),
        )
    }

    fn usecase() -> ChatUseCase {
        ChatUseCase::new(Arc::new(FixedReply("ok")), Duration::ZERO)
    }

    #[test]
    fn test_ensure_active_creates_first_conversation() {
        let mut store = empty_store();

        let id = usecase().ensure_active_conversation(&mut store).unwrap();

        assert_eq!(store.conversations().len(), 1);
        assert_eq!(store.current_conversation_id(), Some(id.as_str()));
    }

    #[test]
    fn test_ensure_active_selects_first_when_none_current() {
        let mut store = empty_store();
        let first = store.create_conversation(None).unwrap();
        store.create_conversation(None).unwrap();
        store.set_current_conversation(None);

        let id = usecase().ensure_active_conversation(&mut store).unwrap();

        assert_eq!(id, first);
        assert_eq!(store.conversations().len(), 2);
    }

    #[test]
    fn test_ensure_active_replaces_dangling_pointer() {
        let mut store = empty_store();
        let first = store.create_conversation(None).unwrap();
        store.set_current_conversation(Some("gone"));

        let id = usecase().ensure_active_conversation(&mut store).unwrap();

        assert_eq!(id, first);
    }

    #[tokio::test]
    async fn test_send_message_appends_user_then_bot() {
        let mut store = empty_store();

        let exchange = usecase().send_message(&mut store, "hello").await.unwrap();

        let conversation = store.conversation(&exchange.conversation_id).unwrap();
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[0].role, MessageRole::User);
        assert_eq!(conversation.messages[0].content, "hello");
        assert_eq!(conversation.messages[0].id, exchange.user_message_id);
        assert_eq!(conversation.messages[1].role, MessageRole::Bot);
        assert_eq!(conversation.messages[1].content, "ok");
        assert_eq!(exchange.reply, "ok");
    }

    #[tokio::test]
    async fn test_send_message_rejects_blank_text() {
        let mut store = empty_store();

        let err = usecase().send_message(&mut store, "   ").await.unwrap_err();

        assert!(err.is_validation());
        assert!(store.conversations().is_empty());
    }

    #[tokio::test]
    async fn test_send_message_keeps_user_message_on_generator_failure() {
        let mut store = empty_store();
        let usecase = ChatUseCase::new(Arc::new(FailingReply), Duration::ZERO);

        let result = usecase.send_message(&mut store, "hello").await;

        assert!(result.is_err());
        let messages = &store.conversations()[0].messages;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_send_message_waits_for_delay() {
        let mut store = empty_store();
        let usecase = ChatUseCase::new(Arc::new(FixedReply("ok")), Duration::from_millis(20));

        let started = Instant::now();
        usecase.send_message(&mut store, "hi").await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_from_config_uses_style() {
        let mut store = empty_store();
        let config = ReplyConfig {
            style: ReplyStyle::Genomics,
            delay_ms: 0,
        };

        let exchange = ChatUseCase::from_config(&config)
            .send_message(&mut store, "tell me about SNPs")
            .await
            .unwrap();

        assert!(exchange.reply.starts_with("Genetic variants are"));
    }

    #[test]
    fn test_rename_conversation_trims() {
        let mut store = empty_store();
        let id = store.create_conversation(None).unwrap();

        usecase()
            .rename_conversation(&mut store, &id, "  Variants  ")
            .unwrap();

        assert_eq!(store.conversation(&id).unwrap().name, "Variants");
    }

    #[test]
    fn test_rename_conversation_errors() {
        let mut store = empty_store();
        let id = store.create_conversation(None).unwrap();

        let err = usecase().rename_conversation(&mut store, &id, "   ").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.conversation(&id).unwrap().name, "New Conversation 1");

        let err = usecase()
            .rename_conversation(&mut store, "missing", "x")
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_create_project_requires_name() {
        let mut store = empty_store();

        assert!(usecase().create_project(&mut store, " ", "d").unwrap_err().is_validation());

        let id = usecase().create_project(&mut store, " Cohort ", " PRS ").unwrap();
        let project = store.project(&id).unwrap();
        assert_eq!(project.name, "Cohort");
        assert_eq!(project.description, "PRS");
    }

    #[test]
    fn test_upload_file_accepts_genomic_extensions() {
        let mut store = empty_store();
        let project_id = store.create_project("P", "");

        let csv = usecase()
            .upload_file(&mut store, &project_id, "scores.CSV", 10, "file:///scores.csv")
            .unwrap();
        let pgen = usecase()
            .upload_file(&mut store, &project_id, "chr1.pgen", 20, "file:///chr1.pgen")
            .unwrap();

        let files = &store.project(&project_id).unwrap().files;
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].id, csv);
        assert_eq!(files[0].file_type, "text/csv");
        assert_eq!(files[1].id, pgen);
        assert_eq!(files[1].file_type, "application/octet-stream");
        assert_eq!(files[1].project_id.as_deref(), Some(project_id.as_str()));
    }

    #[test]
    fn test_upload_file_rejects_other_types() {
        let mut store = empty_store();
        let project_id = store.create_project("P", "");

        for name in ["report.pdf", "noextension", "archive.vcf.gz"] {
            let err = usecase()
                .upload_file(&mut store, &project_id, name, 1, "file:///x")
                .unwrap_err();
            assert!(err.is_validation(), "{} should be rejected", name);
        }
        assert!(store.files().is_empty());
    }

    #[test]
    fn test_upload_file_to_missing_project() {
        let mut store = empty_store();

        let err = usecase()
            .upload_file(&mut store, "ghost", "a.vcf", 1, "file:///a.vcf")
            .unwrap_err();

        assert!(err.is_not_found());
    }
}
