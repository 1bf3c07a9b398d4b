//! Reply generator contract.
//!
//! The chat view treats reply generation as an opaque collaborator: it hands
//! over the user's text and appends whatever comes back as a bot message.

use async_trait::async_trait;

use crate::error::Result;

/// Produces the bot's answer to a user message.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Generates a reply for `user_text`.
    async fn generate_reply(&self, user_text: &str) -> Result<String>;
}
