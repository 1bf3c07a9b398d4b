//! Chat message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Represents the author of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MessageRole {
    /// Message typed by the user.
    User,
    /// Message produced by the reply generator.
    Bot,
}

/// A single message in a conversation history.
///
/// Messages are immutable once created; conversations only ever append them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier (UUID format)
    pub id: String,
    /// The text of the message.
    pub content: String,
    /// Who wrote the message.
    pub role: MessageRole,
    /// When the message was created.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_parsing_is_case_insensitive() {
        assert_eq!(MessageRole::from_str("user").unwrap(), MessageRole::User);
        assert_eq!(MessageRole::from_str("BOT").unwrap(), MessageRole::Bot);
        assert!(MessageRole::from_str("assistant").is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&MessageRole::Bot).unwrap();
        assert_eq!(json, "\"bot\"");
        assert_eq!(MessageRole::User.to_string(), "user");
    }
}
