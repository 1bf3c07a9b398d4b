//! Conversation domain module.
//!
//! # Module Structure
//!
//! - `model`: Core conversation domain model (`Conversation`, `ConversationUpdate`)
//! - `message`: Chat message types (`MessageRole`, `Message`)

mod message;
mod model;

// Re-export public API
pub use message::{Message, MessageRole};
pub use model::{Conversation, ConversationUpdate};
