//! Domain layer for QueryCraft.
//!
//! Holds the conversation/project/file models, the [`ConversationStore`]
//! that keeps them consistent, and the traits implemented by the
//! infrastructure and interaction layers.

pub mod config;
pub mod conversation;
pub mod error;
pub mod id;
pub mod project;
pub mod reply;
pub mod state;
pub mod store;

// Re-export common error type
pub use error::QueryCraftError;
pub use store::ConversationStore;
