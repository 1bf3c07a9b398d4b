//! Application layer for QueryCraft.
//!
//! Use cases that sit between a front-end and the [`ConversationStore`]:
//! input validation, the send/reply round trip and file intake.
//!
//! [`ConversationStore`]: querycraft_core::ConversationStore

pub mod chat_usecase;

pub use chat_usecase::{ALLOWED_FILE_EXTENSIONS, ChatExchange, ChatUseCase};
