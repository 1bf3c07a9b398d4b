//! Persistence for QueryCraft: the versioned state file, the config file
//! and the directories they live in.

pub mod dto;
pub mod json_state_repository;
pub mod memory_state_repository;
pub mod paths;
pub mod storage;
pub mod toml_config_repository;

pub use crate::json_state_repository::JsonStateRepository;
pub use crate::memory_state_repository::MemoryStateRepository;
pub use crate::paths::QueryCraftPaths;
pub use crate::toml_config_repository::TomlConfigRepository;
