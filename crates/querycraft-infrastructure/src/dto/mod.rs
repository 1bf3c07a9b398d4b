//! Data Transfer Objects (DTOs) for persistence layer.
//!
//! DTOs carry the on-disk schema version; the domain models in
//! `querycraft-core` stay free of persistence concerns.

pub mod store_state;

pub use store_state::{
    ConversationDTO, MessageDTO, MessageRoleDTO, ProjectDTO, StoreStateV1_0_0, UploadedFileDTO,
    STORE_STATE_VERSIONS, create_store_state_migrator,
};
