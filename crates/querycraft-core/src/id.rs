//! Identifier helpers shared by all entities.

use uuid::Uuid;

/// Generates a fresh, globally-unique entity id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// First four characters of an id, used for display fallbacks and prefix lookups.
pub fn short_id(id: &str) -> String {
    id.chars().take(4).collect()
}
