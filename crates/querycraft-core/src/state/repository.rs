//! State repository trait.

use crate::error::Result;
use crate::state::model::StoreState;

/// Durable storage for the whole store state.
///
/// The store loads once at startup and saves the full state after every
/// mutation, so implementations only need wholesale load/save.
pub trait StateRepository: Send + Sync {
    /// Loads the saved state.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(StoreState))`: State found
    /// - `Ok(None)`: Nothing has been saved yet
    /// - `Err(_)`: Stored data could not be read or migrated
    fn load(&self) -> Result<Option<StoreState>>;

    /// Replaces the saved state with `state`.
    fn save(&self, state: &StoreState) -> Result<()>;
}
