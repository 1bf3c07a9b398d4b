//! In-memory store state repository.
//!
//! Keeps the last saved snapshot. Used for `--ephemeral` sessions and tests.

use std::sync::{Mutex, MutexGuard};

use querycraft_core::error::{QueryCraftError, Result};
use querycraft_core::state::{StateRepository, StoreState};

#[derive(Debug, Default)]
pub struct MemoryStateRepository {
    slot: Mutex<Slot>,
}

#[derive(Debug, Default)]
struct Slot {
    state: Option<StoreState>,
    saves: usize,
}

impl MemoryStateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last saved state.
    pub fn saved(&self) -> Result<Option<StoreState>> {
        Ok(self.lock()?.state.clone())
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> Result<usize> {
        Ok(self.lock()?.saves)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Slot>> {
        self.slot
            .lock()
            .map_err(|_| QueryCraftError::internal("memory state lock poisoned"))
    }
}

impl StateRepository for MemoryStateRepository {
    fn load(&self) -> Result<Option<StoreState>> {
        self.saved()
    }

    fn save(&self, state: &StoreState) -> Result<()> {
        let mut slot = self.lock()?;
        slot.state = Some(state.clone());
        slot.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_until_saved() {
        let repo = MemoryStateRepository::new();
        assert!(repo.load().unwrap().is_none());

        let state = StoreState {
            current_conversation_id: Some("c1".to_string()),
            ..StoreState::default()
        };
        repo.save(&state).unwrap();

        assert_eq!(repo.load().unwrap(), Some(state));
        assert_eq!(repo.save_count().unwrap(), 1);
    }
}
