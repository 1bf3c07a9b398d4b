//! Persisted store state and its repository contract.

pub mod model;
pub mod repository;

pub use model::StoreState;
pub use repository::StateRepository;
