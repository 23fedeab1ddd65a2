//! Ports at the engine boundary.

pub mod gateway;
pub mod repository;

pub use gateway::NotificationGateway;
pub use repository::{CandidateRepository, EntityMutator};
