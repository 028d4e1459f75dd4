//! Repositories
//!
//! Storage backends for Vehicle Records.

pub mod memory_repository;
pub mod vehicle_repository;

pub use memory_repository::MemoryVehicleStore;
pub use vehicle_repository::{ExitOutcome, InsertOutcome, PgVehicleStore, VehicleStore};
