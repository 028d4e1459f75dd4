//! Database
//!
//! PostgreSQL pool and schema bootstrap.

pub mod connection;

pub use connection::{ensure_schema, DatabaseConnection};
