//! Configuration
//!
//! Environment settings and database pool options.

pub mod database;
pub mod environment;

pub use database::DatabaseConfig;
pub use environment::*;
