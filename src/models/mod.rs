//! Data models
//!
//! The Vehicle Record and the shapes derived from collections of records.

pub mod analytics;
pub mod vehicle;

pub use analytics::*;
pub use vehicle::*;
