//! Gate entry tracking
//!
//! Records vehicles entering and leaving the plant gates, classifies them,
//! measures dwell time, flags overstays and serves dashboards over a REST API.

pub mod clients;
pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
