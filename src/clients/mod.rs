//! HTTP clients
//!
//! Typed access to the gate REST API.

pub mod gate_api_client;

pub use gate_api_client::{ClientConfig, ClientError, GateApiClient};
