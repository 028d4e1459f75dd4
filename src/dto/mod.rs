//! Request and response bodies of the REST API

pub mod ocr_dto;
pub mod vehicle_dto;

pub use ocr_dto::*;
pub use vehicle_dto::*;
