//! Request handling behind the routes

pub mod ocr_controller;
pub mod vehicle_controller;

pub use ocr_controller::OcrController;
pub use vehicle_controller::VehicleController;
