//! Services
//!
//! Domain rules of the gate (classification, dwell time, overstay, dashboard
//! and analytics projections) and the integrations around them (OCR, reports).

pub mod analytics_service;
pub mod clock;
pub mod dashboard_view;
pub mod duration;
pub mod ocr_service;
pub mod overstay;
pub mod plate_parser;
pub mod report_service;
pub mod type_classifier;

pub use clock::{Clock, ManualClock, SystemClock};
pub use dashboard_view::{DashboardView, DateRange, FilterCriteria};
pub use duration::{dwell_duration, format_dwell, DwellDuration};
pub use ocr_service::{HttpOcrEngine, OcrError, PlateRecognizer};
pub use overstay::{OverstayPolicy, OverstayTracker};
pub use type_classifier::{classify, FirstLetterClassifier, VehicleClassifier};
