//! Vehicle type classification
//!
//! Registration derives the vehicle category from the plate text. The
//! current rule is a first-letter heuristic; it sits behind
//! [`VehicleClassifier`] so a stricter plate-format classifier can replace it
//! without touching callers.

use crate::models::vehicle::VehicleType;

pub trait VehicleClassifier: Send + Sync {
    fn classify(&self, plate: &str, container_id: Option<&str>) -> VehicleType;
}

/// Container id wins, then the first letter of the plate decides.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstLetterClassifier;

impl VehicleClassifier for FirstLetterClassifier {
    fn classify(&self, plate: &str, container_id: Option<&str>) -> VehicleType {
        if container_id.map_or(false, |c| !c.trim().is_empty()) {
            return VehicleType::ContainerTruck;
        }

        let plate = plate.trim();
        match plate.chars().next().map(|c| c.to_ascii_uppercase()) {
            None => VehicleType::Unknown,
            Some('L') => VehicleType::Lorry,
            Some('T') => VehicleType::Truck,
            Some('V') => VehicleType::Van,
            Some(_) => VehicleType::Car,
        }
    }
}

/// Classify with the default heuristic
pub fn classify(plate: &str, container_id: Option<&str>) -> VehicleType {
    FirstLetterClassifier.classify(plate, container_id)
}
