//! Plate and container extraction from OCR text
//!
//! OCR output is noisy: watermark words, letters read as digits, hyphens in
//! odd places. The text is normalised first, then matched against Sri Lankan
//! plate layouts and ISO 6346 container ids.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::models::vehicle::VehicleType;
use crate::services::type_classifier::VehicleClassifier;

const NOISE_WORDS: [&str; 5] = ["ALAMY", "ILAMY", "ALALLY", "ZIEZSURE", "SURE"];

const PROVINCES: &str = "WP|CP|SP|NP|EP|NW|NC|UVA|SB";

lazy_static! {
    /// Tried in order; the first hit wins.
    static ref PLATE_PATTERNS: Vec<Regex> = vec![
        // Modern plates: WP NC 9024
        Regex::new(&format!(r"\b({})\s?[A-Z]{{1,3}}\s?\d{{3,4}}\b", PROVINCES)).expect("valid plate regex"),
        // Government / diplomatic: WP ABCDEF
        Regex::new(&format!(r"\b({})\s?[A-Z]{{2,6}}\b", PROVINCES)).expect("valid plate regex"),
        // Old numeric style: 19 5678
        Regex::new(r"\b\d{2,3}\s?\d{3,4}\b").expect("valid plate regex"),
        // Fallback: ABC 1234
        Regex::new(r"\b[A-Z]{2,3}\s?\d{3,4}\b").expect("valid plate regex"),
    ];

    static ref CONTAINER_PATTERN: Regex =
        Regex::new(r"\b([A-Z]{4}\s?\d{6}\s?\d)\b").expect("valid container regex");
}

/// What could be read off an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateDetection {
    pub vehicle_no: Option<String>,
    pub container_id: Option<String>,
    pub vehicle_type: VehicleType,
}

/// Normalise raw OCR output before matching
pub fn clean_ocr_text(text: &str) -> String {
    let mut upper = text.to_uppercase();
    for word in NOISE_WORDS {
        upper = upper.replace(word, " ");
    }
    upper
        .chars()
        .map(|c| match c {
            'O' => '0',
            'I' => '1',
            'S' => '5',
            ']' => 'F',
            '-' => ' ',
            other => other,
        })
        .collect()
}

fn strip_spaces(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn detect_plate_and_container(text: &str, classifier: &dyn VehicleClassifier) -> PlateDetection {
    let cleaned = clean_ocr_text(text);
    log::debug!("🔎 Cleaned OCR text: {}", cleaned);

    let vehicle_no = PLATE_PATTERNS
        .iter()
        .find_map(|re| re.find(&cleaned))
        .map(|m| strip_spaces(m.as_str()));

    let container_id = CONTAINER_PATTERN
        .captures(&cleaned)
        .and_then(|caps| caps.get(1))
        .map(|m| strip_spaces(m.as_str()));

    let vehicle_type = match (&vehicle_no, &container_id) {
        (_, Some(_)) => VehicleType::ContainerTruck,
        (Some(plate), None) => classifier.classify(plate, None),
        (None, None) => VehicleType::Unknown,
    };

    PlateDetection {
        vehicle_no,
        container_id,
        vehicle_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::type_classifier::FirstLetterClassifier;

    fn detect(text: &str) -> PlateDetection {
        detect_plate_and_container(text, &FirstLetterClassifier)
    }

    #[test]
    fn modern_province_plate() {
        let d = detect("wp nc 9024");
        assert_eq!(d.vehicle_no.as_deref(), Some("WPNC9024"));
        assert_eq!(d.container_id, None);
        assert_eq!(d.vehicle_type, VehicleType::Car);
    }

    #[test]
    fn noise_words_are_dropped() {
        let d = detect("ALAMY WP CAB 1234 alamy");
        assert_eq!(d.vehicle_no.as_deref(), Some("WPCAB1234"));
    }

    #[test]
    fn old_numeric_plate_with_hyphen() {
        let d = detect("19-5678");
        assert_eq!(d.vehicle_no.as_deref(), Some("195678"));
    }

    #[test]
    fn fallback_plate_goes_through_classifier() {
        let d = detect("LX 4455");
        assert_eq!(d.vehicle_no.as_deref(), Some("LX4455"));
        assert_eq!(d.vehicle_type, VehicleType::Lorry);
    }

    #[test]
    fn container_id_sets_container_truck() {
        let d = detect("CMAU 123456 7");
        assert_eq!(d.container_id.as_deref(), Some("CMAU1234567"));
        assert_eq!(d.vehicle_type, VehicleType::ContainerTruck);
    }

    #[test]
    fn misread_letters_are_mapped_to_digits() {
        assert_eq!(clean_ocr_text("wp-ab 12O4"), "WP AB 1204");
    }

    #[test]
    fn nothing_readable() {
        let d = detect("hello there");
        assert_eq!(d.vehicle_no, None);
        assert_eq!(d.container_id, None);
        assert_eq!(d.vehicle_type, VehicleType::Unknown);
    }
}
