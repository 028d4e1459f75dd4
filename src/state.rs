//! Shared application state
//!
//! Passed to every handler through the axum router. Collaborators sit behind
//! traits so tests can swap in the memory store and a manual clock.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::VehicleStore;
use crate::services::{Clock, FirstLetterClassifier, OverstayPolicy, PlateRecognizer, SystemClock, VehicleClassifier};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn VehicleStore>,
    pub config: EnvironmentConfig,
    pub classifier: Arc<dyn VehicleClassifier>,
    /// `None` when no OCR engine is configured
    pub recognizer: Option<Arc<dyn PlateRecognizer>>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(store: Arc<dyn VehicleStore>, config: EnvironmentConfig) -> Self {
        Self {
            store,
            config,
            classifier: Arc::new(FirstLetterClassifier),
            recognizer: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_recognizer(mut self, recognizer: Arc<dyn PlateRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn overstay_policy(&self) -> OverstayPolicy {
        OverstayPolicy::new(self.config.overstay_threshold_hours)
    }
}
