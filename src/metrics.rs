//! Prometheus counters
//!
//! Process-wide registry exposed on `GET /metrics`.

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref VEHICLES_REGISTERED: IntCounter =
        IntCounter::new("gate_vehicles_registered_total", "Vehicle entries created").expect("valid metric definition");
    pub static ref DUPLICATE_ENTRIES: IntCounter = IntCounter::new(
        "gate_duplicate_entries_total",
        "Registrations rejected because the plate was already inside"
    )
    .expect("valid metric definition");
    pub static ref VEHICLE_EXITS: IntCounter =
        IntCounter::new("gate_vehicle_exits_total", "Exits recorded").expect("valid metric definition");
    pub static ref OCR_REQUESTS: IntCounterVec = IntCounterVec::new(
        Opts::new("gate_ocr_requests_total", "OCR requests by outcome"),
        &["outcome"]
    )
    .expect("valid metric definition");
}

/// Register every collector once at startup; repeated calls are no-ops
pub fn register_metrics() {
    let collectors: [Box<dyn prometheus::core::Collector>; 4] = [
        Box::new(VEHICLES_REGISTERED.clone()),
        Box::new(DUPLICATE_ENTRIES.clone()),
        Box::new(VEHICLE_EXITS.clone()),
        Box::new(OCR_REQUESTS.clone()),
    ];
    for collector in collectors {
        if let Err(e) = REGISTRY.register(collector) {
            log::debug!("metric already registered: {}", e);
        }
    }
}

/// Text exposition of the registry
pub fn render() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
