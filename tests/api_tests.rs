use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use gate_entry::config::EnvironmentConfig;
use gate_entry::repositories::MemoryVehicleStore;
use gate_entry::services::{ManualClock, OcrError, PlateRecognizer};
use gate_entry::{create_router, AppState};

struct FixedTextRecognizer(Option<&'static str>);

#[async_trait]
impl PlateRecognizer for FixedTextRecognizer {
    async fn recognize_text(&self, image: &[u8], _content_type: Option<&str>) -> Result<Option<String>, OcrError> {
        if image.is_empty() {
            return Err(OcrError::EmptyImage);
        }
        Ok(self.0.map(str::to_string))
    }
}

struct TestApp {
    router: Router,
    clock: Arc<ManualClock>,
}

fn test_app() -> TestApp {
    build_app(None)
}

fn build_app(recognizer: Option<Arc<dyn PlateRecognizer>>) -> TestApp {
    // 13:30 at the Colombo site
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap()));
    let mut state = AppState::new(Arc::new(MemoryVehicleStore::new()), EnvironmentConfig::default())
        .with_clock(clock.clone());
    if let Some(recognizer) = recognizer {
        state = state.with_recognizer(recognizer);
    }
    TestApp {
        router: create_router(state),
        clock,
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let (status, bytes) = self.send(request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register(&self, vehicle_no: &str) -> (StatusCode, Value) {
        self.json(
            Method::POST,
            "/api/vehicles",
            Some(json!({ "vehicleNo": vehicle_no, "plant": "Badalgama" })),
        )
        .await
    }
}

fn multipart_request(field: &str, image: &[u8]) -> Request<Body> {
    multipart_request_to("/api/ocr", field, image)
}

fn multipart_request_to(uri: &str, field: &str, image: &[u8]) -> Request<Body> {
    let boundary = "gate-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"plate.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n",
            field
        )
        .as_bytes(),
    );
    body.extend_from_slice(image);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app();
    let (status, body) = app.json(Method::GET, "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_classifies_when_type_missing() {
    let app = test_app();
    let (status, body) = app.register("LB-1234").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["vehicle"]["type"], "Lorry");
    assert_eq!(body["vehicle"]["status"], "inside");
    assert_eq!(body["vehicle"]["outTime"], Value::Null);
    assert_eq!(body["vehicle"]["inTime"], "2024-01-15T08:00:00+00:00");
    assert_eq!(body["id"], body["vehicle"]["id"]);
}

#[tokio::test]
async fn test_register_keeps_explicit_type_and_container() {
    let app = test_app();
    let (status, body) = app
        .json(
            Method::POST,
            "/api/vehicles",
            Some(json!({
                "vehicleNo": "WP-KL4455",
                "containerId": " MSCU1234567 ",
                "plant": "Madampe",
                "type": "Container Truck"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["vehicle"]["type"], "Container Truck");
    assert_eq!(body["vehicle"]["containerId"], "MSCU1234567");
    assert_eq!(body["vehicle"]["plant"], "Madampe");
}

#[tokio::test]
async fn test_duplicate_entry_is_rejected_while_inside() {
    let app = test_app();
    app.register("TB-9001").await;
    let (status, body) = app.register(" TB-9001 ").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "duplicate");
    assert_eq!(body["code"], "DUPLICATE_ENTRY");

    let (_, list) = app.json(Method::GET, "/api/vehicles", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_blank_vehicle_number_is_a_validation_error() {
    let app = test_app();
    let (status, body) = app.register("   ").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_exit_is_recorded_once() {
    let app = test_app();
    let (_, created) = app.register("VA-5566").await;
    let id = created["id"].as_str().unwrap().to_string();

    app.clock.advance(Duration::minutes(45));
    let (status, body) = app.json(Method::PUT, &format!("/api/vehicles/{}/exit", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vehicle"]["status"], "exited");
    assert_eq!(body["vehicle"]["outTime"], "2024-01-15T08:45:00+00:00");

    app.clock.advance(Duration::minutes(10));
    let (status, _) = app.json(Method::PUT, &format!("/api/vehicles/{}/exit", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.json(Method::PUT, "/api/vehicles/does-not-exist/exit", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A new stay can begin once the first one is closed
    let (status, _) = app.register("VA-5566").await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let app = test_app();
    app.register("CAR-1").await;
    app.clock.advance(Duration::minutes(5));
    app.register("CAR-2").await;

    let (status, body) = app.json(Method::GET, "/api/vehicles", None).await;
    assert_eq!(status, StatusCode::OK);
    let plates: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["vehicleNo"].as_str().unwrap())
        .collect();
    assert_eq!(plates, vec!["CAR-2", "CAR-1"]);
}

#[tokio::test]
async fn test_dashboard_splits_tables_and_flags_overstays() {
    let app = test_app();
    app.register("LB-1111").await;
    let (_, car) = app.register("WP-2222").await;
    app.register("TB-3333").await;

    app.clock.advance(Duration::minutes(30));
    let car_id = car["id"].as_str().unwrap();
    app.json(Method::PUT, &format!("/api/vehicles/{}/exit", car_id), None).await;

    app.clock.advance(Duration::minutes(91));
    let (status, body) = app.json(Method::GET, "/api/dashboard", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inside"].as_array().unwrap().len(), 2);
    assert_eq!(body["exited"].as_array().unwrap().len(), 1);
    assert_eq!(body["kpis"]["totalInside"], 2);
    assert_eq!(body["kpis"]["enteredToday"], 3);

    let first_inside = &body["inside"][0];
    assert_eq!(first_inside["duration"], "2h 1m");
    assert_eq!(first_inside["overstaying"], true);
    assert_eq!(body["exited"][0]["duration"], "0h 30m");
    assert_eq!(body["exited"][0]["overstaying"], false);
}

#[tokio::test]
async fn test_dashboard_filters() {
    let app = test_app();
    app.register("LB-1111").await;
    app.register("TB-3333").await;
    app.register("WP-2222").await;

    let (status, body) = app.json(Method::GET, "/api/dashboard?type=Truck", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inside"].as_array().unwrap().len(), 1);
    assert_eq!(body["inside"][0]["vehicleNo"], "TB-3333");
    // KPIs ignore filters
    assert_eq!(body["kpis"]["totalInside"], 3);

    let (_, body) = app.json(Method::GET, "/api/dashboard?search=wp", None).await;
    assert_eq!(body["inside"].as_array().unwrap().len(), 1);

    let (_, body) = app.json(Method::GET, "/api/dashboard?from=2024-01-16", None).await;
    assert_eq!(body["inside"].as_array().unwrap().len(), 0);

    let (status, _) = app.json(Method::GET, "/api/dashboard?type=Bicycle", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_overstay_alerts_respect_threshold() {
    let app = test_app();
    app.register("LB-1111").await;
    app.clock.advance(Duration::minutes(61));
    app.register("TB-3333").await;
    app.clock.advance(Duration::minutes(60));

    let (_, body) = app.json(Method::GET, "/api/alerts/overstay", None).await;
    assert_eq!(body["thresholdHours"], 2);
    assert_eq!(body["count"], 1);
    assert_eq!(body["vehicles"][0]["vehicle"]["vehicleNo"], "LB-1111");

    let (_, body) = app.json(Method::GET, "/api/alerts/overstay?thresholdHours=1", None).await;
    assert_eq!(body["count"], 2);

    let (status, _) = app.json(Method::GET, "/api/alerts/overstay?thresholdHours=-1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analytics_summary() {
    let app = test_app();
    app.register("LB-1111").await;
    app.register("LB-2222").await;
    app.register("TB-3333").await;

    let (status, body) = app.json(Method::GET, "/api/analytics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalRecords"], 3);
    assert_eq!(body["statusSplit"]["inside"], 3);
    assert_eq!(body["typeCounts"][0]["type"], "Lorry");
    assert_eq!(body["typeCounts"][0]["count"], 2);
    assert_eq!(body["peakHours"].as_array().unwrap().len(), 24);
    // 08:00 UTC is 13:30 in Colombo
    assert_eq!(body["peakHours"][13]["count"], 3);
}

#[tokio::test]
async fn test_reports() {
    let app = test_app();
    let (_, created) = app.register("WP-<KL>").await;
    let id = created["id"].as_str().unwrap();

    let request = Request::builder()
        .uri(format!("/api/reports/vehicles/{}", id))
        .body(Body::empty())
        .unwrap();
    let (status, bytes) = app.send(request).await;
    let html = String::from_utf8(bytes).unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("WP-&lt;KL&gt;"));
    assert!(html.contains("window.print()"));

    let request = Request::builder()
        .uri("/api/reports/vehicles.csv")
        .body(Body::empty())
        .unwrap();
    let (status, bytes) = app.send(request).await;
    let csv = String::from_utf8(bytes).unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(csv.starts_with("Vehicle No,Container ID,Type"));
    assert_eq!(csv.lines().count(), 2);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/reports/vehicles/{}.pdf", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"WP-KL.pdf\""
    );
    let pdf = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(pdf.starts_with(b"%PDF"));

    let request = Request::builder()
        .uri("/api/reports/vehicles/unknown.pdf")
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder()
        .uri("/api/reports/vehicles/unknown")
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ocr_without_engine_is_unavailable() {
    let app = test_app();
    let (status, _) = app.send(multipart_request("file", b"jpeg-bytes")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_ocr_extracts_plate_and_container() {
    let app = build_app(Some(Arc::new(FixedTextRecognizer(Some("alamy WP CAB-1234 CMAU 123456 7")))));
    let (status, bytes) = app.send(multipart_request("file", b"jpeg-bytes")).await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["vehicleNo"], "WPCAB1234");
    assert_eq!(body["containerId"], "CMAU1234567");
    assert_eq!(body["vehicleType"], "Container Truck");
    assert!(body["processingTime"].is_number());
}

#[tokio::test]
async fn test_ocr_accepts_trailing_slash() {
    let app = build_app(Some(Arc::new(FixedTextRecognizer(Some("WP CAB 1234")))));
    let (status, bytes) = app.send(multipart_request_to("/api/ocr/", "file", b"jpeg-bytes")).await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["vehicleNo"], "WPCAB1234");
}

#[tokio::test]
async fn test_vehicle_collection_accepts_trailing_slash() {
    let app = test_app();
    let (status, _) = app
        .json(
            Method::POST,
            "/api/vehicles/",
            Some(json!({ "vehicleNo": "LB-4242", "plant": "Badalgama" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.json(Method::GET, "/api/vehicles/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_ocr_requires_file_field() {
    let app = build_app(Some(Arc::new(FixedTextRecognizer(None))));
    let (status, _) = app.send(multipart_request("image", b"jpeg-bytes")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, bytes) = app.send(multipart_request("file", b"jpeg-bytes")).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["vehicleNo"], Value::Null);
    assert_eq!(body["vehicleType"], "Unknown");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    gate_entry::metrics::register_metrics();
    let app = test_app();
    app.register("LB-7777").await;

    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let (status, bytes) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(bytes).unwrap().contains("gate_vehicles_registered_total"));
}
