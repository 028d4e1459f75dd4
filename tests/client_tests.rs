use std::sync::Arc;

use gate_entry::clients::{ClientConfig, ClientError, GateApiClient};
use gate_entry::config::EnvironmentConfig;
use gate_entry::models::vehicle::{Plant, VehicleType};
use gate_entry::repositories::MemoryVehicleStore;
use gate_entry::services::{DashboardView, FilterCriteria, OverstayPolicy, OverstayTracker};
use gate_entry::{create_router, AppState};

async fn spawn_server() -> GateApiClient {
    let state = AppState::new(Arc::new(MemoryVehicleStore::new()), EnvironmentConfig::default());
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    GateApiClient::new(ClientConfig {
        base_url: format!("http://{}/api", addr),
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_register_list_and_exit() {
    let client = spawn_server().await;

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");

    let created = client.register("TB-1234", None, Plant::Badalgama).await.unwrap();
    assert_eq!(created.status, "ok");
    assert_eq!(created.vehicle.vehicle_type, VehicleType::Truck);
    assert!(created.vehicle.is_inside());

    let records = client.fetch_vehicles().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].vehicle_no, "TB-1234");

    let exited = client.mark_exit(&created.id).await.unwrap();
    assert!(!exited.vehicle.is_inside());

    match client.mark_exit(&created.id).await {
        Err(ClientError::UnexpectedStatus { status, .. }) => assert_eq!(status, 409),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_duplicate_is_distinguishable() {
    let client = spawn_server().await;
    client.register("LB-7788", Some("CMAU1234567"), Plant::Madampe).await.unwrap();

    let err = client.register("LB-7788", None, Plant::Madampe).await.unwrap_err();
    assert!(err.is_duplicate());
    assert!(err.to_string().contains("LB-7788"));
}

#[tokio::test]
async fn test_client_side_classification_wins_over_server_default() {
    let client = spawn_server().await;
    let created = client
        .register("WP-KL4455", Some("CMAU1234567"), Plant::Badalgama)
        .await
        .unwrap();
    assert_eq!(created.vehicle.vehicle_type, VehicleType::ContainerTruck);
    assert_eq!(created.vehicle.container_id.as_deref(), Some("CMAU1234567"));
}

#[tokio::test]
async fn test_local_view_over_fetched_records() {
    let client = spawn_server().await;
    client.register("WP-1111", None, Plant::Badalgama).await.unwrap();
    let truck = client.register("TB-2222", None, Plant::Badalgama).await.unwrap();
    client.register("WP-3333", None, Plant::Madampe).await.unwrap();
    client.mark_exit(&truck.id).await.unwrap();

    let records = client.fetch_vehicles().await.unwrap();
    let now = chrono::Utc::now();
    let site = EnvironmentConfig::default().site_offset();
    let view = DashboardView::build(&records, &FilterCriteria::default(), now, &site);

    assert_eq!(view.inside.len(), 2);
    assert_eq!(view.exited.len(), 1);
    assert_eq!(view.kpis.total_inside, 2);
    assert_eq!(view.kpis.most_common_type, Some(VehicleType::Car));

    let mut tracker = OverstayTracker::new(OverstayPolicy::default());
    assert!(tracker.refresh(&records, now).is_empty());
}

#[tokio::test]
async fn test_network_failure() {
    let client = GateApiClient::new(ClientConfig {
        base_url: "http://127.0.0.1:1/api".to_string(),
        ..Default::default()
    })
    .unwrap();

    let err = client.fetch_vehicles().await.unwrap_err();
    assert!(matches!(err, ClientError::NetworkFailure(_)));
}

#[tokio::test]
async fn test_ocr_unavailable_surfaces_status() {
    let client = spawn_server().await;
    match client.recognize_plate(b"jpeg".to_vec(), "plate.jpg").await {
        Err(ClientError::UnexpectedStatus { status, .. }) => assert_eq!(status, 503),
        other => panic!("unexpected {:?}", other),
    }
}
