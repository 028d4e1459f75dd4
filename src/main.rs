use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use gate_entry::config::{DatabaseConfig, EnvironmentConfig};
use gate_entry::database::DatabaseConnection;
use gate_entry::repositories::{MemoryVehicleStore, PgVehicleStore, VehicleStore};
use gate_entry::services::HttpOcrEngine;
use gate_entry::{create_router, metrics, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    let level = tracing::Level::from_str(&config.log_level).unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("🚛 Gate Entry API");
    info!("================================================");
    info!("🌍 Environment: {}", config.environment);

    let store: Arc<dyn VehicleStore> = match config.database_url.as_deref() {
        Some(url) => {
            let connection = DatabaseConnection::connect(&DatabaseConfig::from_url(url)).await.map_err(|e| {
                error!("❌ Database connection failed: {}", e);
                e
            })?;
            info!("✅ PostgreSQL store ready");
            Arc::new(PgVehicleStore::new(connection.pool))
        }
        None => {
            warn!("⚠️ DATABASE_URL not set, records are kept in memory only");
            Arc::new(MemoryVehicleStore::new())
        }
    };

    let mut state = AppState::new(store, config.clone());
    match config.ocr_engine_url.clone() {
        Some(endpoint) => {
            let engine = HttpOcrEngine::new(endpoint, config.ocr_timeout())?;
            info!("📷 OCR engine: {}", engine.endpoint());
            state = state.with_recognizer(Arc::new(engine));
        }
        None => warn!("⚠️ OCR_ENGINE_URL not set, /api/ocr will answer 503"),
    }

    metrics::register_metrics();
    let app = create_router(state);

    let addr: SocketAddr = config.server_url().parse()?;
    info!("🌐 Server listening on http://{}", addr);
    info!("🔍 Endpoints:");
    info!("   GET  /api/health");
    info!("   GET  /api/vehicles");
    info!("   POST /api/vehicles");
    info!("   PUT  /api/vehicles/:id/exit");
    info!("   POST /api/ocr");
    info!("   GET  /api/dashboard");
    info!("   GET  /api/alerts/overstay");
    info!("   GET  /api/analytics");
    info!("   GET  /api/reports/vehicles/:id");
    info!("   GET  /api/reports/vehicles.csv");
    info!("   GET  /metrics");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Server error: {}", e);
            e
        })?;

    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ Could not listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ Could not install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Ctrl+C received, shutting down...");
        },
        _ = terminate => {
            info!("🛑 Termination signal received, shutting down...");
        },
    }
}
