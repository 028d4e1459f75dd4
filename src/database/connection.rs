//! PostgreSQL connection
//!
//! Opens the pool and makes sure the `gate_vehicles` table exists.

use anyhow::Result;
use sqlx::PgPool;

use crate::config::DatabaseConfig;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS gate_vehicles (
        id UUID PRIMARY KEY,
        vehicle_no TEXT NOT NULL,
        container_id TEXT,
        vehicle_type TEXT NOT NULL DEFAULT 'Unknown',
        plant TEXT,
        in_time TIMESTAMPTZ NOT NULL,
        out_time TIMESTAMPTZ,
        CONSTRAINT gate_vehicles_exit_after_entry CHECK (out_time IS NULL OR out_time >= in_time)
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS gate_vehicles_one_open_stay
        ON gate_vehicles (vehicle_no) WHERE out_time IS NULL
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS gate_vehicles_in_time_idx
        ON gate_vehicles (in_time DESC)
    "#,
];

/// Shared database handle
#[derive(Clone)]
pub struct DatabaseConnection {
    pub pool: PgPool,
}

impl DatabaseConnection {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        log::info!("🔌 Connecting to {}", mask_database_url(&config.url));
        let pool = config.create_pool().await?;
        ensure_schema(&pool).await?;
        Ok(Self { pool })
    }
}

/// Create the table and indexes when missing
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    log::info!("✅ Schema gate_vehicles ready");
    Ok(())
}

/// Hide credentials before a URL reaches the logs
pub fn mask_database_url(url: &str) -> String {
    let Some(at_pos) = url.rfind('@') else {
        return url.to_string();
    };
    let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
    if scheme_end > at_pos {
        return url.to_string();
    }
    format!("{}***:***@{}", &url[..scheme_end], &url[at_pos + 1..])
}
