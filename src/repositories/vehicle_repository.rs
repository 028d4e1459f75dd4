//! Vehicle Record persistence
//!
//! `VehicleStore` is the seam between the API and the backing store. The
//! store owns the one-open-stay-per-plate rule so it holds under concurrent
//! registrations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::vehicle::{NewVehicleEntry, Plant, VehicleRecord, VehicleType};
use crate::utils::errors::AppError;

/// Result of opening a record
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Created(VehicleRecord),
    /// The plate already has an open stay; carries that record
    Duplicate(VehicleRecord),
}

/// Result of closing a record
#[derive(Debug, Clone, PartialEq)]
pub enum ExitOutcome {
    Exited(VehicleRecord),
    AlreadyExited(VehicleRecord),
    NotFound,
}

#[async_trait]
pub trait VehicleStore: Send + Sync {
    /// Newest entries first, at most `limit`
    async fn list(&self, limit: i64) -> Result<Vec<VehicleRecord>, AppError>;

    async fn find(&self, id: &str) -> Result<Option<VehicleRecord>, AppError>;

    async fn insert(&self, entry: NewVehicleEntry) -> Result<InsertOutcome, AppError>;

    async fn mark_exit(&self, id: &str, at: DateTime<Utc>) -> Result<ExitOutcome, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}

#[derive(Debug, sqlx::FromRow)]
struct VehicleRow {
    id: Uuid,
    vehicle_no: String,
    container_id: Option<String>,
    vehicle_type: String,
    plant: Option<String>,
    in_time: DateTime<Utc>,
    out_time: Option<DateTime<Utc>>,
}

impl From<VehicleRow> for VehicleRecord {
    fn from(row: VehicleRow) -> Self {
        let vehicle_type = row.vehicle_type.parse::<VehicleType>().unwrap_or_else(|e| {
            log::warn!("⚠️ Row {}: {}, using Unknown", row.id, e);
            VehicleType::Unknown
        });
        let plant = row.plant.as_deref().and_then(|p| p.parse::<Plant>().ok());

        VehicleRecord {
            id: row.id.to_string(),
            vehicle_no: row.vehicle_no,
            container_id: row.container_id,
            vehicle_type,
            plant,
            in_time: row.in_time,
            out_time: row.out_time,
        }
    }
}

/// PostgreSQL-backed store
pub struct PgVehicleStore {
    pool: PgPool,
}

impl PgVehicleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_uuid(&self, id: Uuid) -> Result<Option<VehicleRecord>, AppError> {
        let row = sqlx::query_as::<_, VehicleRow>("SELECT * FROM gate_vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(VehicleRecord::from))
    }

    async fn find_open_stay(&self, vehicle_no: &str) -> Result<Option<VehicleRecord>, AppError> {
        let row = sqlx::query_as::<_, VehicleRow>(
            "SELECT * FROM gate_vehicles WHERE vehicle_no = $1 AND out_time IS NULL",
        )
        .bind(vehicle_no)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(VehicleRecord::from))
    }
}

#[async_trait]
impl VehicleStore for PgVehicleStore {
    async fn list(&self, limit: i64) -> Result<Vec<VehicleRecord>, AppError> {
        let rows = sqlx::query_as::<_, VehicleRow>(
            "SELECT * FROM gate_vehicles ORDER BY in_time DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(VehicleRecord::from).collect())
    }

    async fn find(&self, id: &str) -> Result<Option<VehicleRecord>, AppError> {
        match Uuid::parse_str(id) {
            Ok(uuid) => self.find_uuid(uuid).await,
            Err(_) => Ok(None),
        }
    }

    async fn insert(&self, entry: NewVehicleEntry) -> Result<InsertOutcome, AppError> {
        // The partial unique index on open stays turns a concurrent duplicate into "no row".
        let created = sqlx::query_as::<_, VehicleRow>(
            r#"
            INSERT INTO gate_vehicles (id, vehicle_no, container_id, vehicle_type, plant, in_time, out_time)
            VALUES ($1, $2, $3, $4, $5, $6, NULL)
            ON CONFLICT (vehicle_no) WHERE out_time IS NULL DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&entry.vehicle_no)
        .bind(&entry.container_id)
        .bind(entry.vehicle_type.as_str())
        .bind(entry.plant.as_str())
        .bind(entry.in_time)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = created {
            return Ok(InsertOutcome::Created(row.into()));
        }

        match self.find_open_stay(&entry.vehicle_no).await? {
            Some(existing) => Ok(InsertOutcome::Duplicate(existing)),
            // The open stay closed between the two statements.
            None => Err(AppError::Conflict(format!(
                "Vehicle {} changed state during registration, retry",
                entry.vehicle_no
            ))),
        }
    }

    async fn mark_exit(&self, id: &str, at: DateTime<Utc>) -> Result<ExitOutcome, AppError> {
        let uuid = match Uuid::parse_str(id) {
            Ok(uuid) => uuid,
            Err(_) => return Ok(ExitOutcome::NotFound),
        };

        let updated = sqlx::query_as::<_, VehicleRow>(
            r#"
            UPDATE gate_vehicles
            SET out_time = GREATEST($2, in_time)
            WHERE id = $1 AND out_time IS NULL
            RETURNING *
            "#,
        )
        .bind(uuid)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = updated {
            return Ok(ExitOutcome::Exited(row.into()));
        }

        Ok(match self.find_uuid(uuid).await? {
            Some(existing) => ExitOutcome::AlreadyExited(existing),
            None => ExitOutcome::NotFound,
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
