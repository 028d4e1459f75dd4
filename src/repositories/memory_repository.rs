//! In-memory vehicle store
//!
//! Used when no database is configured and by the test suite. Check and
//! insert run under the same write lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::vehicle::{NewVehicleEntry, VehicleRecord};
use crate::repositories::vehicle_repository::{ExitOutcome, InsertOutcome, VehicleStore};
use crate::utils::errors::AppError;

#[derive(Debug, Default)]
pub struct MemoryVehicleStore {
    records: RwLock<Vec<VehicleRecord>>,
}

impl MemoryVehicleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-built records as-is
    pub fn with_records(records: Vec<VehicleRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl VehicleStore for MemoryVehicleStore {
    async fn list(&self, limit: i64) -> Result<Vec<VehicleRecord>, AppError> {
        let mut records = self.records.read().await.clone();
        records.sort_by(|a, b| b.in_time.cmp(&a.in_time));
        records.truncate(limit.max(0) as usize);
        Ok(records)
    }

    async fn find(&self, id: &str) -> Result<Option<VehicleRecord>, AppError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn insert(&self, entry: NewVehicleEntry) -> Result<InsertOutcome, AppError> {
        let mut records = self.records.write().await;

        if let Some(existing) = records
            .iter()
            .find(|r| r.is_inside() && r.vehicle_no == entry.vehicle_no)
        {
            return Ok(InsertOutcome::Duplicate(existing.clone()));
        }

        let record = VehicleRecord {
            id: Uuid::new_v4().to_string(),
            vehicle_no: entry.vehicle_no,
            container_id: entry.container_id,
            vehicle_type: entry.vehicle_type,
            plant: Some(entry.plant),
            in_time: entry.in_time,
            out_time: None,
        };
        records.push(record.clone());
        Ok(InsertOutcome::Created(record))
    }

    async fn mark_exit(&self, id: &str, at: DateTime<Utc>) -> Result<ExitOutcome, AppError> {
        let mut records = self.records.write().await;
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(ExitOutcome::NotFound);
        };

        if record.record_exit(at) {
            Ok(ExitOutcome::Exited(record.clone()))
        } else {
            Ok(ExitOutcome::AlreadyExited(record.clone()))
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
