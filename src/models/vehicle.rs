//! Vehicle Record model
//!
//! A record tracks one visit of a vehicle through the gate: created on entry,
//! closed exactly once on exit. `status` is never stored, it is derived from
//! the presence of `out_time`.

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::utils::validation::parse_utc_timestamp;

/// Vehicle category assigned at registration time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VehicleType {
    Car,
    Van,
    Lorry,
    Truck,
    #[serde(rename = "Container Truck")]
    ContainerTruck,
    Other,
    #[default]
    Unknown,
}

impl VehicleType {
    pub const ALL: [VehicleType; 7] = [
        VehicleType::Car,
        VehicleType::Van,
        VehicleType::Lorry,
        VehicleType::Truck,
        VehicleType::ContainerTruck,
        VehicleType::Other,
        VehicleType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Car => "Car",
            VehicleType::Van => "Van",
            VehicleType::Lorry => "Lorry",
            VehicleType::Truck => "Truck",
            VehicleType::ContainerTruck => "Container Truck",
            VehicleType::Other => "Other",
            VehicleType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VehicleType::ALL
            .iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("unknown vehicle type '{}'", s))
    }
}

/// Destination site of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Plant {
    Badalgama,
    Madampe,
}

impl Plant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plant::Badalgama => "Badalgama",
            Plant::Madampe => "Madampe",
        }
    }
}

impl fmt::Display for Plant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "badalgama" => Ok(Plant::Badalgama),
            "madampe" => Ok(Plant::Madampe),
            other => Err(format!("unknown plant '{}'", other)),
        }
    }
}

/// Lifecycle status, derived from `out_time`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Inside,
    Exited,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Inside => "inside",
            VehicleStatus::Exited => "exited",
        }
    }

    /// Display label used in tables and reports
    pub fn label(&self) -> &'static str {
        match self {
            VehicleStatus::Inside => "Inside",
            VehicleStatus::Exited => "Exited",
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vehicle Record as exchanged with the API
///
/// Timestamps are UTC instants. On the wire they are ISO-8601 strings; naive
/// timestamps without an offset are read as UTC.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    pub id: String,
    pub vehicle_no: String,
    #[serde(default)]
    pub container_id: Option<String>,
    #[serde(rename = "type", default)]
    pub vehicle_type: VehicleType,
    #[serde(default)]
    pub plant: Option<Plant>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub in_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub out_time: Option<DateTime<Utc>>,
}

impl VehicleRecord {
    /// `inside` iff no exit has been recorded
    pub fn status(&self) -> VehicleStatus {
        if self.out_time.is_none() {
            VehicleStatus::Inside
        } else {
            VehicleStatus::Exited
        }
    }

    pub fn is_inside(&self) -> bool {
        self.status() == VehicleStatus::Inside
    }

    /// Close the record. Returns `false` and leaves the record untouched when it
    /// has already exited.
    pub fn record_exit(&mut self, at: DateTime<Utc>) -> bool {
        if self.out_time.is_some() {
            return false;
        }
        self.out_time = Some(at.max(self.in_time));
        true
    }
}

impl Serialize for VehicleRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("VehicleRecord", 8)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("vehicleNo", &self.vehicle_no)?;
        state.serialize_field("containerId", &self.container_id)?;
        state.serialize_field("type", &self.vehicle_type)?;
        state.serialize_field("plant", &self.plant)?;
        state.serialize_field("inTime", &self.in_time.to_rfc3339())?;
        state.serialize_field("outTime", &self.out_time.map(|t| t.to_rfc3339()))?;
        state.serialize_field("status", &self.status())?;
        state.end()
    }
}

/// Data needed to open a new record
#[derive(Debug, Clone, PartialEq)]
pub struct NewVehicleEntry {
    pub vehicle_no: String,
    pub container_id: Option<String>,
    pub vehicle_type: VehicleType,
    pub plant: Plant,
    pub in_time: DateTime<Utc>,
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_utc_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw)))
}

fn deserialize_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_utc_timestamp(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", s))),
    }
}
