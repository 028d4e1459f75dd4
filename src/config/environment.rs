//! Environment configuration
//!
//! Resolved once at startup from the process environment (after `.env` is
//! loaded). Every setting has a default except the optional integrations.

use chrono::{FixedOffset, Offset, Utc};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Asia/Colombo, no DST
pub const DEFAULT_SITE_UTC_OFFSET_MINUTES: i32 = 330;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error("{name} must be set when ENVIRONMENT={environment}")]
    Missing { name: &'static str, environment: String },
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub cors_origins: Vec<String>,
    pub database_url: Option<String>,
    pub site_utc_offset_minutes: i32,
    pub overstay_threshold_hours: i64,
    pub vehicle_list_limit: i64,
    pub ocr_engine_url: Option<String>,
    pub ocr_timeout_secs: u64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            cors_origins: Vec::new(),
            database_url: None,
            site_utc_offset_minutes: DEFAULT_SITE_UTC_OFFSET_MINUTES,
            overstay_threshold_hours: 2,
            vehicle_list_limit: 100,
            ocr_engine_url: None,
            ocr_timeout_secs: 30,
        }
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parsed_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional_var(name) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

impl EnvironmentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let site_utc_offset_minutes = parsed_var("SITE_UTC_OFFSET_MINUTES", defaults.site_utc_offset_minutes)?;
        if site_utc_offset_minutes.checked_mul(60).and_then(FixedOffset::east_opt).is_none() {
            return Err(ConfigError::Invalid {
                name: "SITE_UTC_OFFSET_MINUTES",
                value: site_utc_offset_minutes.to_string(),
            });
        }

        let overstay_threshold_hours = parsed_var("OVERSTAY_THRESHOLD_HOURS", defaults.overstay_threshold_hours)?;
        if overstay_threshold_hours < 0 {
            return Err(ConfigError::Invalid {
                name: "OVERSTAY_THRESHOLD_HOURS",
                value: overstay_threshold_hours.to_string(),
            });
        }

        let vehicle_list_limit = parsed_var("VEHICLE_LIST_LIMIT", defaults.vehicle_list_limit)?;
        if vehicle_list_limit <= 0 {
            return Err(ConfigError::Invalid {
                name: "VEHICLE_LIST_LIMIT",
                value: vehicle_list_limit.to_string(),
            });
        }

        let config = Self {
            environment: optional_var("ENVIRONMENT").unwrap_or(defaults.environment),
            host: optional_var("HOST").unwrap_or(defaults.host),
            port: parsed_var("PORT", defaults.port)?,
            log_level: optional_var("LOG_LEVEL").unwrap_or(defaults.log_level),
            cors_origins: optional_var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            database_url: optional_var("DATABASE_URL"),
            site_utc_offset_minutes,
            overstay_threshold_hours,
            vehicle_list_limit,
            ocr_engine_url: optional_var("OCR_ENGINE_URL"),
            ocr_timeout_secs: parsed_var("OCR_TIMEOUT_SECS", defaults.ocr_timeout_secs)?,
        };
        config.check_required()?;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Production never falls back to the in-memory store
    pub fn check_required(&self) -> Result<(), ConfigError> {
        if self.is_production() && self.database_url.is_none() {
            return Err(ConfigError::Missing {
                name: "DATABASE_URL",
                environment: self.environment.clone(),
            });
        }
        Ok(())
    }

    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Offset used for calendar days and display times at the gate
    pub fn site_offset(&self) -> FixedOffset {
        self.site_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }

    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_secs)
    }
}
