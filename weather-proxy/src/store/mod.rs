//! Durable per-city storage of the combined weather payload.

mod memory;
mod postgres;

pub use memory::MemoryWeatherStore;
pub use postgres::PgWeatherStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::errors::AppError;
use common::models::{RecordPreview, RecordSummary};
use serde_json::Value;

/// Serialized payloads longer than this are cut in `/database_details`.
pub const PREVIEW_LENGTH: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub id: i32,
    pub city: String,
    pub payload: Value,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherRecord {
    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            city: self.city.clone(),
            timestamp: self.fetched_at.to_rfc3339(),
        }
    }

    pub fn preview(&self) -> RecordPreview {
        RecordPreview {
            city: self.city.clone(),
            timestamp: self.fetched_at.to_rfc3339(),
            data_preview: payload_preview(&self.payload),
        }
    }
}

/// Serialize `payload` and keep the first [`PREVIEW_LENGTH`] characters.
pub fn payload_preview(payload: &Value) -> Option<String> {
    if payload.is_null() {
        return None;
    }

    let serialized = payload.to_string();
    match serialized.char_indices().nth(PREVIEW_LENGTH) {
        Some((cut, _)) => Some(format!("{}...", &serialized[..cut])),
        None => Some(serialized),
    }
}

/// Keyed record storage shared by every request.
///
/// City keys are exact and case-sensitive. Implementations must make `upsert` a single
/// atomic operation and must roll back a failed `delete_all`.
#[async_trait]
pub trait WeatherStore: Send + Sync {
    async fn get(&self, city: &str) -> Result<Option<WeatherRecord>, AppError>;

    /// Insert or replace the payload for `city`, stamping it with the current time.
    async fn upsert(&self, city: &str, payload: &Value) -> Result<WeatherRecord, AppError>;

    async fn delete_one(&self, city: &str) -> Result<bool, AppError>;

    /// Remove every record and restart the id sequence at 1.
    async fn delete_all(&self) -> Result<u64, AppError>;

    /// All records ordered by id.
    async fn records(&self) -> Result<Vec<WeatherRecord>, AppError>;

    async fn ping(&self) -> Result<(), AppError>;

    async fn list_all(&self) -> Result<Vec<RecordSummary>, AppError> {
        Ok(self.records().await?.iter().map(WeatherRecord::summary).collect())
    }

    async fn list_all_with_preview(&self) -> Result<Vec<RecordPreview>, AppError> {
        Ok(self.records().await?.iter().map(WeatherRecord::preview).collect())
    }
}
