use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::errors::AppError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{WeatherRecord, WeatherStore};

struct Table {
    rows: HashMap<String, WeatherRecord>,
    next_id: i32,
}

/// Process-local store used when no database is configured.
#[derive(Clone)]
pub struct MemoryWeatherStore {
    table: Arc<RwLock<Table>>,
}

impl MemoryWeatherStore {
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(Table {
                rows: HashMap::new(),
                next_id: 1,
            })),
        }
    }

    /// Upsert with an explicit write time; `fetched_at` never moves backwards for a city.
    pub async fn upsert_at(
        &self,
        city: &str,
        payload: &Value,
        fetched_at: DateTime<Utc>,
    ) -> WeatherRecord {
        let mut table = self.table.write().await;

        if let Some(existing) = table.rows.get_mut(city) {
            existing.payload = payload.clone();
            existing.fetched_at = existing.fetched_at.max(fetched_at);
            return existing.clone();
        }

        let record = WeatherRecord {
            id: table.next_id,
            city: city.to_string(),
            payload: payload.clone(),
            fetched_at,
        };
        table.next_id += 1;
        table.rows.insert(city.to_string(), record.clone());
        record
    }
}

impl Default for MemoryWeatherStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeatherStore for MemoryWeatherStore {
    async fn get(&self, city: &str) -> Result<Option<WeatherRecord>, AppError> {
        let table = self.table.read().await;
        Ok(table.rows.get(city).cloned())
    }

    async fn upsert(&self, city: &str, payload: &Value) -> Result<WeatherRecord, AppError> {
        Ok(self.upsert_at(city, payload, Utc::now()).await)
    }

    async fn delete_one(&self, city: &str) -> Result<bool, AppError> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(city).is_some())
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let mut table = self.table.write().await;
        let deleted = table.rows.len() as u64;
        table.rows.clear();
        table.next_id = 1;
        Ok(deleted)
    }

    async fn records(&self) -> Result<Vec<WeatherRecord>, AppError> {
        let table = self.table.read().await;
        let mut records: Vec<WeatherRecord> = table.rows.values().cloned().collect();
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
