use chrono::{DateTime, TimeDelta, Utc};
use common::errors::AppError;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::api_client::WeatherGateway;
use crate::shaper;
use crate::store::WeatherStore;

/// Records younger than this are served without contacting the provider.
pub const STALE_AFTER_SECONDS: i64 = 3600;

pub fn is_fresh(fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - fetched_at < TimeDelta::seconds(STALE_AFTER_SECONDS)
}

/// The only failure callers see for a city whose data could not be obtained.
pub fn fetch_failed(city: &str) -> AppError {
    AppError::not_found(format!("Could not fetch weather data for {}", city))
}

/// Cache-or-fetch for city lookups.
///
/// Two concurrent refreshes of the same stale city both hit the provider; whichever
/// upsert lands last wins.
#[derive(Clone)]
pub struct WeatherCache {
    store: Arc<dyn WeatherStore>,
    gateway: Arc<dyn WeatherGateway>,
}

impl WeatherCache {
    pub fn new(store: Arc<dyn WeatherStore>, gateway: Arc<dyn WeatherGateway>) -> Self {
        Self { store, gateway }
    }

    pub async fn resolve(&self, city: &str) -> Result<Value, AppError> {
        self.resolve_at(city, Utc::now()).await
    }

    /// Same as [`resolve`](Self::resolve) with freshness judged against `now`.
    #[instrument(skip(self, now), fields(city = %city))]
    pub async fn resolve_at(&self, city: &str, now: DateTime<Utc>) -> Result<Value, AppError> {
        if let Some(record) = self.store.get(city).await?
            && is_fresh(record.fetched_at, now)
        {
            info!(city = %city, "Cache hit");
            return Ok(record.payload);
        }

        info!(city = %city, "Cache miss or stale, fetching new data");

        let combined = self.gateway.fetch_by_city(city).await.map_err(|e| {
            error!(city = %city, error = %e, "Could not fetch weather data");
            fetch_failed(city)
        })?;

        // Never persist a payload that the city response could not be built from.
        shaper::android_format(&combined.current).map_err(|e| {
            error!(city = %city, error = %e, "Upstream weather data cannot be shaped");
            fetch_failed(city)
        })?;

        let payload = combined.into_document();
        self.store.upsert(city, &payload).await?;
        info!(city = %city, "Weather data stored");

        Ok(payload)
    }
}
