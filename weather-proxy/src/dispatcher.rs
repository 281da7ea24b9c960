use common::errors::AppError;
use common::models::WeatherResponse;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::api_client::WeatherGateway;
use crate::cache::{WeatherCache, fetch_failed};
use crate::shaper;

/// Raw `GET /weather` parameters; empty strings count as absent.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn parse_coordinate(raw: &str, name: &str, limit: f64) -> Result<f64, AppError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() <= limit)
        .ok_or_else(|| AppError::validation(format!("Invalid {}: {}", name, raw)))
}

/// Routes a query to the live coordinate path or the cached city path.
#[derive(Clone)]
pub struct Dispatcher {
    cache: WeatherCache,
    gateway: Arc<dyn WeatherGateway>,
}

impl Dispatcher {
    pub fn new(cache: WeatherCache, gateway: Arc<dyn WeatherGateway>) -> Self {
        Self { cache, gateway }
    }

    /// Coordinates win over a city name when both are supplied.
    #[instrument(skip(self))]
    pub async fn dispatch(&self, query: &WeatherQuery) -> Result<WeatherResponse, AppError> {
        if let (Some(lat), Some(lon)) = (present(&query.lat), present(&query.lon)) {
            let lat = parse_coordinate(lat, "latitude", 90.0)?;
            let lon = parse_coordinate(lon, "longitude", 180.0)?;
            return self.by_coordinates(lat, lon).await;
        }

        if let Some(city) = present(&query.city) {
            info!(city = %city, "Getting weather for city");
            let payload = self.cache.resolve(city).await?;
            let shaped = shaper::shape_for_city_query(&payload).map_err(|e| {
                error!(city = %city, error = %e, "Cached weather data cannot be shaped");
                fetch_failed(city)
            })?;
            return Ok(WeatherResponse::City(shaped));
        }

        warn!("Weather request missing city or coordinates");
        Err(AppError::missing_parameters("City or coordinates not provided"))
    }

    async fn by_coordinates(&self, lat: f64, lon: f64) -> Result<WeatherResponse, AppError> {
        let unavailable = || AppError::not_found("Could not fetch weather data for coordinates");

        let combined = self
            .gateway
            .fetch_by_coordinates(lat, lon)
            .await
            .map_err(|e| {
                error!(lat, lon, error = %e, "Could not fetch weather data for coordinates");
                unavailable()
            })?;

        let shaped = shaper::shape_for_coordinate_query(combined).map_err(|e| {
            error!(lat, lon, error = %e, "Upstream weather data cannot be shaped");
            unavailable()
        })?;
        Ok(WeatherResponse::Coordinates(shaped))
    }
}
