use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, Uri},
    response::Json,
};
use axum_extra::extract::Query;
use common::errors::AppError;
use common::models::{
    ClearWeatherResponse, MessageResponse, RecordPreview, RecordSummary, WeatherResponse,
    WeatherUpdateRequest,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::dispatcher::{Dispatcher, WeatherQuery};
use crate::store::WeatherStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn WeatherStore>,
    pub dispatcher: Dispatcher,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health check")
    )
)]
pub async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok", "service": "weather-proxy" }))
}

#[utoipa::path(
    get,
    path = "/weather",
    params(
        ("city" = Option<String>, Query, description = "City name, served from cache when fresh"),
        ("lat" = Option<f64>, Query, description = "Latitude; with `lon` takes precedence over `city`"),
        ("lon" = Option<f64>, Query, description = "Longitude")
    ),
    responses(
        (status = 200, description = "Current conditions, forecast and mobile format", body = WeatherResponse),
        (status = 400, description = "City or coordinates not provided"),
        (status = 404, description = "Weather data could not be fetched")
    ),
    tag = "weather"
)]
pub async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherResponse>, AppError> {
    info!(city = ?query.city, lat = ?query.lat, lon = ?query.lon, "Weather request received");

    let response = state.dispatcher.dispatch(&query).await?;

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/weather",
    request_body = WeatherUpdateRequest,
    responses(
        (status = 200, description = "Weather data stored", body = MessageResponse),
        (status = 400, description = "Invalid data provided")
    ),
    tag = "weather"
)]
pub async fn update_weather(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(body) = body.map_err(|e| {
        warn!(error = %e, "Received invalid data for weather update");
        AppError::validation("Invalid data provided")
    })?;

    let city = body
        .get("city")
        .and_then(Value::as_str)
        .filter(|city| !city.is_empty());
    let data = body.get("data").filter(|data| !data.is_null());

    let (Some(city), Some(data)) = (city, data) else {
        warn!("Received invalid data for weather update");
        return Err(AppError::validation("Invalid data provided"));
    };

    state.store.upsert(city, data).await?;
    info!(city = %city, "Weather data updated");

    Ok(Json(MessageResponse {
        message: "Weather data updated successfully".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/clear_weather",
    responses(
        (status = 200, description = "All records removed and id sequence reset", body = ClearWeatherResponse),
        (status = 500, description = "Database error")
    ),
    tag = "admin"
)]
pub async fn clear_weather(
    State(state): State<AppState>,
) -> Result<Json<ClearWeatherResponse>, AppError> {
    let deleted = state.store.delete_all().await?;

    info!(deleted, "Cleared weather entries and reset ID sequence");

    Ok(Json(ClearWeatherResponse {
        message: format!(
            "Successfully cleared {} weather entries and reset ID sequence",
            deleted
        ),
        deleted,
    }))
}

#[utoipa::path(
    delete,
    path = "/delete_city/{city}",
    params(
        ("city" = String, Path, description = "City key, case-sensitive")
    ),
    responses(
        (status = 200, description = "Record deleted", body = MessageResponse),
        (status = 404, description = "No record for this city")
    ),
    tag = "admin"
)]
pub async fn delete_city(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.store.delete_one(&city).await? {
        return Err(AppError::not_found(format!("No weather data found for {}", city)));
    }

    info!(city = %city, "Deleted weather data");

    Ok(Json(MessageResponse {
        message: format!("Successfully deleted weather data for {}", city),
    }))
}

#[utoipa::path(
    get,
    path = "/check_weather",
    responses(
        (status = 200, description = "Cached cities and their fetch times", body = Vec<RecordSummary>)
    ),
    tag = "admin"
)]
pub async fn check_weather(
    State(state): State<AppState>,
) -> Result<Json<Vec<RecordSummary>>, AppError> {
    let records = state.store.list_all().await?;
    info!(total = records.len(), "Checking weather data");
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/database_details",
    responses(
        (status = 200, description = "Cached cities with a truncated payload preview", body = Vec<RecordPreview>)
    ),
    tag = "admin"
)]
pub async fn database_details(
    State(state): State<AppState>,
) -> Result<Json<Vec<RecordPreview>>, AppError> {
    Ok(Json(state.store.list_all_with_preview().await?))
}

#[utoipa::path(
    get,
    path = "/test_db",
    responses(
        (status = 200, description = "Database reachable"),
        (status = 500, description = "Database connection failed")
    ),
    tag = "admin"
)]
pub async fn test_db(State(state): State<AppState>) -> Result<&'static str, AppError> {
    state.store.ping().await?;

    info!("Database connection test successful");
    Ok("Database connection successful!")
}

pub async fn not_found(uri: Uri) -> (StatusCode, Json<Value>) {
    warn!(path = %uri.path(), "Caught unhandled request");
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Not found" })),
    )
}
