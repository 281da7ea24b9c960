use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use utoipa::ToSchema;

/// Current conditions and forecast exactly as the provider returned them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CombinedPayload {
    pub current: Value,
    pub forecast: Value,
}

impl CombinedPayload {
    pub fn new(current: Value, forecast: Value) -> Self {
        Self { current, forecast }
    }

    /// The stored form of the payload: `{"current": ..., "forecast": ...}`.
    pub fn into_document(self) -> Value {
        serde_json::json!({
            "current": self.current,
            "forecast": self.forecast,
        })
    }
}

/// Flattened view consumed by the mobile client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AndroidFormat {
    pub city_name: String,
    #[schema(value_type = f64)]
    pub temperature: Number,
    pub description: String,
    #[schema(value_type = f64)]
    pub humidity: Number,
    #[schema(value_type = f64)]
    pub pressure: Number,
    #[schema(value_type = f64)]
    pub wind_speed: Number,
    #[schema(value_type = Option<f64>)]
    pub wind_direction: Option<Number>,
    #[schema(value_type = f64)]
    pub cloudiness: Number,
    pub country: String,
}

/// Response for `GET /weather?city=...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CityWeatherResponse {
    pub current: Value,
    pub forecast: Value,
    pub android_format: AndroidFormat,
}

/// Response for `GET /weather?lat=...&lon=...`
///
/// Deliberately not the same envelope as [`CityWeatherResponse`]; existing clients read
/// both shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CoordinateWeatherResponse {
    pub source: String,
    pub data: CombinedPayload,
    pub android_format: AndroidFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum WeatherResponse {
    City(CityWeatherResponse),
    Coordinates(CoordinateWeatherResponse),
}

/// Body of `POST /weather`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WeatherUpdateRequest {
    pub city: String,
    pub data: Value,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClearWeatherResponse {
    pub message: String,
    pub deleted: u64,
}

/// One row of `GET /check_weather`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecordSummary {
    pub city: String,
    pub timestamp: String,
}

/// One row of `GET /database_details`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecordPreview {
    pub city: String,
    pub timestamp: String,
    pub data_preview: Option<String>,
}
