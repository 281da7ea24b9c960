//! Builds the two outbound document shapes from upstream payloads.

use common::errors::AppError;
use common::models::{
    AndroidFormat, CityWeatherResponse, CombinedPayload, CoordinateWeatherResponse,
};
use serde_json::{Number, Value};

/// Resolve a dotted path such as `weather.0.description`; `null` counts as missing.
///
/// Numeric segments only index arrays and named segments only index objects.
fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(doc, |node, segment| match (node, segment.parse::<usize>()) {
            (Value::Array(items), Ok(index)) => items.get(index),
            (Value::Object(map), Err(_)) => map.get(segment),
            _ => None,
        })
        .filter(|value| !value.is_null())
}

fn required<'a>(doc: &'a Value, path: &str) -> Result<&'a Value, AppError> {
    lookup(doc, path).ok_or_else(|| AppError::malformed(format!("missing field `{}`", path)))
}

fn required_number(doc: &Value, path: &str) -> Result<Number, AppError> {
    match required(doc, path)? {
        Value::Number(n) => Ok(n.clone()),
        other => Err(AppError::malformed(format!(
            "field `{}` is not a number: {}",
            path, other
        ))),
    }
}

fn required_string(doc: &Value, path: &str) -> Result<String, AppError> {
    match required(doc, path)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(AppError::malformed(format!(
            "field `{}` is not a string: {}",
            path, other
        ))),
    }
}

/// Flatten a current-conditions document into the mobile field set.
pub fn android_format(current: &Value) -> Result<AndroidFormat, AppError> {
    let wind_direction = match lookup(current, "wind.deg") {
        None => None,
        Some(Value::Number(n)) => Some(n.clone()),
        Some(other) => {
            return Err(AppError::malformed(format!(
                "field `wind.deg` is not a number: {}",
                other
            )));
        }
    };

    Ok(AndroidFormat {
        city_name: required_string(current, "name")?,
        temperature: required_number(current, "main.temp")?,
        description: required_string(current, "weather.0.description")?,
        humidity: required_number(current, "main.humidity")?,
        pressure: required_number(current, "main.pressure")?,
        wind_speed: required_number(current, "wind.speed")?,
        wind_direction,
        cloudiness: required_number(current, "clouds.all")?,
        country: required_string(current, "sys.country")?,
    })
}

/// Shape a stored `{current, forecast}` document for a city lookup.
pub fn shape_for_city_query(payload: &Value) -> Result<CityWeatherResponse, AppError> {
    let current = required(payload, "current")?;
    let forecast = required(payload, "forecast")?;

    Ok(CityWeatherResponse {
        android_format: android_format(current)?,
        current: current.clone(),
        forecast: forecast.clone(),
    })
}

pub fn shape_for_coordinate_query(
    payload: CombinedPayload,
) -> Result<CoordinateWeatherResponse, AppError> {
    let android_format = android_format(&payload.current)?;

    Ok(CoordinateWeatherResponse {
        source: "external".to_string(),
        data: payload,
        android_format,
    })
}
