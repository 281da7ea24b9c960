use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use common::models::{
    AndroidFormat, CityWeatherResponse, ClearWeatherResponse, CombinedPayload,
    CoordinateWeatherResponse, MessageResponse, RecordPreview, RecordSummary, WeatherResponse,
    WeatherUpdateRequest,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::get_weather,
        handlers::update_weather,
        handlers::clear_weather,
        handlers::delete_city,
        handlers::check_weather,
        handlers::database_details,
        handlers::test_db,
    ),
    components(schemas(
        WeatherResponse,
        CityWeatherResponse,
        CoordinateWeatherResponse,
        CombinedPayload,
        AndroidFormat,
        WeatherUpdateRequest,
        MessageResponse,
        ClearWeatherResponse,
        RecordSummary,
        RecordPreview,
    )),
    tags(
        (name = "weather", description = "Cached weather lookups"),
        (name = "admin", description = "Cache inspection and maintenance"),
    ),
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
