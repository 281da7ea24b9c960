use async_trait::async_trait;
use common::errors::{AppError, UpstreamStatus};
use common::http_client::HttpClient;
use common::models::CombinedPayload;
use serde_json::Value;
use tracing::{error, info, instrument};

/// Source of live weather documents.
///
/// Both operations issue a current-conditions call and a forecast call and succeed only
/// when both do. Nothing is retried.
#[async_trait]
pub trait WeatherGateway: Send + Sync {
    async fn fetch_by_city(&self, city: &str) -> Result<CombinedPayload, AppError>;

    async fn fetch_by_coordinates(&self, lat: f64, lon: f64) -> Result<CombinedPayload, AppError>;
}

/// OpenWeatherMap `/weather` + `/forecast` (5 day / 3 hour) client, metric units.
pub struct OpenWeatherClient {
    http_client: HttpClient,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(
        http_client: HttpClient,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn url(&self, endpoint: &str, location: &str) -> String {
        format!(
            "{}/{}?{}&appid={}&units=metric",
            self.base_url,
            endpoint,
            location,
            urlencoding::encode(&self.api_key)
        )
    }

    async fn fetch_pair(&self, location: &str) -> Result<CombinedPayload, AppError> {
        let current_url = self.url("weather", location);
        let forecast_url = self.url("forecast", location);

        let (current, forecast) = tokio::join!(
            self.http_client.get(&current_url),
            self.http_client.get(&forecast_url)
        );

        info!(
            current_status = %current,
            forecast_status = %forecast,
            "Upstream calls completed"
        );

        if !current.is_success() || !forecast.is_success() {
            error!(
                current_status = %current,
                current_body = %current.body,
                forecast_status = %forecast,
                forecast_body = %forecast.body,
                "Failed to fetch weather data"
            );
            return Err(AppError::gateway(current, forecast));
        }

        Ok(CombinedPayload::new(
            parse_body("current conditions", &current)?,
            parse_body("forecast", &forecast)?,
        ))
    }
}

fn parse_body(label: &str, reply: &UpstreamStatus) -> Result<Value, AppError> {
    serde_json::from_str(&reply.body)
        .map_err(|e| AppError::malformed(format!("{} body is not JSON: {}", label, e)))
}

#[async_trait]
impl WeatherGateway for OpenWeatherClient {
    #[instrument(skip(self), fields(city = %city))]
    async fn fetch_by_city(&self, city: &str) -> Result<CombinedPayload, AppError> {
        info!(city = %city, "Fetching weather from API");
        self.fetch_pair(&format!("q={}", urlencoding::encode(city))).await
    }

    #[instrument(skip(self))]
    async fn fetch_by_coordinates(&self, lat: f64, lon: f64) -> Result<CombinedPayload, AppError> {
        info!(lat, lon, "Fetching weather for coordinates");
        self.fetch_pair(&format!("lat={}&lon={}", lat, lon)).await
    }
}
