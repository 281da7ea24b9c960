#![allow(dead_code)]

use async_trait::async_trait;
use common::errors::{AppError, UpstreamStatus};
use common::models::CombinedPayload;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use weather_proxy::api_client::WeatherGateway;
use weather_proxy::store::{MemoryWeatherStore, WeatherRecord, WeatherStore};

pub fn current_fixture(city: &str) -> Value {
    json!({
        "name": city,
        "main": { "temp": 21.3, "humidity": 48, "pressure": 1016 },
        "weather": [{ "id": 800, "main": "Clear", "description": "clear sky" }],
        "wind": { "speed": 3.6, "deg": 200 },
        "clouds": { "all": 0 },
        "sys": { "country": "FR" }
    })
}

pub fn forecast_fixture() -> Value {
    json!({
        "cod": "200",
        "cnt": 1,
        "list": [{ "dt": 1_700_000_000, "main": { "temp": 19.0 } }]
    })
}

/// Gateway double that records how often each operation ran.
pub struct StubGateway {
    current: Option<Value>,
    pub city_calls: AtomicUsize,
    pub coordinate_calls: AtomicUsize,
}

impl StubGateway {
    pub fn returning(current: Value) -> Arc<Self> {
        Arc::new(Self {
            current: Some(current),
            city_calls: AtomicUsize::new(0),
            coordinate_calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            current: None,
            city_calls: AtomicUsize::new(0),
            coordinate_calls: AtomicUsize::new(0),
        })
    }

    pub fn city_calls(&self) -> usize {
        self.city_calls.load(Ordering::SeqCst)
    }

    pub fn coordinate_calls(&self) -> usize {
        self.coordinate_calls.load(Ordering::SeqCst)
    }

    fn reply(&self) -> Result<CombinedPayload, AppError> {
        match &self.current {
            Some(current) => Ok(CombinedPayload::new(current.clone(), forecast_fixture())),
            None => Err(AppError::gateway(
                UpstreamStatus::new(Some(404), r#"{"cod":"404","message":"city not found"}"#),
                UpstreamStatus::new(Some(404), r#"{"cod":"404","message":"city not found"}"#),
            )),
        }
    }
}

#[async_trait]
impl WeatherGateway for StubGateway {
    async fn fetch_by_city(&self, _city: &str) -> Result<CombinedPayload, AppError> {
        self.city_calls.fetch_add(1, Ordering::SeqCst);
        self.reply()
    }

    async fn fetch_by_coordinates(
        &self,
        _lat: f64,
        _lon: f64,
    ) -> Result<CombinedPayload, AppError> {
        self.coordinate_calls.fetch_add(1, Ordering::SeqCst);
        self.reply()
    }
}

/// Memory store that counts lookups, to prove a path never touched the cache.
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryWeatherStore,
    gets: AtomicUsize,
}

impl CountingStore {
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherStore for CountingStore {
    async fn get(&self, city: &str) -> Result<Option<WeatherRecord>, AppError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(city).await
    }

    async fn upsert(&self, city: &str, payload: &Value) -> Result<WeatherRecord, AppError> {
        self.inner.upsert(city, payload).await
    }

    async fn delete_one(&self, city: &str) -> Result<bool, AppError> {
        self.inner.delete_one(city).await
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        self.inner.delete_all().await
    }

    async fn records(&self) -> Result<Vec<WeatherRecord>, AppError> {
        self.inner.records().await
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.inner.ping().await
    }
}

/// Store whose every operation fails like a lost database connection.
pub struct FailingStore;

impl FailingStore {
    fn fail<T>() -> Result<T, AppError> {
        Err(AppError::database("boom"))
    }
}

#[async_trait]
impl WeatherStore for FailingStore {
    async fn get(&self, _city: &str) -> Result<Option<WeatherRecord>, AppError> {
        Self::fail()
    }

    async fn upsert(&self, _city: &str, _payload: &Value) -> Result<WeatherRecord, AppError> {
        Self::fail()
    }

    async fn delete_one(&self, _city: &str) -> Result<bool, AppError> {
        Self::fail()
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        Self::fail()
    }

    async fn records(&self) -> Result<Vec<WeatherRecord>, AppError> {
        Self::fail()
    }

    async fn ping(&self) -> Result<(), AppError> {
        Self::fail()
    }
}
