mod support;

use chrono::{TimeDelta, Utc};
use common::errors::AppError;
use common::models::{CombinedPayload, WeatherResponse};
use serde_json::json;
use std::sync::Arc;
use support::{CountingStore, StubGateway, current_fixture, forecast_fixture};
use weather_proxy::cache::WeatherCache;
use weather_proxy::dispatcher::{Dispatcher, WeatherQuery};
use weather_proxy::store::{MemoryWeatherStore, WeatherStore};

fn stored_payload(city: &str) -> serde_json::Value {
    CombinedPayload::new(current_fixture(city), forecast_fixture()).into_document()
}

#[tokio::test]
async fn second_resolve_within_window_is_served_from_store() {
    let store = Arc::new(MemoryWeatherStore::new());
    let gateway = StubGateway::returning(current_fixture("Paris"));
    let cache = WeatherCache::new(store.clone(), gateway.clone());

    let first = cache.resolve("Paris").await.expect("first resolve");
    let second = cache.resolve("Paris").await.expect("second resolve");

    assert_eq!(gateway.city_calls(), 1);
    assert_eq!(
        serde_json::to_vec(&first).expect("serialize"),
        serde_json::to_vec(&second).expect("serialize")
    );
    assert_eq!(first, stored_payload("Paris"));
}

#[tokio::test]
async fn record_exactly_an_hour_old_is_refetched() {
    let store = Arc::new(MemoryWeatherStore::new());
    let gateway = StubGateway::returning(current_fixture("Paris"));
    let cache = WeatherCache::new(store.clone(), gateway.clone());

    let now = Utc::now();
    store
        .upsert_at("Paris", &json!({"old": true}), now - TimeDelta::seconds(3600))
        .await;

    let payload = cache.resolve_at("Paris", now).await.expect("resolve");

    assert_eq!(gateway.city_calls(), 1);
    assert_eq!(payload, stored_payload("Paris"));

    let record = store.get("Paris").await.expect("get").expect("record");
    assert_eq!(record.payload, stored_payload("Paris"));
    assert!(record.fetched_at > now - TimeDelta::seconds(3600));
}

#[tokio::test]
async fn record_just_under_an_hour_old_is_fresh() {
    let store = Arc::new(MemoryWeatherStore::new());
    let gateway = StubGateway::returning(current_fixture("Paris"));
    let cache = WeatherCache::new(store.clone(), gateway.clone());

    let now = Utc::now();
    let cached = stored_payload("Paris");
    store
        .upsert_at("Paris", &cached, now - TimeDelta::seconds(3599))
        .await;

    let payload = cache.resolve_at("Paris", now).await.expect("resolve");

    assert_eq!(gateway.city_calls(), 0);
    assert_eq!(payload, cached);
}

#[tokio::test]
async fn stale_refresh_updates_in_place() {
    let store = Arc::new(MemoryWeatherStore::new());
    let gateway = StubGateway::returning(current_fixture("Paris"));
    let cache = WeatherCache::new(store.clone(), gateway.clone());

    let seeded = store
        .upsert_at("Paris", &json!({"old": true}), Utc::now() - TimeDelta::hours(3))
        .await;

    cache.resolve("Paris").await.expect("resolve");

    let records = store.records().await.expect("records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, seeded.id);
    assert!(records[0].fetched_at > seeded.fetched_at);
}

#[tokio::test]
async fn gateway_failure_is_not_found_and_stores_nothing() {
    let store = Arc::new(MemoryWeatherStore::new());
    let gateway = StubGateway::failing();
    let cache = WeatherCache::new(store.clone(), gateway.clone());

    let err = cache.resolve("Atlantis").await.expect_err("must fail");

    assert!(
        matches!(&err, AppError::NotFound(msg) if msg == "Could not fetch weather data for Atlantis")
    );
    assert!(store.records().await.expect("records").is_empty());
}

#[tokio::test]
async fn stale_record_survives_failed_refresh() {
    let store = Arc::new(MemoryWeatherStore::new());
    let gateway = StubGateway::failing();
    let cache = WeatherCache::new(store.clone(), gateway.clone());

    let old = store
        .upsert_at("Paris", &json!({"old": true}), Utc::now() - TimeDelta::hours(2))
        .await;

    assert!(cache.resolve("Paris").await.is_err());
    let record = store.get("Paris").await.expect("get").expect("record");
    assert_eq!(record, old);
}

#[tokio::test]
async fn unshapeable_upstream_document_is_not_persisted() {
    let mut current = current_fixture("Paris");
    current["main"]
        .as_object_mut()
        .expect("main object")
        .remove("temp");

    let store = Arc::new(MemoryWeatherStore::new());
    let gateway = StubGateway::returning(current);
    let cache = WeatherCache::new(store.clone(), gateway.clone());

    let err = cache.resolve("Paris").await.expect_err("must fail");

    assert!(
        matches!(&err, AppError::NotFound(msg) if msg == "Could not fetch weather data for Paris")
    );
    assert!(store.get("Paris").await.expect("get").is_none());
}

fn dispatcher_with(store: Arc<CountingStore>, gateway: Arc<StubGateway>) -> Dispatcher {
    let cache = WeatherCache::new(store, gateway.clone());
    Dispatcher::new(cache, gateway)
}

fn query(city: Option<&str>, lat: Option<&str>, lon: Option<&str>) -> WeatherQuery {
    WeatherQuery {
        city: city.map(String::from),
        lat: lat.map(String::from),
        lon: lon.map(String::from),
    }
}

#[tokio::test]
async fn coordinates_take_precedence_over_city() {
    let store = Arc::new(CountingStore::default());
    let gateway = StubGateway::returning(current_fixture("Paris"));
    let dispatcher = dispatcher_with(store.clone(), gateway.clone());

    let response = dispatcher
        .dispatch(&query(Some("London"), Some("48.85"), Some("2.35")))
        .await
        .expect("dispatch");

    assert!(matches!(response, WeatherResponse::Coordinates(ref r) if r.source == "external"));
    assert_eq!(gateway.coordinate_calls(), 1);
    assert_eq!(gateway.city_calls(), 0);
    assert_eq!(store.gets(), 0);
    assert!(store.records().await.expect("records").is_empty());
}

#[tokio::test]
async fn city_query_goes_through_cache() {
    let store = Arc::new(CountingStore::default());
    let gateway = StubGateway::returning(current_fixture("Berlin"));
    let dispatcher = dispatcher_with(store.clone(), gateway.clone());

    let response = dispatcher
        .dispatch(&query(Some("Berlin"), Some("52.5"), None))
        .await
        .expect("dispatch");

    let WeatherResponse::City(city) = response else {
        panic!("expected city response");
    };
    assert_eq!(city.android_format.city_name, "Berlin");
    assert_eq!(store.gets(), 1);
    assert_eq!(gateway.city_calls(), 1);
    assert_eq!(gateway.coordinate_calls(), 0);
}

#[tokio::test]
async fn empty_parameters_are_missing() {
    let store = Arc::new(CountingStore::default());
    let gateway = StubGateway::returning(current_fixture("Paris"));
    let dispatcher = dispatcher_with(store.clone(), gateway.clone());

    for q in [
        query(None, None, None),
        query(Some(""), None, None),
        query(Some(""), Some(""), Some("")),
        query(None, Some("48.85"), None),
    ] {
        let err = dispatcher.dispatch(&q).await.expect_err("must fail");
        assert!(matches!(err, AppError::MissingParameters(_)), "{q:?}");
    }
    assert_eq!(gateway.city_calls() + gateway.coordinate_calls(), 0);
}

#[tokio::test]
async fn invalid_coordinates_are_rejected() {
    let store = Arc::new(CountingStore::default());
    let gateway = StubGateway::returning(current_fixture("Paris"));
    let dispatcher = dispatcher_with(store, gateway.clone());

    let err = dispatcher
        .dispatch(&query(None, Some("north"), Some("2.35")))
        .await
        .expect_err("must fail");

    assert!(matches!(err, AppError::ValidationError(_)));
    assert_eq!(gateway.coordinate_calls(), 0);
}

#[tokio::test]
async fn coordinate_fetch_failure_is_not_found() {
    let store = Arc::new(CountingStore::default());
    let gateway = StubGateway::failing();
    let dispatcher = dispatcher_with(store, gateway);

    let err = dispatcher
        .dispatch(&query(None, Some("0"), Some("0")))
        .await
        .expect_err("must fail");

    assert!(
        matches!(err, AppError::NotFound(msg) if msg == "Could not fetch weather data for coordinates")
    );
}

#[tokio::test]
async fn unshapeable_coordinate_document_is_not_found() {
    let mut current = current_fixture("Paris");
    current.as_object_mut().expect("object").remove("sys");

    let store = Arc::new(CountingStore::default());
    let gateway = StubGateway::returning(current);
    let dispatcher = dispatcher_with(store, gateway);

    let err = dispatcher
        .dispatch(&query(None, Some("48.85"), Some("2.35")))
        .await
        .expect_err("must fail");

    assert!(
        matches!(err, AppError::NotFound(msg) if msg == "Could not fetch weather data for coordinates")
    );
}
