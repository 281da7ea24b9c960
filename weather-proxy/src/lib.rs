pub mod api_client;
pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod handlers;
pub mod openapi;
pub mod shaper;
pub mod store;

use axum::{
    Router,
    handler::HandlerWithoutStateExt,
    routing::{delete, get, post},
};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api_client::WeatherGateway;
use crate::cache::WeatherCache;
use crate::dispatcher::Dispatcher;
use crate::handlers::AppState;
use crate::store::WeatherStore;

/// Wire the store and gateway into request handlers.
pub fn build_state(store: Arc<dyn WeatherStore>, gateway: Arc<dyn WeatherGateway>) -> AppState {
    let cache = WeatherCache::new(store.clone(), gateway.clone());
    AppState {
        store,
        dispatcher: Dispatcher::new(cache, gateway),
    }
}

pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let static_files = ServeDir::new(static_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(handlers::not_found.into_service());

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/weather",
            get(handlers::get_weather).post(handlers::update_weather),
        )
        .route("/clear_weather", post(handlers::clear_weather))
        .route("/delete_city/{city}", delete(handlers::delete_city))
        .route("/check_weather", get(handlers::check_weather))
        .route("/database_details", get(handlers::database_details))
        .route("/test_db", get(handlers::test_db))
        .merge(openapi::swagger_ui())
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
