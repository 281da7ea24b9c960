use common::http_client::HttpClient;
use common::tracing::init_tracing_with_format;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use weather_proxy::api_client::OpenWeatherClient;
use weather_proxy::config::Config;
use weather_proxy::store::{MemoryWeatherStore, PgWeatherStore, WeatherStore};
use weather_proxy::{build_state, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    init_tracing_with_format(&config.log_format);

    let store: Arc<dyn WeatherStore> = match &config.database_url {
        Some(url) => Arc::new(PgWeatherStore::connect(url).await?),
        None => {
            warn!("DATABASE_URL not set, cached weather will not survive a restart");
            Arc::new(MemoryWeatherStore::new())
        }
    };

    if config.openweather_api_key.is_empty() {
        warn!("OPENWEATHER_API_KEY not set, upstream calls will be rejected");
    }

    let http_client = HttpClient::new(config.upstream_timeout_seconds)?;
    let gateway = Arc::new(OpenWeatherClient::new(
        http_client,
        config.openweather_url.clone(),
        config.openweather_api_key.clone(),
    ));

    let app = create_router(build_state(store, gateway), &config.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Weather proxy starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Weather proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        },
    }

    warn!("Shutting down gracefully...");
}
