use crate::errors::{AppError, UpstreamStatus};
use reqwest::Client;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// HTTP client with a hard per-request timeout. Failed calls are not retried.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> Result<Self, AppError> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    /// Issue a GET and capture whatever came back.
    ///
    /// Transport failures are folded into an [`UpstreamStatus`] without a status code, so
    /// callers decide success purely from the returned value.
    #[instrument(skip(self, url))]
    pub async fn get(&self, url: &str) -> UpstreamStatus {
        let response = match tokio::time::timeout(self.timeout, self.client.get(url).send()).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) if e.is_timeout() => {
                warn!(timeout_ms = self.timeout.as_millis(), "Upstream request timed out");
                return UpstreamStatus::new(None, "request timed out");
            }
            Ok(Err(e)) => {
                // The URL carries the API key.
                let e = e.without_url();
                warn!(error = %e, "Upstream request failed");
                return UpstreamStatus::new(None, e.to_string());
            }
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis(), "Upstream request timed out");
                return UpstreamStatus::new(None, "request timed out");
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                let e = e.without_url();
                warn!(status, error = %e, "Failed to read upstream body");
                return UpstreamStatus::new(None, e.to_string());
            }
        };

        info!(status, "Upstream responded");
        UpstreamStatus::new(Some(status), body)
    }
}
