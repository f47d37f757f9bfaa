//! HTTP client for the advanced-hunting API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{AccessToken, QueryResult};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.security.microsoft.com";

/// Path of the query endpoint, relative to the base URL.
pub const RUN_QUERY_PATH: &str = "/api/advancedhunting/run";

/// Configuration for the hunting client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retry attempts for throttled or failed requests.
    pub max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds).
    pub base_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds).
    pub max_delay_ms: u64,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 5,
            base_delay_ms: 1_000,
            max_delay_ms: 60_000, // The service throttles per minute
            user_agent: format!("huntsize/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Returns the full URL of the query endpoint.
    #[must_use]
    pub fn run_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), RUN_QUERY_PATH)
    }
}

/// Errors that can occur while running a query.
#[derive(Error, Debug)]
pub enum QueryError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server kept failing or throttling after all retries.
    #[error("Server error: {status} after {attempts} attempts")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Attempts made.
        attempts: u32,
    },

    /// The service refused the query (bad syntax, missing permission, unknown table).
    #[error("Query rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },
}

/// Anything that can run a hunting query.
///
/// The estimator only depends on this seam: a query string in, rows out, or
/// a failure.
#[async_trait]
pub trait QueryRunner: Send + Sync {
    /// Runs a query and returns its rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the query could not be executed.
    async fn run_query(&self, query: &str) -> Result<QueryResult, QueryError>;
}

#[derive(Serialize)]
struct RunQueryBody<'a> {
    #[serde(rename = "Query")]
    query: &'a str,
}

/// Authenticated client for the hunting API with retry logic.
#[derive(Debug, Clone)]
pub struct HuntingClient {
    client: Client,
    config: ClientConfig,
    token: AccessToken,
}

impl HuntingClient {
    /// Creates a new client using the given token for every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ClientConfig, token: AccessToken) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;
        Ok(Self {
            client,
            config,
            token,
        })
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Runs a query, retrying throttled and transient failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is rejected or fails after all retries.
    pub async fn run(&self, query: &str) -> Result<QueryResult, QueryError> {
        let url = self.config.run_url();
        let body = RunQueryBody { query };
        let mut attempts = 0;

        loop {
            debug!(query, attempt = attempts, "Running hunting query");
            let sent = self
                .client
                .post(&url)
                .bearer_auth(self.token.secret())
                .json(&body)
                .send()
                .await;

            match sent {
                Ok(response) => {
                    let status = response.status();

                    // Retry on server errors (5xx) and throttling (429)
                    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                        if attempts < self.config.max_retries {
                            attempts += 1;
                            let delay = self.calculate_backoff_delay(attempts);
                            warn!(
                                status = status.as_u16(),
                                attempt = attempts,
                                delay_ms = delay.as_millis() as u64,
                                "Hunting API unavailable, retrying"
                            );
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                        return Err(QueryError::ServerError {
                            status: status.as_u16(),
                            attempts: attempts + 1,
                        });
                    }

                    if !status.is_success() {
                        let message = response.text().await.unwrap_or_default();
                        return Err(QueryError::Rejected {
                            status: status.as_u16(),
                            message,
                        });
                    }

                    return Ok(response.json::<QueryResult>().await?);
                }
                Err(e) if self.is_retryable_error(&e) && attempts < self.config.max_retries => {
                    attempts += 1;
                    let delay = self.calculate_backoff_delay(attempts);
                    warn!(error = %e, attempt = attempts, "Hunting request failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Calculates the backoff delay with exponential backoff and jitter.
    fn calculate_backoff_delay(&self, attempt: u32) -> Duration {
        let exp_delay = self
            .config
            .base_delay_ms
            .saturating_mul(1u64 << attempt.min(10));

        let capped_delay = exp_delay.min(self.config.max_delay_ms);

        // Deterministic jitter in [-25%, +25%) keyed on the attempt number
        let jitter_range = capped_delay / 4;
        let jitter: i64 = if jitter_range > 0 {
            let offset = (u64::from(attempt) * 7919) % (jitter_range * 2);
            offset as i64 - jitter_range as i64
        } else {
            0
        };

        let final_delay = (capped_delay as i64 + jitter).max(100) as u64;
        Duration::from_millis(final_delay)
    }

    /// Determines if a transport error is retryable.
    fn is_retryable_error(&self, error: &reqwest::Error) -> bool {
        if error.is_builder() {
            return false;
        }
        error.is_timeout() || error.is_connect() || error.is_request()
    }
}

#[async_trait]
impl QueryRunner for HuntingClient {
    async fn run_query(&self, query: &str) -> Result<QueryResult, QueryError> {
        self.run(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_client() -> HuntingClient {
        HuntingClient::new(ClientConfig::default(), AccessToken::new("token", Utc::now())).unwrap()
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.base_delay_ms, 1_000);
        assert_eq!(config.max_delay_ms, 60_000);
        assert!(config.user_agent.starts_with("huntsize/"));
    }

    #[test]
    fn test_run_url() {
        let mut config = ClientConfig::default();
        assert_eq!(
            config.run_url(),
            "https://api.security.microsoft.com/api/advancedhunting/run"
        );

        config.base_url = "https://api-eu.security.microsoft.com/".to_string();
        assert_eq!(
            config.run_url(),
            "https://api-eu.security.microsoft.com/api/advancedhunting/run"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = RunQueryBody {
            query: "DeviceEvents | take 1",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["Query"], "DeviceEvents | take 1");
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = test_client();
        assert_eq!(client.config().max_retries, 5);
    }

    #[tokio::test]
    async fn test_backoff_delay_calculation() {
        let client = test_client();

        // First attempt: base_delay * 2 = 2000ms (plus jitter)
        let delay1 = client.calculate_backoff_delay(1);
        assert!(delay1.as_millis() >= 1500 && delay1.as_millis() <= 2500);

        // Second attempt: base_delay * 4 = 4000ms (plus jitter)
        let delay2 = client.calculate_backoff_delay(2);
        assert!(delay2.as_millis() >= 3000 && delay2.as_millis() <= 5000);

        // High attempts are capped at max_delay
        let delay_high = client.calculate_backoff_delay(20);
        assert!(delay_high.as_millis() <= 75_000);
    }
}
