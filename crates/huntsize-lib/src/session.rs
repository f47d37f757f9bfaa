//! Wiring from [`Settings`] to a ready-to-run estimation.

use chrono::NaiveDateTime;
use huntsize_config::Settings;
use huntsize_estimate::Estimator;
use huntsize_fetch::{
    AccessToken, AuthConfig, AuthError, ClientConfig, HuntingClient, TokenProvider,
};
use huntsize_format::{FormatError, OutputFormat, write_summary};
use huntsize_types::{EstimationRequest, HuntsizeError, ResultSet, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Prefix of summary file names.
pub const SUMMARY_FILE_PREFIX: &str = "ingestion_estimate";

/// Loads and validates settings.
///
/// # Errors
///
/// Returns [`HuntsizeError::Config`] if a source cannot be parsed or a value
/// is invalid.
pub fn load_settings(explicit_path: Option<&Path>) -> Result<Settings> {
    Ok(Settings::load(explicit_path)?)
}

/// Builds the token request configuration from settings.
#[must_use]
pub fn auth_config(settings: &Settings) -> AuthConfig {
    let auth = &settings.auth;
    let mut config = AuthConfig::new(&auth.tenant_id, &auth.client_id, &auth.client_secret);
    config.authority.clone_from(&auth.authority);
    config.scope.clone_from(&auth.scope);
    config
}

/// Builds the hunting client configuration from settings.
#[must_use]
pub fn client_config(settings: &Settings) -> ClientConfig {
    ClientConfig {
        base_url: settings.api.base_url.clone(),
        timeout: Duration::from_secs(settings.api.timeout_secs),
        max_retries: settings.api.max_retries,
        ..ClientConfig::default()
    }
}

/// Authenticates and returns a client ready to run queries.
///
/// # Errors
///
/// Returns [`HuntsizeError::Auth`] if a credential is missing or the token
/// request fails, and [`HuntsizeError::Config`] if the HTTP client cannot be
/// built from the API settings.
pub async fn connect(settings: &Settings) -> Result<HuntingClient> {
    let provider = TokenProvider::new(auth_config(settings)).map_err(auth_error)?;
    let token = provider.acquire().await.map_err(auth_error)?;
    open_client(client_config(settings), token)
}

fn open_client(config: ClientConfig, token: AccessToken) -> Result<HuntingClient> {
    HuntingClient::new(config, token)
        .map_err(|e| HuntsizeError::Config(format!("cannot build HTTP client: {e}")))
}

fn auth_error(err: AuthError) -> HuntsizeError {
    HuntsizeError::Auth(err.to_string())
}

/// Builds a request from raw operator input and the configured tables.
#[must_use]
pub fn request_from_input(
    settings: &Settings,
    lookback_days: &str,
    sample_size: &str,
    sample_method: &str,
) -> EstimationRequest {
    EstimationRequest::from_raw_input(
        lookback_days,
        sample_size,
        sample_method,
        settings.estimate.tables.clone(),
    )
}

/// Creates an estimator writing samples under the configured output directory.
#[must_use]
pub fn estimator(settings: &Settings, request: EstimationRequest) -> Estimator {
    Estimator::new(request, settings.samples_dir())
        .with_fallback_record_size_kb(settings.estimate.fallback_record_size_kb)
}

/// Returns the summary file name for a run started at `started`.
#[must_use]
pub fn summary_file_name(started: NaiveDateTime, format: OutputFormat) -> String {
    format!(
        "{SUMMARY_FILE_PREFIX}_{}.{}",
        started.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Writes the run summary into `dir` and returns its path.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub async fn save_summary(
    dir: &Path,
    started: NaiveDateTime,
    format: OutputFormat,
    request: &EstimationRequest,
    results: &ResultSet,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(summary_file_name(started, format));

    write_summary(&path, format, request, results)
        .await
        .map_err(|e| match e {
            FormatError::Io(e) => HuntsizeError::Io(e),
            FormatError::Json(e) => HuntsizeError::Json(e),
            other => HuntsizeError::Format(other.to_string()),
        })?;

    info!(path = %path.display(), tables = results.len(), "Wrote summary");
    Ok(path)
}
