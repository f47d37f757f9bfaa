//! Settings model and loading.

use directories::ProjectDirs;
use huntsize_types::HuntsizeError;
use serde::Deserialize;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "HUNTSIZE_CONFIG";

/// Prefix of environment variables overriding individual settings.
pub const ENV_PREFIX: &str = "HUNTSIZE";

/// Configuration file looked up in the working directory as a last resort.
pub const LOCAL_CONFIG_FILE: &str = "huntsize.toml";

/// Average record size assumed when a table cannot be sampled, in KB.
pub const DEFAULT_FALLBACK_RECORD_SIZE_KB: f64 = 2.5;

/// Advanced-hunting tables estimated when none are configured.
pub const DEFAULT_TABLES: &[&str] = &[
    "AlertEvidence",
    "AlertInfo",
    "CloudAppEvents",
    "DeviceEvents",
    "DeviceFileCertificateInfo",
    "DeviceFileEvents",
    "DeviceImageLoadEvents",
    "DeviceInfo",
    "DeviceLogonEvents",
    "DeviceNetworkEvents",
    "DeviceNetworkInfo",
    "DeviceProcessEvents",
    "DeviceRegistryEvents",
    "EmailAttachmentInfo",
    "EmailEvents",
    "EmailPostDeliveryEvents",
    "EmailUrlInfo",
    "IdentityDirectoryEvents",
    "IdentityLogonEvents",
    "IdentityQueryEvents",
    "UrlClickEvents",
];

/// Errors raised while loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration source could not be read or deserialized.
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    /// The configuration parsed but holds an unusable value.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for HuntsizeError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Static inputs of a run, built once at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Service principal credentials.
    #[serde(default)]
    pub auth: AuthSettings,
    /// Hunting API endpoint settings.
    #[serde(default)]
    pub api: ApiSettings,
    /// Where artifacts are written.
    #[serde(default)]
    pub output: OutputSettings,
    /// Estimation inputs.
    #[serde(default)]
    pub estimate: EstimateSettings,
    /// Log output.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Service principal used for the client-credentials grant.
#[derive(Clone, Deserialize)]
pub struct AuthSettings {
    /// Directory (tenant) identifier.
    #[serde(default)]
    pub tenant_id: String,
    /// Application (client) identifier.
    #[serde(default)]
    pub client_id: String,
    /// Client secret.
    #[serde(default)]
    pub client_secret: String,
    /// Token authority base URL.
    #[serde(default = "default_authority")]
    pub authority: String,
    /// Scope requested for the hunting API.
    #[serde(default = "default_scope")]
    pub scope: String,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("authority", &self.authority)
            .field("scope", &self.scope)
            .finish()
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            tenant_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            authority: default_authority(),
            scope: default_scope(),
        }
    }
}

fn default_authority() -> String {
    "https://login.microsoftonline.com".to_string()
}

fn default_scope() -> String {
    "https://api.security.microsoft.com/.default".to_string()
}

/// Hunting API endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries for throttled or failed requests.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.security.microsoft.com".to_string()
}

const fn default_timeout_secs() -> u64 {
    60
}

const fn default_max_retries() -> u32 {
    5
}

/// Output locations.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    /// Directory receiving sample files, the summary and the log file.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("huntsize-output")
}

/// Estimation inputs that are not prompted for.
#[derive(Debug, Clone, Deserialize)]
pub struct EstimateSettings {
    /// Tables to estimate, in processing order.
    #[serde(default = "default_tables")]
    pub tables: Vec<String>,
    /// Average record size used when sampling a table fails, in KB.
    #[serde(default = "default_fallback_record_size_kb")]
    pub fallback_record_size_kb: f64,
    /// Tables processed at once. 1 is strictly sequential.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

impl Default for EstimateSettings {
    fn default() -> Self {
        Self {
            tables: default_tables(),
            fallback_record_size_kb: default_fallback_record_size_kb(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_tables() -> Vec<String> {
    DEFAULT_TABLES.iter().map(|t| (*t).to_string()).collect()
}

const fn default_fallback_record_size_kb() -> f64 {
    DEFAULT_FALLBACK_RECORD_SIZE_KB
}

const fn default_parallelism() -> usize {
    1
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Level used when neither `-v` nor `RUST_LOG` is given.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to also write a debug-level log file to the output directory.
    #[serde(default = "default_log_file")]
    pub file: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

const fn default_log_file() -> bool {
    true
}

impl Settings {
    /// Loads settings from the resolved configuration file and the environment.
    ///
    /// A file named by `explicit_path` or `HUNTSIZE_CONFIG` must exist; the
    /// fallback locations are optional. Environment variables take the form
    /// `HUNTSIZE_<SECTION>__<KEY>`, e.g. `HUNTSIZE_AUTH__CLIENT_SECRET`;
    /// `HUNTSIZE_ESTIMATE__TABLES` takes a comma-separated list.
    ///
    /// # Errors
    ///
    /// Returns an error if a named file is missing, a source cannot be parsed
    /// or the result is invalid.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = config_location(explicit_path, env::var_os(CONFIG_PATH_ENV));
        debug!(path = %path.display(), required, "Loading configuration");
        Self::load_from(&path, required)
    }

    /// Loads settings from a specific file, then the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is required but missing, a source cannot
    /// be parsed, or the result is invalid.
    pub fn load_from(path: &Path, required: bool) -> Result<Self, ConfigError> {
        Self::load_with_env(path, required, environment())
    }

    fn load_with_env(
        path: &Path,
        required: bool,
        environment: config::Environment,
    ) -> Result<Self, ConfigError> {
        let settings: Self = config::Config::builder()
            .add_source(config::File::from(path).required(required))
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Checks values that deserialize fine but cannot drive a run.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty table list, a non-positive fallback size
    /// or a zero parallelism.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.estimate.tables.is_empty() {
            return Err(ConfigError::Invalid("estimate.tables is empty".into()));
        }
        let fallback = self.estimate.fallback_record_size_kb;
        if fallback.is_nan() || fallback <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "estimate.fallback_record_size_kb must be positive, got {fallback}"
            )));
        }
        if self.estimate.parallelism == 0 {
            return Err(ConfigError::Invalid(
                "estimate.parallelism must be at least 1".into(),
            ));
        }

        // Table names are spliced into queries verbatim.
        for table in &self.estimate.tables {
            if !is_plain_identifier(table) {
                warn!(table = %table, "Table name is not a plain identifier");
            }
        }

        Ok(())
    }

    /// Returns the directory receiving per-table sample files.
    #[must_use]
    pub fn samples_dir(&self) -> PathBuf {
        self.output.dir.join("samples")
    }
}

/// Returns true if `name` only contains ASCII letters, digits and underscores.
#[must_use]
pub fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Resolves which configuration file to read.
///
/// Order: explicit path, `HUNTSIZE_CONFIG`, the platform config directory
/// (if a file exists there), then `./huntsize.toml`.
#[must_use]
pub fn resolve_config_path(explicit_path: Option<&Path>) -> PathBuf {
    config_location(explicit_path, env::var_os(CONFIG_PATH_ENV)).0
}

/// Returns the configuration file and whether it must exist.
///
/// Paths named by the operator are required; fallback locations are not.
fn config_location(explicit_path: Option<&Path>, env_path: Option<OsString>) -> (PathBuf, bool) {
    if let Some(path) = explicit_path {
        return (path.to_path_buf(), true);
    }
    if let Some(path) = env_path.filter(|p| !p.is_empty()) {
        return (PathBuf::from(path), true);
    }
    if let Some(dirs) = ProjectDirs::from("", "", "huntsize") {
        let candidate = dirs.config_dir().join("config.toml");
        if candidate.exists() {
            return (candidate, false);
        }
    }
    (PathBuf::from(LOCAL_CONFIG_FILE), false)
}

/// Environment source for `HUNTSIZE_<SECTION>__<KEY>` overrides.
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("estimate.tables")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("huntsize.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api.base_url, "https://api.security.microsoft.com");
        assert_eq!(settings.api.timeout_secs, 60);
        assert_eq!(settings.estimate.tables.len(), DEFAULT_TABLES.len());
        assert_eq!(settings.estimate.fallback_record_size_kb, 2.5);
        assert_eq!(settings.estimate.parallelism, 1);
        assert_eq!(settings.logging.level, "warn");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[auth]
tenant_id = "tenant"
client_id = "client"
client_secret = "secret"

[output]
dir = "/tmp/huntsize"

[estimate]
tables = ["DeviceEvents", "EmailEvents"]
fallback_record_size_kb = 3.0
"#,
        );

        let settings = Settings::load_from(&path, true).unwrap();
        assert_eq!(settings.auth.tenant_id, "tenant");
        assert_eq!(settings.auth.client_secret, "secret");
        assert_eq!(
            settings.auth.scope,
            "https://api.security.microsoft.com/.default"
        );
        assert_eq!(settings.output.dir, PathBuf::from("/tmp/huntsize"));
        assert_eq!(settings.estimate.tables, vec!["DeviceEvents", "EmailEvents"]);
        assert_eq!(settings.estimate.fallback_record_size_kb, 3.0);
        assert_eq!(settings.samples_dir(), PathBuf::from("/tmp/huntsize/samples"));
    }

    #[test]
    fn test_missing_optional_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.toml"), false).unwrap();
        assert_eq!(settings.estimate.tables.len(), DEFAULT_TABLES.len());
    }

    #[test]
    fn test_missing_required_file_fails() {
        let dir = TempDir::new().unwrap();
        assert!(Settings::load_from(&dir.path().join("absent.toml"), true).is_err());
    }

    #[test]
    fn test_rejects_empty_tables() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[estimate]\ntables = []\n");
        let err = Settings::load_from(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_non_positive_fallback() {
        let mut settings = Settings::default();
        settings.estimate.fallback_record_size_kb = 0.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_parallelism() {
        let mut settings = Settings::default();
        settings.estimate.parallelism = 0;

        let err: HuntsizeError = settings.validate().unwrap_err().into();
        assert!(matches!(err, HuntsizeError::Config(msg) if msg.contains("parallelism")));
    }

    #[test]
    fn test_plain_identifier() {
        assert!(is_plain_identifier("DeviceProcessEvents"));
        assert!(is_plain_identifier("Custom_Table_CL"));
        assert!(!is_plain_identifier("DeviceEvents | take 1"));
        assert!(!is_plain_identifier(""));
    }

    #[test]
    fn test_auth_debug_redacts_secret() {
        let auth = AuthSettings {
            client_secret: "hunter2".into(),
            ..AuthSettings::default()
        };
        let rendered = format!("{auth:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = PathBuf::from("/etc/huntsize/custom.toml");
        assert_eq!(resolve_config_path(Some(&path)), path);
        assert_eq!(
            config_location(Some(&path), Some("/tmp/other.toml".into())),
            (path, true)
        );
    }

    #[test]
    fn test_named_config_file_is_required() {
        let (path, required) = config_location(None, Some("/etc/huntsize/env.toml".into()));
        assert_eq!(path, PathBuf::from("/etc/huntsize/env.toml"));
        assert!(required);

        let dir = TempDir::new().unwrap();
        let absent = dir.path().join("absent.toml");
        let err = Settings::load(Some(&absent)).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn test_env_overrides_table_list() {
        let dir = TempDir::new().unwrap();
        let vars = config::Map::from([
            (
                "HUNTSIZE_ESTIMATE__TABLES".to_string(),
                "DeviceEvents,EmailEvents".to_string(),
            ),
            ("HUNTSIZE_API__MAX_RETRIES".to_string(), "2".to_string()),
            ("HUNTSIZE_AUTH__TENANT_ID".to_string(), "contoso".to_string()),
        ]);

        let settings = Settings::load_with_env(
            &dir.path().join("absent.toml"),
            false,
            environment().source(Some(vars)),
        )
        .unwrap();

        assert_eq!(settings.estimate.tables, vec!["DeviceEvents", "EmailEvents"]);
        assert_eq!(settings.api.max_retries, 2);
        assert_eq!(settings.auth.tenant_id, "contoso");
    }
}
