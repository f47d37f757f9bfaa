//! Run configuration for the huntsize ingestion estimator.
//!
//! [`Settings`] holds every static input of a run: service principal
//! credentials, the hunting API endpoint, the output directory, the table
//! list and logging preferences. It is loaded once at startup from an
//! optional TOML file and `HUNTSIZE_*` environment variables, then passed by
//! reference to whatever needs it.

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/huntsize/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod settings;

pub use settings::{
    ApiSettings, AuthSettings, CONFIG_PATH_ENV, ConfigError, DEFAULT_FALLBACK_RECORD_SIZE_KB,
    DEFAULT_TABLES, ENV_PREFIX, EstimateSettings, LOCAL_CONFIG_FILE, LoggingSettings,
    OutputSettings, Settings, is_plain_identifier, resolve_config_path,
};
