//! Estimate security-telemetry ingestion volume from advanced-hunting samples.
//!
//! This is a facade crate that re-exports functionality from the huntsize
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use huntsize_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = load_settings(None)?;
//!     let client = connect(&settings).await?;
//!
//!     let request = request_from_input(&settings, "7", "1000", "take");
//!     let run = estimator(&settings, request).run(&client, 1).await;
//!
//!     for estimate in run.results.sorted_for_display() {
//!         println!("{}: {} GB", estimate.table_name, estimate.est_total_gb_in_lookback);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/huntsize/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

#[cfg(feature = "estimate")]
mod session;

// Re-export core types
pub use huntsize_types::*;

// Re-export configuration
pub use huntsize_config::{
    ApiSettings, AuthSettings, ConfigError, DEFAULT_TABLES, EstimateSettings, LoggingSettings,
    OutputSettings, Settings, is_plain_identifier,
};

// Re-export API access
#[cfg(feature = "fetch")]
pub use huntsize_fetch::{
    AccessToken, AuthConfig, AuthError, ClientConfig, Column, HuntingClient, QueryError,
    QueryResult, QueryRunner, Row, TokenProvider, query,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use huntsize_format::{CsvFormatter, FormatError, JsonFormatter, OutputFormat, write_summary};

// Re-export estimation
#[cfg(feature = "estimate")]
pub use huntsize_estimate::{
    DEFAULT_FALLBACK_RECORD_SIZE_KB, EstimationRun, Estimator, SampleError, SkipReason,
    SkippedTable, TableOutcome,
};

#[cfg(feature = "estimate")]
pub use session::{
    SUMMARY_FILE_PREFIX, auth_config, client_config, connect, estimator, load_settings,
    request_from_input, save_summary, summary_file_name,
};

/// Prelude module for convenient imports.
///
/// ```
/// use huntsize_lib::prelude::*;
/// ```
pub mod prelude {
    pub use huntsize_types::{
        EstimationRequest, GrandTotals, HuntsizeError, Result, ResultSet, SampleMethod,
        TableEstimate,
    };

    pub use huntsize_config::Settings;

    #[cfg(feature = "fetch")]
    pub use huntsize_fetch::{HuntingClient, QueryResult, QueryRunner};

    #[cfg(feature = "format")]
    pub use huntsize_format::OutputFormat;

    #[cfg(feature = "estimate")]
    pub use huntsize_estimate::{EstimationRun, Estimator, SkipReason, TableOutcome};

    #[cfg(feature = "estimate")]
    pub use crate::session::{connect, estimator, load_settings, request_from_input, save_summary};
}
