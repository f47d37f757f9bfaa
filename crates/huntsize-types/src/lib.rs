//! Core types for the huntsize ingestion estimator.
//!
//! This crate provides the data model shared by the other huntsize crates:
//!
//! - [`SampleMethod`] - How rows are sampled from a table
//! - [`EstimationRequest`] - Normalized run parameters
//! - [`TableEstimate`] - Extrapolated ingestion volume for one table
//! - [`ResultSet`] - Estimates of a run, in processing order
//! - [`GrandTotals`] - Totals across a result set

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/huntsize/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod estimate;
mod request;
mod result_set;
mod sample_method;

pub use error::{HuntsizeError, Result};
pub use estimate::{TableEstimate, daily_events, round2};
pub use request::{
    DEFAULT_SAMPLE_SIZE, EstimationRequest, MAX_SAMPLE_SIZE, MIN_LOOKBACK_DAYS, MIN_SAMPLE_SIZE,
    clamp_sample_size, parse_lookback_days, parse_sample_size,
};
pub use result_set::{GrandTotals, ResultSet};
pub use sample_method::{SampleMethod, SampleMethodParseError};
