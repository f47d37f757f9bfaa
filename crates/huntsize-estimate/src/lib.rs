//! Ingestion estimation for the huntsize workspace.
//!
//! This crate turns count and sample queries into per-table estimates:
//!
//! - [`Estimator`] - Runs the count/sample pipeline for each configured table
//! - [`TableOutcome`] - What happened to one table (estimated, degraded, skipped)
//! - [`SkipReason`] - Why a table produced no estimate
//! - [`EstimationRun`] - Outcomes of a whole run, in processing order
//! - [`write_and_measure`] - Sample export and average record size measurement

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/huntsize/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod estimator;
mod outcome;
mod sizing;

pub use estimator::{DEFAULT_FALLBACK_RECORD_SIZE_KB, Estimator};
pub use outcome::{EstimationRun, SkipReason, SkippedTable, TableOutcome};
pub use sizing::{
    SampleError, SampleMeasurement, average_record_size_kb, sample_file_name, write_and_measure,
};
