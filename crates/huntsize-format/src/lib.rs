//! Report and sample writers for the huntsize ingestion estimator.
//!
//! - [`CsvFormatter`] - Per-table sample files and the CSV summary
//! - [`JsonFormatter`] - JSON summary with request, estimates and totals
//! - [`write_summary`] - Writes the summary file in a chosen [`OutputFormat`]

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/huntsize/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod csv;
mod formatter;
mod json;

pub use crate::csv::{CsvFormatter, SUMMARY_HEADERS};
pub use formatter::{FormatError, OutputFormat, write_summary};
pub use json::{JsonFormatter, SummaryReport};
