//! Run parameters and lenient operator input handling.

use serde::{Deserialize, Serialize};
use std::num::IntErrorKind;

use crate::SampleMethod;

/// Smallest accepted lookback window, in days.
pub const MIN_LOOKBACK_DAYS: u32 = 1;

/// Smallest accepted sample size.
pub const MIN_SAMPLE_SIZE: u32 = 1;

/// Largest accepted sample size.
pub const MAX_SAMPLE_SIZE: u32 = 100_000;

/// Sample size used when the operator leaves the value blank.
pub const DEFAULT_SAMPLE_SIZE: u32 = 10_000;

/// Parameters of a single estimation run.
///
/// Values are normalized on construction and the request is not mutated
/// afterwards: `lookback_days >= 1` and `sample_size` lies in
/// `[MIN_SAMPLE_SIZE, MAX_SAMPLE_SIZE]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimationRequest {
    lookback_days: u32,
    sample_size: u32,
    sample_method: SampleMethod,
    tables: Vec<String>,
}

impl EstimationRequest {
    /// Creates a request, clamping numeric values into their valid ranges.
    #[must_use]
    pub fn new(
        lookback_days: u32,
        sample_size: u32,
        sample_method: SampleMethod,
        tables: Vec<String>,
    ) -> Self {
        Self {
            lookback_days: lookback_days.max(MIN_LOOKBACK_DAYS),
            sample_size: sample_size.clamp(MIN_SAMPLE_SIZE, MAX_SAMPLE_SIZE),
            sample_method,
            tables,
        }
    }

    /// Creates a request from raw operator input.
    ///
    /// Malformed values are never rejected; see [`parse_lookback_days`],
    /// [`parse_sample_size`] and [`SampleMethod::parse_lenient`].
    #[must_use]
    pub fn from_raw_input(
        lookback_days: &str,
        sample_size: &str,
        sample_method: &str,
        tables: Vec<String>,
    ) -> Self {
        Self::new(
            parse_lookback_days(lookback_days),
            parse_sample_size(sample_size),
            SampleMethod::parse_lenient(sample_method),
            tables,
        )
    }

    /// Returns the lookback window in days.
    #[must_use]
    pub const fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    /// Returns the maximum number of rows sampled per table.
    #[must_use]
    pub const fn sample_size(&self) -> u32 {
        self.sample_size
    }

    /// Returns the sampling strategy.
    #[must_use]
    pub const fn sample_method(&self) -> SampleMethod {
        self.sample_method
    }

    /// Returns the tables to estimate, in processing order.
    #[must_use]
    pub fn tables(&self) -> &[String] {
        &self.tables
    }
}

/// Parses a lookback window in days.
///
/// Anything that is not an integer, or is below one, resolves to
/// [`MIN_LOOKBACK_DAYS`].
#[must_use]
pub fn parse_lookback_days(input: &str) -> u32 {
    match input.trim().parse::<i64>() {
        Ok(days) if days >= i64::from(MIN_LOOKBACK_DAYS) => {
            u32::try_from(days).unwrap_or(u32::MAX)
        }
        _ => MIN_LOOKBACK_DAYS,
    }
}

/// Parses a per-table sample size.
///
/// Blank input resolves to [`DEFAULT_SAMPLE_SIZE`]. Integers are clamped into
/// `[MIN_SAMPLE_SIZE, MAX_SAMPLE_SIZE]`, including ones too large to
/// represent. Other non-numeric input also resolves to the default.
#[must_use]
pub fn parse_sample_size(input: &str) -> u32 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return DEFAULT_SAMPLE_SIZE;
    }

    match trimmed.parse::<i64>() {
        Ok(size) => clamp_sample_size(size),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => MAX_SAMPLE_SIZE,
            IntErrorKind::NegOverflow => MIN_SAMPLE_SIZE,
            _ => DEFAULT_SAMPLE_SIZE,
        },
    }
}

/// Clamps a signed sample size into the accepted range.
#[must_use]
pub fn clamp_sample_size(size: i64) -> u32 {
    size.clamp(i64::from(MIN_SAMPLE_SIZE), i64::from(MAX_SAMPLE_SIZE)) as u32
}
