//! Record sampling strategies.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Strategy used to pull a bounded subset of rows from a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SampleMethod {
    /// First N rows in storage order.
    Take,
    /// N rows chosen at random.
    #[default]
    Sample,
}

impl SampleMethod {
    /// Returns the query operator name for this method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Take => "take",
            Self::Sample => "sample",
        }
    }

    /// Returns all available methods.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Take, Self::Sample]
    }

    /// Normalizes free-form operator input into a method.
    ///
    /// Blank input and anything other than `take` (case-insensitive) resolve to
    /// [`SampleMethod::Sample`]. This never fails.
    #[must_use]
    pub fn parse_lenient(input: &str) -> Self {
        input.parse().unwrap_or_default()
    }
}

impl std::fmt::Display for SampleMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SampleMethod {
    type Err = SampleMethodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "take" => Ok(Self::Take),
            "sample" => Ok(Self::Sample),
            _ => Err(SampleMethodParseError(s.to_string())),
        }
    }
}

/// Error returned when a sample method string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleMethodParseError(String);

impl std::fmt::Display for SampleMethodParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid sample method: '{}'. Valid options: take, sample",
            self.0
        )
    }
}

impl std::error::Error for SampleMethodParseError {}
