//! Output format abstraction.

use huntsize_types::{EstimationRequest, ResultSet};
use std::path::Path;
use thiserror::Error;

use crate::{CsvFormatter, JsonFormatter};

/// Summary file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// CSV, one row per table.
    #[default]
    Csv,
    /// Pretty-printed JSON with request, estimates and totals.
    Json,
}

impl OutputFormat {
    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Returns all available formats.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Csv, Self::Json]
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(FormatError::UnknownFormat(s.to_string())),
        }
    }
}

/// Errors that can occur during formatting.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Unknown output format.
    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv_async::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes the summary file for a run, creating or truncating `path`.
///
/// Estimates are written in processing order.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub async fn write_summary(
    path: &Path,
    format: OutputFormat,
    request: &EstimationRequest,
    results: &ResultSet,
) -> Result<(), FormatError> {
    let file = tokio::fs::File::create(path).await?;

    match format {
        OutputFormat::Csv => CsvFormatter::new().write_estimates(results, file).await,
        OutputFormat::Json => JsonFormatter::new().write_report(request, results, file).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huntsize_types::{SampleMethod, TableEstimate};
    use tempfile::TempDir;

    #[test]
    fn test_parse_format() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("parquet".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default().extension(), "csv");
    }

    #[tokio::test]
    async fn test_write_summary_both_formats() {
        let dir = TempDir::new().unwrap();
        let request = EstimationRequest::new(7, 100, SampleMethod::Take, vec!["A".into()]);
        let results: ResultSet = [TableEstimate::compute("A", 70_000, 1.0, 7)]
            .into_iter()
            .collect();

        for format in OutputFormat::all() {
            let path = dir.path().join(format!("summary.{format}"));
            write_summary(&path, *format, &request, &results).await.unwrap();

            let written = tokio::fs::read_to_string(&path).await.unwrap();
            assert!(written.contains("68.36"), "{format}: {written}");
        }
    }
}
