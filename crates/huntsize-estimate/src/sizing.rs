//! Record size measurement from sample artifacts.

use huntsize_fetch::{QueryError, QueryResult};
use huntsize_format::{CsvFormatter, FormatError};
use huntsize_types::round2;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that prevent measuring a table's record size.
#[derive(Error, Debug)]
pub enum SampleError {
    /// The sample query failed.
    #[error("sample query failed: {0}")]
    Query(#[from] QueryError),

    /// The sample rows could not be encoded.
    #[error("sample export failed: {0}")]
    Format(#[from] FormatError),

    /// The sample file could not be created or inspected.
    #[error("sample file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of exporting and measuring a table sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMeasurement {
    /// Where the sample was written.
    pub path: PathBuf,
    /// Rows returned by the sample query.
    pub rows: usize,
    /// Size of the sample file on disk.
    pub file_bytes: u64,
    /// Mean record size in KB, rounded to two decimals.
    pub avg_record_size_kb: f64,
}

/// Computes the mean record size in KB of a file holding `rows` records.
///
/// A row count of zero is treated as one, so an empty sample yields the file
/// size itself.
#[must_use]
pub fn average_record_size_kb(file_bytes: u64, rows: usize) -> f64 {
    let divisor = rows.max(1) as f64;
    round2(file_bytes as f64 / 1024.0 / divisor)
}

/// Returns the sample file name for a table.
///
/// `occurrence` counts earlier appearances of the same name in the table
/// list: the first is `<table>.csv`, later ones `<table>.<n>.csv`, so repeated
/// tables never share a file. Path separators are replaced so the file
/// always lands in the samples directory.
#[must_use]
pub fn sample_file_name(table: &str, occurrence: usize) -> String {
    let safe: String = table
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    match occurrence {
        0 => format!("{safe}.csv"),
        n => format!("{safe}.{}.csv", n + 1),
    }
}

/// Writes a sample to `<dir>/<file_name>` and measures it.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created or written.
pub async fn write_and_measure(
    dir: &Path,
    file_name: &str,
    result: &QueryResult,
) -> Result<SampleMeasurement, SampleError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);

    let file = tokio::fs::File::create(&path).await?;
    let rows = CsvFormatter::new().write_rows(result, file).await?;
    let file_bytes = tokio::fs::metadata(&path).await?.len();

    Ok(SampleMeasurement {
        avg_record_size_kb: average_record_size_kb(file_bytes, rows),
        path,
        rows,
        file_bytes,
    })
}
