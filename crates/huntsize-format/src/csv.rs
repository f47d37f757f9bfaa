//! CSV output for sample artifacts and summary files.

use huntsize_fetch::QueryResult;
use huntsize_types::ResultSet;
use tokio::io::AsyncWrite;

use crate::FormatError;

/// Column headers of the summary file, in order.
pub const SUMMARY_HEADERS: [&str; 8] = [
    "TableName",
    "EventsInLookback",
    "AvgRecordSizeKB",
    "EstDailyEvents",
    "EstDailyMBIngested",
    "EstTotalMBInLookback",
    "EstDailyGBIngested",
    "EstTotalGBInLookback",
];

/// CSV formatter.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    /// Field delimiter (default: comma).
    delimiter: u8,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFormatter {
    /// Creates a new CSV formatter with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Writes sampled rows with a header row.
    ///
    /// Columns follow [`QueryResult::column_names`]. Nothing is written when
    /// no column is known. Returns the number of rows in the result.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub async fn write_rows<W>(&self, result: &QueryResult, writer: W) -> Result<usize, FormatError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let columns = result.column_names();
        if columns.is_empty() {
            return Ok(result.len());
        }

        let mut csv = csv_async::AsyncWriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .create_writer(writer);

        csv.write_record(&columns).await?;
        for row in &result.results {
            csv.write_record(columns.iter().map(|c| row.cell_text(c)))
                .await?;
        }
        csv.flush().await?;

        Ok(result.results.len())
    }

    /// Writes table estimates under [`SUMMARY_HEADERS`], in processing order.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub async fn write_estimates<W>(&self, results: &ResultSet, writer: W) -> Result<(), FormatError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut csv = csv_async::AsyncWriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .create_serializer(writer);

        // Written explicitly so an empty result set still gets a header row.
        csv.serialize(SUMMARY_HEADERS).await?;
        for estimate in results {
            csv.serialize(estimate).await?;
        }
        csv.flush().await?;

        Ok(())
    }

    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        "csv"
    }
}
