//! JSON summary output.

use huntsize_types::{EstimationRequest, GrandTotals, ResultSet};
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::FormatError;

/// Full run report as written to a JSON summary file.
#[derive(Debug, Serialize)]
pub struct SummaryReport<'a> {
    /// Normalized run parameters.
    pub request: &'a EstimationRequest,
    /// Estimates in processing order.
    pub estimates: &'a ResultSet,
    /// Totals across all estimates.
    pub totals: GrandTotals,
}

impl<'a> SummaryReport<'a> {
    /// Builds a report, computing totals from the result set.
    #[must_use]
    pub fn new(request: &'a EstimationRequest, estimates: &'a ResultSet) -> Self {
        Self {
            request,
            estimates,
            totals: estimates.totals(),
        }
    }
}

/// JSON formatter.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    /// Whether to pretty-print output.
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a formatter producing pretty-printed JSON.
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty: true }
    }

    /// Creates a formatter producing single-line JSON.
    #[must_use]
    pub const fn compact() -> Self {
        Self { pretty: false }
    }

    /// Writes a [`SummaryReport`] for the given run.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn write_report<W>(
        &self,
        request: &EstimationRequest,
        results: &ResultSet,
        mut writer: W,
    ) -> Result<(), FormatError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let report = SummaryReport::new(request, results);
        let mut bytes = if self.pretty {
            serde_json::to_vec_pretty(&report)?
        } else {
            serde_json::to_vec(&report)?
        };
        bytes.push(b'\n');

        writer.write_all(&bytes).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        "json"
    }
}
