//! Per-table outcomes and their accumulation into a run.

use huntsize_types::{ResultSet, TableEstimate};
use thiserror::Error;

/// Why a table produced no estimate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The count query failed.
    #[error("count query failed: {0}")]
    QueryFailed(String),

    /// The count query succeeded but returned no rows.
    ///
    /// Usually a table the principal cannot read, or that does not exist in
    /// the tenant.
    #[error("count query returned no rows (table missing or not readable)")]
    NoRows,

    /// The count row had no numeric `TotalEvents` value.
    #[error("count query returned no numeric TotalEvents")]
    MissingCount,

    /// The table holds no events in the lookback window.
    #[error("no events in the lookback window")]
    ZeroEvents,
}

/// Result of processing a single table.
#[derive(Debug, Clone, PartialEq)]
pub enum TableOutcome {
    /// Estimated from a measured sample.
    Estimated(TableEstimate),
    /// Estimated with the fallback record size because sampling failed.
    Degraded {
        /// The estimate, built on the fallback size.
        estimate: TableEstimate,
        /// What went wrong while sampling.
        reason: String,
    },
    /// Not estimated.
    Skipped {
        /// The table that was skipped.
        table: String,
        /// Why it was skipped.
        reason: SkipReason,
    },
}

impl TableOutcome {
    /// Returns the table this outcome belongs to.
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::Estimated(estimate) | Self::Degraded { estimate, .. } => &estimate.table_name,
            Self::Skipped { table, .. } => table,
        }
    }

    /// Returns the estimate, if the table produced one.
    #[must_use]
    pub const fn estimate(&self) -> Option<&TableEstimate> {
        match self {
            Self::Estimated(estimate) | Self::Degraded { estimate, .. } => Some(estimate),
            Self::Skipped { .. } => None,
        }
    }

    /// Returns true if the table was skipped.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// A table left out of the results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTable {
    /// The table.
    pub table: String,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Accumulated outcomes of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstimationRun {
    /// Estimates in processing order.
    pub results: ResultSet,
    /// Tables that produced no estimate, in processing order.
    pub skipped: Vec<SkippedTable>,
    /// Tables estimated with the fallback record size.
    pub degraded: Vec<String>,
}

impl EstimationRun {
    /// Creates an empty run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a table outcome into the run.
    pub fn record(&mut self, outcome: TableOutcome) {
        match outcome {
            TableOutcome::Estimated(estimate) => self.results.push(estimate),
            TableOutcome::Degraded { estimate, .. } => {
                self.degraded.push(estimate.table_name.clone());
                self.results.push(estimate);
            }
            TableOutcome::Skipped { table, reason } => {
                self.skipped.push(SkippedTable { table, reason });
            }
        }
    }

    /// Returns the number of tables processed.
    #[must_use]
    pub fn tables_processed(&self) -> usize {
        self.results.len() + self.skipped.len()
    }
}

impl Extend<TableOutcome> for EstimationRun {
    fn extend<I: IntoIterator<Item = TableOutcome>>(&mut self, iter: I) {
        for outcome in iter {
            self.record(outcome);
        }
    }
}
