//! Ordered collection of table estimates and their totals.

use serde::{Deserialize, Serialize};

use crate::{TableEstimate, round2};

/// Estimates produced by a run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    estimates: Vec<TableEstimate>,
}

impl ResultSet {
    /// Creates an empty result set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            estimates: Vec::new(),
        }
    }

    /// Appends an estimate.
    pub fn push(&mut self, estimate: TableEstimate) {
        self.estimates.push(estimate);
    }

    /// Returns the estimates in processing order.
    #[must_use]
    pub fn estimates(&self) -> &[TableEstimate] {
        &self.estimates
    }

    /// Returns the number of estimates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    /// Returns true if no table produced an estimate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    /// Returns the estimates ordered by total GB in the lookback window,
    /// largest first. Ties keep processing order.
    #[must_use]
    pub fn sorted_for_display(&self) -> Vec<&TableEstimate> {
        let mut sorted: Vec<&TableEstimate> = self.estimates.iter().collect();
        sorted.sort_by(|a, b| {
            b.est_total_gb_in_lookback
                .total_cmp(&a.est_total_gb_in_lookback)
        });
        sorted
    }

    /// Sums the per-table values, rounding each total once.
    #[must_use]
    pub fn totals(&self) -> GrandTotals {
        let mut events = 0u64;
        let mut daily_mb = 0.0;
        let mut total_mb = 0.0;
        let mut daily_gb = 0.0;
        let mut total_gb = 0.0;

        for estimate in &self.estimates {
            events = events.saturating_add(estimate.events_in_lookback);
            daily_mb += estimate.est_daily_mb_ingested;
            total_mb += estimate.est_total_mb_in_lookback;
            daily_gb += estimate.est_daily_gb_ingested;
            total_gb += estimate.est_total_gb_in_lookback;
        }

        GrandTotals {
            events_in_lookback: events,
            est_daily_mb_ingested: round2(daily_mb),
            est_total_mb_in_lookback: round2(total_mb),
            est_daily_gb_ingested: round2(daily_gb),
            est_total_gb_in_lookback: round2(total_gb),
        }
    }
}

impl FromIterator<TableEstimate> for ResultSet {
    fn from_iter<I: IntoIterator<Item = TableEstimate>>(iter: I) -> Self {
        Self {
            estimates: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a TableEstimate;
    type IntoIter = std::slice::Iter<'a, TableEstimate>;

    fn into_iter(self) -> Self::IntoIter {
        self.estimates.iter()
    }
}

/// Totals across every table in a [`ResultSet`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GrandTotals {
    /// Events across all tables in the lookback window.
    pub events_in_lookback: u64,
    /// Daily ingestion in MB.
    pub est_daily_mb_ingested: f64,
    /// Ingestion over the lookback window in MB.
    pub est_total_mb_in_lookback: f64,
    /// Daily ingestion in GB.
    pub est_daily_gb_ingested: f64,
    /// Ingestion over the lookback window in GB.
    pub est_total_gb_in_lookback: f64,
}
