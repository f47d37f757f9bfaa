//! Per-table ingestion estimates.

use serde::{Deserialize, Serialize};

/// Kilobytes per megabyte, megabytes per gigabyte.
const UNIT: f64 = 1024.0;

/// Rounds to two decimal places, half away from zero.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Extrapolates a daily event count from a lookback total.
///
/// Rounds half up. `lookback_days` of zero is treated as one.
#[must_use]
pub const fn daily_events(total_events: u64, lookback_days: u32) -> u64 {
    let days = if lookback_days == 0 {
        1
    } else {
        lookback_days as u64
    };
    total_events / days + ((total_events % days) * 2 >= days) as u64
}

/// Ingestion estimate for a single table.
///
/// Field names serialize to the column headers of the summary file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEstimate {
    /// Table the estimate belongs to.
    #[serde(rename = "TableName")]
    pub table_name: String,
    /// Events observed in the lookback window.
    #[serde(rename = "EventsInLookback")]
    pub events_in_lookback: u64,
    /// Mean serialized size of a sampled record, in KB.
    #[serde(rename = "AvgRecordSizeKB")]
    pub avg_record_size_kb: f64,
    /// Events per day, extrapolated from the lookback window.
    #[serde(rename = "EstDailyEvents")]
    pub est_daily_events: u64,
    /// Daily ingestion in MB.
    #[serde(rename = "EstDailyMBIngested")]
    pub est_daily_mb_ingested: f64,
    /// Ingestion over the whole lookback window in MB.
    #[serde(rename = "EstTotalMBInLookback")]
    pub est_total_mb_in_lookback: f64,
    /// Daily ingestion in GB.
    #[serde(rename = "EstDailyGBIngested")]
    pub est_daily_gb_ingested: f64,
    /// Ingestion over the whole lookback window in GB.
    #[serde(rename = "EstTotalGBInLookback")]
    pub est_total_gb_in_lookback: f64,
}

impl TableEstimate {
    /// Computes an estimate from an event count and an average record size.
    ///
    /// MB values are `events * avg_record_size_kb / 1024` rounded to two
    /// decimals; GB values are the rounded MB values divided by 1024 and
    /// rounded again.
    #[must_use]
    pub fn compute(
        table_name: impl Into<String>,
        events_in_lookback: u64,
        avg_record_size_kb: f64,
        lookback_days: u32,
    ) -> Self {
        let avg_record_size_kb = round2(avg_record_size_kb);
        let est_daily_events = daily_events(events_in_lookback, lookback_days);

        let est_total_mb_in_lookback =
            round2(events_in_lookback as f64 * avg_record_size_kb / UNIT);
        let est_daily_mb_ingested = round2(est_daily_events as f64 * avg_record_size_kb / UNIT);

        Self {
            table_name: table_name.into(),
            events_in_lookback,
            avg_record_size_kb,
            est_daily_events,
            est_daily_mb_ingested,
            est_total_mb_in_lookback,
            est_daily_gb_ingested: round2(est_daily_mb_ingested / UNIT),
            est_total_gb_in_lookback: round2(est_total_mb_in_lookback / UNIT),
        }
    }
}
