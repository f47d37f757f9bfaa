//! Advanced-hunting query construction.
//!
//! Table names are inserted verbatim. They come from the static
//! configuration, never from prompts, so no escaping is attempted.

use huntsize_types::SampleMethod;

/// Column holding the event count returned by [`count_query`].
pub const TOTAL_EVENTS_COLUMN: &str = "TotalEvents";

/// Builds the relative time token for a lookback window.
///
/// # Example
///
/// ```
/// use huntsize_fetch::query::lookback_period;
///
/// assert_eq!(lookback_period(7), "ago(7d)");
/// ```
#[must_use]
pub fn lookback_period(lookback_days: u32) -> String {
    format!("ago({lookback_days}d)")
}

/// Builds the query counting a table's events inside the lookback window.
///
/// # Example
///
/// ```
/// use huntsize_fetch::query::count_query;
///
/// assert_eq!(
///     count_query("DeviceEvents", "ago(7d)"),
///     "DeviceEvents | where Timestamp > ago(7d) | summarize TotalEvents = count()"
/// );
/// ```
#[must_use]
pub fn count_query(table: &str, lookback_period: &str) -> String {
    format!(
        "{table} | where Timestamp > {lookback_period} | summarize {TOTAL_EVENTS_COLUMN} = count()"
    )
}

/// Builds the query pulling up to `sample_size` rows from a table.
///
/// # Example
///
/// ```
/// use huntsize_fetch::query::sample_query;
/// use huntsize_types::SampleMethod;
///
/// assert_eq!(
///     sample_query("EmailEvents", "ago(1d)", SampleMethod::Take, 500),
///     "EmailEvents | where Timestamp > ago(1d) | take 500"
/// );
/// ```
#[must_use]
pub fn sample_query(
    table: &str,
    lookback_period: &str,
    method: SampleMethod,
    sample_size: u32,
) -> String {
    format!("{table} | where Timestamp > {lookback_period} | {method} {sample_size}")
}
