//! Queries command implementation.
//!
//! Prints the count and sample queries an estimate run would issue, without
//! contacting the service.

use huntsize_lib::prelude::*;
use huntsize_lib::query::{count_query, lookback_period, sample_query};

/// Print the queries for every configured table.
pub(crate) fn print_queries(
    settings: &Settings,
    lookback_days: Option<&str>,
    sample_size: Option<&str>,
    sample_method: Option<&str>,
) {
    let request = request_from_input(
        settings,
        lookback_days.unwrap_or_default(),
        sample_size.unwrap_or_default(),
        sample_method.unwrap_or_default(),
    );

    for line in query_lines(&request) {
        println!("{line}");
    }
}

/// Returns the count query then the sample query for each table, in order.
fn query_lines(request: &EstimationRequest) -> Vec<String> {
    let period = lookback_period(request.lookback_days());
    request
        .tables()
        .iter()
        .flat_map(|table| {
            [
                count_query(table, &period),
                sample_query(
                    table,
                    &period,
                    request.sample_method(),
                    request.sample_size(),
                ),
            ]
        })
        .collect()
}
