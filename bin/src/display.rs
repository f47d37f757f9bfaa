//! Console rendering for the huntsize CLI.

use clap::ValueEnum;
use huntsize_lib::prelude::*;
use huntsize_lib::SkippedTable;
use std::fmt::Write as _;
use std::path::Path;

/// Summary file format.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    Csv,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => Self::Csv,
            Format::Json => Self::Json,
        }
    }
}

/// Renders estimates as a fixed-width table, largest total first.
pub(crate) fn render_estimates(results: &ResultSet) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<32} {:>14} {:>9} {:>12} {:>11} {:>12} {:>9} {:>10}",
        "TABLE", "EVENTS", "AVG KB", "DAILY EVTS", "DAILY MB", "TOTAL MB", "DAILY GB", "TOTAL GB"
    );
    let _ = writeln!(out, "{}", "-".repeat(116));

    for e in results.sorted_for_display() {
        let _ = writeln!(
            out,
            "{:<32} {:>14} {:>9.2} {:>12} {:>11.2} {:>12.2} {:>9.2} {:>10.2}",
            e.table_name,
            e.events_in_lookback,
            e.avg_record_size_kb,
            e.est_daily_events,
            e.est_daily_mb_ingested,
            e.est_total_mb_in_lookback,
            e.est_daily_gb_ingested,
            e.est_total_gb_in_lookback,
        );
    }
    out
}

/// Renders the summary block printed after the table.
pub(crate) fn render_summary(
    request: &EstimationRequest,
    run: &EstimationRun,
    summary_path: Option<&Path>,
) -> String {
    let totals = run.results.totals();
    let mut out = String::new();

    let _ = writeln!(out, "Lookback window:    {} day(s)", request.lookback_days());
    let _ = writeln!(
        out,
        "Sampling:           {} {} rows per table",
        request.sample_method(),
        request.sample_size()
    );
    let _ = writeln!(
        out,
        "Tables estimated:   {} of {} ({} with fallback record size)",
        run.results.len(),
        run.tables_processed(),
        run.degraded.len()
    );
    let _ = writeln!(out, "Tables skipped:     {}", run.skipped.len());
    let _ = writeln!(out, "Events in window:   {}", totals.events_in_lookback);
    let _ = writeln!(
        out,
        "Est. daily ingest:  {:.2} MB ({:.2} GB)",
        totals.est_daily_mb_ingested, totals.est_daily_gb_ingested
    );
    let _ = writeln!(
        out,
        "Est. total ingest:  {:.2} MB ({:.2} GB)",
        totals.est_total_mb_in_lookback, totals.est_total_gb_in_lookback
    );
    if let Some(path) = summary_path {
        let _ = writeln!(out, "Summary written to: {}", path.display());
    }
    out
}

/// Renders the skipped tables with their reasons.
pub(crate) fn render_skipped(skipped: &[SkippedTable]) -> String {
    let mut out = String::new();
    for s in skipped {
        let _ = writeln!(out, "  {:<32} {}", s.table, s.reason);
    }
    out
}
