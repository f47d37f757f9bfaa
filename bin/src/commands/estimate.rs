//! Estimate command implementation.
//!
//! Collects the run parameters, authenticates, estimates every configured
//! table and writes the summary file.

use crate::display::{Format, render_estimates, render_skipped, render_summary};
use anyhow::{Context, Result};
use futures::StreamExt;
use huntsize_lib::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::Text;
use tracing::{info, warn};

/// Run parameters as given on the command line.
pub(crate) struct EstimateArgs {
    pub(crate) lookback_days: Option<String>,
    pub(crate) sample_size: Option<String>,
    pub(crate) sample_method: Option<String>,
    pub(crate) format: Format,
    pub(crate) parallel: Option<usize>,
    pub(crate) yes: bool,
}

/// Estimate ingestion volume for every configured table.
pub(crate) async fn estimate(settings: &Settings, args: EstimateArgs, quiet: bool) -> Result<()> {
    let lookback_days = input(args.lookback_days, args.yes, "Lookback period in days:", "1")?;
    let sample_size = input(args.sample_size, args.yes, "Sample size (rows per table):", "10000")?;
    let sample_method = input(
        args.sample_method,
        args.yes,
        "Sample method (take or sample):",
        "sample",
    )?;
    let request = request_from_input(settings, &lookback_days, &sample_size, &sample_method);
    info!(
        lookback_days = request.lookback_days(),
        sample_size = request.sample_size(),
        sample_method = %request.sample_method(),
        tables = request.tables().len(),
        "Starting estimation"
    );

    // Authentication failure aborts before any table is touched.
    let client = connect(settings).await.context("Authentication failed")?;

    let parallelism = args.parallel.unwrap_or(settings.estimate.parallelism).max(1);
    let started = chrono::Local::now().naive_local();
    let estimator = estimator(settings, request);

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(estimator.request().tables().len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} tables {msg}")
                .context("Invalid progress template")?
                .progress_chars("=>-"),
        );
        pb
    };

    let mut run = EstimationRun::new();
    let mut outcomes = std::pin::pin!(estimator.estimate_tables(&client, parallelism));
    while let Some(outcome) = outcomes.next().await {
        progress.set_message(outcome.table().to_string());
        progress.inc(1);
        run.record(outcome);
    }
    progress.finish_with_message(format!("{} tables estimated", run.results.len()));

    if run.results.is_empty() {
        warn!(
            lookback_days = estimator.request().lookback_days(),
            "No table returned events in the lookback window"
        );
    }

    let saved = save_summary(
        &settings.output.dir,
        started,
        args.format.into(),
        estimator.request(),
        &run.results,
    )
    .await;

    if !quiet {
        println!();
        print!("{}", render_estimates(&run.results));
        if !run.skipped.is_empty() {
            println!("\nSkipped tables:");
            print!("{}", render_skipped(&run.skipped));
        }
        println!();
        print!(
            "{}",
            render_summary(estimator.request(), &run, saved.as_deref().ok())
        );
    }

    saved.context("Failed to write summary file")?;
    Ok(())
}

/// Returns the flag value, else prompts for it, else blank input.
///
/// Blank input is normalized downstream, so `placeholder` only documents
/// what an empty answer means.
fn input(flag: Option<String>, no_prompt: bool, message: &str, placeholder: &str) -> Result<String> {
    match flag {
        Some(value) => Ok(value),
        None if no_prompt => Ok(String::new()),
        None => Text::new(message)
            .with_placeholder(placeholder)
            .prompt()
            .context("Input cancelled"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_prefers_flag() {
        let value = input(Some("14".into()), false, "unused", "1").unwrap();
        assert_eq!(value, "14");
    }

    #[test]
    fn test_input_without_prompt_is_blank() {
        let value = input(None, true, "unused", "1").unwrap();
        assert!(value.is_empty());
    }
}
