//! Per-table ingestion estimation.

use futures::stream::{self, Stream, StreamExt};
use huntsize_fetch::QueryRunner;
use huntsize_fetch::query::{TOTAL_EVENTS_COLUMN, count_query, lookback_period, sample_query};
use huntsize_types::{EstimationRequest, TableEstimate};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::outcome::{EstimationRun, SkipReason, TableOutcome};
use crate::sizing::{self, SampleError, SampleMeasurement};

/// Average record size assumed when a table cannot be sampled, in KB.
pub const DEFAULT_FALLBACK_RECORD_SIZE_KB: f64 = 2.5;

/// Estimates ingestion volume table by table.
///
/// Each table costs two queries: a count over the lookback window, then a
/// bounded sample whose exported size gives the average record size. A
/// failed or empty count skips the table; a failed sample only degrades it
/// to the fallback record size. Neither ever aborts the run.
#[derive(Debug, Clone)]
pub struct Estimator {
    request: EstimationRequest,
    samples_dir: PathBuf,
    fallback_record_size_kb: f64,
}

impl Estimator {
    /// Creates an estimator writing sample files to `samples_dir`.
    #[must_use]
    pub fn new(request: EstimationRequest, samples_dir: impl Into<PathBuf>) -> Self {
        Self {
            request,
            samples_dir: samples_dir.into(),
            fallback_record_size_kb: DEFAULT_FALLBACK_RECORD_SIZE_KB,
        }
    }

    /// Overrides the record size used when sampling fails.
    #[must_use]
    pub const fn with_fallback_record_size_kb(mut self, size_kb: f64) -> Self {
        self.fallback_record_size_kb = size_kb;
        self
    }

    /// Returns the run parameters.
    #[must_use]
    pub const fn request(&self) -> &EstimationRequest {
        &self.request
    }

    /// Returns the directory receiving sample files.
    #[must_use]
    pub fn samples_dir(&self) -> &Path {
        &self.samples_dir
    }

    /// Returns the fallback record size in KB.
    #[must_use]
    pub const fn fallback_record_size_kb(&self) -> f64 {
        self.fallback_record_size_kb
    }

    /// Estimates a single table.
    pub async fn estimate_table<R>(&self, runner: &R, table: &str) -> TableOutcome
    where
        R: QueryRunner + ?Sized,
    {
        self.estimate_occurrence(runner, table, 0).await
    }

    /// Estimates one appearance of a table in the list.
    ///
    /// `occurrence` selects the sample file so repeated tables running at
    /// the same time never write to the same path.
    async fn estimate_occurrence<R>(
        &self,
        runner: &R,
        table: &str,
        occurrence: usize,
    ) -> TableOutcome
    where
        R: QueryRunner + ?Sized,
    {
        let total_events = match self.count_events(runner, table).await {
            Ok(count) => count,
            Err(reason) => {
                warn!(table, reason = %reason, "Skipping table");
                return TableOutcome::Skipped {
                    table: table.to_string(),
                    reason,
                };
            }
        };

        let lookback_days = self.request.lookback_days();
        match self.measure_sample(runner, table, occurrence).await {
            Ok(measurement) => {
                debug!(
                    table,
                    rows = measurement.rows,
                    bytes = measurement.file_bytes,
                    path = %measurement.path.display(),
                    "Measured sample"
                );
                let estimate = TableEstimate::compute(
                    table,
                    total_events,
                    measurement.avg_record_size_kb,
                    lookback_days,
                );
                info!(
                    table,
                    events = total_events,
                    avg_record_size_kb = estimate.avg_record_size_kb,
                    total_gb = estimate.est_total_gb_in_lookback,
                    "Estimated table"
                );
                TableOutcome::Estimated(estimate)
            }
            Err(e) => {
                warn!(
                    table,
                    error = %e,
                    fallback_kb = self.fallback_record_size_kb,
                    "Sampling failed, using fallback record size"
                );
                let estimate = TableEstimate::compute(
                    table,
                    total_events,
                    self.fallback_record_size_kb,
                    lookback_days,
                );
                TableOutcome::Degraded {
                    estimate,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Estimates every configured table, yielding outcomes in table order.
    ///
    /// With `parallelism` of 1 tables are processed strictly one after
    /// another. Larger values let up to that many tables run at once; the
    /// stream still yields in configuration order.
    pub fn estimate_tables<'a, R>(
        &'a self,
        runner: &'a R,
        parallelism: usize,
    ) -> impl Stream<Item = TableOutcome> + 'a
    where
        R: QueryRunner + ?Sized,
    {
        let tables = self.request.tables();
        stream::iter(tables.iter().enumerate())
            .map(move |(index, table)| {
                let occurrence = tables[..index].iter().filter(|t| *t == table).count();
                self.estimate_occurrence(runner, table, occurrence)
            })
            .buffered(parallelism.max(1))
    }

    /// Estimates every configured table and collects the outcomes.
    pub async fn run<R>(&self, runner: &R, parallelism: usize) -> EstimationRun
    where
        R: QueryRunner + ?Sized,
    {
        let outcomes: Vec<TableOutcome> = self.estimate_tables(runner, parallelism).collect().await;
        let mut run = EstimationRun::new();
        run.extend(outcomes);
        run
    }

    /// Runs the count query and extracts a positive event count.
    async fn count_events<R>(&self, runner: &R, table: &str) -> Result<u64, SkipReason>
    where
        R: QueryRunner + ?Sized,
    {
        let query = count_query(table, &lookback_period(self.request.lookback_days()));
        let result = runner
            .run_query(&query)
            .await
            .map_err(|e| SkipReason::QueryFailed(e.to_string()))?;

        let row = result.first().ok_or(SkipReason::NoRows)?;
        let count = row
            .get_i64(TOTAL_EVENTS_COLUMN)
            .ok_or(SkipReason::MissingCount)?;

        u64::try_from(count)
            .ok()
            .filter(|&n| n > 0)
            .ok_or(SkipReason::ZeroEvents)
    }

    /// Runs the sample query, exports the rows and measures the file.
    async fn measure_sample<R>(
        &self,
        runner: &R,
        table: &str,
        occurrence: usize,
    ) -> Result<SampleMeasurement, SampleError>
    where
        R: QueryRunner + ?Sized,
    {
        let query = sample_query(
            table,
            &lookback_period(self.request.lookback_days()),
            self.request.sample_method(),
            self.request.sample_size(),
        );
        let result = runner.run_query(&query).await?;
        let file_name = sizing::sample_file_name(table, occurrence);
        sizing::write_and_measure(&self.samples_dir, &file_name, &result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::average_record_size_kb;
    use approx::assert_abs_diff_eq;
    use async_trait::async_trait;
    use huntsize_fetch::{QueryError, QueryResult};
    use huntsize_types::SampleMethod;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Answers queries from a fixed script and records what was asked.
    #[derive(Default)]
    struct ScriptedRunner {
        responses: HashMap<String, Result<Value, (u16, String)>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        fn respond(mut self, query: String, body: Value) -> Self {
            self.responses.insert(query, Ok(body));
            self
        }

        fn reject(mut self, query: String, status: u16) -> Self {
            self.responses
                .insert(query, Err((status, "Forbidden".to_string())));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueryRunner for ScriptedRunner {
        async fn run_query(&self, query: &str) -> Result<QueryResult, QueryError> {
            self.calls.lock().unwrap().push(query.to_string());
            match self.responses.get(query) {
                Some(Ok(body)) => Ok(serde_json::from_value(body.clone()).unwrap()),
                Some(Err((status, message))) => Err(QueryError::Rejected {
                    status: *status,
                    message: message.clone(),
                }),
                None => Err(QueryError::Rejected {
                    status: 400,
                    message: format!("unscripted query: {query}"),
                }),
            }
        }
    }

    fn count_body(count: Value) -> Value {
        json!({
            "Schema": [{"Name": "TotalEvents", "Type": "Int64"}],
            "Results": [{"TotalEvents": count}]
        })
    }

    fn sample_body(rows: usize) -> Value {
        let results: Vec<Value> = (0..rows)
            .map(|i| {
                json!({
                    "Timestamp": format!("2024-01-15T12:00:{:02}Z", i % 60),
                    "DeviceName": format!("host-{i}"),
                    "ActionType": "ProcessCreated"
                })
            })
            .collect();
        json!({
            "Schema": [
                {"Name": "Timestamp", "Type": "DateTime"},
                {"Name": "DeviceName", "Type": "String"},
                {"Name": "ActionType", "Type": "String"}
            ],
            "Results": results
        })
    }

    fn count_q(table: &str, days: u32) -> String {
        count_query(table, &lookback_period(days))
    }

    fn sample_q(table: &str, days: u32, method: SampleMethod, size: u32) -> String {
        sample_query(table, &lookback_period(days), method, size)
    }

    fn request(tables: &[&str]) -> EstimationRequest {
        EstimationRequest::new(
            7,
            100,
            SampleMethod::Take,
            tables.iter().map(|t| (*t).to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn test_estimates_from_measured_sample() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::default()
            .respond(count_q("DeviceEvents", 7), count_body(json!(70_000)))
            .respond(
                sample_q("DeviceEvents", 7, SampleMethod::Take, 100),
                sample_body(50),
            );
        let estimator = Estimator::new(request(&["DeviceEvents"]), dir.path());

        let outcome = estimator.estimate_table(&runner, "DeviceEvents").await;

        let TableOutcome::Estimated(estimate) = outcome else {
            panic!("expected an estimate, got {outcome:?}");
        };
        let bytes = std::fs::metadata(dir.path().join("DeviceEvents.csv"))
            .unwrap()
            .len();
        assert_eq!(estimate.events_in_lookback, 70_000);
        assert_eq!(estimate.est_daily_events, 10_000);
        assert_eq!(estimate.avg_record_size_kb, average_record_size_kb(bytes, 50));
        assert_abs_diff_eq!(
            estimate.est_total_mb_in_lookback,
            70_000.0 * estimate.avg_record_size_kb / 1024.0,
            epsilon = 0.01
        );

        // Count first, then sample.
        assert_eq!(
            runner.calls(),
            vec![
                "DeviceEvents | where Timestamp > ago(7d) | summarize TotalEvents = count()",
                "DeviceEvents | where Timestamp > ago(7d) | take 100",
            ]
        );
    }

    #[tokio::test]
    async fn test_zero_count_skips_without_sampling() {
        let dir = TempDir::new().unwrap();
        let runner =
            ScriptedRunner::default().respond(count_q("EmailEvents", 7), count_body(json!(0)));
        let estimator = Estimator::new(request(&["EmailEvents"]), dir.path());

        let outcome = estimator.estimate_table(&runner, "EmailEvents").await;

        assert_eq!(
            outcome,
            TableOutcome::Skipped {
                table: "EmailEvents".into(),
                reason: SkipReason::ZeroEvents,
            }
        );
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_count_failures_are_distinguished() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::default()
            .reject(count_q("Forbidden", 7), 403)
            .respond(count_q("Empty", 7), json!({"Schema": [], "Results": []}))
            .respond(count_q("Null", 7), count_body(Value::Null))
            .respond(count_q("Negative", 7), count_body(json!(-3)));
        let estimator = Estimator::new(
            request(&["Forbidden", "Empty", "Null", "Negative"]),
            dir.path(),
        );

        let run = estimator.run(&runner, 1).await;

        let reasons: Vec<_> = run.skipped.iter().map(|s| s.reason.clone()).collect();
        assert!(matches!(reasons[0], SkipReason::QueryFailed(_)));
        assert_eq!(reasons[1], SkipReason::NoRows);
        assert_eq!(reasons[2], SkipReason::MissingCount);
        assert_eq!(reasons[3], SkipReason::ZeroEvents);
        assert!(run.results.is_empty());
        assert_eq!(run.results.totals().est_total_gb_in_lookback, 0.0);
    }

    #[tokio::test]
    async fn test_sample_failure_uses_fallback_size() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::default()
            .respond(count_q("DeviceEvents", 7), count_body(json!("70000")))
            .reject(sample_q("DeviceEvents", 7, SampleMethod::Take, 100), 500);
        let estimator = Estimator::new(request(&["DeviceEvents"]), dir.path());

        let outcome = estimator.estimate_table(&runner, "DeviceEvents").await;

        let TableOutcome::Degraded { estimate, reason } = outcome else {
            panic!("expected a degraded estimate, got {outcome:?}");
        };
        assert_eq!(estimate.avg_record_size_kb, 2.5);
        assert_eq!(estimate.events_in_lookback, 70_000);
        assert!(reason.contains("sample query failed"));
    }

    #[tokio::test]
    async fn test_export_failure_uses_configured_fallback() {
        let dir = TempDir::new().unwrap();
        // A file where the samples directory should be makes the export fail.
        let blocked = dir.path().join("samples");
        std::fs::write(&blocked, b"not a directory").unwrap();

        let runner = ScriptedRunner::default()
            .respond(count_q("DeviceEvents", 7), count_body(json!(1_024)))
            .respond(
                sample_q("DeviceEvents", 7, SampleMethod::Take, 100),
                sample_body(3),
            );
        let estimator = Estimator::new(request(&["DeviceEvents"]), &blocked)
            .with_fallback_record_size_kb(4.0);

        let outcome = estimator.estimate_table(&runner, "DeviceEvents").await;

        let estimate = outcome.estimate().unwrap();
        assert!(matches!(outcome, TableOutcome::Degraded { .. }));
        assert_eq!(estimate.avg_record_size_kb, 4.0);
        assert_eq!(estimate.est_total_mb_in_lookback, 4.0);
    }

    #[tokio::test]
    async fn test_empty_sample_divides_by_one() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::default()
            .respond(count_q("DeviceInfo", 7), count_body(json!(10)))
            .respond(
                sample_q("DeviceInfo", 7, SampleMethod::Take, 100),
                sample_body(0),
            );
        let estimator = Estimator::new(request(&["DeviceInfo"]), dir.path());

        let outcome = estimator.estimate_table(&runner, "DeviceInfo").await;

        let bytes = std::fs::metadata(dir.path().join("DeviceInfo.csv"))
            .unwrap()
            .len();
        assert!(bytes > 0, "header row is still written");
        assert_eq!(
            outcome.estimate().unwrap().avg_record_size_kb,
            average_record_size_kb(bytes, 1)
        );
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_later_tables() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::default()
            .reject(count_q("A", 7), 403)
            .respond(count_q("B", 7), count_body(json!(700)))
            .respond(sample_q("B", 7, SampleMethod::Take, 100), sample_body(10))
            .respond(count_q("C", 7), count_body(json!(1_400)));
        let estimator = Estimator::new(request(&["A", "B", "C"]), dir.path());

        let run = estimator.run(&runner, 1).await;

        let names: Vec<_> = run
            .results
            .estimates()
            .iter()
            .map(|e| e.table_name.as_str())
            .collect();
        assert_eq!(names, vec!["B", "C"]);
        assert_eq!(run.degraded, vec!["C"]);
        assert_eq!(run.skipped.len(), 1);
        assert_eq!(run.tables_processed(), 3);
    }

    #[tokio::test]
    async fn test_identical_responses_give_identical_results() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::default()
            .respond(count_q("X", 7), count_body(json!(70_000)))
            .respond(sample_q("X", 7, SampleMethod::Take, 100), sample_body(20))
            .respond(count_q("Y", 7), count_body(json!(5)))
            .respond(sample_q("Y", 7, SampleMethod::Take, 100), sample_body(2));
        let estimator = Estimator::new(request(&["X", "Y"]), dir.path());

        let first = estimator.run(&runner, 1).await;
        let second = estimator.run(&runner, 1).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_parallel_run_keeps_table_order() {
        let dir = TempDir::new().unwrap();
        let tables = ["T1", "T2", "T3", "T4", "T5"];
        let mut runner = ScriptedRunner::default();
        for (i, table) in tables.iter().enumerate() {
            runner = runner
                .respond(count_q(table, 7), count_body(json!((i + 1) * 1_000)))
                .respond(
                    sample_q(table, 7, SampleMethod::Take, 100),
                    sample_body(i + 1),
                );
        }
        let estimator = Estimator::new(request(&tables), dir.path());

        let sequential = estimator.run(&runner, 1).await;
        let parallel = estimator.run(&runner, 4).await;

        let names: Vec<_> = parallel
            .results
            .estimates()
            .iter()
            .map(|e| e.table_name.as_str())
            .collect();
        assert_eq!(names, tables);
        assert_eq!(sequential.results, parallel.results);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_repeated_tables_use_separate_sample_files() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptedRunner::default()
            .respond(count_q("A", 7), count_body(json!(7_000)))
            .respond(sample_q("A", 7, SampleMethod::Take, 100), sample_body(40));
        let estimator = Estimator::new(request(&["A", "A", "A", "A"]), dir.path());

        let sequential = estimator.run(&runner, 1).await;
        for _ in 0..20 {
            let parallel = estimator.run(&runner, 4).await;
            assert_eq!(parallel, sequential);
        }

        for name in ["A.csv", "A.2.csv", "A.3.csv", "A.4.csv"] {
            assert!(dir.path().join(name).exists(), "missing {name}");
        }
        let sizes: Vec<_> = sequential
            .results
            .estimates()
            .iter()
            .map(|e| e.avg_record_size_kb)
            .collect();
        assert!(sizes.iter().all(|&kb| kb == sizes[0] && kb > 0.0));
    }
}
