//! Koan execution runner
//!
//! Runs suites in registration order and cases one at a time. Each body
//! runs on a blocking worker, so a panic or timeout becomes an `ERROR`
//! result instead of taking the run down.

use chrono::Utc;
use std::any::Any;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::assertion::{Expect, OutcomeLog};
use crate::lang::Ambient;
use crate::models::{AssertionOutcome, Case, CaseResult, RunReport, Suite, SuiteReport};
use crate::registry::SuiteRegistry;
use crate::utils::timer::Timer;

/// Case-insensitive substring filter on suite and case names
#[derive(Clone, Debug, Default)]
pub struct RunFilter {
    pub suite: Option<String>,
    pub case: Option<String>,
}

impl RunFilter {
    pub fn new(suite: Option<String>, case: Option<String>) -> Self {
        Self { suite, case }
    }

    pub fn matches_suite(&self, name: &str) -> bool {
        contains_ignore_case(name, self.suite.as_deref())
    }

    pub fn matches_case(&self, name: &str) -> bool {
        contains_ignore_case(name, self.case.as_deref())
    }
}

fn contains_ignore_case(name: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) => name.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

/// Sequential runner over a registry
pub struct KoanRunner {
    registry: SuiteRegistry,
    ambient: Ambient,
    case_timeout: Option<Duration>,
    skip: Vec<String>,
}

impl KoanRunner {
    pub fn new(registry: SuiteRegistry) -> Self {
        Self {
            registry,
            ambient: Ambient::new(),
            case_timeout: None,
            skip: Vec::new(),
        }
    }

    /// Fail any case body that runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.case_timeout = Some(timeout);
        self
    }

    /// Cases to report as skipped, by case name or `suite/case`
    pub fn with_skip(mut self, names: Vec<String>) -> Self {
        self.skip = names;
        self
    }

    /// Number of cases `filter` selects, skipped ones included
    pub fn selected(&self, filter: &RunFilter) -> usize {
        self.registry
            .suites()
            .iter()
            .filter(|suite| filter.matches_suite(suite.name()))
            .flat_map(|suite| suite.cases())
            .filter(|case| filter.matches_case(case.name()))
            .count()
    }

    /// Run the cases selected by `filter`. Suites with no selected case are
    /// left out of the report.
    pub async fn run_filtered(&self, filter: &RunFilter) -> RunReport {
        let started_at = Utc::now();
        let timer = Timer::start("run");
        info!("Starting koan run ({} suites)", self.registry.len());

        self.ambient.clear();
        let mut suites = Vec::new();

        for suite in self.registry.suites() {
            if !filter.matches_suite(suite.name()) {
                continue;
            }
            let cases: Vec<&Case> = suite
                .cases()
                .iter()
                .filter(|c| filter.matches_case(c.name()))
                .collect();
            if cases.is_empty() {
                continue;
            }
            suites.push(self.run_suite(suite, &cases).await);
        }

        debug!("Clearing ambient bindings {:?}", self.ambient.names());
        self.ambient.clear();
        let report = RunReport::new(started_at, suites);

        info!(
            "Koan run completed in {}ms - Pass: {}/{} ({:.1}%)",
            timer.elapsed_ms(),
            report.passed,
            report.total,
            report.pass_rate()
        );

        report
    }

    async fn run_suite(&self, suite: &Suite, cases: &[&Case]) -> SuiteReport {
        info!("Running suite '{}'", suite.name());

        if let Some(setup) = suite.setup() {
            if let Err(e) = setup(&self.ambient) {
                error!("Setup for suite '{}' failed: {:#}", suite.name(), e);
                let results = cases
                    .iter()
                    .map(|case| {
                        CaseResult::errored(
                            suite.name(),
                            case.name(),
                            0,
                            Vec::new(),
                            format!("suite setup failed: {e:#}"),
                        )
                    })
                    .collect();
                return SuiteReport::new(suite.name(), results);
            }
        }

        let timer = Timer::start(suite.name());
        let mut results = Vec::with_capacity(cases.len());
        for case in cases {
            let result = self.run_case(suite.name(), case).await;
            debug!("  {}", result);
            for message in result.failed_assertions().filter_map(AssertionOutcome::message) {
                debug!("    {}", message);
            }
            results.push(result);
        }
        timer.stop();

        let report = SuiteReport::new(suite.name(), results);
        if !report.is_all_passed() {
            warn!("Suite '{}' has failing koans", suite.name());
        }
        report
    }

    /// Run a single case and wait for it to finish
    pub async fn run_case(&self, suite: &str, case: &Case) -> CaseResult {
        if self.is_skipped(suite, case.name()) {
            return CaseResult::skipped(suite, case.name(), "Skipped by configuration");
        }

        debug!("Running '{}' / '{}'", suite, case.name());

        let log = OutcomeLog::new();
        let task_log = log.clone();
        let ambient = self.ambient.clone();
        let body = case.body().clone();
        let timer = Timer::start(case.name());

        let task = tokio::task::spawn_blocking(move || {
            let mut expect = Expect::new(task_log, ambient);
            body(&mut expect)
        });

        let joined = match self.case_timeout {
            Some(limit) => tokio::time::timeout(limit, task).await.ok(),
            None => Some(task.await),
        };
        let duration_ms = timer.elapsed_ms();
        let outcomes = log.take();

        match joined {
            Some(Ok(Ok(()))) => CaseResult::completed(suite, case.name(), duration_ms, outcomes),
            Some(Ok(Err(fault))) => {
                warn!("Case '{}' raised: {:#}", case.name(), fault);
                CaseResult::errored(suite, case.name(), duration_ms, outcomes, format!("{fault:#}"))
            }
            Some(Err(join_error)) => {
                let message = if join_error.is_panic() {
                    format!("panicked: {}", panic_message(join_error.into_panic()))
                } else {
                    "cancelled".to_string()
                };
                warn!("Case '{}' {}", case.name(), message);
                CaseResult::errored(suite, case.name(), duration_ms, outcomes, message)
            }
            None => {
                // The blocking body cannot be cancelled. It is left running and
                // anything it records from here on lands in a drained log.
                let limit = self.case_timeout.unwrap_or_default();
                warn!("Case '{}' timed out, abandoning its body", case.name());
                CaseResult::errored(
                    suite,
                    case.name(),
                    duration_ms,
                    outcomes,
                    format!("timed out after {}ms, body abandoned", limit.as_millis()),
                )
            }
        }
    }

    fn is_skipped(&self, suite: &str, case: &str) -> bool {
        let qualified = format!("{suite}/{case}");
        self.skip.iter().any(|s| s == case || *s == qualified)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::koans;
    use crate::models::{CaseStatus, Suite};

    fn registry_of(suites: Vec<Suite>) -> SuiteRegistry {
        let mut registry = SuiteRegistry::new();
        for suite in suites {
            registry.register_suite(suite).unwrap();
        }
        registry
    }

    async fn run_all(runner: &KoanRunner) -> RunReport {
        runner.run_filtered(&RunFilter::default()).await
    }

    fn passing(name: &str) -> Case {
        Case::new(name, |expect| {
            expect.equal(2 + 2, 4);
            Ok(())
        })
    }

    #[tokio::test]
    async fn test_koans_all_pass() {
        let runner = KoanRunner::new(koans::registry().unwrap());
        let report = run_all(&runner).await;

        assert_eq!(report.total, 15);
        assert_eq!(report.passed, 15, "{report}");
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_runs_are_deterministic() {
        let first = run_all(&KoanRunner::new(koans::registry().unwrap())).await;
        let second = run_all(&KoanRunner::new(koans::registry().unwrap())).await;

        let shape = |report: &RunReport| {
            report
                .results()
                .map(|r| (r.case.clone(), r.status, r.assertions.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(shape(&first), shape(&second));
    }

    #[tokio::test]
    async fn test_failed_assertion_does_not_stop_case() {
        let suite = Suite::new(
            "s",
            vec![Case::new("mixed", |expect| {
                expect.equal("actual", "expected");
                expect.equal(1, 1);
                Ok(())
            })],
        );
        let report = run_all(&KoanRunner::new(registry_of(vec![suite]))).await;
        let result = report.results().next().unwrap();

        assert_eq!(result.status, CaseStatus::Fail);
        assert_eq!(result.assertions.len(), 2);
        assert!(result.assertions[0].is_failed());
        assert!(!result.assertions[1].is_failed());
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn test_faults_are_isolated() {
        let suite = Suite::new(
            "s",
            vec![
                Case::new("returns error", |expect| {
                    expect.equal(1, 1);
                    anyhow::bail!("record has no field 'missing'")
                }),
                Case::new("panics", |expect| {
                    expect.equal(1, 1);
                    panic!("undeclared variable");
                }),
                passing("still runs"),
            ],
        );
        let report = run_all(&KoanRunner::new(registry_of(vec![suite]))).await;
        let results: Vec<_> = report.results().collect();

        assert_eq!(results[0].status, CaseStatus::Error);
        assert_eq!(results[0].assertions.len(), 1);
        assert!(results[0].message.as_deref().unwrap().contains("missing"));

        assert_eq!(results[1].status, CaseStatus::Error);
        assert_eq!(results[1].assertions.len(), 1);
        assert!(results[1]
            .message
            .as_deref()
            .unwrap()
            .contains("undeclared variable"));

        assert_eq!(results[2].status, CaseStatus::Pass);
        assert_eq!(report.errors, 2);
    }

    #[tokio::test]
    async fn test_timeout_reports_error() {
        let suite = Suite::new(
            "s",
            vec![
                Case::new("slow", |expect| {
                    expect.equal(1, 1);
                    std::thread::sleep(Duration::from_millis(300));
                    expect.equal(1, 2);
                    Ok(())
                }),
                passing("fast"),
            ],
        );
        let runner =
            KoanRunner::new(registry_of(vec![suite])).with_timeout(Duration::from_millis(20));
        let report = run_all(&runner).await;
        let results: Vec<_> = report.results().collect();

        assert_eq!(results[0].status, CaseStatus::Error);
        let message = results[0].message.as_deref().unwrap();
        assert!(message.contains("timed out after 20ms"));
        assert!(message.contains("abandoned"));
        // Only the outcome recorded before the deadline is kept.
        assert_eq!(results[0].assertions.len(), 1);
        assert!(!results[0].assertions[0].is_failed());
        assert_eq!(results[1].status, CaseStatus::Pass);
    }

    #[tokio::test]
    async fn test_case_without_assertions_fails() {
        let suite = Suite::new("s", vec![Case::new("empty", |_| Ok(()))]);
        let report = run_all(&KoanRunner::new(registry_of(vec![suite]))).await;
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn test_skip_list() {
        let suite = Suite::new("s", vec![passing("a"), passing("b")]);
        let runner = KoanRunner::new(registry_of(vec![suite])).with_skip(vec!["s/b".to_string()]);
        let report = run_all(&runner).await;

        assert_eq!(report.passed, 1);
        assert_eq!(report.skipped, 1);
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_filter_selects_cases() {
        let runner = KoanRunner::new(koans::registry().unwrap());
        let filter = RunFilter::new(Some("scope".to_string()), Some("GLOBAL".to_string()));
        let report = runner.run_filtered(&filter).await;

        assert_eq!(report.suites.len(), 1);
        assert_eq!(report.total, 1);
        assert_eq!(report.passed, 1);
    }

    #[tokio::test]
    async fn test_ambient_set_by_setup_and_cleared_after_run() {
        let suite = Suite::new(
            "s",
            vec![Case::new("reads ambient", |expect| {
                let value = expect.ambient().get("answer");
                expect.returns(value, 42);
                Ok(())
            })],
        )
        .with_setup(|ambient| {
            ambient.set("answer", 42);
            Ok(())
        });
        let runner = KoanRunner::new(registry_of(vec![suite]));
        let report = run_all(&runner).await;

        assert_eq!(report.passed, 1);
        assert!(runner.ambient.names().is_empty());
    }

    #[tokio::test]
    async fn test_failed_setup_errors_every_case() {
        let suite = Suite::new("s", vec![passing("a"), passing("b")])
            .with_setup(|_| anyhow::bail!("no registry"));
        let report = run_all(&KoanRunner::new(registry_of(vec![suite]))).await;

        assert_eq!(report.errors, 2);
        assert!(report
            .results()
            .all(|r| r.message.as_deref().unwrap().contains("no registry")));
    }

    #[tokio::test]
    async fn test_run_case_directly() {
        let runner = KoanRunner::new(koans::registry().unwrap());
        let suite = &runner.registry.suites()[0];
        let case = &suite.cases()[0];

        let result = runner.run_case(suite.name(), case).await;
        assert_eq!(result.status, CaseStatus::Pass);
    }

    #[test]
    fn test_selected_counts_filtered_cases() {
        let runner = KoanRunner::new(koans::registry().unwrap());
        assert_eq!(runner.selected(&RunFilter::default()), 15);
        assert_eq!(
            runner.selected(&RunFilter::new(Some("closure".to_string()), None)),
            7
        );
        assert_eq!(
            runner.selected(&RunFilter::new(None, Some("no such koan".to_string()))),
            0
        );
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let filter = RunFilter::new(Some("about SCOPE".to_string()), None);
        assert!(filter.matches_suite("About Scope"));
        assert!(!filter.matches_suite("About Functions"));
        assert!(filter.matches_case("anything"));
    }
}
