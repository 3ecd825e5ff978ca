//! Assertion outcomes, case results and the run report

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Lifecycle of a single assertion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssertionState {
    Pending,
    Passed,
    Failed,
}

/// One recorded comparison inside a case
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AssertionOutcome {
    /// 1-based position within the case
    pub index: usize,
    pub state: AssertionState,
    pub expected: String,
    pub actual: String,
    /// `file:line` of the assertion call
    pub location: String,
}

impl AssertionOutcome {
    pub fn pending(index: usize, location: impl Into<String>) -> Self {
        Self {
            index,
            state: AssertionState::Pending,
            expected: String::new(),
            actual: String::new(),
            location: location.into(),
        }
    }

    /// Settle a pending assertion. Already settled outcomes are returned
    /// unchanged.
    pub fn resolve(
        mut self,
        passed: bool,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        if self.state != AssertionState::Pending {
            return self;
        }
        self.state = if passed {
            AssertionState::Passed
        } else {
            AssertionState::Failed
        };
        self.expected = expected.into();
        self.actual = actual.into();
        self
    }

    pub fn is_failed(&self) -> bool {
        self.state == AssertionState::Failed
    }

    /// Failure message; `None` unless the assertion failed
    pub fn message(&self) -> Option<String> {
        self.is_failed().then(|| {
            format!(
                "assertion #{} at {}: expected {}, found {}",
                self.index, self.location, self.expected, self.actual
            )
        })
    }
}

/// Case execution status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Pass,
    Fail,
    Skip,
    Error,
}

impl CaseStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            CaseStatus::Pass => "✓",
            CaseStatus::Fail => "✗",
            CaseStatus::Skip => "○",
            CaseStatus::Error => "!",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseStatus::Pass => write!(f, "PASS"),
            CaseStatus::Fail => write!(f, "FAIL"),
            CaseStatus::Skip => write!(f, "SKIP"),
            CaseStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Result of running one case
#[derive(Clone, Debug, Serialize)]
pub struct CaseResult {
    pub suite: String,
    pub case: String,
    pub status: CaseStatus,
    pub duration_ms: u64,
    pub message: Option<String>,
    pub assertions: Vec<AssertionOutcome>,
}

impl CaseResult {
    /// Result for a body that returned normally; status follows the outcomes
    pub fn completed(
        suite: impl Into<String>,
        case: impl Into<String>,
        duration_ms: u64,
        assertions: Vec<AssertionOutcome>,
    ) -> Self {
        let (status, message) = if assertions.is_empty() {
            (
                CaseStatus::Fail,
                Some("case recorded no assertions".to_string()),
            )
        } else if assertions.iter().any(AssertionOutcome::is_failed) {
            let failed = assertions.iter().filter(|a| a.is_failed()).count();
            (
                CaseStatus::Fail,
                Some(format!("{failed} of {} assertions failed", assertions.len())),
            )
        } else {
            (CaseStatus::Pass, None)
        };

        Self {
            suite: suite.into(),
            case: case.into(),
            status,
            duration_ms,
            message,
            assertions,
        }
    }

    /// Result for a body that faulted; outcomes recorded so far are kept
    pub fn errored(
        suite: impl Into<String>,
        case: impl Into<String>,
        duration_ms: u64,
        assertions: Vec<AssertionOutcome>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            suite: suite.into(),
            case: case.into(),
            status: CaseStatus::Error,
            duration_ms,
            message: Some(error.into()),
            assertions,
        }
    }

    pub fn skipped(
        suite: impl Into<String>,
        case: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            suite: suite.into(),
            case: case.into(),
            status: CaseStatus::Skip,
            duration_ms: 0,
            message: Some(reason.into()),
            assertions: Vec::new(),
        }
    }

    pub fn failed_assertions(&self) -> impl Iterator<Item = &AssertionOutcome> {
        self.assertions.iter().filter(|a| a.is_failed())
    }
}

impl fmt::Display for CaseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}ms]",
            self.status.symbol(),
            self.case,
            self.duration_ms
        )?;
        if let Some(msg) = &self.message {
            write!(f, " - {msg}")?;
        }
        Ok(())
    }
}

/// Results for one suite, in case order
#[derive(Clone, Debug, Serialize)]
pub struct SuiteReport {
    pub name: String,
    pub results: Vec<CaseResult>,
}

impl SuiteReport {
    pub fn new(name: impl Into<String>, results: Vec<CaseResult>) -> Self {
        Self {
            name: name.into(),
            results,
        }
    }

    pub fn is_all_passed(&self) -> bool {
        self.results
            .iter()
            .all(|r| matches!(r.status, CaseStatus::Pass | CaseStatus::Skip))
    }
}

/// Everything a run produced
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
    pub assertions: usize,
    pub failed_assertions: usize,
    pub total_duration_ms: u64,
    pub suites: Vec<SuiteReport>,
}

impl RunReport {
    pub fn new(started_at: DateTime<Utc>, suites: Vec<SuiteReport>) -> Self {
        let count = |status: CaseStatus| {
            suites
                .iter()
                .flat_map(|s| &s.results)
                .filter(|r| r.status == status)
                .count()
        };
        let passed = count(CaseStatus::Pass);
        let failed = count(CaseStatus::Fail);
        let errors = count(CaseStatus::Error);
        let skipped = count(CaseStatus::Skip);

        let results = || suites.iter().flat_map(|s| &s.results);
        let total = results().count();
        let assertions: usize = results().map(|r| r.assertions.len()).sum();
        let failed_assertions: usize = results().map(|r| r.failed_assertions().count()).sum();
        let total_duration_ms: u64 = results().map(|r| r.duration_ms).sum();

        Self {
            started_at,
            total,
            passed,
            failed,
            errors,
            skipped,
            assertions,
            failed_assertions,
            total_duration_ms,
            suites,
        }
    }

    pub fn results(&self) -> impl Iterator<Item = &CaseResult> {
        self.suites.iter().flat_map(|s| &s.results)
    }

    pub fn pass_rate(&self) -> f64 {
        let ran = self.total - self.skipped;
        if ran == 0 {
            0.0
        } else {
            (self.passed as f64 / ran as f64) * 100.0
        }
    }

    /// No case failed or errored
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for suite in &self.suites {
            writeln!(f, "{}", suite.name)?;
            for result in &suite.results {
                writeln!(f, "  {result}")?;
            }
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "Total: {} | Pass: {} | Fail: {} | Skip: {} | Error: {}",
            self.total, self.passed, self.failed, self.skipped, self.errors
        )?;
        writeln!(
            f,
            "Assertions: {} ({} failed) | Duration: {}ms",
            self.assertions, self.failed_assertions, self.total_duration_ms
        )
    }
}
