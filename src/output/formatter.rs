//! Output formatters for koan reports
//!
//! Provides table, JSON, CSV and one-line summary output.

use anyhow::{Context, Result};
use difference::{Changeset, Difference};
use std::io::Write;

use crate::models::{AssertionOutcome, CaseResult, CaseStatus, RunReport};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Csv,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }

    pub fn names() -> &'static [&'static str] {
        &["table", "json", "json-pretty", "csv", "summary"]
    }
}

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Report formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Format a whole run
    pub fn format_report(&self, report: &RunReport) -> Result<String> {
        let output = match self.format {
            OutputFormat::Table => self.format_report_table(report),
            OutputFormat::Json => {
                serde_json::to_string(report).context("Failed to serialize report")?
            }
            OutputFormat::JsonPretty => {
                serde_json::to_string_pretty(report).context("Failed to serialize report")?
            }
            OutputFormat::Csv => format_report_csv(report)?,
            OutputFormat::Summary => self.format_report_brief(report),
        };
        Ok(output)
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.colorize {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn status_label(&self, status: CaseStatus) -> String {
        let label = format!("{} {}", status.symbol(), status);
        match status {
            CaseStatus::Pass => self.paint(GREEN, &label),
            CaseStatus::Fail | CaseStatus::Error => self.paint(RED, &label),
            CaseStatus::Skip => self.paint(YELLOW, &label),
        }
    }

    fn format_case_table(&self, result: &CaseResult) -> String {
        let mut output = format!(
            "  {:9} {:58} [{:>5}ms]\n",
            self.status_label(result.status),
            result.case,
            result.duration_ms
        );

        match result.status {
            CaseStatus::Fail | CaseStatus::Error => {
                for outcome in result.failed_assertions() {
                    output.push_str(&self.format_failure(outcome));
                }
                if let Some(message) = &result.message {
                    output.push_str(&format!("      {message}\n"));
                }
            }
            CaseStatus::Skip => {
                if let Some(message) = &result.message {
                    output.push_str(&format!("      {message}\n"));
                }
            }
            CaseStatus::Pass => {}
        }

        output
    }

    fn format_failure(&self, outcome: &AssertionOutcome) -> String {
        let mut output = format!(
            "      assertion #{} at {}\n        expected: {}\n        found:    {}\n",
            outcome.index, outcome.location, outcome.expected, outcome.actual
        );
        output.push_str(&format!(
            "        diff:     {}\n",
            self.render_diff(&outcome.expected, &outcome.actual)
        ));
        output
    }

    /// Word-level diff from expected to actual
    fn render_diff(&self, expected: &str, actual: &str) -> String {
        let changeset = Changeset::new(expected, actual, " ");
        changeset
            .diffs
            .iter()
            .map(|diff| match diff {
                Difference::Same(text) => text.clone(),
                Difference::Rem(text) => self.paint(RED, &format!("[-{text}-]")),
                Difference::Add(text) => self.paint(GREEN, &format!("{{+{text}+}}")),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn format_report_table(&self, report: &RunReport) -> String {
        let mut output = String::new();

        for suite in &report.suites {
            output.push_str("\n╔══════════════════════════════════════════════════════════════╗\n");
            output.push_str(&format!("║  {:60}║\n", suite.name));
            output.push_str("╚══════════════════════════════════════════════════════════════╝\n");
            for result in &suite.results {
                output.push_str(&self.format_case_table(result));
            }
        }

        output.push_str("\n══════════════════════════════════════════════════════════════════\n");

        let pass_str = self.paint(GREEN, &report.passed.to_string());
        let fail_str = if report.failed > 0 {
            self.paint(RED, &report.failed.to_string())
        } else {
            report.failed.to_string()
        };
        let error_str = if report.errors > 0 {
            self.paint(RED, &report.errors.to_string())
        } else {
            report.errors.to_string()
        };

        output.push_str(&format!(
            " Total: {} | Pass: {} | Fail: {} | Error: {} | Skip: {}\n",
            report.total, pass_str, fail_str, error_str, report.skipped
        ));
        output.push_str(&format!(
            " Assertions: {} ({} failed) | Pass Rate: {:.1}% | Duration: {}ms\n",
            report.assertions,
            report.failed_assertions,
            report.pass_rate(),
            report.total_duration_ms
        ));

        output
    }

    fn format_report_brief(&self, report: &RunReport) -> String {
        format!(
            "{}/{} koans passed ({} failed, {} errors, {} skipped; {}/{} assertions) in {}ms",
            report.passed,
            report.total,
            report.failed,
            report.errors,
            report.skipped,
            report.assertions - report.failed_assertions,
            report.assertions,
            report.total_duration_ms
        )
    }
}

fn format_report_csv(report: &RunReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "suite",
        "case",
        "status",
        "duration_ms",
        "assertions",
        "failed_assertions",
        "message",
    ])?;

    for result in report.results() {
        writer.write_record([
            result.suite.as_str(),
            result.case.as_str(),
            &result.status.to_string(),
            &result.duration_ms.to_string(),
            &result.assertions.len().to_string(),
            &result.failed_assertions().count().to_string(),
            result.message.as_deref().unwrap_or(""),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output was not UTF-8")
}

/// Write a report to a file, without color codes
pub fn write_report_to_file(path: &str, report: &RunReport, format: OutputFormat) -> Result<()> {
    let formatter = ResultFormatter::new(format).no_color();
    let content = formatter.format_report(report)?;

    let mut file =
        std::fs::File::create(path).with_context(|| format!("Failed to create {path}"))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write report to {path}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CaseResult, SuiteReport};
    use chrono::Utc;

    fn report() -> RunReport {
        let passed = AssertionOutcome::pending(1, "src/koans/scope.rs:40").resolve(true, "77", "77");
        let failed = AssertionOutcome::pending(2, "src/koans/scope.rs:41")
            .resolve(false, "\"Mary totally rules!\"", "\"Mary rules!\"");
        RunReport::new(
            Utc::now(),
            vec![SuiteReport::new(
                "About Scope",
                vec![
                    CaseResult::completed("About Scope", "global variables", 1, vec![passed.clone()]),
                    CaseResult::completed("About Scope", "fails, with \"quotes\"", 2, vec![passed, failed]),
                ],
            )],
        )
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("TABLE"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("unknown"), None);
        for name in OutputFormat::names() {
            assert!(OutputFormat::from_str(name).is_some());
        }
    }

    #[test]
    fn test_table_shows_failure_details() {
        let output = ResultFormatter::new(OutputFormat::Table)
            .no_color()
            .format_report(&report())
            .unwrap();

        assert!(output.contains("About Scope"));
        assert!(output.contains("✓ PASS"));
        assert!(output.contains("✗ FAIL"));
        assert!(output.contains("src/koans/scope.rs:41"));
        assert!(output.contains("expected: \"Mary totally rules!\""));
        assert!(output.contains("found:    \"Mary rules!\""));
        assert!(output.contains("[-totally-]"));
        assert!(output.contains("Total: 2 | Pass: 1 | Fail: 1"));
        assert!(!output.contains("\x1b["));
    }

    #[test]
    fn test_json_is_parseable() {
        let output = ResultFormatter::new(OutputFormat::Json)
            .format_report(&report())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["total"], 2);
        assert_eq!(value["suites"][0]["results"][1]["status"], "fail");
        assert_eq!(
            value["suites"][0]["results"][1]["assertions"][1]["state"],
            "failed"
        );
    }

    #[test]
    fn test_csv_quotes_fields() {
        let output = ResultFormatter::new(OutputFormat::Csv)
            .format_report(&report())
            .unwrap();
        let mut lines = output.lines();
        assert_eq!(
            lines.next(),
            Some("suite,case,status,duration_ms,assertions,failed_assertions,message")
        );
        assert_eq!(lines.next(), Some("About Scope,global variables,PASS,1,1,0,"));
        let failing = lines.next().unwrap();
        assert!(failing.starts_with("About Scope,\"fails, with \"\"quotes\"\"\",FAIL,2,2,1,"));
    }

    #[test]
    fn test_summary_line() {
        let output = ResultFormatter::new(OutputFormat::Summary)
            .format_report(&report())
            .unwrap();
        assert!(output.starts_with("1/2 koans passed"));
        assert!(output.contains("2/3 assertions"));
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_report_to_file(path.to_str().unwrap(), &report(), OutputFormat::JsonPretty).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"started_at\""));
    }

    #[test]
    fn test_every_format_renders() {
        for name in OutputFormat::names() {
            let format = OutputFormat::from_str(name).unwrap();
            let output = ResultFormatter::new(format).format_report(&report()).unwrap();
            assert!(!output.is_empty(), "{name} rendered nothing");
        }
    }

    #[test]
    fn test_write_report_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.csv");
        let err = write_report_to_file(path.to_str().unwrap(), &report(), OutputFormat::Csv)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to create"));
    }
}
