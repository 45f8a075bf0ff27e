//! Human-readable report written to a text stream.

use std::io::{self, Write};
use std::sync::Mutex;

use tracing::info;

use crate::context::PolicyContext;
use crate::error::{RuleError, RuleResult};
use crate::issue::{CheckResult, Severity};
use crate::report::{Reporter, STREAM_REPORTER};
use crate::result::{IssueSummary, RuleAgentResult};

const SUMMARY_HEADING: &str = "Summary:";
const TOTAL_LABEL: &str = "Total issues:";
const ERRORS_LABEL: &str = "Errors:";
const WARNINGS_LABEL: &str = "Warnings:";
const INFO_LABEL: &str = "Info:";

/// Writes the multi-section text report to a stream, stdout by default.
pub struct StreamReporter {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl StreamReporter {
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Render the full report.
    pub fn render(result: &RuleAgentResult, context: &PolicyContext) -> String {
        let mut report = String::new();

        report.push_str("╔══════════════════════════════════════════════════════════════╗\n");
        report.push_str("║                      RULE AGENT REPORT                       ║\n");
        report.push_str("╚══════════════════════════════════════════════════════════════╝\n");
        report.push_str(&format!("Module: {}\n", result.module));
        report.push_str(&format!("Score: {}/100\n", result.overall_score));
        report.push_str(&format!("Status: {}\n", result.gate_status.badge()));
        report.push_str(&format!("Duration: {}ms\n\n", result.duration_ms()));

        report.push_str(SUMMARY_HEADING);
        report.push('\n');
        report.push_str(&format!("  {} {}\n", TOTAL_LABEL, result.summary.total));
        report.push_str(&format!("  {} {}\n", ERRORS_LABEL, result.summary.errors));
        report.push_str(&format!("  {} {}\n", WARNINGS_LABEL, result.summary.warnings));
        report.push_str(&format!("  {} {}\n\n", INFO_LABEL, result.summary.infos));

        report.push_str("Checks:\n");
        if result.check_results.is_empty() {
            report.push_str("  (no checks ran)\n");
        }
        for check in &result.check_results {
            render_check(&mut report, check);
        }

        if !result.recommendations.is_empty() {
            report.push_str("\nRecommendations:\n");
            for rec in &result.recommendations {
                report.push_str(&format!("  • {}\n", rec));
            }
        }

        report.push_str("\nInventory:\n");
        report.push_str(&format!("  Files ({}):\n", context.files.len()));
        for file in &context.files {
            report.push_str(&format!("    {:<10} {}\n", file.kind.as_str(), file.path));
        }
        report.push_str(&format!("  Routes ({}):\n", context.routes.len()));
        for route in &context.routes {
            report.push_str(&format!(
                "    {} [auth {} | isolation {} | validation {} | rate-limit {}]\n",
                route.label(),
                mark(route.has_auth),
                mark(route.has_row_isolation),
                mark(route.has_validation),
                mark(route.has_rate_limit),
            ));
        }
        if !context.features.is_empty() {
            let features: Vec<&str> = context.features.iter().map(String::as_str).collect();
            report.push_str(&format!("  Features: {}\n", features.join(", ")));
        }

        report.push('\n');
        report.push_str(&"═".repeat(64));
        report.push('\n');
        report.push_str(&format!(
            "  VERDICT: {}  (score {}/100)\n",
            result.gate_status.badge(),
            result.overall_score
        ));
        report.push_str(&"═".repeat(64));
        report.push('\n');

        report
    }

    /// Read the summary counters back from a rendered report.
    pub fn parse_summary(text: &str) -> RuleResult<IssueSummary> {
        let mut lines = text
            .lines()
            .map(str::trim)
            .skip_while(|l| *l != SUMMARY_HEADING)
            .skip(1)
            .take_while(|l| !l.is_empty());

        let mut counter = |label: &str| -> RuleResult<usize> {
            let line = lines
                .next()
                .ok_or_else(|| parse_error(format!("missing '{}' line", label)))?;
            let value = line
                .strip_prefix(label)
                .ok_or_else(|| parse_error(format!("expected '{}', found '{}'", label, line)))?;
            value
                .trim()
                .parse()
                .map_err(|e| parse_error(format!("bad value for '{}': {}", label, e)))
        };

        Ok(IssueSummary {
            total: counter(TOTAL_LABEL)?,
            errors: counter(ERRORS_LABEL)?,
            warnings: counter(WARNINGS_LABEL)?,
            infos: counter(INFO_LABEL)?,
        })
    }
}

fn render_check(report: &mut String, check: &CheckResult) {
    let status = if check.is_agent_failure() {
        "💥"
    } else if check.passed {
        "✅"
    } else {
        "❌"
    };
    report.push_str(&format!(
        "  {} {} - score {}/{} ({} error, {} warning, {} info)\n",
        status,
        check.check_name,
        check.score,
        check.threshold,
        check.count(Severity::Error),
        check.count(Severity::Warning),
        check.count(Severity::Info),
    ));

    for (severity, heading) in [
        (Severity::Error, "Errors"),
        (Severity::Warning, "Warnings"),
        (Severity::Info, "Info"),
    ] {
        let mut issues = check.issues_with(severity).peekable();
        if issues.peek().is_none() {
            continue;
        }
        report.push_str(&format!("     {}\n", heading));
        for issue in issues {
            let location = issue
                .file
                .as_deref()
                .map(|f| format!(" ({})", f))
                .unwrap_or_default();
            report.push_str(&format!(
                "       {} [{}] {}{}\n",
                severity.icon(),
                issue.issue_type,
                issue.message,
                location
            ));
            if let Some(suggestion) = &issue.suggestion {
                let fix = if issue.auto_fixable { " (auto-fixable)" } else { "" };
                report.push_str(&format!("          → {}{}\n", suggestion, fix));
            }
        }
    }
}

fn mark(value: bool) -> &'static str {
    if value {
        "✓"
    } else {
        "✗"
    }
}

fn parse_error(message: String) -> RuleError {
    RuleError::reporter_failed(STREAM_REPORTER, message)
}

impl Reporter for StreamReporter {
    fn id(&self) -> &'static str {
        STREAM_REPORTER
    }

    fn report(&self, result: &RuleAgentResult, context: &PolicyContext) -> RuleResult<()> {
        let text = Self::render(result, context);
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| RuleError::reporter_failed(STREAM_REPORTER, "writer lock poisoned"))?;
        writer.write_all(text.as_bytes())?;
        writer.flush()?;

        info!(
            "Rule agent report for {}: {} (score {}, {} issue(s))",
            result.module, result.gate_status, result.overall_score, result.summary.total
        );
        Ok(())
    }
}
