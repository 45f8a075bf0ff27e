//! Aggregate result of one orchestrator run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gate::GateStatus;
use crate::issue::{CheckResult, Issue, Severity};

/// Issue counters across all checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl IssueSummary {
    pub fn from_results(results: &[CheckResult]) -> Self {
        let mut summary = Self::default();
        for issue in results.iter().flat_map(|r| r.issues.iter()) {
            summary.add(issue.severity);
        }
        summary
    }

    pub fn add(&mut self, severity: Severity) {
        self.total += 1;
        match severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Info => self.infos += 1,
        }
    }
}

/// The terminal artifact of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAgentResult {
    /// Module the context described
    pub module: String,
    /// True iff the gate status is `pass`
    pub passed: bool,
    /// Weighted score in `0..=100`
    pub overall_score: u32,
    pub check_results: Vec<CheckResult>,
    pub summary: IssueSummary,
    pub recommendations: Vec<String>,
    pub gate_status: GateStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl RuleAgentResult {
    /// Every issue, in check order.
    pub fn issues(&self) -> impl Iterator<Item = (&CheckResult, &Issue)> {
        self.check_results
            .iter()
            .flat_map(|r| r.issues.iter().map(move |i| (r, i)))
    }

    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.check_results.iter().find(|r| r.check_name == name)
    }

    /// Messages of every issue with exactly `severity`.
    pub fn messages_with(&self, severity: Severity) -> Vec<String> {
        self.issues()
            .filter(|(_, issue)| issue.severity == severity)
            .map(|(check, issue)| match &issue.file {
                Some(file) => format!("[{}] {} ({})", check.check_name, issue.message, file),
                None => format!("[{}] {}", check.check_name, issue.message),
            })
            .collect()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.completed_at - self.started_at).num_milliseconds()
    }
}
