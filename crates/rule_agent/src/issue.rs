//! Issues and per-check results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RuleError;
use crate::scoring;

/// Issue severity levels, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Info => "ℹ️",
            Severity::Warning => "⚠️",
            Severity::Error => "❌",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            other => Err(RuleError::InvalidConfiguration(format!(
                "unknown severity '{}'",
                other
            ))),
        }
    }
}

/// Rule category an issue belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Branding,
    Layout,
    Motion,
    Accessibility,
    UxStates,
    Theming,
    Structure,
    Typing,
    Conventions,
    Security,
    Performance,
    Events,
    Missions,
    Api,
    Documentation,
    UiKit,
    StateManagement,
    Agent,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Branding => "branding",
            Category::Layout => "layout",
            Category::Motion => "motion",
            Category::Accessibility => "accessibility",
            Category::UxStates => "ux_states",
            Category::Theming => "theming",
            Category::Structure => "structure",
            Category::Typing => "typing",
            Category::Conventions => "conventions",
            Category::Security => "security",
            Category::Performance => "performance",
            Category::Events => "events",
            Category::Missions => "missions",
            Category::Api => "api",
            Category::Documentation => "documentation",
            Category::UiKit => "ui_kit",
            Category::StateManagement => "state_management",
            Category::Agent => "agent",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rule violation or observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Identifier of the rule that fired
    pub issue_type: String,
    pub severity: Severity,
    pub message: String,
    pub category: Category,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub auto_fixable: bool,
}

impl Issue {
    pub fn new(
        issue_type: impl Into<String>,
        severity: Severity,
        category: Category,
        message: impl Into<String>,
    ) -> Self {
        Self {
            issue_type: issue_type.into(),
            severity,
            message: message.into(),
            category,
            file: None,
            suggestion: None,
            auto_fixable: false,
        }
    }

    pub fn error(issue_type: impl Into<String>, category: Category, message: impl Into<String>) -> Self {
        Self::new(issue_type, Severity::Error, category, message)
    }

    pub fn warning(issue_type: impl Into<String>, category: Category, message: impl Into<String>) -> Self {
        Self::new(issue_type, Severity::Warning, category, message)
    }

    pub fn info(issue_type: impl Into<String>, category: Category, message: impl Into<String>) -> Self {
        Self::new(issue_type, Severity::Info, category, message)
    }

    /// Set the file reference.
    pub fn at_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn auto_fixable(mut self) -> Self {
        self.auto_fixable = true;
        self
    }
}

/// Result of running one check against one context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub check_name: String,
    pub passed: bool,
    /// Highest severity among the issues (`info` when there are none)
    pub severity: Severity,
    pub issues: Vec<Issue>,
    /// Score in `0..=100`
    pub score: u32,
    /// Minimum score the check had to reach
    #[serde(default)]
    pub threshold: u32,
    pub recommendations: Vec<String>,
    /// Set when the check errored or panicked instead of returning a result
    #[serde(default)]
    pub agent_failure: bool,
}

impl CheckResult {
    /// Build a result with the shared penalty model.
    ///
    /// The check passes when the score reaches `threshold` and no issue has
    /// `error` severity.
    pub fn from_issues(
        check_name: impl Into<String>,
        issues: Vec<Issue>,
        threshold: u32,
        recommendations: Vec<String>,
    ) -> Self {
        let score = scoring::penalty_score(&issues);
        let has_error = issues.iter().any(|i| i.severity == Severity::Error);
        Self {
            check_name: check_name.into(),
            passed: score >= threshold && !has_error,
            severity: dominant_severity(&issues),
            issues,
            score,
            threshold,
            recommendations: scoring::dedup_preserving_order(recommendations),
            agent_failure: false,
        }
    }

    /// Result standing in for a check that could not run.
    pub fn agent_failure(check_name: impl Into<String>, message: impl Into<String>) -> Self {
        let check_name = check_name.into();
        let issue = Issue::error(
            "agent-failure",
            Category::Agent,
            format!("Check '{}' failed to execute: {}", check_name, message.into()),
        )
        .with_suggestion("Inspect the rule agent logs and fix the failing check");
        Self {
            check_name,
            passed: false,
            severity: Severity::Error,
            issues: vec![issue],
            score: 0,
            threshold: 0,
            recommendations: Vec::new(),
            agent_failure: true,
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    /// Issues of one severity, in emission order.
    pub fn issues_with(&self, severity: Severity) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    pub fn is_agent_failure(&self) -> bool {
        self.agent_failure
    }
}

/// Highest severity among `issues`, `info` for an empty list.
pub fn dominant_severity(issues: &[Issue]) -> Severity {
    issues
        .iter()
        .map(|i| i.severity)
        .max()
        .unwrap_or(Severity::Info)
}
