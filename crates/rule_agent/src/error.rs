//! Error types for the rule agent.

use thiserror::Error;

use crate::gate::GateStatus;

/// Result type alias for rule agent operations.
pub type RuleResult<T> = Result<T, RuleError>;

/// Errors that can occur while configuring or running the rule agent.
///
/// Policy violations are not errors; they travel as [`crate::Issue`] values
/// inside the result.
#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Agent failure in check {check}: {message}")]
    AgentFailure { check: String, message: String },

    #[error("Gate failed ({status}, score {score}): {}", fatal_issues.join("; "))]
    GateFailed {
        status: GateStatus,
        score: u32,
        fatal_issues: Vec<String>,
    },

    #[error("Reporter {reporter} failed: {message}")]
    ReporterFailed { reporter: String, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Invalid heuristic pattern {name}: {message}")]
    InvalidPattern { name: String, message: String },

    #[error("Failed to load fixture {path}: {message}")]
    Fixture { path: String, message: String },

    #[error("Evaluation timed out after {0}ms")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RuleError {
    /// Create an agent failure error.
    pub fn agent_failure(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AgentFailure {
            check: check.into(),
            message: message.into(),
        }
    }

    /// Create a reporter failure error.
    pub fn reporter_failed(reporter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ReporterFailed {
            reporter: reporter.into(),
            message: message.into(),
        }
    }
}
