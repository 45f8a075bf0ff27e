//! Gate verdicts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::GateConfig;
use crate::issue::Severity;

/// Final decision of an evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    Pass,
    Warning,
    Fail,
}

impl GateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateStatus::Pass => "pass",
            GateStatus::Warning => "warning",
            GateStatus::Fail => "fail",
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            GateStatus::Pass => "✅ PASS",
            GateStatus::Warning => "⚠️ WARNING",
            GateStatus::Fail => "❌ FAIL",
        }
    }
}

impl fmt::Display for GateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue counts as the gate sees them, after severity ceilings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateTally {
    pub errors: usize,
    pub warnings: usize,
    /// A check could not run
    pub agent_failure: bool,
}

impl GateTally {
    /// Count one issue whose severity has been capped at `ceiling`.
    pub fn record(&mut self, severity: Severity, ceiling: Severity) {
        match severity.min(ceiling) {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Info => {}
        }
    }
}

/// Decide the verdict for a run.
///
/// `fail` when a check could not run, or when gating is enabled and either
/// an error exists under `fail_on_error` or the warning count reaches the
/// threshold (`0` disables that rule). Otherwise `warning` when any warning
/// exists or the score is below `pass_score`, else `pass`.
pub fn evaluate(tally: &GateTally, overall_score: u32, config: &GateConfig) -> GateStatus {
    if tally.agent_failure {
        return GateStatus::Fail;
    }

    if config.enabled {
        let error_fail = config.fail_on_error && tally.errors > 0;
        let warning_fail = config.warning_threshold > 0 && tally.warnings >= config.warning_threshold;
        if error_fail || warning_fail {
            return GateStatus::Fail;
        }
    }

    if tally.warnings > 0 || overall_score < config.pass_score {
        GateStatus::Warning
    } else {
        GateStatus::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(enabled: bool, fail_on_error: bool, warning_threshold: usize) -> GateConfig {
        GateConfig {
            enabled,
            fail_on_error,
            warning_threshold,
            ..GateConfig::default()
        }
    }

    #[test]
    fn test_clean_run_passes() {
        let status = evaluate(&GateTally::default(), 100, &gate(true, true, 10));
        assert_eq!(status, GateStatus::Pass);
    }

    #[test]
    fn test_error_fails_when_fail_on_error() {
        let tally = GateTally { errors: 1, ..Default::default() };
        assert_eq!(evaluate(&tally, 100, &gate(true, true, 10)), GateStatus::Fail);
        // Errors do not count as warnings; a high score then passes.
        assert_eq!(evaluate(&tally, 100, &gate(true, false, 10)), GateStatus::Pass);
        assert_eq!(evaluate(&tally, 70, &gate(true, false, 10)), GateStatus::Warning);
    }

    #[test]
    fn test_warning_threshold() {
        let tally = GateTally { warnings: 3, ..Default::default() };
        assert_eq!(evaluate(&tally, 90, &gate(true, true, 3)), GateStatus::Fail);
        assert_eq!(evaluate(&tally, 90, &gate(true, true, 4)), GateStatus::Warning);
        assert_eq!(evaluate(&tally, 90, &gate(true, true, 0)), GateStatus::Warning);
    }

    #[test]
    fn test_disabled_gate_never_fails_on_policy() {
        let tally = GateTally { errors: 4, warnings: 20, agent_failure: false };
        assert_eq!(evaluate(&tally, 10, &gate(false, true, 1)), GateStatus::Warning);
    }

    #[test]
    fn test_agent_failure_always_fails() {
        let tally = GateTally { agent_failure: true, ..Default::default() };
        assert_eq!(evaluate(&tally, 100, &gate(false, false, 0)), GateStatus::Fail);
    }

    #[test]
    fn test_tally_applies_ceiling() {
        let mut tally = GateTally::default();
        tally.record(Severity::Error, Severity::Warning);
        tally.record(Severity::Error, Severity::Error);
        tally.record(Severity::Warning, Severity::Info);
        assert_eq!(tally.errors, 1);
        assert_eq!(tally.warnings, 1);
    }
}
