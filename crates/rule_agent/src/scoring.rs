//! Scoring helpers shared by every check and by the orchestrator.

use std::collections::HashSet;

use crate::issue::{Issue, Severity};

pub const ERROR_PENALTY: u32 = 20;
pub const WARNING_PENALTY: u32 = 10;
pub const INFO_PENALTY: u32 = 2;

/// Score assigned when nothing was evaluated.
pub const MAX_SCORE: u32 = 100;

/// Penalty for one issue.
pub fn penalty(severity: Severity) -> u32 {
    match severity {
        Severity::Error => ERROR_PENALTY,
        Severity::Warning => WARNING_PENALTY,
        Severity::Info => INFO_PENALTY,
    }
}

/// Start at 100, subtract one penalty per issue, clamp at 0.
pub fn penalty_score(issues: &[Issue]) -> u32 {
    let total: u32 = issues.iter().map(|i| penalty(i.severity)).sum();
    MAX_SCORE.saturating_sub(total)
}

/// Weighted average of `(weight, score)` pairs, normalized by the weight
/// actually present. Returns [`MAX_SCORE`] for an empty run.
pub fn weighted_score(entries: &[(f64, u32)]) -> u32 {
    let total_weight: f64 = entries.iter().map(|(w, _)| w.max(0.0)).sum();
    if total_weight <= f64::EPSILON {
        return MAX_SCORE;
    }
    let weighted: f64 = entries
        .iter()
        .map(|(w, s)| w.max(0.0) * f64::from((*s).min(MAX_SCORE)))
        .sum();
    let score = (weighted / total_weight).round();
    (score.clamp(0.0, f64::from(MAX_SCORE))) as u32
}

/// Drop repeated strings, keeping first occurrences in order.
pub fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
