//! Compliance checks.
//!
//! A check inspects a [`PolicyContext`] and returns a [`CheckResult`]. Checks
//! are pure with respect to the context and deterministic for a fixed
//! context and fixture set. Scoring is shared through
//! [`CheckResult::from_issues`], so a new family only implements [`Check`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::PolicyContext;
use crate::error::RuleResult;
use crate::issue::{CheckResult, Issue};

pub mod integration;
pub mod structure;
pub mod style;

pub use integration::IntegrationCheck;
pub use structure::StructuralCheck;
pub use style::StyleCheck;

pub const STYLE_CHECK: &str = "style-compliance";
pub const STRUCTURAL_CHECK: &str = "structural-compliance";
pub const INTEGRATION_CHECK: &str = "integration-compliance";

/// Family a check belongs to; decides its weight in the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckFamily {
    Style,
    Structural,
    Integration,
    Custom,
}

impl CheckFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckFamily::Style => "style",
            CheckFamily::Structural => "structural",
            CheckFamily::Integration => "integration",
            CheckFamily::Custom => "custom",
        }
    }
}

impl fmt::Display for CheckFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core trait for all checks.
pub trait Check: Send + Sync {
    /// Unique name, also the key in the configuration.
    fn name(&self) -> &str;

    fn family(&self) -> CheckFamily;

    /// Minimum score for the check to pass.
    fn threshold(&self) -> u32;

    /// Evaluate the context.
    ///
    /// `Err` means the check itself broke, not that the context violates
    /// policy; violations are issues in the returned result.
    fn run(&self, context: &PolicyContext) -> RuleResult<CheckResult>;
}

/// Map issue types to recommendations, keeping first-seen order.
pub(crate) fn recommend(issues: &[Issue], lookup: fn(&str) -> Option<&'static str>) -> Vec<String> {
    issues
        .iter()
        .filter_map(|i| lookup(&i.issue_type))
        .map(str::to_string)
        .collect()
}
