//! The rule agent orchestrator.
//!
//! Owns the configuration, the registered checks and reporters. A run
//! evaluates every enabled check against one context, aggregates the
//! outcome into a [`RuleAgentResult`], then hands it to the configured
//! reporters in order.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use std::time::Duration;

use chrono::Utc;
use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::checks::{Check, CheckFamily, IntegrationCheck, StructuralCheck, StyleCheck};
use crate::config::{ConfigPatch, RuleAgentConfig};
use crate::context::PolicyContext;
use crate::error::{RuleError, RuleResult};
use crate::fixtures::FixtureSet;
use crate::gate::{self, GateStatus, GateTally};
use crate::issue::{CheckResult, Severity};
use crate::report::{NoticeBoard, NoticeReporter, Reporter, StreamReporter};
use crate::result::{IssueSummary, RuleAgentResult};
use crate::scoring;

/// Name used when the orchestrator itself fails.
const ORCHESTRATOR: &str = "rule-agent";

/// Policy evaluation pipeline.
pub struct RuleAgent {
    config: RwLock<RuleAgentConfig>,
    fixtures: FixtureSet,
    checks: Vec<Arc<dyn Check>>,
    reporters: Vec<Arc<dyn Reporter>>,
    notices: NoticeBoard,
}

impl RuleAgent {
    /// Create an agent with the three default checks, the stdout stream
    /// reporter and a notice reporter.
    pub fn new(config: RuleAgentConfig) -> RuleResult<Self> {
        let mut agent = Self::bare(config)?;

        agent.register_check(Arc::new(StyleCheck::new(agent.fixtures.style_tokens.clone())?));
        agent.register_check(Arc::new(StructuralCheck::new(agent.fixtures.directories.clone())?));
        agent.register_check(Arc::new(IntegrationCheck::from_fixtures(&agent.fixtures)?));

        agent.register_reporter(Arc::new(StreamReporter::stdout()));
        agent.register_reporter(Arc::new(NoticeReporter::new(agent.notices.clone())));

        Ok(agent)
    }

    /// Create an agent with fixtures loaded but no checks or reporters.
    pub fn bare(config: RuleAgentConfig) -> RuleResult<Self> {
        config.validate()?;
        let fixtures = FixtureSet::load(&config.fixtures)?;
        debug!("Rule agent fixtures loaded");

        Ok(Self {
            config: RwLock::new(config),
            fixtures,
            checks: Vec::new(),
            reporters: Vec::new(),
            notices: NoticeBoard::new(),
        })
    }

    /// Register a check, replacing any check with the same name.
    pub fn register_check(&mut self, check: Arc<dyn Check>) {
        self.checks.retain(|c| c.name() != check.name());
        debug!("Registered check: {}", check.name());
        self.checks.push(check);
    }

    /// Register a reporter, replacing any reporter with the same id.
    pub fn register_reporter(&mut self, reporter: Arc<dyn Reporter>) {
        self.reporters.retain(|r| r.id() != reporter.id());
        debug!("Registered reporter: {}", reporter.id());
        self.reporters.push(reporter);
    }

    pub fn with_check(mut self, check: Arc<dyn Check>) -> Self {
        self.register_check(check);
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.register_reporter(reporter);
        self
    }

    /// Names of the registered checks, in registration order.
    pub fn check_names(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    pub fn fixtures(&self) -> &FixtureSet {
        &self.fixtures
    }

    /// Board the default notice reporter posts to.
    pub fn notice_board(&self) -> &NoticeBoard {
        &self.notices
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> RuleAgentConfig {
        self.read_config().clone()
    }

    /// Merge a patch into the live configuration.
    ///
    /// Waits for in-flight runs to release the configuration. Fixtures are
    /// bound at construction and are not reloaded.
    pub fn update_config(&self, patch: ConfigPatch) -> RuleResult<()> {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        config.merge(patch)?;
        info!("Rule agent configuration updated");
        Ok(())
    }

    fn read_config(&self) -> RwLockReadGuard<'_, RuleAgentConfig> {
        self.config.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Evaluate a context.
    ///
    /// Check failures become `agent-failure` issues and reporter failures
    /// are logged; neither aborts the run.
    pub fn execute(&self, context: &PolicyContext) -> RuleAgentResult {
        let guard = self.read_config();
        let config = &*guard;
        let started_at = Utc::now();

        let enabled: Vec<&Arc<dyn Check>> = self
            .checks
            .iter()
            .filter(|c| config.is_enabled(c.name()))
            .collect();
        info!(
            "Evaluating module {} with {} check(s)",
            context.module,
            enabled.len()
        );

        let run = |check: &&Arc<dyn Check>| -> (CheckFamily, CheckResult) {
            let mut result = run_check(check, context);
            let threshold = config
                .check_settings(check.name())
                .pass_threshold
                .unwrap_or_else(|| check.threshold());
            result.threshold = threshold;
            if !result.is_agent_failure() {
                result.passed = result.score >= threshold && result.count(Severity::Error) == 0;
            }
            (check.family(), result)
        };
        let outcomes: Vec<(CheckFamily, CheckResult)> = if config.parallel {
            enabled.par_iter().map(run).collect()
        } else {
            enabled.iter().map(run).collect()
        };

        let mut tally = GateTally::default();
        let mut weighted = Vec::with_capacity(outcomes.len());
        let mut recommendations = Vec::new();
        for (family, result) in &outcomes {
            let ceiling = config.check_settings(&result.check_name).severity_ceiling;
            for issue in &result.issues {
                tally.record(issue.severity, ceiling);
            }
            tally.agent_failure |= result.is_agent_failure();
            weighted.push((config.weights.weight_for(*family), result.score));
            recommendations.extend(result.recommendations.iter().cloned());
        }

        let check_results: Vec<CheckResult> = outcomes.into_iter().map(|(_, r)| r).collect();
        let overall_score = scoring::weighted_score(&weighted);
        let gate_status = gate::evaluate(&tally, overall_score, &config.gate);

        let result = RuleAgentResult {
            module: context.module.clone(),
            passed: gate_status == GateStatus::Pass,
            overall_score,
            summary: IssueSummary::from_results(&check_results),
            check_results,
            recommendations: scoring::dedup_preserving_order(recommendations),
            gate_status,
            started_at,
            completed_at: Utc::now(),
        };

        info!(
            "Module {}: {} (score {}, {} error(s), {} warning(s))",
            result.module,
            result.gate_status,
            result.overall_score,
            result.summary.errors,
            result.summary.warnings
        );

        let reporter_ids = config.reporters.clone();
        drop(guard);
        self.dispatch(&reporter_ids, &result, context);
        result
    }

    /// Evaluate and turn a `fail` verdict into [`RuleError::GateFailed`]
    /// listing the issues whose severity equals the configured fatal severity.
    pub fn assert_compliant(&self, context: &PolicyContext) -> RuleResult<RuleAgentResult> {
        let result = self.execute(context);
        if result.gate_status != GateStatus::Fail {
            return Ok(result);
        }

        let fatal = self.read_config().gate.fatal_severity;
        Err(RuleError::GateFailed {
            status: result.gate_status,
            score: result.overall_score,
            fatal_issues: result.messages_with(fatal),
        })
    }

    /// Run [`execute`](Self::execute) on the blocking pool, bounded by `timeout`.
    pub async fn execute_with_timeout(
        self: &Arc<Self>,
        context: PolicyContext,
        timeout: Duration,
    ) -> RuleResult<RuleAgentResult> {
        let agent = Arc::clone(self);
        let task = tokio::task::spawn_blocking(move || agent.execute(&context));

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(RuleError::agent_failure(ORCHESTRATOR, e.to_string())),
            Err(_) => {
                warn!("Evaluation exceeded {:?}", timeout);
                Err(RuleError::Timeout(timeout.as_millis() as u64))
            }
        }
    }

    fn dispatch(&self, ids: &[String], result: &RuleAgentResult, context: &PolicyContext) {
        for id in ids {
            let Some(reporter) = self.reporters.iter().find(|r| r.id() == id) else {
                warn!("Reporter '{}' is configured but not registered", id);
                continue;
            };

            match catch_unwind(AssertUnwindSafe(|| reporter.report(result, context))) {
                Ok(Ok(())) => debug!("Reporter {} done", id),
                Ok(Err(e)) => error!("Reporter {} failed: {}", id, e),
                Err(payload) => error!("Reporter {} panicked: {}", id, panic_message(payload.as_ref())),
            }
        }
    }
}

/// Run one check, converting errors and panics into an agent failure.
fn run_check(check: &Arc<dyn Check>, context: &PolicyContext) -> CheckResult {
    match catch_unwind(AssertUnwindSafe(|| check.run(context))) {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            warn!("Check {} failed: {}", check.name(), e);
            CheckResult::agent_failure(check.name(), e.to_string())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!("Check {} panicked: {}", check.name(), message);
            CheckResult::agent_failure(check.name(), message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
