//! Rule agent: a governance policy engine for proposed code changes.
//!
//! A [`PolicyContext`] describes a change (files, routes, declared
//! features). The [`RuleAgent`] runs every enabled [`Check`] against it,
//! scores the findings, decides a pass/warning/fail gate verdict and hands
//! the resulting [`RuleAgentResult`] to its reporters.
//!
//! ```no_run
//! use rule_agent::{ContextLoader, RuleAgent, RuleAgentConfig};
//!
//! # fn main() -> rule_agent::RuleResult<()> {
//! let agent = RuleAgent::new(RuleAgentConfig::default())?;
//! let context = ContextLoader::new("./my-app")?.load("orders")?;
//! let result = agent.assert_compliant(&context)?;
//! println!("score {}", result.overall_score);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod capability;
pub mod checks;
pub mod config;
pub mod context;
pub mod error;
pub mod fixtures;
pub mod gate;
pub mod heuristics;
pub mod issue;
pub mod report;
pub mod result;
pub mod scoring;
pub mod workspace;

pub use agent::RuleAgent;
pub use capability::{EventBusCapability, MissionCapability};
pub use checks::{Check, CheckFamily, IntegrationCheck, StructuralCheck, StyleCheck};
pub use config::{CheckSettings, ConfigPatch, GateConfig, GatePatch, Preset, RuleAgentConfig};
pub use context::{FileDescriptor, FileKind, HttpMethod, PolicyContext, RouteDescriptor, RouteKind};
pub use error::{RuleError, RuleResult};
pub use fixtures::FixtureSet;
pub use gate::GateStatus;
pub use issue::{Category, CheckResult, Issue, Severity};
pub use report::{Notice, NoticeBoard, NoticeReporter, Reporter, StreamReporter};
pub use result::{IssueSummary, RuleAgentResult};
pub use workspace::ContextLoader;
