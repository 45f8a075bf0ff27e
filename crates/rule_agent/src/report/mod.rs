//! Reporting sinks.
//!
//! A reporter consumes a finished [`RuleAgentResult`]. It never changes the
//! result, and the orchestrator logs and swallows any failure it returns.

use crate::context::PolicyContext;
use crate::error::RuleResult;
use crate::result::RuleAgentResult;

pub mod notice;
pub mod stream;

pub use notice::{Notice, NoticeBoard, NoticeReporter, DEFAULT_NOTICE_TIMEOUT};
pub use stream::StreamReporter;

/// Id of the terminal/log stream reporter.
pub const STREAM_REPORTER: &str = "stream";

/// Id of the interactive notice reporter.
pub const NOTICE_REPORTER: &str = "notice";

/// Core trait for all reporters.
#[cfg_attr(test, mockall::automock)]
pub trait Reporter: Send + Sync {
    /// Id referenced from the `reporters` configuration list.
    fn id(&self) -> &'static str;

    /// Render the result for this reporter's destination.
    fn report(&self, result: &RuleAgentResult, context: &PolicyContext) -> RuleResult<()>;
}
