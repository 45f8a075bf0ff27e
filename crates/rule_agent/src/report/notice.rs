//! Compact, dismissible notices for an interactive review surface.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::context::PolicyContext;
use crate::error::{RuleError, RuleResult};
use crate::gate::GateStatus;
use crate::report::{Reporter, NOTICE_REPORTER};
use crate::result::RuleAgentResult;

/// How long a non-fatal notice stays visible.
pub const DEFAULT_NOTICE_TIMEOUT: Duration = Duration::from_secs(8);

/// One rendered notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: Uuid,
    pub module: String,
    pub status: GateStatus,
    /// Status badge, e.g. "✅ PASS"
    pub badge: String,
    pub score: u32,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    /// Fatal notices stay until dismissed
    pub fatal: bool,
    pub created_at: DateTime<Utc>,
    /// `None` for fatal notices
    pub expires_at: Option<DateTime<Utc>>,
}

impl Notice {
    /// Build the notice for a result.
    pub fn from_result(result: &RuleAgentResult, now: DateTime<Utc>, timeout: chrono::Duration) -> Self {
        let fatal = result.gate_status == GateStatus::Fail;
        Self {
            id: Uuid::new_v4(),
            module: result.module.clone(),
            status: result.gate_status,
            badge: result.gate_status.badge().to_string(),
            score: result.overall_score,
            errors: result.summary.errors,
            warnings: result.summary.warnings,
            infos: result.summary.infos,
            fatal,
            created_at: now,
            expires_at: (!fatal).then(|| now + timeout),
        }
    }

    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |expires| now < expires)
    }

    /// One-line text form.
    pub fn headline(&self) -> String {
        format!(
            "{} {} · score {} · {} error(s), {} warning(s), {} info",
            self.badge, self.module, self.score, self.errors, self.warnings, self.infos
        )
    }
}

/// Shared list of notices, cloned into every consumer.
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    notices: Arc<RwLock<Vec<Notice>>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a notice, dropping those already expired when it was created.
    pub fn push(&self, notice: Notice) {
        let mut notices = self.notices.write().unwrap_or_else(PoisonError::into_inner);
        notices.retain(|n| n.is_visible(notice.created_at));
        notices.push(notice);
    }

    /// Notices still visible at `now`, oldest first.
    pub fn active(&self, now: DateTime<Utc>) -> Vec<Notice> {
        self.notices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|n| n.is_visible(now))
            .cloned()
            .collect()
    }

    /// Drop expired notices; returns how many were removed.
    pub fn prune(&self, now: DateTime<Utc>) -> usize {
        let mut notices = self.notices.write().unwrap_or_else(PoisonError::into_inner);
        let before = notices.len();
        notices.retain(|n| n.is_visible(now));
        before - notices.len()
    }

    /// Remove a notice by id; returns whether it existed.
    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut notices = self.notices.write().unwrap_or_else(PoisonError::into_inner);
        let before = notices.len();
        notices.retain(|n| n.id != id);
        notices.len() != before
    }

    pub fn len(&self) -> usize {
        self.notices.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Posts a notice per result onto a [`NoticeBoard`].
#[derive(Debug, Clone)]
pub struct NoticeReporter {
    board: NoticeBoard,
    timeout: Duration,
}

impl NoticeReporter {
    pub fn new(board: NoticeBoard) -> Self {
        Self {
            board,
            timeout: DEFAULT_NOTICE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn board(&self) -> &NoticeBoard {
        &self.board
    }
}

impl Reporter for NoticeReporter {
    fn id(&self) -> &'static str {
        NOTICE_REPORTER
    }

    fn report(&self, result: &RuleAgentResult, _context: &PolicyContext) -> RuleResult<()> {
        let timeout = chrono::Duration::from_std(self.timeout)
            .map_err(|e| RuleError::reporter_failed(NOTICE_REPORTER, e.to_string()))?;
        let notice = Notice::from_result(result, Utc::now(), timeout);
        debug!("Posting notice {}", notice.headline());
        self.board.push(notice);
        Ok(())
    }
}
