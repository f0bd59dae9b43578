//! Run summary: the counters a dispatch run reports to its caller.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{JobKind, Outcome, OutcomeKind, OwnerId, RunId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientFailure {
    pub owner_id: OwnerId,
    pub reason: String,
}

/// Counts for one run.
///
/// - `sent` / `failed`: notifications attempted (one per task for reminders,
///   one per recipient for the digest).
/// - `skipped`: recipients never attempted (no subscription, nothing pending).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub job: JobKind,
    pub target_date: NaiveDate,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<RecipientFailure>,
}

impl RunSummary {
    pub fn new(run_id: RunId, job: JobKind, target_date: NaiveDate) -> Self {
        Self {
            run_id,
            job,
            target_date,
            sent: 0,
            skipped: 0,
            failed: 0,
            failures: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome.kind {
            OutcomeKind::Sent => self.sent += 1,
            OutcomeKind::Skipped => self.skipped += 1,
            OutcomeKind::Failed => {
                self.failed += 1;
                self.failures.push(RecipientFailure {
                    owner_id: outcome.owner_id,
                    reason: outcome.reason.unwrap_or_default(),
                });
            }
        }
    }

    /// Nothing qualified at all.
    pub fn is_empty_run(&self) -> bool {
        self.sent == 0 && self.skipped == 0 && self.failed == 0
    }

    pub fn log(&self) {
        if self.failed > 0 {
            warn!(
                run_id = %self.run_id,
                job = %self.job,
                sent = self.sent,
                skipped = self.skipped,
                failed = self.failed,
                "dispatch run finished with failures"
            );
        } else {
            info!(
                run_id = %self.run_id,
                job = %self.job,
                sent = self.sent,
                skipped = self.skipped,
                failed = self.failed,
                "dispatch run finished"
            );
        }
    }
}
