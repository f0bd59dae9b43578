//! Work set produced by the resolver for one run.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{OwnerId, Subscription, Task};

/// A recipient paired with its subscription and qualifying tasks.
///
/// `tasks` is unordered here; ordering belongs to the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub owner_id: OwnerId,
    pub subscription: Subscription,
    pub tasks: Vec<Task>,
}

/// Why a recipient, or one of its reminders, produced no send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    NoSubscription,
    NoPendingTasks,
    /// A reminder task whose content is empty.
    EmptyContent,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoSubscription => f.write_str("no subscription"),
            SkipReason::NoPendingTasks => f.write_str("no pending items"),
            SkipReason::EmptyContent => f.write_str("task has no content"),
        }
    }
}

/// A recipient the resolver already decided not to notify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecipient {
    pub owner_id: OwnerId,
    pub reason: SkipReason,
    /// Number of qualifying tasks left undelivered.
    pub task_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkSet {
    pub items: Vec<WorkItem>,
    pub skipped: Vec<SkippedRecipient>,
}

impl WorkSet {
    /// Nothing qualified and nobody was even considered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.skipped.is_empty()
    }
}
