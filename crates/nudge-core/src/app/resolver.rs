//! RecipientResolver - decides who gets notified and about which tasks.
//!
//! # Flow
//! - Reminder: query open tasks due on the target date, group by owner,
//!   look up one subscription per owner. Owners without one are skipped.
//! - Digest: query all subscriptions, then each subscriber's pending tasks
//!   due or planned on the target date. Empty sets are kept.
//!
//! Resolution only reads. Any store error aborts the whole resolution.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::{
    JobKind, OwnerId, SkipReason, SkippedRecipient, StoreError, Task, TaskFilter, WorkItem,
    WorkSet,
};
use crate::ports::TaskStore;

pub struct RecipientResolver {
    store: Arc<dyn TaskStore>,
}

impl RecipientResolver {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(
        &self,
        job: JobKind,
        target_date: NaiveDate,
    ) -> Result<WorkSet, StoreError> {
        match job {
            JobKind::TomorrowReminder => self.resolve_due(target_date).await,
            JobKind::DailyDigest => self.resolve_digest(target_date).await,
        }
    }

    async fn resolve_due(&self, target_date: NaiveDate) -> Result<WorkSet, StoreError> {
        let tasks = self.store.query_tasks(&TaskFilter::due_on(target_date)).await?;
        debug!(count = tasks.len(), %target_date, "tasks due");

        // BTreeMap keeps owner order stable between runs
        let mut by_owner: BTreeMap<OwnerId, Vec<Task>> = BTreeMap::new();
        for task in tasks {
            by_owner.entry(task.owner_id.clone()).or_default().push(task);
        }

        let mut work = WorkSet::default();
        for (owner_id, tasks) in by_owner {
            match self.store.query_subscription(&owner_id).await? {
                Some(subscription) => work.items.push(WorkItem {
                    owner_id,
                    subscription,
                    tasks,
                }),
                None => {
                    warn!(
                        owner_id = %owner_id,
                        tasks = tasks.len(),
                        "no push subscription, skipping recipient"
                    );
                    work.skipped.push(SkippedRecipient {
                        owner_id,
                        reason: SkipReason::NoSubscription,
                        task_count: tasks.len(),
                    });
                }
            }
        }
        Ok(work)
    }

    async fn resolve_digest(&self, target_date: NaiveDate) -> Result<WorkSet, StoreError> {
        let subscriptions = self.store.query_all_subscriptions().await?;
        debug!(count = subscriptions.len(), %target_date, "subscribers");

        let mut work = WorkSet::default();
        for subscription in subscriptions {
            let filter = TaskFilter::digest_for(&subscription.owner_id, target_date);
            let tasks = self.store.query_tasks(&filter).await?;
            work.items.push(WorkItem {
                owner_id: subscription.owner_id.clone(),
                subscription,
                tasks,
            });
        }
        Ok(work)
    }
}
