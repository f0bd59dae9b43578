//! DispatchLoop - runs one job end to end.
//!
//! # Flow
//! 1. Compute the target date from the clock and the configured offset
//! 2. `RecipientResolver::resolve` (store errors abort the run)
//! 3. Empty work set: log "nothing to do" and return an empty summary
//! 4. Each recipient runs in its own task, bounded by a semaphore:
//!    build drafts, send, turn every result into an `Outcome`
//! 5. Fold outcomes into `RunSummary`
//!
//! # Isolation
//! - A panic inside one `send` becomes a `FAILED` outcome for that single
//!   notification; the recipient's other reminders are still attempted.
//! - A panic elsewhere in a recipient's task becomes one `FAILED` outcome
//!   for that recipient.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate};
use futures::FutureExt;
use tokio::sync::Semaphore;
use tracing::{Instrument, error, info, info_span, warn};

use super::aggregator::TaskAggregator;
use super::resolver::RecipientResolver;
use crate::domain::{JobKind, Outcome, RunId, SkipReason, TransportError, WorkItem};
use crate::error::NudgeError;
use crate::observability::RunSummary;
use crate::ports::{Clock, PushTransport, RunIdGenerator, TaskStore};

pub struct DispatchLoop {
    pub(crate) store: Arc<dyn TaskStore>,
    pub(crate) transport: Arc<dyn PushTransport>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) run_ids: Arc<dyn RunIdGenerator>,
    pub(crate) aggregator: Arc<TaskAggregator>,
    pub(crate) utc_offset: FixedOffset,
    pub(crate) concurrency: usize,
}

impl DispatchLoop {
    pub async fn run(&self, job: JobKind) -> Result<RunSummary, NudgeError> {
        let run_id = self.run_ids.generate_run_id();
        let target_date = job.target_date(self.clock.today(self.utc_offset));
        let span = info_span!("dispatch_run", %run_id, job = %job, date = %target_date);

        self.execute(run_id, job, target_date).instrument(span).await
    }

    async fn execute(
        &self,
        run_id: RunId,
        job: JobKind,
        target_date: NaiveDate,
    ) -> Result<RunSummary, NudgeError> {
        info!("dispatch run started");
        let resolver = RecipientResolver::new(Arc::clone(&self.store));
        let work = resolver.resolve(job, target_date).await.map_err(|e| {
            error!(error = %e, "cannot resolve work set");
            NudgeError::from(e)
        })?;

        let mut summary = RunSummary::new(run_id, job, target_date);
        if work.is_empty() {
            info!("nothing to do");
            summary.log();
            return Ok(summary);
        }

        for skipped in work.skipped {
            summary.record(Outcome::skipped(skipped.owner_id, skipped.reason));
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(work.items.len());
        for item in work.items {
            let owner_id = item.owner_id.clone();
            let semaphore = Arc::clone(&semaphore);
            let transport = Arc::clone(&self.transport);
            let aggregator = Arc::clone(&self.aggregator);

            let handle = tokio::spawn(
                async move {
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return vec![Outcome::failed(item.owner_id, "worker pool closed")];
                    };
                    dispatch_recipient(job, item, &aggregator, transport.as_ref()).await
                }
                .in_current_span(),
            );
            handles.push((owner_id, handle));
        }

        // completion order is irrelevant; outcomes are folded once all are in
        for (owner_id, handle) in handles {
            match handle.await {
                Ok(outcomes) => outcomes.into_iter().for_each(|o| summary.record(o)),
                Err(e) => {
                    error!(owner_id = %owner_id, error = %e, "recipient task aborted");
                    summary.record(Outcome::failed(
                        owner_id,
                        format!("recipient task aborted: {e}"),
                    ));
                }
            }
        }

        summary.log();
        Ok(summary)
    }
}

/// PENDING -> BUILD_PAYLOAD -> SEND -> {SENT | FAILED}, for one recipient.
async fn dispatch_recipient(
    job: JobKind,
    item: WorkItem,
    aggregator: &TaskAggregator,
    transport: &dyn PushTransport,
) -> Vec<Outcome> {
    let drafts = aggregator.compose(job, &item.tasks);
    if drafts.is_empty() {
        info!(owner_id = %item.owner_id, outcome = "skipped", "no pending items");
        return vec![Outcome::skipped(item.owner_id, SkipReason::NoPendingTasks)];
    }

    let mut outcomes = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let payload = match draft {
            Ok(payload) => payload,
            Err(reason) => {
                info!(
                    owner_id = %item.owner_id,
                    outcome = "skipped",
                    reason = %reason,
                    "notification skipped"
                );
                outcomes.push(Outcome::skipped(item.owner_id.clone(), reason));
                continue;
            }
        };

        let result = AssertUnwindSafe(transport.send(&item.subscription, &payload))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(TransportError::Other(format!(
                    "transport panicked: {}",
                    panic_message(panic.as_ref())
                )))
            });

        match result {
            Ok(()) => {
                info!(owner_id = %item.owner_id, outcome = "sent", "notification sent");
                outcomes.push(Outcome::sent(item.owner_id.clone()));
            }
            Err(e) => {
                warn!(
                    owner_id = %item.owner_id,
                    outcome = "failed",
                    reason = %e,
                    "notification failed"
                );
                outcomes.push(Outcome::failed(item.owner_id.clone(), e.to_string()));
            }
        }
    }
    outcomes
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::DispatcherBuilder;
    use crate::domain::{NotificationPayload, OwnerId, Subscription, Task, TransportError};
    use crate::impls::{InMemoryTaskStore, RecordingTransport};
    use crate::ports::FixedClock;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    // "today" is 2024-01-05 for every test
    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 5, 9, 0, 0).unwrap())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    fn tomorrow() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 6).unwrap()
    }

    fn sub(owner: &str) -> Subscription {
        Subscription::new(owner, format!("https://push.example/{owner}"))
    }

    fn dispatcher(store: InMemoryTaskStore, transport: Arc<dyn PushTransport>) -> DispatchLoop {
        DispatcherBuilder::new()
            .store(Arc::new(store))
            .transport(transport)
            .clock(Arc::new(clock()))
            .target_url("/whattodo/")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn reminder_sends_one_notification_per_task() {
        let store = InMemoryTaskStore::new()
            .with_task(Task::new("u1", "pay rent").with_due_date(tomorrow()))
            .with_task(Task::new("u1", "call mom").with_due_date(tomorrow()))
            .with_task(Task::new("u2", "dentist").with_due_date(tomorrow()))
            .with_task(Task::new("u2", "today only").with_due_date(today()))
            .with_subscription(sub("u1"))
            .with_subscription(sub("u2"));
        let transport = Arc::new(RecordingTransport::new());

        let summary = dispatcher(store, transport.clone())
            .run(JobKind::TomorrowReminder)
            .await
            .unwrap();

        assert_eq!((summary.sent, summary.skipped, summary.failed), (3, 0, 0));
        assert_eq!(summary.target_date, tomorrow());

        let mut sent: Vec<_> = transport
            .attempts()
            .await
            .into_iter()
            .map(|a| (a.owner_id.as_str().to_string(), a.payload.body().to_string()))
            .collect();
        sent.sort();
        assert_eq!(
            sent,
            vec![
                ("u1".to_string(), "call mom".to_string()),
                ("u1".to_string(), "pay rent".to_string()),
                ("u2".to_string(), "dentist".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn reminder_without_subscription_is_skipped_not_fatal() {
        let store = InMemoryTaskStore::new()
            .with_task(Task::new("u1", "a").with_due_date(tomorrow()))
            .with_task(Task::new("u1", "b").with_due_date(tomorrow()));
        let transport = Arc::new(RecordingTransport::new());

        let summary = dispatcher(store, transport.clone())
            .run(JobKind::TomorrowReminder)
            .await
            .unwrap();

        assert_eq!((summary.sent, summary.skipped, summary.failed), (0, 1, 0));
        assert!(transport.attempts().await.is_empty());
    }

    #[tokio::test]
    async fn digest_skips_subscriber_with_nothing_pending() {
        let store = InMemoryTaskStore::new()
            .with_task(Task::new("u1", "report").with_due_date(today()))
            .with_task(Task::new("u2", "gym").with_planned_date(today()))
            .with_task(Task::new("u3", "next week").with_planned_date(tomorrow()))
            .with_subscription(sub("u1"))
            .with_subscription(sub("u2"))
            .with_subscription(sub("u3"));
        let transport = Arc::new(RecordingTransport::new());

        let summary = dispatcher(store, transport.clone())
            .run(JobKind::DailyDigest)
            .await
            .unwrap();

        assert_eq!((summary.sent, summary.skipped, summary.failed), (2, 1, 0));
        let attempts = transport.attempts().await;
        assert_eq!(attempts.len(), 2);
        assert!(attempts.iter().all(|a| a.owner_id.as_str() != "u3"));
    }

    #[tokio::test]
    async fn one_failing_recipient_does_not_block_others() {
        let store = InMemoryTaskStore::new()
            .with_task(Task::new("u1", "a").with_due_date(today()))
            .with_task(Task::new("u2", "b").with_due_date(today()))
            .with_subscription(sub("u1"))
            .with_subscription(sub("u2"));
        let transport = Arc::new(RecordingTransport::new().fail_for("u1"));

        let summary = dispatcher(store, transport.clone())
            .run(JobKind::DailyDigest)
            .await
            .unwrap();

        assert_eq!((summary.sent, summary.skipped, summary.failed), (1, 0, 1));
        assert_eq!(summary.failures[0].owner_id, OwnerId::new("u1"));
        assert!(summary.failures[0].reason.contains("400"));

        let delivered = transport.delivered().await;
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].owner_id, OwnerId::new("u2"));
    }

    #[tokio::test]
    async fn empty_work_set_is_success() {
        let transport = Arc::new(RecordingTransport::new());
        let summary = dispatcher(InMemoryTaskStore::new(), transport.clone())
            .run(JobKind::TomorrowReminder)
            .await
            .unwrap();

        assert!(summary.is_empty_run());
        assert!(transport.attempts().await.is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_run_fatal() {
        let store = InMemoryTaskStore::new().failing("connection refused");
        let err = dispatcher(store, Arc::new(RecordingTransport::new()))
            .run(JobKind::DailyDigest)
            .await
            .unwrap_err();

        assert!(matches!(err, NudgeError::Store(_)));
        assert_eq!(err.kind(), crate::domain::ErrorKind::Infrastructure);
    }

    #[tokio::test]
    async fn rerun_produces_same_bodies() {
        let build = || {
            InMemoryTaskStore::new()
                .with_task(
                    Task::new("u1", "A")
                        .with_due_date(NaiveDate::from_ymd_opt(2024, 1, 9).unwrap())
                        .with_planned_date(today()),
                )
                .with_task(Task::new("u1", "B").with_planned_date(today()))
                .with_task(Task::new("u1", "C").with_due_date(today()))
                .with_subscription(sub("u1"))
        };

        let first = Arc::new(RecordingTransport::new());
        let second = Arc::new(RecordingTransport::new());
        dispatcher(build(), first.clone()).run(JobKind::DailyDigest).await.unwrap();
        dispatcher(build(), second.clone()).run(JobKind::DailyDigest).await.unwrap();

        let bodies = |attempts: Vec<crate::impls::SendAttempt>| -> Vec<String> {
            attempts.into_iter().map(|a| a.payload.body().to_string()).collect()
        };
        let first = bodies(first.attempts().await);
        assert_eq!(first, vec!["You have 3 tasks for today\n• C\n• A\n• B".to_string()]);
        assert_eq!(first, bodies(second.attempts().await));
    }

    type PanicWhen = Box<dyn Fn(&Subscription, &NotificationPayload) -> bool + Send + Sync>;

    struct PanickingTransport {
        inner: RecordingTransport,
        panic_when: PanicWhen,
    }

    impl PanickingTransport {
        fn new(panic_when: PanicWhen) -> Self {
            Self {
                inner: RecordingTransport::new(),
                panic_when,
            }
        }
    }

    #[async_trait]
    impl PushTransport for PanickingTransport {
        async fn send(
            &self,
            subscription: &Subscription,
            payload: &NotificationPayload,
        ) -> Result<(), TransportError> {
            if (self.panic_when)(subscription, payload) {
                panic!("transport bug");
            }
            self.inner.send(subscription, payload).await
        }
    }

    #[tokio::test]
    async fn panic_in_one_recipient_is_contained() {
        let store = InMemoryTaskStore::new()
            .with_task(Task::new("u1", "a").with_due_date(today()))
            .with_task(Task::new("u2", "b").with_due_date(today()))
            .with_subscription(sub("u1"))
            .with_subscription(sub("u2"));
        let transport = Arc::new(PanickingTransport::new(Box::new(|sub, _| {
            sub.owner_id.as_str() == "u1"
        })));

        let summary = dispatcher(store, transport.clone())
            .run(JobKind::DailyDigest)
            .await
            .unwrap();

        assert_eq!((summary.sent, summary.failed), (1, 1));
        assert_eq!(summary.failures[0].owner_id, OwnerId::new("u1"));
        assert!(summary.failures[0].reason.contains("transport bug"));
        assert_eq!(transport.inner.delivered().await.len(), 1);
    }

    #[tokio::test]
    async fn panic_mid_reminders_keeps_earlier_and_later_sends() {
        let store = InMemoryTaskStore::new()
            .with_task(Task::new("u1", "a").with_due_date(tomorrow()))
            .with_task(Task::new("u1", "b").with_due_date(tomorrow()))
            .with_task(Task::new("u1", "c").with_due_date(tomorrow()))
            .with_subscription(sub("u1"));
        let transport = Arc::new(PanickingTransport::new(Box::new(|_, payload| {
            payload.body() == "b"
        })));

        let summary = dispatcher(store, transport.clone())
            .run(JobKind::TomorrowReminder)
            .await
            .unwrap();

        assert_eq!((summary.sent, summary.skipped, summary.failed), (2, 0, 1));
        let delivered: Vec<_> = transport
            .inner
            .delivered()
            .await
            .into_iter()
            .map(|a| a.payload.body().to_string())
            .collect();
        assert_eq!(delivered, vec!["a".to_string(), "c".to_string()]);
    }

    #[tokio::test]
    async fn reminder_without_content_is_counted_as_skipped() {
        let store = InMemoryTaskStore::new()
            .with_task(Task::new("u1", "").with_due_date(tomorrow()))
            .with_task(Task::new("u1", "water plants").with_due_date(tomorrow()))
            .with_subscription(sub("u1"));
        let transport = Arc::new(RecordingTransport::new());

        let summary = dispatcher(store, transport.clone())
            .run(JobKind::TomorrowReminder)
            .await
            .unwrap();

        assert_eq!((summary.sent, summary.skipped, summary.failed), (1, 1, 0));
        assert_eq!(transport.attempts().await.len(), 1);
    }
}
