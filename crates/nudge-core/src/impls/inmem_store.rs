//! InMemoryTaskStore - store double that evaluates `TaskFilter` in memory.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::{OwnerId, StoreError, Subscription, Task, TaskFilter};
use crate::ports::TaskStore;

/// Holds fixed rows; results keep insertion order.
///
/// # Example
/// ```ignore
/// let store = InMemoryTaskStore::new()
///     .with_task(Task::new("u1", "buy milk").with_due_date(tomorrow))
///     .with_subscription(Subscription::new("u1", "https://push.example/u1"));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: Vec<Task>,
    subscriptions: Vec<Subscription>,
    failure: Option<String>,
    queries: AtomicUsize,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscriptions.push(subscription);
        self
    }

    /// Every query fails with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Number of queries answered so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    fn begin_query(&self) -> Result<(), StoreError> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        match &self.failure {
            Some(message) => Err(StoreError::Other(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn query_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        self.begin_query()?;
        Ok(self
            .tasks
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn query_subscription(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Option<Subscription>, StoreError> {
        self.begin_query()?;
        Ok(self
            .subscriptions
            .iter()
            .find(|s| &s.owner_id == owner_id)
            .cloned())
    }

    async fn query_all_subscriptions(&self) -> Result<Vec<Subscription>, StoreError> {
        self.begin_query()?;
        Ok(self.subscriptions.clone())
    }
}
