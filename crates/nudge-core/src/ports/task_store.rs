//! TaskStore port - read-only view over `todos` and `push_subscriptions`.
//!
//! # Implementations
//! - `PostgrestTaskStore`: Supabase / PostgREST over HTTP
//! - `InMemoryTaskStore`: tests and local runs

use async_trait::async_trait;

use crate::domain::{OwnerId, StoreError, Subscription, Task, TaskFilter};

/// TaskStore answers the three queries a dispatch run needs.
///
/// # Contract
/// - Pure reads: no implementation may write to either table.
/// - Any failure is reported as `StoreError` and aborts the run.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Tasks matching `filter`, in store order.
    async fn query_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError>;

    /// The subscription of `owner_id`. When the store holds several, the
    /// same one is returned on every call.
    async fn query_subscription(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Option<Subscription>, StoreError>;

    async fn query_all_subscriptions(&self) -> Result<Vec<Subscription>, StoreError>;
}
