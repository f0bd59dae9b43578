//! Domain model (ids, tasks, subscriptions, filters, payloads, outcomes, errors).

pub mod errors;
pub mod filter;
pub mod ids;
pub mod job;
pub mod outcome;
pub mod payload;
pub mod subscription;
pub mod task;
pub mod work;

pub use errors::{ErrorKind, StoreError, TransportError};
pub use filter::{Field, TaskFilter, Value};
pub use ids::{OwnerId, RunId};
pub use job::JobKind;
pub use outcome::{Outcome, OutcomeKind};
pub use payload::{DeliveryHints, NotificationPayload, Urgency};
pub use subscription::{EndpointCredentials, Subscription, SubscriptionKeys};
pub use task::Task;
pub use work::{SkipReason, SkippedRecipient, WorkItem, WorkSet};
