//! PushTransport port - delivers one payload to one subscription.
//!
//! Encryption and sender signing live behind this trait; the core only sees
//! success or a typed `TransportError`.

use async_trait::async_trait;

use crate::domain::{NotificationPayload, Subscription, TransportError};

/// # Contract
/// - One call addresses exactly one endpoint.
/// - Timeouts are the implementation's concern and surface as `TransportError`.
/// - Never a silent no-op: a message not handed over is an `Err`.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn send(
        &self,
        subscription: &Subscription,
        payload: &NotificationPayload,
    ) -> Result<(), TransportError>;
}
