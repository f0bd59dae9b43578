//! DryRunTransport - logs what would be sent and reports success.

use async_trait::async_trait;
use tracing::info;

use crate::domain::{NotificationPayload, Subscription, TransportError};
use crate::ports::PushTransport;

#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunTransport;

impl DryRunTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PushTransport for DryRunTransport {
    async fn send(
        &self,
        subscription: &Subscription,
        payload: &NotificationPayload,
    ) -> Result<(), TransportError> {
        info!(
            owner_id = %subscription.owner_id,
            endpoint = %subscription.credentials.endpoint,
            title = payload.title(),
            body = payload.body(),
            url = payload.target_url(),
            "dry run: notification not sent"
        );
        Ok(())
    }
}
