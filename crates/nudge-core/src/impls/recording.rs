//! RecordingTransport - push double that remembers every attempt.

use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::Mutex;

use crate::domain::{NotificationPayload, OwnerId, Subscription, TransportError};
use crate::ports::PushTransport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendAttempt {
    pub owner_id: OwnerId,
    pub endpoint: String,
    pub payload: NotificationPayload,
    pub delivered: bool,
}

/// Records sends; owners registered with `fail_for` get a `Rejected` error.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    failing: HashSet<OwnerId>,
    attempts: Mutex<Vec<SendAttempt>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(mut self, owner_id: impl Into<String>) -> Self {
        self.failing.insert(OwnerId::new(owner_id));
        self
    }

    pub async fn attempts(&self) -> Vec<SendAttempt> {
        self.attempts.lock().await.clone()
    }

    pub async fn delivered(&self) -> Vec<SendAttempt> {
        self.attempts
            .lock()
            .await
            .iter()
            .filter(|a| a.delivered)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PushTransport for RecordingTransport {
    async fn send(
        &self,
        subscription: &Subscription,
        payload: &NotificationPayload,
    ) -> Result<(), TransportError> {
        let fail = self.failing.contains(&subscription.owner_id);
        self.attempts.lock().await.push(SendAttempt {
            owner_id: subscription.owner_id.clone(),
            endpoint: subscription.credentials.endpoint.clone(),
            payload: payload.clone(),
            delivered: !fail,
        });

        if fail {
            return Err(TransportError::Rejected {
                status: 400,
                body: "simulated rejection".to_string(),
            });
        }
        Ok(())
    }
}
