//! WebPushTransport - delivers straight to the browser's push service.
//!
//! Each payload is encrypted with `aes128gcm` (RFC 8291) for the
//! subscription's keys and carries a VAPID token (RFC 8292) signed with
//! `VAPID_PRIVATE_KEY`, claiming `VAPID_SUBJECT` as `sub`.
//!
//! # Error mapping
//! - endpoint not found (404): `TransportError::Gone`
//! - endpoint no longer valid (410): `TransportError::Gone`
//! - push service error or timeout: `TransportError::Network`
//! - anything else: `TransportError::Other`

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use web_push::{
    ContentEncoding, HyperWebPushClient, SubscriptionInfo, URL_SAFE_NO_PAD,
    VapidSignatureBuilder, WebPushClient, WebPushError, WebPushMessage, WebPushMessageBuilder,
};

use crate::config::{Config, ConfigError};
use crate::domain::{NotificationPayload, Subscription, TransportError, Urgency};
use crate::ports::PushTransport;

pub struct WebPushTransport {
    client: HyperWebPushClient,
    private_key: String,
    subject: String,
    timeout: Duration,
}

impl WebPushTransport {
    /// `private_key` is the raw 32-byte P-256 scalar, base64url without
    /// padding, as most VAPID key generators print it.
    pub fn new(
        private_key: &str,
        subject: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let private_key = private_key.trim().to_string();
        VapidSignatureBuilder::from_base64_no_sub(&private_key, URL_SAFE_NO_PAD)
            .map_err(|e| TransportError::Other(format!("invalid VAPID private key: {e}")))?;

        Ok(Self {
            client: HyperWebPushClient::new(),
            private_key,
            subject: subject.into(),
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let key = config.require_vapid_private_key()?;
        Self::new(key, &config.vapid_subject, config.http_timeout).map_err(|e| {
            ConfigError::Invalid {
                name: "VAPID_PRIVATE_KEY",
                reason: e.to_string(),
            }
        })
    }

    fn message(
        &self,
        subscription: &Subscription,
        payload: &NotificationPayload,
    ) -> Result<WebPushMessage, TransportError> {
        let credentials = &subscription.credentials;
        let info = SubscriptionInfo::new(
            credentials.endpoint.as_str(),
            credentials.keys.p256dh.as_str(),
            credentials.keys.auth.as_str(),
        );

        let mut signer =
            VapidSignatureBuilder::from_base64(&self.private_key, URL_SAFE_NO_PAD, &info)
                .map_err(map_error)?;
        signer.add_claim("sub", self.subject.as_str());
        let signature = signer.build().map_err(map_error)?;

        let body = serde_json::to_vec(payload)
            .map_err(|e| TransportError::Other(format!("cannot encode payload: {e}")))?;
        let hints = payload.hints();

        let mut builder = WebPushMessageBuilder::new(&info);
        builder.set_payload(ContentEncoding::Aes128Gcm, &body);
        builder.set_ttl(hints.ttl_secs);
        builder.set_urgency(urgency(hints.urgency));
        builder.set_vapid_signature(signature);
        builder.build().map_err(map_error)
    }
}

#[async_trait]
impl PushTransport for WebPushTransport {
    async fn send(
        &self,
        subscription: &Subscription,
        payload: &NotificationPayload,
    ) -> Result<(), TransportError> {
        let message = self.message(subscription, payload)?;

        match tokio::time::timeout(self.timeout, self.client.send(message)).await {
            Ok(Ok(())) => {
                debug!(owner_id = %subscription.owner_id, "push service accepted");
                Ok(())
            }
            Ok(Err(e)) => Err(map_error(e)),
            Err(_) => Err(TransportError::Network(format!(
                "timed out after {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

fn urgency(urgency: Urgency) -> web_push::Urgency {
    match urgency {
        Urgency::VeryLow => web_push::Urgency::VeryLow,
        Urgency::Low => web_push::Urgency::Low,
        Urgency::Normal => web_push::Urgency::Normal,
        Urgency::High => web_push::Urgency::High,
    }
}

fn map_error(e: WebPushError) -> TransportError {
    match e {
        WebPushError::EndpointNotFound { .. } => TransportError::Gone { status: 404 },
        WebPushError::EndpointNotValid { .. } => TransportError::Gone { status: 410 },
        WebPushError::ServerError { .. } => TransportError::Network(e.to_string()),
        other => TransportError::Other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 8291 appendix A application server key, raw form
    const VAPID_KEY: &str = "yfWPiYE-n46HLnH0KqZOF1fJJU3MYrct3AELtAQ-oRw";

    #[test]
    fn accepts_raw_base64url_key() {
        let transport =
            WebPushTransport::new(VAPID_KEY, "mailto:ops@example.com", Duration::from_secs(5));
        assert!(transport.is_ok());
    }

    #[test]
    fn rejects_malformed_key() {
        let timeout = Duration::from_secs(5);
        let err = WebPushTransport::new("not-a-key", "mailto:ops@example.com", timeout)
            .err()
            .unwrap();
        assert!(matches!(err, TransportError::Other(_)));
        assert!(err.to_string().contains("VAPID"));
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let config = Config::from_lookup(|key| match key {
            "SUPABASE_URL" => Some("https://db.example".to_string()),
            "SUPABASE_SERVICE_ROLE_KEY" => Some("k".to_string()),
            _ => None,
        })
        .unwrap();

        assert!(matches!(
            WebPushTransport::from_config(&config),
            Err(ConfigError::Missing("VAPID_PRIVATE_KEY"))
        ));
    }
}
