//! HttpPushGateway - hands payloads to a Web Push gateway over HTTP.
//!
//! The gateway owns the VAPID key pair and performs RFC 8291 encryption; this
//! side only forwards the subscription, the payload, and delivery hints.
//!
//! # Status mapping
//! - 2xx: delivered
//! - 404 / 410: `TransportError::Gone` (the browser dropped the subscription)
//! - anything else: `TransportError::Rejected`
//! - no response: `TransportError::Network`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;

use crate::config::{Config, ConfigError};
use crate::domain::{
    EndpointCredentials, NotificationPayload, Subscription, TransportError, Urgency,
};
use crate::ports::PushTransport;

#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    subscription: &'a EndpointCredentials,
    payload: &'a NotificationPayload,
    ttl: u32,
    urgency: Urgency,
    sender: Sender<'a>,
}

#[derive(Debug, Serialize)]
struct Sender<'a> {
    subject: &'a str,
}

pub struct HttpPushGateway {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    sender_subject: String,
}

impl HttpPushGateway {
    pub fn new(
        url: impl Into<String>,
        token: Option<String>,
        sender_subject: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            token,
            sender_subject: sender_subject.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let url = config.require_gateway_url()?;
        Self::new(
            url,
            config.gateway_token.clone(),
            &config.vapid_subject,
            config.http_timeout,
        )
        .map_err(|e| ConfigError::Invalid {
            name: "PUSH_GATEWAY_URL",
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl PushTransport for HttpPushGateway {
    async fn send(
        &self,
        subscription: &Subscription,
        payload: &NotificationPayload,
    ) -> Result<(), TransportError> {
        let hints = payload.hints();
        let request = GatewayRequest {
            subscription: &subscription.credentials,
            payload,
            ttl: hints.ttl_secs,
            urgency: hints.urgency,
            sender: Sender {
                subject: &self.sender_subject,
            },
        };

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(owner_id = %subscription.owner_id, status = status.as_u16(), "gateway answered");

        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(TransportError::Gone {
                status: status.as_u16(),
            });
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
