//! Subscription - one browser push registration per row.
//!
//! # Shape
//! - `user_id`: owner of the registration
//! - `subscription`: the `PushSubscription.toJSON()` object, stored as is

use serde::{Deserialize, Serialize};

use super::OwnerId;

/// Client keys of a push registration (`PushSubscription.toJSON().keys`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// Everything a push transport needs to address exactly one browser/device.
///
/// Shape matches what the browser hands out from `PushSubscription.toJSON()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointCredentials {
    pub endpoint: String,

    #[serde(
        rename = "expirationTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration_time: Option<i64>,

    pub keys: SubscriptionKeys,
}

/// A row of the `push_subscriptions` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(rename = "user_id")]
    pub owner_id: OwnerId,

    #[serde(rename = "subscription")]
    pub credentials: EndpointCredentials,
}

impl Subscription {
    pub fn new(owner_id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            owner_id: OwnerId::new(owner_id),
            credentials: EndpointCredentials {
                endpoint: endpoint.into(),
                expiration_time: None,
                keys: SubscriptionKeys {
                    p256dh: String::new(),
                    auth: String::new(),
                },
            },
        }
    }

    pub fn with_keys(mut self, p256dh: impl Into<String>, auth: impl Into<String>) -> Self {
        self.credentials.keys = SubscriptionKeys {
            p256dh: p256dh.into(),
            auth: auth.into(),
        };
        self
    }
}
