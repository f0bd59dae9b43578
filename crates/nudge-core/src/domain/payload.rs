//! NotificationPayload - what a push carries to the service worker.
//!
//! # Wire shape
//! `{"title", "body", "url"}`. Urgency and TTL travel beside the payload
//! as `DeliveryHints` and become push headers, never part of the JSON.

use serde::{Deserialize, Serialize};

/// Web Push urgency (RFC 8030 §5.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Urgency {
    VeryLow,
    Low,
    Normal,
    High,
}

/// Hints forwarded to the push service alongside the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryHints {
    pub urgency: Urgency,
    pub ttl_secs: u32,
}

impl Default for DeliveryHints {
    fn default() -> Self {
        Self {
            urgency: Urgency::Normal,
            ttl_secs: 4 * 60 * 60,
        }
    }
}

/// What the service worker receives and shows.
///
/// `body` is never empty: `new` refuses to build a payload without one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    title: String,
    body: String,
    #[serde(rename = "url")]
    target_url: String,
    #[serde(skip)]
    hints: DeliveryHints,
}

impl NotificationPayload {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        target_url: impl Into<String>,
    ) -> Option<Self> {
        let body = body.into();
        if body.is_empty() {
            return None;
        }
        Some(Self {
            title: title.into(),
            body,
            target_url: target_url.into(),
            hints: DeliveryHints::default(),
        })
    }

    pub fn with_hints(mut self, hints: DeliveryHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    pub fn hints(&self) -> DeliveryHints {
        self.hints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_refused() {
        assert!(NotificationPayload::new("t", "", "/").is_none());
    }

    #[test]
    fn serializes_in_service_worker_shape() {
        let payload = NotificationPayload::new("Due tomorrow", "file taxes", "/whattodo/")
            .unwrap()
            .with_hints(DeliveryHints {
                urgency: Urgency::High,
                ttl_secs: 60,
            });

        let v = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "title": "Due tomorrow",
                "body": "file taxes",
                "url": "/whattodo/"
            })
        );
        assert_eq!(payload.hints().urgency, Urgency::High);
    }

    #[test]
    fn urgency_uses_header_tokens() {
        let s = serde_json::to_string(&Urgency::VeryLow).unwrap();
        assert_eq!(s, "\"very-low\"");
    }
}
