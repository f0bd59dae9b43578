//! Outcome model: the result of trying to notify one recipient.
//!
//! The dispatch loop never uses unwinding for control flow: every send step
//! returns an `Outcome`, and the run summary is folded from those values.

use serde::{Deserialize, Serialize};

use super::{OwnerId, SkipReason};

/// Serialized as SCREAMING_SNAKE_CASE: SENT / SKIPPED / FAILED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Sent,
    Skipped,
    Failed,
}

/// Result of one notification attempt (or of a recipient that was skipped).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub owner_id: OwnerId,

    pub kind: OutcomeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Outcome {
    pub fn sent(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            kind: OutcomeKind::Sent,
            reason: None,
        }
    }

    pub fn skipped(owner_id: OwnerId, reason: SkipReason) -> Self {
        Self {
            owner_id,
            kind: OutcomeKind::Skipped,
            reason: Some(reason.to_string()),
        }
    }

    pub fn failed(owner_id: OwnerId, reason: impl Into<String>) -> Self {
        Self {
            owner_id,
            kind: OutcomeKind::Failed,
            reason: Some(reason.into()),
        }
    }
}
