//! Errors raised at the two external seams.
//!
//! - `StoreError` is run-fatal: the resolver has no per-recipient boundary yet.
//! - `TransportError` is per-recipient: logged, counted, and the loop moves on.

use thiserror::Error;

/// Operational classification of a run-fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Store unreachable or answering garbage.
    Infrastructure,
    /// Missing or malformed settings; retrying will not help.
    Configuration,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("store response could not be decoded: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    /// The push service no longer knows this subscription (404/410).
    #[error("subscription endpoint is gone (status {status})")]
    Gone { status: u16 },

    #[error("push rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("push request failed: {0}")]
    Network(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Network(format!("timed out: {e}"))
        } else {
            TransportError::Network(e.to_string())
        }
    }
}
