use thiserror::Error;

use crate::app::BuildError;
use crate::config::ConfigError;
use crate::domain::{ErrorKind, StoreError};

/// Run-fatal errors. Anything that reaches the caller as `NudgeError` means
/// the run could not produce a work set and the process should exit non-zero.
#[derive(Debug, Error)]
pub enum NudgeError {
    #[error("cannot resolve work set: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] BuildError),
}

impl NudgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NudgeError::Store(_) => ErrorKind::Infrastructure,
            NudgeError::Config(_) | NudgeError::Build(_) => ErrorKind::Configuration,
        }
    }
}
