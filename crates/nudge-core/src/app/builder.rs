//! DispatcherBuilder - wires ports into a `DispatchLoop`.
//!
//! # Fail-fast
//! `build()` refuses to produce a loop without a store or a transport, so a
//! misconfigured invocation dies before touching the network.

use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};

use super::aggregator::TaskAggregator;
use super::dispatch_loop::DispatchLoop;
use crate::config::{Config, DEFAULT_CONCURRENCY, DEFAULT_TARGET_URL};
use crate::ports::{Clock, PushTransport, SystemClock, TaskStore, UlidGenerator};

/// # Example
/// ```ignore
/// let dispatcher = DispatcherBuilder::new()
///     .with_config(&config)
///     .store(Arc::new(PostgrestTaskStore::from_config(&config)?))
///     .transport(Arc::new(HttpPushGateway::from_config(&config)?))
///     .build()?;
/// let summary = dispatcher.run(JobKind::DailyDigest).await?;
/// ```
pub struct DispatcherBuilder {
    store: Option<Arc<dyn TaskStore>>,
    transport: Option<Arc<dyn PushTransport>>,
    clock: Arc<dyn Clock>,
    target_url: String,
    utc_offset: FixedOffset,
    concurrency: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("dispatcher is missing a {0}")]
    Missing(&'static str),

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            transport: None,
            clock: Arc::new(SystemClock),
            target_url: DEFAULT_TARGET_URL.to_string(),
            utc_offset: Utc.fix(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Takes target URL, UTC offset and concurrency from `config`.
    pub fn with_config(self, config: &Config) -> Self {
        self.target_url(&config.target_url)
            .utc_offset(config.utc_offset)
            .concurrency(config.concurrency)
    }

    pub fn store(mut self, store: Arc<dyn TaskStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn PushTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn target_url(mut self, target_url: impl Into<String>) -> Self {
        self.target_url = target_url.into();
        self
    }

    pub fn utc_offset(mut self, utc_offset: FixedOffset) -> Self {
        self.utc_offset = utc_offset;
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn build(self) -> Result<DispatchLoop, BuildError> {
        let store = self.store.ok_or(BuildError::Missing("task store"))?;
        let transport = self.transport.ok_or(BuildError::Missing("push transport"))?;
        if self.concurrency == 0 {
            return Err(BuildError::ZeroConcurrency);
        }

        Ok(DispatchLoop {
            store,
            transport,
            run_ids: Arc::new(UlidGenerator::new(Arc::clone(&self.clock))),
            clock: self.clock,
            aggregator: Arc::new(TaskAggregator::new(self.target_url)),
            utc_offset: self.utc_offset,
            concurrency: self.concurrency,
        })
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
