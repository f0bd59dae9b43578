use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use nudge_core::config::ConfigError;
use nudge_core::impls::{DryRunTransport, HttpPushGateway, PostgrestTaskStore, WebPushTransport};
use nudge_core::ports::PushTransport;
use nudge_core::{Config, DispatcherBuilder, JobKind, NudgeError};

pub struct RunOptions {
    pub job: JobKind,
    pub dry_run: bool,
    pub concurrency: Option<usize>,
    pub summary_json: bool,
}

/// Builds the store and transport, runs one job, and drops them again.
///
/// Partial delivery failures are not errors here; only a run that could not
/// resolve its work set returns `Err`. Setup failures are wrapped as
/// `NudgeError` so the caller can pick an exit code from `kind()`.
pub async fn run(options: RunOptions) -> Result<()> {
    let mut config = Config::from_env()
        .map_err(NudgeError::from)
        .context("reading configuration")?;
    if let Some(concurrency) = options.concurrency {
        config.concurrency = concurrency;
    }
    info!(job = %options.job, dry_run = options.dry_run, ?config, "starting");

    let store = PostgrestTaskStore::from_config(&config)
        .map_err(NudgeError::from)
        .context("creating store client")?;
    let transport = transport(&config, options.dry_run)
        .map_err(NudgeError::from)
        .context("creating push transport")?;

    let dispatcher = DispatcherBuilder::new()
        .with_config(&config)
        .store(Arc::new(store))
        .transport(transport)
        .build()
        .map_err(NudgeError::from)?;

    let summary = dispatcher.run(options.job).await?;

    if options.summary_json {
        println!("{}", serde_json::to_string(&summary)?);
    }
    Ok(())
}

/// Dry run, else direct Web Push when a VAPID key is set, else the gateway.
fn transport(config: &Config, dry_run: bool) -> Result<Arc<dyn PushTransport>, ConfigError> {
    if dry_run {
        info!(transport = "dry-run", "push transport selected");
        return Ok(Arc::new(DryRunTransport::new()));
    }
    if config.vapid_private_key.is_some() {
        info!(transport = "web-push", "push transport selected");
        return Ok(Arc::new(WebPushTransport::from_config(config)?));
    }
    if config.gateway_url.is_some() {
        info!(transport = "gateway", "push transport selected");
        return Ok(Arc::new(HttpPushGateway::from_config(config)?));
    }
    Err(ConfigError::Missing("VAPID_PRIVATE_KEY"))
}
