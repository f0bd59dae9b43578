//! nudge-core
//!
//! Scheduled push notifications for a to-do tracker.
//!
//! # Modules
//! - **domain**: tasks, subscriptions, typed filters, payloads, outcomes, errors
//! - **ports**: TaskStore, PushTransport, Clock, RunIdGenerator
//! - **app**: recipient resolver, task aggregator, dispatch loop, builder
//! - **impls**: PostgREST store, HTTP push gateway, in-memory and dry-run doubles
//! - **config**: environment configuration
//! - **observability**: run summary

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod impls;
pub mod observability;
pub mod ports;

pub use app::{DispatchLoop, DispatcherBuilder};
pub use config::Config;
pub use domain::JobKind;
pub use error::NudgeError;
pub use observability::RunSummary;
