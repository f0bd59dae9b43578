//! App - application layer.
//!
//! Combines the ports into the three pieces of a dispatch run.
//!
//! # Components
//! - **RecipientResolver**: who qualifies, with which tasks
//! - **TaskAggregator**: ordering and message bodies
//! - **DispatchLoop**: per-recipient send with failure isolation
//! - **DispatcherBuilder**: wiring and fail-fast validation

pub mod aggregator;
pub mod builder;
pub mod dispatch_loop;
pub mod resolver;

pub use self::aggregator::TaskAggregator;
pub use self::builder::{BuildError, DispatcherBuilder};
pub use self::dispatch_loop::DispatchLoop;
pub use self::resolver::RecipientResolver;
