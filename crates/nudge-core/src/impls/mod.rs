//! Impls - port implementations.
//!
//! # Production
//! - **PostgrestTaskStore**: Supabase tables over PostgREST
//! - **WebPushTransport**: Web Push straight to the push service (VAPID)
//! - **HttpPushGateway**: Web Push via an HTTP gateway, when no VAPID key is set
//!
//! # Development / tests
//! - **InMemoryTaskStore**: evaluates `TaskFilter` over fixed rows
//! - **RecordingTransport**: remembers sends, can be told to fail
//! - **DryRunTransport**: logs instead of sending

pub mod dry_run;
pub mod inmem_store;
pub mod postgrest;
pub mod push_gateway;
pub mod recording;
pub mod web_push;

pub use self::dry_run::DryRunTransport;
pub use self::inmem_store::InMemoryTaskStore;
pub use self::postgrest::PostgrestTaskStore;
pub use self::push_gateway::HttpPushGateway;
pub use self::recording::{RecordingTransport, SendAttempt};
pub use self::web_push::WebPushTransport;
