//! Ports - the seams to everything outside the core.
//!
//! The dispatch loop receives these as constructed handles; nothing here is
//! global. The invocation surface owns their lifecycle.

pub mod clock;
pub mod id_generator;
pub mod push_transport;
pub mod task_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{RunIdGenerator, UlidGenerator};
pub use self::push_transport::PushTransport;
pub use self::task_store::TaskStore;
