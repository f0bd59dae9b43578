//! RunIdGenerator port - run id generation.
//!
//! # Implementations
//! - **UlidGenerator**: ULID built from the injected clock

use crate::domain::RunId;
use crate::ports::Clock;
use ulid::Ulid;

pub trait RunIdGenerator: Send + Sync {
    fn generate_run_id(&self) -> RunId;
}

/// Timestamp part comes from `Clock`, so a `FixedClock` yields ids with a
/// predictable prefix. The random part still differs per call.
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> RunIdGenerator for UlidGenerator<C> {
    fn generate_run_id(&self) -> RunId {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        RunId::from(ulid)
    }
}
