//! Element and connection id generation.
//!
//! Ids are minted once at creation and never reinterpreted. The engine holds a
//! boxed [`IdSource`] so hosts and tests can swap the strategy.

use uuid::Uuid;

/// Produces fresh, unique ids.
pub trait IdSource: Send + Sync {
    fn next_id(&mut self) -> Uuid;
}

/// Random v4 UUIDs. The default for live boards.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Monotonic ids (`00000000-...-0001`, `-0002`, ...). Deterministic across runs.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    /// Start counting after `start`.
    #[must_use]
    pub fn starting_at(start: u128) -> Self {
        Self { next: start }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> Uuid {
        self.next += 1;
        Uuid::from_u128(self.next)
    }
}
