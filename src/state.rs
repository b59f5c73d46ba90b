//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is cloned into every background task. The board is a single
//! `EngineCore` behind a `tokio` `RwLock`: services take the lock, mutate
//! or snapshot, and release it before any network or disk I/O. In-flight
//! remote work per element is tracked in a [`TaskRegistry`] so deleting an
//! element stops its polling loop.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use canvas::doc::ElementId;
use canvas::engine::EngineCore;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::api::ContentApi;
use crate::config::ServiceConfig;

// =============================================================================
// TASK REGISTRY
// =============================================================================

/// Proof of registration, handed back to [`TaskRegistry::finish`].
#[derive(Debug, Clone)]
pub struct TaskTicket {
    pub token: CancellationToken,
    generation: u64,
}

#[derive(Default)]
struct Registry {
    next_generation: u64,
    tokens: HashMap<ElementId, (u64, CancellationToken)>,
}

/// Cancellation tokens for remote work, keyed by element id.
#[derive(Clone, Default)]
pub struct TaskRegistry {
    inner: Arc<Mutex<Registry>>,
}

impl TaskRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register new work for `id`. Any earlier work for the same id is cancelled.
    pub fn register(&self, id: ElementId) -> TaskTicket {
        let mut reg = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        reg.next_generation += 1;
        let generation = reg.next_generation;
        let token = CancellationToken::new();
        if let Some((_, previous)) = reg.tokens.insert(id, (generation, token.clone())) {
            tracing::debug!(element_id = %id, "superseding in-flight task");
            previous.cancel();
        }
        TaskTicket { token, generation }
    }

    /// Cancel work for `id`. Returns true when something was running.
    pub fn cancel(&self, id: &ElementId) -> bool {
        let mut reg = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match reg.tokens.remove(id) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Drop the registration if it still belongs to `ticket`.
    pub fn finish(&self, id: &ElementId, ticket: &TaskTicket) {
        let mut reg = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if reg.tokens.get(id).is_some_and(|(generation, _)| *generation == ticket.generation) {
            reg.tokens.remove(id);
        }
    }

    #[must_use]
    pub fn is_active(&self, id: &ElementId) -> bool {
        let reg = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        reg.tokens.contains_key(id)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        let reg = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        reg.tokens.len()
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state. Clone is cheap: all fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub board: Arc<RwLock<EngineCore>>,
    pub api: Arc<dyn ContentApi>,
    pub tasks: TaskRegistry,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(core: EngineCore, api: Arc<dyn ContentApi>, config: ServiceConfig) -> Self {
        Self {
            board: Arc::new(RwLock::new(core)),
            api,
            tasks: TaskRegistry::new(),
            config: Arc::new(config),
        }
    }
}


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
