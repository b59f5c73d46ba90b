//! Host-side services that run around the canvas engine.
//!
//! Every service follows the same shape: read what it needs under the board
//! lock, release the lock for remote I/O, then re-acquire it to fold the
//! result back in. Folding checks that the element still exists first.

pub mod analysis;
pub mod content;
pub mod ingest;
pub mod persistence;
pub mod search;

use canvas::content::IngestEvent;
use canvas::doc::ElementId;
use canvas::engine::Action;
use tokio::task::JoinHandle;

use crate::state::AppState;

/// Result of folding an event into the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Folded {
    Changed,
    Unchanged,
    /// The element was deleted while the request was in flight.
    Missing,
}

pub(crate) async fn fold_event(state: &AppState, id: &ElementId, event: IngestEvent) -> Folded {
    let mut core = state.board.write().await;
    if !core.doc.contains(id) {
        return Folded::Missing;
    }
    if core.apply_ingest(id, event) { Folded::Changed } else { Folded::Unchanged }
}

/// Route engine actions that need host work: ingestion for pasted URLs and
/// remote cleanup for deleted cards. Returns the spawned ingestion tasks.
pub async fn dispatch(state: &AppState, actions: &[Action]) -> Vec<JoinHandle<ingest::IngestOutcome>> {
    content::handle_deleted(state, actions).await;
    ingest::spawn_requested(state, actions)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
