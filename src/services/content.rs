//! Content deletion — local removal first, remote cleanup after.
//!
//! Removing elements from the board never waits on the network. Once the
//! lock is released, in-flight ingestion for the removed cards is cancelled
//! and each ingested card's remote artifacts are released best-effort.

use canvas::doc::ElementId;
use canvas::engine::Action;
use tracing::{debug, warn};

use crate::state::AppState;

/// Delete elements (cascading their connections) and clean up after them.
pub async fn delete_elements(state: &AppState, ids: &[ElementId]) -> Vec<Action> {
    let actions = {
        let mut core = state.board.write().await;
        core.delete_elements(ids)
    };
    handle_deleted(state, &actions).await;
    actions
}

/// Cancel tasks and request remote cleanup for every `ElementsDeleted`
/// action. Returns the number of cleanup calls that succeeded.
pub async fn handle_deleted(state: &AppState, actions: &[Action]) -> usize {
    let mut scrape_ids = Vec::new();
    for action in actions {
        let Action::ElementsDeleted(removed) = action else {
            continue;
        };
        for el in &removed.elements {
            if state.tasks.cancel(&el.id) {
                debug!(element_id = %el.id, "cancelled in-flight work for deleted element");
            }
            if let Some(scrape_id) = el.as_content().and_then(|c| c.metadata.scrape_id.clone()) {
                scrape_ids.push((el.id, scrape_id));
            }
        }
    }
    if scrape_ids.is_empty() {
        return 0;
    }

    let Some(project_id) = state.config.project_id.as_deref() else {
        debug!(count = scrape_ids.len(), "no project id; skipping remote cleanup");
        return 0;
    };

    let mut cleaned = 0;
    for (element_id, scrape_id) in scrape_ids {
        match state.api.cleanup(&scrape_id, project_id).await {
            Ok(()) => cleaned += 1,
            Err(e) => warn!(element_id = %element_id, scrape_id = %scrape_id, error = %e, "content cleanup failed"),
        }
    }
    cleaned
}

#[cfg(test)]
#[path = "content_test.rs"]
mod tests;
