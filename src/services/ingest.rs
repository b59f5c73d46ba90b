//! Ingestion service — scrape a content URL and poll until it settles.
//!
//! DESIGN
//! ======
//! One task per content card. The task registers a cancellation token keyed
//! by element id, triggers the scrape, then polls the status endpoint on a
//! fixed interval until the scrape completes, fails, or the attempt budget
//! runs out. Every outcome is folded into the card's metadata; nothing is
//! returned as an error.
//!
//! Deleting the card cancels the token. A poll that lands after deletion
//! is discarded by the existence check in `fold_event`.

use canvas::content::IngestEvent;
use canvas::doc::{ElementId, Platform};
use canvas::engine::Action;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{Folded, analysis, fold_event};
use crate::api::types::{ApiError, ScrapeStatus, scraped_content};
use crate::state::AppState;

/// How an ingestion task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Completed,
    /// Card was already ingested; nothing was requested.
    AlreadyIngested,
    /// Ingestion or analysis for the card is still in flight; left untouched.
    Busy,
    Failed(String),
    TimedOut,
    Cancelled,
    /// The card was deleted while the task was running.
    Discarded,
}

/// Spawn an ingestion task for every `IngestRequested` action.
pub fn spawn_requested(state: &AppState, actions: &[Action]) -> Vec<JoinHandle<IngestOutcome>> {
    actions
        .iter()
        .filter_map(|action| match action {
            Action::IngestRequested { id, .. } => Some(spawn_ingest(state.clone(), *id)),
            _ => None,
        })
        .collect()
}

pub fn spawn_ingest(state: AppState, id: ElementId) -> JoinHandle<IngestOutcome> {
    tokio::spawn(async move { ingest(&state, id).await })
}

/// Ingest the content card `id`, then analyze it when configured to.
///
/// Checked before registering: registering would cancel whatever is running
/// for the card.
pub async fn ingest(state: &AppState, id: ElementId) -> IngestOutcome {
    match source(state, &id).await {
        None => return IngestOutcome::Discarded,
        Some(source) if source.scraped => return IngestOutcome::AlreadyIngested,
        Some(_) if state.tasks.is_active(&id) => return IngestOutcome::Busy,
        Some(_) => {}
    }
    let ticket = state.tasks.register(id);
    let outcome = run(state, id, &ticket.token).await;
    state.tasks.finish(&id, &ticket);
    info!(element_id = %id, ?outcome, "ingestion finished");
    outcome
}

struct Source {
    url: String,
    platform: Platform,
    scraped: bool,
}

async fn source(state: &AppState, id: &ElementId) -> Option<Source> {
    let core = state.board.read().await;
    let content = core.element(id)?.as_content()?;
    Some(Source { url: content.url.clone(), platform: content.platform, scraped: content.metadata.is_scraped })
}

async fn run(state: &AppState, id: ElementId, token: &CancellationToken) -> IngestOutcome {
    let Some(source) = source(state, &id).await else {
        return IngestOutcome::Discarded;
    };
    if source.scraped {
        return IngestOutcome::AlreadyIngested;
    }
    let project_id = match state.config.require_project_id() {
        Ok(project_id) => project_id.to_owned(),
        Err(e) => return fail(state, id, e.to_string()).await,
    };

    if fold_event(state, &id, IngestEvent::ScrapeStarted { scrape_id: None }).await == Folded::Missing {
        return IngestOutcome::Discarded;
    }

    let response = tokio::select! {
        biased;
        () = token.cancelled() => return IngestOutcome::Cancelled,
        r = state.api.scrape(&source.url, &project_id) => r,
    };
    let response = match response {
        Ok(response) => response,
        Err(e) => {
            warn!(element_id = %id, error = %e, "scrape request failed");
            return fail(state, id, e.user_message()).await;
        }
    };

    if !response.success || response.status == ScrapeStatus::Failed {
        let rejected = ApiError::Rejected(response.error.unwrap_or_else(|| "Scrape failed".to_owned()));
        warn!(element_id = %id, error = %rejected, "scrape rejected");
        return fail(state, id, rejected.user_message()).await;
    }
    if response.status == ScrapeStatus::Completed {
        debug!(element_id = %id, cached = response.cached, existing = response.existing, "scrape already available");
        return complete(state, id, response.scrape_id, response.processed_data.as_ref(), token).await;
    }
    let Some(scrape_id) = response.scrape_id else {
        return fail(state, id, "Scrape started without an id".to_owned()).await;
    };
    let started = IngestEvent::ScrapeStarted { scrape_id: Some(scrape_id.clone()) };
    if fold_event(state, &id, started).await == Folded::Missing {
        return IngestOutcome::Discarded;
    }

    poll(state, id, &scrape_id, source.platform, token).await
}

async fn poll(
    state: &AppState,
    id: ElementId,
    scrape_id: &str,
    platform: Platform,
    token: &CancellationToken,
) -> IngestOutcome {
    let max_attempts = state.config.ingest.max_attempts_for(platform);
    let interval = state.config.ingest.poll_interval();

    for attempt in 1..=max_attempts {
        tokio::select! {
            biased;
            () = token.cancelled() => return IngestOutcome::Cancelled,
            () = tokio::time::sleep(interval) => {}
        }
        if !state.board.read().await.doc.contains(&id) {
            return IngestOutcome::Discarded;
        }

        let status = tokio::select! {
            biased;
            () = token.cancelled() => return IngestOutcome::Cancelled,
            r = state.api.scrape_status(scrape_id) => r,
        };
        match status {
            Ok(status) => match status.status {
                ScrapeStatus::Completed => {
                    return complete(state, id, Some(scrape_id.to_owned()), status.processed_data.as_ref(), token)
                        .await;
                }
                ScrapeStatus::Failed => {
                    let error = status.error.unwrap_or_else(|| "Scrape failed".to_owned());
                    return fail(state, id, error).await;
                }
                ScrapeStatus::Pending | ScrapeStatus::Processing | ScrapeStatus::Unknown => {
                    debug!(element_id = %id, scrape_id, attempt, "scrape still processing");
                }
            },
            Err(e) if e.retryable() => {
                warn!(element_id = %id, scrape_id, attempt, error = %e, "status poll failed; retrying");
            }
            Err(e) => {
                warn!(element_id = %id, scrape_id, attempt, error = %e, "status poll failed");
                return fail(state, id, e.user_message()).await;
            }
        }
    }

    warn!(element_id = %id, scrape_id, attempts = max_attempts, "ingestion timed out");
    match fold_event(state, &id, IngestEvent::ScrapeTimedOut).await {
        Folded::Missing => IngestOutcome::Discarded,
        Folded::Changed | Folded::Unchanged => IngestOutcome::TimedOut,
    }
}

async fn complete(
    state: &AppState,
    id: ElementId,
    scrape_id: Option<String>,
    processed: Option<&serde_json::Value>,
    token: &CancellationToken,
) -> IngestOutcome {
    let event = IngestEvent::ScrapeCompleted { scrape_id, content: scraped_content(processed) };
    if fold_event(state, &id, event).await == Folded::Missing {
        return IngestOutcome::Discarded;
    }
    if state.config.ingest.auto_analyze {
        let outcome = analysis::run_analysis(state, id, token).await;
        debug!(element_id = %id, ?outcome, "auto analysis finished");
    }
    IngestOutcome::Completed
}

async fn fail(state: &AppState, id: ElementId, error: String) -> IngestOutcome {
    match fold_event(state, &id, IngestEvent::ScrapeFailed { error: error.clone() }).await {
        Folded::Missing => IngestOutcome::Discarded,
        Folded::Changed | Folded::Unchanged => IngestOutcome::Failed(error),
    }
}

#[cfg(test)]
#[path = "ingest_test.rs"]
mod tests;
