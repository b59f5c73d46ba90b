//! Analysis service — request hook/body/CTA insights for an ingested card.
//!
//! Failures are recorded on the card (`analysisError`, retry count) and the
//! card stays eligible, so calling [`analyze`] again is the retry path.

use canvas::content::{IngestEvent, ready_for_analysis};
use canvas::doc::ElementId;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{Folded, fold_event};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Completed,
    Failed(String),
    /// Not ingested yet, already analyzed, or analysis already running.
    NotReady,
    Cancelled,
    Discarded,
}

/// Analyze the content card `id` as its own cancellable task.
///
/// Readiness is checked before registering so a card with ingestion or
/// analysis still in flight keeps its running task.
pub async fn analyze(state: &AppState, id: ElementId) -> AnalysisOutcome {
    match state.board.read().await.element(&id) {
        None => return AnalysisOutcome::Discarded,
        Some(el) if !ready_for_analysis(el) || state.tasks.is_active(&id) => return AnalysisOutcome::NotReady,
        Some(_) => {}
    }
    let ticket = state.tasks.register(id);
    let outcome = run_analysis(state, id, &ticket.token).await;
    state.tasks.finish(&id, &ticket);
    info!(element_id = %id, ?outcome, "analysis finished");
    outcome
}

/// Analysis step shared with ingestion, under the caller's token.
pub(crate) async fn run_analysis(state: &AppState, id: ElementId, token: &CancellationToken) -> AnalysisOutcome {
    let scrape_id = {
        let core = state.board.read().await;
        let Some(el) = core.element(&id) else {
            return AnalysisOutcome::Discarded;
        };
        if !ready_for_analysis(el) {
            return AnalysisOutcome::NotReady;
        }
        el.as_content().and_then(|c| c.metadata.scrape_id.clone())
    };
    let Some(scrape_id) = scrape_id else {
        return AnalysisOutcome::NotReady;
    };

    if fold_event(state, &id, IngestEvent::AnalysisStarted).await == Folded::Missing {
        return AnalysisOutcome::Discarded;
    }

    let result = tokio::select! {
        biased;
        () = token.cancelled() => {
            fold_event(state, &id, IngestEvent::AnalysisCancelled).await;
            return AnalysisOutcome::Cancelled;
        }
        r = state.api.analyze(&scrape_id, true) => r,
    };
    match result {
        Ok(analysis) => match fold_event(state, &id, IngestEvent::AnalysisCompleted { analysis }).await {
            Folded::Missing => AnalysisOutcome::Discarded,
            Folded::Changed | Folded::Unchanged => AnalysisOutcome::Completed,
        },
        Err(e) => {
            warn!(element_id = %id, scrape_id = %scrape_id, error = %e, retryable = e.retryable(), "analysis request failed");
            let error = e.user_message();
            match fold_event(state, &id, IngestEvent::AnalysisFailed { error: error.clone() }).await {
                Folded::Missing => AnalysisOutcome::Discarded,
                Folded::Changed | Folded::Unchanged => AnalysisOutcome::Failed(error),
            }
        }
    }
}

#[cfg(test)]
#[path = "analysis_test.rs"]
mod tests;
