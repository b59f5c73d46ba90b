use std::sync::Arc;

use canvas::content::ScrapedContent;
use canvas::doc::Platform;
use serde_json::json;

use super::ingest::IngestOutcome;
use super::*;
use crate::api::types::{ScrapeResponse, ScrapeStatus};
use crate::state::test_helpers::{MockApi, seed_content, test_app_state};

#[tokio::test]
async fn fold_into_deleted_element_is_missing() {
    let state = test_app_state(Arc::new(MockApi::default()));
    let folded = fold_event(&state, &uuid::Uuid::from_u128(5), IngestEvent::ScrapeTimedOut).await;
    assert_eq!(folded, Folded::Missing);
}

#[tokio::test]
async fn repeated_completion_is_unchanged() {
    let state = test_app_state(Arc::new(MockApi::default()));
    let id = seed_content(&state, 1, "https://www.instagram.com/p/abc", Platform::Instagram).await;
    let done = || IngestEvent::ScrapeCompleted { scrape_id: Some("s1".into()), content: ScrapedContent::default() };

    assert_eq!(fold_event(&state, &id, done()).await, Folded::Changed);
    assert_eq!(fold_event(&state, &id, done()).await, Folded::Unchanged);
}

#[tokio::test]
async fn pasted_url_is_ingested() {
    let api = Arc::new(MockApi::default());
    *api.scrape.lock().unwrap() = Some(Ok(ScrapeResponse {
        success: true,
        scrape_id: Some("s1".into()),
        status: ScrapeStatus::Completed,
        cached: true,
        existing: false,
        processed_data: Some(json!({"title": "Pasta night"})),
        error: None,
    }));
    let state = test_app_state(api.clone());

    let actions = state.board.write().await.on_paste("https://www.instagram.com/p/abc123");
    let Some(id) = actions.iter().find_map(|a| match a {
        Action::IngestRequested { id, .. } => Some(*id),
        _ => None,
    }) else {
        panic!("paste produced no ingest request: {actions:?}");
    };

    let handles = dispatch(&state, &actions).await;
    assert_eq!(handles.len(), 1);
    for handle in handles {
        assert_eq!(handle.await.unwrap(), IngestOutcome::Completed);
    }

    let core = state.board.read().await;
    let card = core.element(&id).and_then(|el| el.as_content()).unwrap();
    assert_eq!(card.title, "Pasta night");
    assert!(card.metadata.is_scraped);
    assert_eq!(api.call_count("scrape https://www.instagram.com/p/abc123 proj-1"), 1);
}

#[tokio::test]
async fn dispatch_without_host_work_spawns_nothing() {
    let api = Arc::new(MockApi::default());
    let state = test_app_state(api.clone());
    let actions = state.board.write().await.fit_to_screen();
    assert!(dispatch(&state, &actions).await.is_empty());
    assert!(api.calls().is_empty());
}
