use std::sync::Arc;

use canvas::content::{IngestEvent, ScrapedContent};
use canvas::doc::Platform;

use super::*;
use crate::api::types::ApiError;
use crate::config::ServiceConfig;
use crate::state::test_helpers::{MockApi, fast_config, seed_content, test_app_state, test_core};

async fn scraped(state: &AppState, n: u128, scrape_id: &str) -> ElementId {
    let id = seed_content(state, n, "https://www.instagram.com/p/abc", Platform::Instagram).await;
    let event = IngestEvent::ScrapeCompleted { scrape_id: Some(scrape_id.into()), content: ScrapedContent::default() };
    state.board.write().await.apply_ingest(&id, event);
    id
}

#[tokio::test]
async fn delete_releases_remote_content() {
    let api = Arc::new(MockApi::default());
    let state = test_app_state(api.clone());
    let a = scraped(&state, 1, "s1").await;
    let b = seed_content(&state, 2, "https://www.tiktok.com/@x/video/2", Platform::Tiktok).await;

    let actions = delete_elements(&state, &[a, b]).await;

    assert!(actions.iter().any(|a| matches!(a, Action::ElementsDeleted(r) if r.elements.len() == 2)));
    assert!(state.board.read().await.doc.is_empty());
    assert_eq!(api.calls(), vec!["cleanup s1 proj-1".to_owned()]);
}

#[tokio::test]
async fn cleanup_failure_still_deletes_locally() {
    let api = Arc::new(MockApi::default());
    *api.cleanup_error.lock().unwrap() = Some(ApiError::Request("connection reset".into()));
    let state = test_app_state(api.clone());
    let id = scraped(&state, 1, "s1").await;

    let actions = delete_elements(&state, &[id]).await;

    assert!(!actions.is_empty());
    assert!(state.board.read().await.element(&id).is_none());
    assert_eq!(api.call_count("cleanup"), 1);
}

#[tokio::test]
async fn delete_cancels_in_flight_work() {
    let api = Arc::new(MockApi::default());
    let state = test_app_state(api);
    let id = seed_content(&state, 1, "https://www.instagram.com/p/abc", Platform::Instagram).await;
    let ticket = state.tasks.register(id);

    delete_elements(&state, &[id]).await;

    assert!(ticket.token.is_cancelled());
    assert!(!state.tasks.is_active(&id));
}

#[tokio::test]
async fn no_project_id_skips_cleanup() {
    let api = Arc::new(MockApi::default());
    let state = AppState::new(test_core(), api.clone(), ServiceConfig { project_id: None, ..fast_config() });
    let id = scraped(&state, 1, "s1").await;

    let actions = state.board.write().await.delete_elements(&[id]);
    assert_eq!(handle_deleted(&state, &actions).await, 0);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn unrelated_actions_are_ignored() {
    let api = Arc::new(MockApi::default());
    let state = test_app_state(api.clone());
    assert_eq!(handle_deleted(&state, &[Action::RenderNeeded]).await, 0);
    assert!(api.calls().is_empty());
}
