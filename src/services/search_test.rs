use std::sync::Arc;

use super::*;
use crate::api::types::SearchResponse;
use crate::state::test_helpers::{MockApi, test_app_state};

fn search(handle: &str) -> CreatorSearch {
    CreatorSearch { platform: Platform::Instagram, handle: handle.into(), filter: "latest".into(), user_id: None }
}

fn item(id: &str, url: &str, caption: Option<&str>) -> SearchItem {
    SearchItem {
        id: id.into(),
        content_url: url.into(),
        caption: caption.map(str::to_owned),
        likes: 7,
        ..Default::default()
    }
}

// =============================================================================
// grid_layout
// =============================================================================

const CELL: Size = Size { width: 320.0, height: 480.0 };

#[test]
fn grid_single_cell_is_centered() {
    let at = grid_layout(1, Point::new(0.0, 0.0), CELL, 4, 40.0);
    assert_eq!(at, vec![Point::new(-160.0, -240.0)]);
}

#[test]
fn grid_wraps_after_column_count() {
    let at = grid_layout(5, Point::new(0.0, 0.0), CELL, 4, 40.0);
    assert_eq!(at.len(), 5);
    assert_eq!(at[0], Point::new(-700.0, -500.0));
    assert_eq!(at[3], Point::new(380.0, -500.0));
    assert_eq!(at[4], Point::new(-700.0, 20.0));
}

#[test]
fn grid_empty_and_zero_columns() {
    assert!(grid_layout(0, Point::new(5.0, 5.0), CELL, 4, 40.0).is_empty());
    let at = grid_layout(2, Point::new(0.0, 0.0), CELL, 0, 40.0);
    assert_eq!(at[1].y - at[0].y, 520.0);
}

// =============================================================================
// search_creator
// =============================================================================

#[tokio::test]
async fn invalid_handle_makes_no_request() {
    let api = Arc::new(MockApi::default());
    let state = test_app_state(api.clone());

    let err = search_creator(&state, search("  @  ")).await.unwrap_err();
    assert!(matches!(err, SearchError::Invalid(_)), "{err:?}");
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn results_are_placed_as_ingested_cards() {
    let api = Arc::new(MockApi::default());
    *api.search.lock().unwrap() = Some(Ok(SearchResponse {
        search_id: Some("q1".into()),
        status: ScrapeStatus::Completed,
        content: vec![
            item("c1", "https://www.instagram.com/p/one", Some("First line\nsecond line")),
            item("c2", "", None),
            item("c3", "https://www.instagram.com/p/three", None),
        ],
        error: None,
    }));
    let state = test_app_state(api.clone());
    let center = state.board.read().await.view_center();

    let actions = search_creator(&state, search("@Chef.Anna")).await.unwrap();

    assert_eq!(api.calls(), vec!["search Chef.Anna".to_owned()]);
    assert_eq!(actions.len(), 3);
    assert!(matches!(actions.last(), Some(Action::RenderNeeded)));

    let core = state.board.read().await;
    assert_eq!(core.doc.len(), 2);
    let Action::ElementCreated(first) = &actions[0] else {
        panic!("expected ElementCreated, got {:?}", actions[0]);
    };
    let card = first.as_content().unwrap();
    assert_eq!(card.title, "First line");
    assert_eq!(card.platform, Platform::Instagram);
    assert_eq!(card.metadata.scrape_id.as_deref(), Some("c1"));
    assert!(card.metadata.is_scraped);
    assert_eq!(card.metadata.likes, 7);
    assert_eq!(first.bounds.x, center.x - 340.0);
    assert_eq!(first.bounds.y, center.y - 240.0);
}

#[tokio::test]
async fn long_caption_title_is_truncated() {
    let api = Arc::new(MockApi::default());
    let caption = "x".repeat(200);
    *api.search.lock().unwrap() = Some(Ok(SearchResponse {
        search_id: None,
        status: ScrapeStatus::Completed,
        content: vec![item("c1", "https://www.instagram.com/p/one", Some(&caption))],
        error: None,
    }));
    let state = test_app_state(api);

    let actions = search_creator(&state, search("anna")).await.unwrap();
    let Action::ElementCreated(el) = &actions[0] else {
        panic!("expected ElementCreated");
    };
    assert_eq!(el.as_content().unwrap().title.chars().count(), TITLE_MAX_CHARS);
}

#[tokio::test]
async fn remote_failure_is_an_error() {
    let api = Arc::new(MockApi::default());
    *api.search.lock().unwrap() = Some(Ok(SearchResponse {
        search_id: None,
        status: ScrapeStatus::Failed,
        content: vec![],
        error: Some("profile not found".into()),
    }));
    let state = test_app_state(api);

    let err = search_creator(&state, search("ghost")).await.unwrap_err();
    assert!(matches!(err, SearchError::Remote(ref msg) if msg == "profile not found"), "{err:?}");
    assert!(state.board.read().await.doc.is_empty());
}

#[tokio::test]
async fn empty_result_places_nothing() {
    let api = Arc::new(MockApi::default());
    *api.search.lock().unwrap() =
        Some(Ok(SearchResponse { search_id: None, status: ScrapeStatus::Completed, content: vec![], error: None }));
    let state = test_app_state(api);

    assert!(search_creator(&state, search("quiet")).await.unwrap().is_empty());
}
