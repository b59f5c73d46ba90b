use super::*;
use uuid::Uuid;

fn id(n: u128) -> ElementId {
    Uuid::from_u128(n)
}

#[test]
fn register_then_finish_clears_entry() {
    let tasks = TaskRegistry::new();
    let ticket = tasks.register(id(1));
    assert!(tasks.is_active(&id(1)));
    tasks.finish(&id(1), &ticket);
    assert!(!tasks.is_active(&id(1)));
    assert!(!ticket.token.is_cancelled());
}

#[test]
fn cancel_fires_token() {
    let tasks = TaskRegistry::new();
    let ticket = tasks.register(id(1));
    assert!(tasks.cancel(&id(1)));
    assert!(ticket.token.is_cancelled());
    assert!(!tasks.cancel(&id(1)));
}

#[test]
fn re_register_supersedes_previous_work() {
    let tasks = TaskRegistry::new();
    let first = tasks.register(id(1));
    let second = tasks.register(id(1));
    assert!(first.token.is_cancelled());
    assert!(!second.token.is_cancelled());

    // A stale finish must not drop the newer registration.
    tasks.finish(&id(1), &first);
    assert!(tasks.is_active(&id(1)));
    tasks.finish(&id(1), &second);
    assert_eq!(tasks.active_count(), 0);
}

#[test]
fn registry_clones_share_entries() {
    let tasks = TaskRegistry::new();
    let clone = tasks.clone();
    let ticket = tasks.register(id(7));
    assert!(clone.cancel(&id(7)));
    assert!(ticket.token.is_cancelled());
}

#[tokio::test]
async fn app_state_clones_share_board() {
    let api = std::sync::Arc::new(test_helpers::MockApi::default());
    let state = test_helpers::test_app_state(api);
    let clone = state.clone();
    test_helpers::seed_content(&state, 1, "https://www.tiktok.com/@a/video/1", canvas::doc::Platform::Tiktok).await;
    assert!(clone.board.read().await.doc.contains(&id(1)));
}
