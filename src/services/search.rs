//! Creator search — fetch a creator's recent content and lay it out as cards.
//!
//! The handle is validated before any request goes out. Results land as
//! already-ingested content cards in a grid centered on the current view.

use canvas::camera::Point;
use canvas::consts::{GRID_COLUMNS, GRID_GAP};
use canvas::content::{ContentError, normalize_handle};
use canvas::doc::{
    CanvasElement, ContentData, ContentMetadata, ElementData, ElementType, Platform, Size,
};
use canvas::engine::Action;
use tracing::{info, warn};

use crate::api::types::{ApiError, ScrapeStatus, SearchItem, SearchRequest};
use crate::state::AppState;

/// Longest caption prefix used as a card title.
const TITLE_MAX_CHARS: usize = 80;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Invalid(#[from] ContentError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("creator search failed: {0}")]
    Remote(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorSearch {
    pub platform: Platform,
    pub handle: String,
    pub filter: String,
    pub user_id: Option<String>,
}

/// Run a creator search and place the results on the board.
///
/// # Errors
///
/// `Invalid` for a malformed handle (no request is made), `Api` when the
/// request fails, `Remote` when the collaborator reports a failed search.
pub async fn search_creator(state: &AppState, search: CreatorSearch) -> Result<Vec<Action>, SearchError> {
    let handle = normalize_handle(&search.handle)?;
    let request = SearchRequest {
        platform: search.platform,
        search_query: handle.clone(),
        filter: search.filter,
        user_id: search.user_id,
    };

    let response = state.api.search_creators(&request).await.map_err(|e| {
        warn!(handle = %handle, error = %e, "creator search request failed");
        e
    })?;
    if response.status == ScrapeStatus::Failed || (response.content.is_empty() && response.error.is_some()) {
        return Err(SearchError::Remote(response.error.unwrap_or_else(|| "no results".to_owned())));
    }

    let items: Vec<&SearchItem> = response
        .content
        .iter()
        .filter(|item| !item.content_url.is_empty())
        .collect();

    let mut core = state.board.write().await;
    let cell = ElementType::Content.default_size();
    let positions = grid_layout(items.len(), core.view_center(), cell, GRID_COLUMNS, GRID_GAP);

    let mut actions = Vec::with_capacity(items.len() + 1);
    for (item, position) in items.into_iter().zip(positions) {
        let id = core.next_id();
        let now = core.doc.now();
        let el = CanvasElement::new(id, ElementData::Content(card_for(item, search.platform)), position, now);
        match core.insert_element(el) {
            Ok(action) => actions.push(action),
            Err(e) => warn!(error = %e, "search result rejected"),
        }
    }
    info!(handle = %handle, search_id = ?response.search_id, placed = actions.len(), "creator search placed results");
    if !actions.is_empty() {
        actions.push(Action::RenderNeeded);
    }
    Ok(actions)
}

fn card_for(item: &SearchItem, platform: Platform) -> ContentData {
    let title = item
        .caption
        .as_deref()
        .and_then(|c| c.lines().next())
        .map(|line| line.chars().take(TITLE_MAX_CHARS).collect::<String>())
        .unwrap_or_default();
    ContentData {
        url: item.content_url.clone(),
        platform,
        title,
        thumbnail_url: item.thumbnail_url.clone(),
        metadata: ContentMetadata {
            scrape_id: Some(item.id.clone()),
            is_scraped: true,
            likes: item.likes,
            comments: item.comments,
            views: item.views,
            caption: item.caption.clone(),
            ..Default::default()
        },
    }
}

/// Top-left corners for `count` cells in a grid centered on `center`.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn grid_layout(count: usize, center: Point, cell: Size, columns: usize, gap: f64) -> Vec<Point> {
    if count == 0 {
        return Vec::new();
    }
    let columns = columns.max(1);
    let cols_used = count.min(columns) as f64;
    let rows = count.div_ceil(columns) as f64;
    let total_w = cols_used * cell.width + (cols_used - 1.0) * gap;
    let total_h = rows * cell.height + (rows - 1.0) * gap;
    let origin = Point::new(center.x - total_w * 0.5, center.y - total_h * 0.5);

    (0..count)
        .map(|i| {
            let col = (i % columns) as f64;
            let row = (i / columns) as f64;
            Point::new(origin.x + col * (cell.width + gap), origin.y + row * (cell.height + gap))
        })
        .collect()
}

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
