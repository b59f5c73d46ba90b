//! Viewport virtualization: only elements near the visible region are rendered.
//!
//! The visible world rectangle is expanded by `padding / zoom` so the margin is
//! constant in screen pixels. [`VisibleCache`] memoizes the result on the
//! viewport, container size and store revision.

#[cfg(test)]
#[path = "cull_test.rs"]
mod cull_test;

use crate::camera::{Bounds, Viewport};
use crate::doc::{DocStore, ElementId};

/// World-space region in which elements count as visible.
#[must_use]
pub fn visible_region(viewport: &Viewport, width: f64, height: f64, padding: f64) -> Bounds {
    viewport
        .visible_world_bounds(width, height)
        .expand(viewport.screen_dist_to_world(padding))
}

/// Ids of visible elements intersecting the padded view, in paint order.
#[must_use]
pub fn visible_elements(doc: &DocStore, viewport: &Viewport, width: f64, height: f64, padding: f64) -> Vec<ElementId> {
    let region = visible_region(viewport, width, height, padding);
    doc.sorted_by_z()
        .into_iter()
        .filter(|el| el.is_visible && el.bounds.intersects(&region))
        .map(|el| el.id)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    x: u64,
    y: u64,
    zoom: u64,
    width: u64,
    height: u64,
    padding: u64,
    revision: u64,
}

impl CacheKey {
    fn new(doc: &DocStore, viewport: &Viewport, width: f64, height: f64, padding: f64) -> Self {
        Self {
            x: viewport.x.to_bits(),
            y: viewport.y.to_bits(),
            zoom: viewport.zoom.to_bits(),
            width: width.to_bits(),
            height: height.to_bits(),
            padding: padding.to_bits(),
            revision: doc.revision(),
        }
    }
}

/// Memoized [`visible_elements`].
#[derive(Debug, Clone, Default)]
pub struct VisibleCache {
    key: Option<CacheKey>,
    ids: Vec<ElementId>,
    misses: u64,
}

impl VisibleCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible ids, recomputed only when the viewport, size or store changed.
    pub fn get(&mut self, doc: &DocStore, viewport: &Viewport, width: f64, height: f64, padding: f64) -> &[ElementId] {
        let key = CacheKey::new(doc, viewport, width, height, padding);
        if self.key != Some(key) {
            self.ids = visible_elements(doc, viewport, width, height, padding);
            self.key = Some(key);
            self.misses += 1;
        }
        &self.ids
    }

    /// Number of recomputations so far.
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }
}
