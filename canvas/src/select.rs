//! Selection controller.
//!
//! Membership is kept in insertion order. Shift-click selects a positional
//! range in the store's element order (not spatial, not z-order). The primary
//! element is the one last clicked; when a toggle removes it, the most
//! recently added remaining member takes over.

#[cfg(test)]
#[path = "select_test.rs"]
mod select_test;

use crate::camera::Bounds;
use crate::doc::{DocStore, ElementId};
use crate::input::Modifiers;

#[derive(Debug, Clone, Default)]
pub struct Selection {
    ids: Vec<ElementId>,
    primary: Option<ElementId>,
    last_clicked: Option<ElementId>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected ids in the order they joined the selection.
    #[must_use]
    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn primary(&self) -> Option<ElementId> {
        self.primary
    }

    /// Anchor for shift-range selection.
    #[must_use]
    pub fn last_clicked(&self) -> Option<ElementId> {
        self.last_clicked
    }

    /// Apply an element click. `order` is the store's element order.
    /// Returns whether the selected set changed.
    pub fn click(&mut self, id: ElementId, modifiers: Modifiers, order: &[ElementId]) -> bool {
        let before = self.ids.clone();

        if modifiers.toggle() {
            if let Some(pos) = self.ids.iter().position(|s| *s == id) {
                self.ids.remove(pos);
                if self.primary == Some(id) {
                    self.primary = self.ids.last().copied();
                }
            } else {
                self.ids.push(id);
                self.primary = Some(id);
            }
            self.last_clicked = Some(id);
        } else if let Some(range) = modifiers.shift.then(|| self.range(id, order)).flatten() {
            self.ids = range;
            self.primary = Some(id);
        } else {
            self.ids = vec![id];
            self.primary = Some(id);
            self.last_clicked = Some(id);
        }

        self.ids != before
    }

    /// Ids between the anchor and `id` (inclusive) in `order`.
    fn range(&self, id: ElementId, order: &[ElementId]) -> Option<Vec<ElementId>> {
        let anchor = self.last_clicked?;
        let a = order.iter().position(|x| *x == anchor)?;
        let b = order.iter().position(|x| *x == id)?;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Some(order[lo..=hi].to_vec())
    }

    /// Empty the selection. Returns whether anything was selected.
    pub fn clear(&mut self) -> bool {
        self.primary = None;
        self.last_clicked = None;
        if self.ids.is_empty() {
            return false;
        }
        self.ids.clear();
        true
    }

    /// Select every id in `order`.
    pub fn select_all(&mut self, order: &[ElementId]) -> bool {
        let changed = self.ids != order;
        self.ids = order.to_vec();
        if self.primary.is_none_or(|p| !self.ids.contains(&p)) {
            self.primary = self.ids.last().copied();
        }
        changed
    }

    /// Drop deleted ids from the selection.
    pub fn remove(&mut self, gone: &[ElementId]) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| !gone.contains(id));
        if self.primary.is_some_and(|p| gone.contains(&p)) {
            self.primary = self.ids.last().copied();
        }
        if self.last_clicked.is_some_and(|p| gone.contains(&p)) {
            self.last_clicked = None;
        }
        self.ids.len() != before
    }

    /// Select every visible element intersecting `rect`. With `additive`,
    /// existing members are kept.
    pub fn marquee(&mut self, rect: &Bounds, doc: &DocStore, additive: bool) -> bool {
        let before = self.ids.clone();
        if !additive {
            self.ids.clear();
        }
        for el in doc.all() {
            if el.is_visible && el.bounds.intersects(rect) && !self.ids.contains(&el.id) {
                self.ids.push(el.id);
            }
        }
        if self.primary.is_none_or(|p| !self.ids.contains(&p)) {
            self.primary = self.ids.last().copied();
        }
        self.ids != before
    }
}
