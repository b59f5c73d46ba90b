//! Drag controller: moving and resizing a single element.
//!
//! `Idle -> Dragging -> {Committed, Cancelled} -> Idle`. While dragging, the
//! controller owns a transient overlay (`local`) that the renderer draws in
//! place of the stored bounds. Store writes are proposed through
//! [`DragUpdate::commit`] and rate-limited at high zoom; the overlay itself
//! updates on every move. Pointer-up always proposes the final bounds.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use crate::align::{AlignOptions, Guide, SnapAnchors, align};
use crate::camera::{Bounds, Point, Viewport};
use crate::consts::{DRAG_COMMIT_INTERVAL_MS, DRAG_THROTTLE_ZOOM, SNAP_THRESHOLD};
use crate::doc::{CanvasElement, ElementId, ElementType};
use crate::hit::ResizeAnchor;

/// What the pointer is doing to the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Move,
    Resize(ResizeAnchor),
}

impl DragMode {
    fn snap_anchors(self) -> SnapAnchors {
        match self {
            Self::Move => SnapAnchors::MOVE,
            Self::Resize(anchor) => anchor.snap_anchors(),
        }
    }
}

/// An active drag.
#[derive(Debug, Clone)]
pub struct DragSession {
    pub element_id: ElementId,
    pub element_type: ElementType,
    pub mode: DragMode,
    pub start_screen: Point,
    pub start_bounds: Bounds,
    /// Stacking order before the drag raised the element.
    pub start_z_index: i64,
    /// Optimistic bounds shown while dragging.
    pub local: Bounds,
    /// Bounds most recently proposed to the store.
    pub committed: Bounds,
    last_commit_ms: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Per-move output.
#[derive(Debug, Clone, PartialEq)]
pub struct DragUpdate {
    pub element_id: ElementId,
    /// Start bounds plus the raw world delta, before snapping.
    pub proposed: Bounds,
    /// Bounds to render this frame.
    pub local: Bounds,
    /// Bounds to write to the store, when the throttle allows.
    pub commit: Option<Bounds>,
    pub guides: Vec<Guide>,
}

/// How a drag ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEnd {
    /// Write `bounds` to the store. `changed` is false for a click without movement.
    Committed { element_id: ElementId, bounds: Bounds, changed: bool },
    /// Restore `bounds` and `z_index` (the start values) in the store.
    Cancelled { element_id: ElementId, bounds: Bounds, z_index: i64 },
}

/// Drives a single element move or resize.
#[derive(Debug, Clone)]
pub struct DragController {
    state: DragState,
    snap_threshold: f64,
    snap_enabled: bool,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(SNAP_THRESHOLD, true)
    }
}

impl DragController {
    #[must_use]
    pub fn new(snap_threshold: f64, snap_enabled: bool) -> Self {
        Self { state: DragState::Idle, snap_threshold, snap_enabled }
    }

    #[must_use]
    pub fn state(&self) -> &DragState {
        &self.state
    }

    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(s) => Some(s),
            DragState::Idle => None,
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    #[must_use]
    pub fn active_id(&self) -> Option<ElementId> {
        self.session().map(|s| s.element_id)
    }

    /// Overlay bounds for `id` while it is being dragged.
    #[must_use]
    pub fn local_bounds(&self, id: &ElementId) -> Option<Bounds> {
        self.session().filter(|s| s.element_id == *id).map(|s| s.local)
    }

    /// Begin dragging `el`. Ignored (returns false) if a drag is already active.
    pub fn on_pointer_down(&mut self, el: &CanvasElement, mode: DragMode, screen: Point) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.state = DragState::Dragging(DragSession {
            element_id: el.id,
            element_type: el.element_type(),
            mode,
            start_screen: screen,
            start_bounds: el.bounds,
            start_z_index: el.z_index,
            local: el.bounds,
            committed: el.bounds,
            last_commit_ms: None,
        });
        true
    }

    /// Advance the drag. `others` are the snap candidates (the moving element excluded).
    pub fn on_pointer_move(
        &mut self,
        screen: Point,
        viewport: &Viewport,
        now_ms: f64,
        others: &[Bounds],
    ) -> Option<DragUpdate> {
        let options = AlignOptions { threshold: self.snap_threshold, enabled: self.snap_enabled, ..Default::default() };
        let DragState::Dragging(s) = &mut self.state else {
            return None;
        };

        let dx = (screen.x - s.start_screen.x) / viewport.zoom;
        let dy = (screen.y - s.start_screen.y) / viewport.zoom;
        let options = AlignOptions { anchors: s.mode.snap_anchors(), ..options };

        let (proposed, local, guides) = match s.mode {
            DragMode::Move => {
                let proposed = s.start_bounds.with_position(Point::new(s.start_bounds.x + dx, s.start_bounds.y + dy));
                let snap = align(&proposed, others, options);
                let local = Bounds {
                    x: snap.snapped_x.unwrap_or(proposed.x),
                    y: snap.snapped_y.unwrap_or(proposed.y),
                    ..proposed
                };
                (proposed, local, snap.guides)
            }
            DragMode::Resize(anchor) => {
                let proposed = resize_bounds(&s.start_bounds, anchor, dx, dy, s.element_type);
                let snap = align(&proposed, others, options);
                let local = resize_bounds(
                    &s.start_bounds,
                    anchor,
                    dx + snap.dx(&proposed),
                    dy + snap.dy(&proposed),
                    s.element_type,
                );
                (proposed, local, snap.guides)
            }
        };
        s.local = local;

        let throttled = viewport.zoom > DRAG_THROTTLE_ZOOM
            && s.last_commit_ms.is_some_and(|last| now_ms - last < DRAG_COMMIT_INTERVAL_MS);
        let commit = if !throttled && local != s.committed {
            s.last_commit_ms = Some(now_ms);
            s.committed = local;
            Some(local)
        } else {
            None
        };

        Some(DragUpdate { element_id: s.element_id, proposed, local, commit, guides })
    }

    /// Finish the drag, bypassing the throttle.
    pub fn on_pointer_up(&mut self) -> Option<DragEnd> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(s) => Some(DragEnd::Committed {
                element_id: s.element_id,
                bounds: s.local,
                changed: s.local != s.start_bounds,
            }),
            DragState::Idle => None,
        }
    }

    /// Abort the drag and discard the overlay.
    pub fn cancel(&mut self) -> Option<DragEnd> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(s) => Some(DragEnd::Cancelled {
                element_id: s.element_id,
                bounds: s.start_bounds,
                z_index: s.start_z_index,
            }),
            DragState::Idle => None,
        }
    }

    /// Drop the drag without a result if its element is in `ids`.
    pub fn forget(&mut self, ids: &[ElementId]) {
        if self.active_id().is_some_and(|id| ids.contains(&id)) {
            self.state = DragState::Idle;
        }
    }
}

/// Resize `start` by dragging `anchor` by `(dx, dy)` world units.
///
/// The edges opposite the handle stay fixed; the result respects the
/// element type's size limits.
#[must_use]
pub fn resize_bounds(start: &Bounds, anchor: ResizeAnchor, dx: f64, dy: f64, kind: ElementType) -> Bounds {
    let mut width = start.width;
    let mut height = start.height;
    if anchor.moves_right() {
        width += dx;
    } else if anchor.moves_left() {
        width -= dx;
    }
    if anchor.moves_bottom() {
        height += dy;
    } else if anchor.moves_top() {
        height -= dy;
    }
    let size = kind.clamp_size(width, height);
    let x = if anchor.moves_left() { start.right() - size.width } else { start.x };
    let y = if anchor.moves_top() { start.bottom() - size.height } else { start.y };
    Bounds::new(x, y, size.width, size.height)
}
