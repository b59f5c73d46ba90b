#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::align::{AxisAnchors, SnapAnchors};
use crate::camera::{Bounds, Point, Viewport};
use crate::connect::{connection_path, connection_point};
use crate::consts::HANDLE_RADIUS_PX;
use crate::doc::{ConnectionId, DocStore, ElementId};

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
    ConnectionPoint,
}

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    pub const ALL: [Self; 8] = [Self::N, Self::Ne, Self::E, Self::Se, Self::S, Self::Sw, Self::W, Self::Nw];

    /// World-space position of this handle on `b`.
    #[must_use]
    pub fn handle_point(self, b: &Bounds) -> Point {
        let x = if self.moves_left() {
            b.left()
        } else if self.moves_right() {
            b.right()
        } else {
            b.center_x()
        };
        let y = if self.moves_top() {
            b.top()
        } else if self.moves_bottom() {
            b.bottom()
        } else {
            b.center_y()
        };
        Point::new(x, y)
    }

    #[must_use]
    pub fn moves_left(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    #[must_use]
    pub fn moves_right(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    #[must_use]
    pub fn moves_top(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    #[must_use]
    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    /// Only the edges this handle drags may snap.
    #[must_use]
    pub fn snap_anchors(self) -> SnapAnchors {
        let x = if self.moves_left() {
            AxisAnchors::START
        } else if self.moves_right() {
            AxisAnchors::END
        } else {
            AxisAnchors::NONE
        };
        let y = if self.moves_top() {
            AxisAnchors::START
        } else if self.moves_bottom() {
            AxisAnchors::END
        } else {
            AxisAnchors::NONE
        };
        SnapAnchors { x, y }
    }

    /// CSS cursor shown while hovering or dragging this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::N | Self::S => "ns-resize",
            Self::E | Self::W => "ew-resize",
            Self::Ne | Self::Sw => "nesw-resize",
            Self::Nw | Self::Se => "nwse-resize",
        }
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub element_id: ElementId,
    pub part: HitPart,
}

/// Test which element (if any) is under `world_pt`.
///
/// With exactly one selected, unlocked element, its connection point and then
/// its resize handles win over everything else; handles are not hit with a
/// multi-selection, matching what is drawn. Then elements are checked topmost
/// first: connection point, then body. Hidden elements are never hit. Handle
/// radii are constant in screen space.
#[must_use]
pub fn hit_test(world_pt: Point, doc: &DocStore, viewport: &Viewport, selected: &[ElementId]) -> Option<Hit> {
    let radius = viewport.screen_dist_to_world(HANDLE_RADIUS_PX);
    let radius_sq = radius * radius;

    if let [id] = selected
        && let Some(el) = doc.get(id)
        && el.is_visible
        && !el.is_locked
    {
        // The connection point shares a spot with the E (or W) handle.
        if connection_point(el).distance_sq(world_pt) <= radius_sq {
            return Some(Hit { element_id: el.id, part: HitPart::ConnectionPoint });
        }
        for anchor in ResizeAnchor::ALL {
            if anchor.handle_point(&el.bounds).distance_sq(world_pt) <= radius_sq {
                return Some(Hit { element_id: el.id, part: HitPart::ResizeHandle(anchor) });
            }
        }
    }

    for el in doc.sorted_by_z().into_iter().rev() {
        if !el.is_visible {
            continue;
        }
        if connection_point(el).distance_sq(world_pt) <= radius_sq {
            return Some(Hit { element_id: el.id, part: HitPart::ConnectionPoint });
        }
        if el.bounds.contains(world_pt) {
            return Some(Hit { element_id: el.id, part: HitPart::Body });
        }
    }
    None
}

/// Closest connection whose curve passes within the handle radius of `world_pt`.
#[must_use]
pub fn hit_connection(world_pt: Point, doc: &DocStore, viewport: &Viewport) -> Option<ConnectionId> {
    let tolerance = viewport.screen_dist_to_world(HANDLE_RADIUS_PX);
    let mut best: Option<(ConnectionId, f64)> = None;
    for conn in doc.connections() {
        let (Some(from), Some(to)) = (doc.get(&conn.from), doc.get(&conn.to)) else {
            continue;
        };
        if !from.is_visible || !to.is_visible {
            continue;
        }
        let path = connection_path(from, to);
        if !path.hull_bounds().expand(tolerance).contains(world_pt) {
            continue;
        }
        let d = path.distance_to(world_pt);
        if d <= tolerance && best.is_none_or(|(_, bd)| d < bd) {
            best = Some((conn.id, d));
        }
    }
    best.map(|(id, _)| id)
}
