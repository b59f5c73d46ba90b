//! Connections: the interactive connect gesture and curve geometry.
//!
//! A connection is drawn as a cubic bezier between the two elements'
//! connection points. The point's side is fixed per element type (chat panels
//! take links on their left edge, everything else on its right edge), not the
//! nearest side. Control points sit horizontally off each endpoint by
//! `min(|dx| * 0.5, 100)`, which gives an S-curve for any vertical offset.

#[cfg(test)]
#[path = "connect_test.rs"]
mod connect_test;

use crate::camera::{Bounds, Point};
use crate::consts::{CURVE_HIT_SAMPLES, CURVE_OFFSET_MAX, CURVE_OFFSET_RATIO};
use crate::doc::{CanvasElement, Connection, ElementId, ElementType};
use crate::ids::IdSource;

/// Result of feeding one element click into the connect gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectStep {
    /// The gesture began at this element.
    Started(ElementId),
    /// A connection was proposed; the caller adds it to the store.
    Completed(Connection),
    /// The same element was clicked twice; the gesture was reset.
    SelfLoopRejected(ElementId),
}

/// Tracks an in-progress connect gesture.
#[derive(Debug, Clone, Default)]
pub struct ConnectionManager {
    connecting_from: Option<ElementId>,
}

impl ConnectionManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Element the current gesture started from, if any.
    #[must_use]
    pub fn connecting_from(&self) -> Option<ElementId> {
        self.connecting_from
    }

    #[must_use]
    pub fn is_connecting(&self) -> bool {
        self.connecting_from.is_some()
    }

    /// Begin a gesture, or finish it at `id`.
    pub fn start_or_complete(&mut self, id: ElementId, ids: &mut dyn IdSource) -> ConnectStep {
        match self.connecting_from.take() {
            None => {
                self.connecting_from = Some(id);
                ConnectStep::Started(id)
            }
            Some(from) if from == id => ConnectStep::SelfLoopRejected(id),
            Some(from) => ConnectStep::Completed(Connection { id: ids.next_id(), from, to: id }),
        }
    }

    /// Abort the gesture. Returns whether one was in progress.
    pub fn cancel(&mut self) -> bool {
        self.connecting_from.take().is_some()
    }

    /// Drop the gesture if it started at one of `ids` (the element was deleted).
    pub fn forget(&mut self, ids: &[ElementId]) {
        if self.connecting_from.is_some_and(|from| ids.contains(&from)) {
            self.connecting_from = None;
        }
    }
}

/// Anchor used as a connection endpoint for `bounds` of the given type.
#[must_use]
pub fn connection_point_for(kind: ElementType, bounds: &Bounds) -> Point {
    match kind {
        ElementType::Chat => Point::new(bounds.left(), bounds.center_y()),
        ElementType::Content | ElementType::Text | ElementType::Collection => {
            Point::new(bounds.right(), bounds.center_y())
        }
    }
}

/// Anchor used as a connection endpoint for `el`.
#[must_use]
pub fn connection_point(el: &CanvasElement) -> Point {
    connection_point_for(el.element_type(), &el.bounds)
}

/// A cubic bezier in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierPath {
    pub start: Point,
    pub c1: Point,
    pub c2: Point,
    pub end: Point,
}

impl BezierPath {
    /// S-curve between two endpoints with horizontal tangents.
    #[must_use]
    pub fn between(start: Point, end: Point) -> Self {
        let offset = ((end.x - start.x).abs() * CURVE_OFFSET_RATIO).min(CURVE_OFFSET_MAX);
        Self {
            start,
            c1: Point::new(start.x + offset, start.y),
            c2: Point::new(end.x - offset, end.y),
            end,
        }
    }

    /// Point at parameter `t` in `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point {
        let u = 1.0 - t;
        let a = u * u * u;
        let b = 3.0 * u * u * t;
        let c = 3.0 * u * t * t;
        let d = t * t * t;
        Point::new(
            a * self.start.x + b * self.c1.x + c * self.c2.x + d * self.end.x,
            a * self.start.y + b * self.c1.y + c * self.c2.y + d * self.end.y,
        )
    }

    /// Bounding box of the control polygon; always contains the curve.
    #[must_use]
    pub fn hull_bounds(&self) -> Bounds {
        let xs = [self.start.x, self.c1.x, self.c2.x, self.end.x];
        let ys = [self.start.y, self.c1.y, self.c2.y, self.end.y];
        let min_x = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let max_x = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min_y = ys.iter().copied().fold(f64::INFINITY, f64::min);
        let max_y = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Bounds::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Approximate distance from `p` to the curve, via a flattened polyline.
    #[must_use]
    pub fn distance_to(&self, p: Point) -> f64 {
        let mut prev = self.start;
        let mut best = f64::INFINITY;
        #[allow(clippy::cast_precision_loss)]
        for i in 1..=CURVE_HIT_SAMPLES {
            let next = self.point_at(i as f64 / CURVE_HIT_SAMPLES as f64);
            best = best.min(segment_distance(p, prev, next));
            prev = next;
        }
        best
    }
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq <= f64::EPSILON {
        return p.distance_sq(a).sqrt();
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    p.distance_sq(Point::new(a.x + abx * t, a.y + aby * t)).sqrt()
}

/// Curve for a connection between two elements.
#[must_use]
pub fn connection_path(from: &CanvasElement, to: &CanvasElement) -> BezierPath {
    BezierPath::between(connection_point(from), connection_point(to))
}
