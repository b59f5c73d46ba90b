//! Geometry primitives and the pan/zoom viewport.
//!
//! All functions here are pure. The only stateful concern is
//! [`Viewport::sanitized`], which replaces a corrupted viewport (non-finite
//! pan, non-positive zoom) with a last-known-good value supplied by the caller.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{FIT_MAX_ZOOM, FIT_PADDING_PX, MAX_ZOOM, MIN_ZOOM};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_sq(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Axis-aligned rectangle in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Build the rectangle spanned by two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self { x, y, width: (a.x - b.x).abs(), height: (a.y - b.y).abs() }
    }

    #[must_use]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.x + self.width * 0.5
    }

    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.y + self.height * 0.5
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.center_x(), self.center_y())
    }

    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn with_position(self, p: Point) -> Self {
        Self { x: p.x, y: p.y, ..self }
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Closed-interval overlap test; touching edges count as intersecting.
    #[must_use]
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.left() <= other.right()
            && other.left() <= self.right()
            && self.top() <= other.bottom()
            && other.top() <= self.bottom()
    }

    /// Grow the rectangle by `margin` on every side.
    #[must_use]
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + margin * 2.0,
            height: self.height + margin * 2.0,
        }
    }

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &Bounds) -> Self {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self { x: left, y: top, width: right - left, height: bottom - top }
    }
}

/// Pan/zoom state mapping world coordinates to screen pixels.
///
/// `x` / `y` are the screen-space pan offset in CSS pixels.
/// `zoom` is a scale factor (1.0 = no zoom) kept within [`MIN_ZOOM`, `MAX_ZOOM`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, zoom: 1.0 }
    }
}

impl Viewport {
    #[must_use]
    pub fn new(x: f64, y: f64, zoom: f64) -> Self {
        Self { x, y, zoom }
    }

    /// Convert a screen-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point { x: (screen.x - self.x) / self.zoom, y: (screen.y - self.y) / self.zoom }
    }

    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point { x: world.x * self.zoom + self.x, y: world.y * self.zoom + self.y }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Scale by `factor` around `focal` (screen space) so the world point under
    /// `focal` stays put. The resulting zoom is clamped to the allowed range.
    #[must_use]
    pub fn zoom_at(&self, focal: Point, factor: f64) -> Self {
        let new_zoom = clamp_zoom(self.zoom * factor);
        let ratio = new_zoom / self.zoom;
        Self {
            x: focal.x - (focal.x - self.x) * ratio,
            y: focal.y - (focal.y - self.y) * ratio,
            zoom: new_zoom,
        }
    }

    /// Shift the pan offset by a screen-space delta. Pan is not scaled by zoom.
    #[must_use]
    pub fn panned(&self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy, zoom: self.zoom }
    }

    /// World-space rectangle visible in a `width` x `height` container.
    #[must_use]
    pub fn visible_world_bounds(&self, width: f64, height: f64) -> Bounds {
        let top_left = self.screen_to_world(Point::new(0.0, 0.0));
        let bottom_right = self.screen_to_world(Point::new(width, height));
        Bounds::from_corners(top_left, bottom_right)
    }

    /// World point at the center of a `width` x `height` container.
    #[must_use]
    pub fn world_center(&self, width: f64, height: f64) -> Point {
        self.screen_to_world(Point::new(width * 0.5, height * 0.5))
    }

    /// Whether every component is finite and zoom is positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.zoom.is_finite() && self.zoom > 0.0
    }

    /// Return `self` when valid, otherwise `fallback`.
    #[must_use]
    pub fn sanitized(self, fallback: Viewport) -> Self {
        if self.is_valid() {
            self
        } else {
            log::warn!("non-finite viewport {self:?} replaced with {fallback:?}");
            fallback
        }
    }

    /// Viewport that centers `content` inside a `width` x `height` container.
    ///
    /// Returns `None` for degenerate input (empty container).
    #[must_use]
    pub fn fit_to(content: Bounds, width: f64, height: f64) -> Option<Self> {
        let avail_w = width - FIT_PADDING_PX * 2.0;
        let avail_h = height - FIT_PADDING_PX * 2.0;
        if avail_w <= 0.0 || avail_h <= 0.0 {
            return None;
        }
        let content_w = content.width.max(1.0);
        let content_h = content.height.max(1.0);
        let zoom = clamp_zoom((avail_w / content_w).min(avail_h / content_h).min(FIT_MAX_ZOOM));
        let center = content.center();
        Some(Self { x: width * 0.5 - center.x * zoom, y: height * 0.5 - center.y * zoom, zoom })
    }
}

/// Clamp a zoom factor into [`MIN_ZOOM`, `MAX_ZOOM`].
#[must_use]
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        return 1.0;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}
