//! Alignment snapping for drag and resize.
//!
//! Given the moving element's proposed bounds and the bounds of every other
//! candidate element, find the closest edge/center alignment on each axis
//! within the snap threshold. The caller keeps its unsnapped coordinate on an
//! axis with no match. Guides describe the lines to draw for the winning
//! alignment; they are transient and recomputed every frame.
//!
//! Ties between equally distant candidates go to the first one encountered
//! (element order, then anchor order left/center/right). This is stable but
//! otherwise arbitrary.

#[cfg(test)]
#[path = "align_test.rs"]
mod align_test;

use serde::{Deserialize, Serialize};

use crate::camera::Bounds;
use crate::consts::SNAP_THRESHOLD;

/// Candidates closer than this to the winning delta share its guide.
const SAME_DELTA_EPSILON: f64 = 1e-6;

/// Orientation of a snap guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideKind {
    /// Constant x, spanning y from `start` to `end`.
    Vertical,
    /// Constant y, spanning x from `start` to `end`.
    Horizontal,
}

/// A snap line to render while dragging or resizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    #[serde(rename = "type")]
    pub kind: GuideKind,
    pub position: f64,
    pub start: f64,
    pub end: f64,
}

/// Which anchors of one axis of the moving element may snap.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisAnchors {
    pub start: bool,
    pub center: bool,
    pub end: bool,
}

impl AxisAnchors {
    pub const ALL: Self = Self { start: true, center: true, end: true };
    pub const NONE: Self = Self { start: false, center: false, end: false };
    pub const START: Self = Self { start: true, center: false, end: false };
    pub const END: Self = Self { start: false, center: false, end: true };
}

/// Anchors of the moving element that participate in snapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapAnchors {
    pub x: AxisAnchors,
    pub y: AxisAnchors,
}

impl SnapAnchors {
    /// Every edge and both centers: used while moving.
    pub const MOVE: Self = Self { x: AxisAnchors::ALL, y: AxisAnchors::ALL };
}

/// Tunables for one alignment query.
#[derive(Debug, Clone, Copy)]
pub struct AlignOptions {
    /// Maximum world-space distance at which an alignment snaps.
    pub threshold: f64,
    /// Only true while a drag or resize is active.
    pub enabled: bool,
    pub anchors: SnapAnchors,
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self { threshold: SNAP_THRESHOLD, enabled: true, anchors: SnapAnchors::MOVE }
    }
}

/// Snapped coordinates and guides. `None` on an axis means no snap there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignResult {
    /// New left edge of the moving element.
    pub snapped_x: Option<f64>,
    /// New top edge of the moving element.
    pub snapped_y: Option<f64>,
    pub guides: Vec<Guide>,
}

impl AlignResult {
    /// Horizontal correction relative to `moving`; zero when not snapped.
    #[must_use]
    pub fn dx(&self, moving: &Bounds) -> f64 {
        self.snapped_x.map_or(0.0, |x| x - moving.x)
    }

    /// Vertical correction relative to `moving`; zero when not snapped.
    #[must_use]
    pub fn dy(&self, moving: &Bounds) -> f64 {
        self.snapped_y.map_or(0.0, |y| y - moving.y)
    }
}

#[derive(Clone, Copy)]
struct Candidate {
    delta: f64,
    position: f64,
    other: usize,
}

fn anchors_of(lo: f64, size: f64) -> [f64; 3] {
    [lo, lo + size * 0.5, lo + size]
}

fn enabled_anchors(axis: AxisAnchors) -> [bool; 3] {
    [axis.start, axis.center, axis.end]
}

/// Every pairing on one axis within `threshold`, in iteration order.
fn axis_candidates(
    moving: [f64; 3],
    mask: AxisAnchors,
    others: &[[f64; 3]],
    threshold: f64,
) -> Vec<Candidate> {
    let enabled = enabled_anchors(mask);
    let mut out = Vec::new();
    for (other_idx, other) in others.iter().enumerate() {
        for (m_idx, m) in moving.iter().enumerate() {
            if !enabled[m_idx] {
                continue;
            }
            for o in other {
                let delta = o - m;
                if delta.abs() <= threshold {
                    out.push(Candidate { delta, position: *o, other: other_idx });
                }
            }
        }
    }
    out
}

fn best(candidates: &[Candidate]) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for c in candidates {
        match best {
            Some(b) if c.delta.abs() >= b.delta.abs() => {}
            _ => best = Some(*c),
        }
    }
    best
}

/// Compute snap corrections for `moving` against `others`.
#[must_use]
pub fn align(moving: &Bounds, others: &[Bounds], options: AlignOptions) -> AlignResult {
    if !options.enabled || others.is_empty() {
        return AlignResult::default();
    }

    let xs: Vec<[f64; 3]> = others.iter().map(|b| anchors_of(b.x, b.width)).collect();
    let ys: Vec<[f64; 3]> = others.iter().map(|b| anchors_of(b.y, b.height)).collect();

    let x_cands = axis_candidates(anchors_of(moving.x, moving.width), options.anchors.x, &xs, options.threshold);
    let y_cands = axis_candidates(anchors_of(moving.y, moving.height), options.anchors.y, &ys, options.threshold);

    let best_x = best(&x_cands);
    let best_y = best(&y_cands);

    let snapped = Bounds {
        x: moving.x + best_x.map_or(0.0, |c| c.delta),
        y: moving.y + best_y.map_or(0.0, |c| c.delta),
        ..*moving
    };

    let mut guides = Vec::new();
    if let Some(win) = best_x {
        collect_guides(&mut guides, GuideKind::Vertical, win.delta, &x_cands, |i| {
            span(snapped.top(), snapped.bottom(), others[i].top(), others[i].bottom())
        });
    }
    if let Some(win) = best_y {
        collect_guides(&mut guides, GuideKind::Horizontal, win.delta, &y_cands, |i| {
            span(snapped.left(), snapped.right(), others[i].left(), others[i].right())
        });
    }

    AlignResult { snapped_x: best_x.map(|_| snapped.x), snapped_y: best_y.map(|_| snapped.y), guides }
}

fn span(a_lo: f64, a_hi: f64, b_lo: f64, b_hi: f64) -> (f64, f64) {
    (a_lo.min(b_lo), a_hi.max(b_hi))
}

/// One guide per distinct position among candidates that agree with the winner.
/// Guides at the same position are merged into one spanning all of them.
fn collect_guides<F>(out: &mut Vec<Guide>, kind: GuideKind, win_delta: f64, cands: &[Candidate], extent: F)
where
    F: Fn(usize) -> (f64, f64),
{
    let first = out.len();
    for c in cands {
        if (c.delta - win_delta).abs() > SAME_DELTA_EPSILON {
            continue;
        }
        let (start, end) = extent(c.other);
        let existing = out[first..]
            .iter_mut()
            .find(|g| (g.position - c.position).abs() <= SAME_DELTA_EPSILON);
        if let Some(g) = existing {
            g.start = g.start.min(start);
            g.end = g.end.max(end);
        } else {
            out.push(Guide { kind, position: c.position, start, end });
        }
    }
}
