#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::doc::{ElementData, TextData};

fn text_el(x: f64, y: f64) -> CanvasElement {
    CanvasElement::new(Uuid::from_u128(1), ElementData::Text(TextData::default()), Point::new(x, y), 0)
}

fn no_snap() -> DragController {
    DragController::new(SNAP_THRESHOLD, false)
}

// =============================================================
// Move
// =============================================================

#[test]
fn delta_is_scaled_by_zoom() {
    let mut drag = no_snap();
    let el = text_el(0.0, 0.0);
    assert!(drag.on_pointer_down(&el, DragMode::Move, Point::new(10.0, 10.0)));
    let vp = Viewport::new(0.0, 0.0, 0.5);
    let up = drag.on_pointer_move(Point::new(60.0, 40.0), &vp, 0.0, &[]).unwrap();
    assert_eq!(up.proposed.position(), Point::new(100.0, 60.0));
    assert_eq!(up.local.position(), Point::new(100.0, 60.0));
}

#[test]
fn second_pointer_down_is_ignored() {
    let mut drag = no_snap();
    let el = text_el(0.0, 0.0);
    drag.on_pointer_down(&el, DragMode::Move, Point::new(0.0, 0.0));
    let other = CanvasElement { id: Uuid::from_u128(2), ..text_el(500.0, 500.0) };
    assert!(!drag.on_pointer_down(&other, DragMode::Move, Point::new(0.0, 0.0)));
    assert_eq!(drag.active_id(), Some(el.id));
}

#[test]
fn move_without_drag_returns_none() {
    let mut drag = no_snap();
    assert!(drag.on_pointer_move(Point::new(1.0, 1.0), &Viewport::default(), 0.0, &[]).is_none());
}

#[test]
fn snapping_adjusts_local_but_not_proposed() {
    let mut drag = DragController::default();
    let el = CanvasElement { bounds: Bounds::new(500.0, 300.0, 100.0, 100.0), ..text_el(0.0, 0.0) };
    drag.on_pointer_down(&el, DragMode::Move, Point::new(0.0, 0.0));
    let neighbor = Bounds::new(0.0, 0.0, 100.0, 100.0);
    // Drag left edge to x=102, next to the neighbor's right edge at 100.
    let up = drag.on_pointer_move(Point::new(-398.0, 0.0), &Viewport::default(), 0.0, &[neighbor]).unwrap();
    assert_eq!(up.proposed.x, 102.0);
    assert_eq!(up.local.x, 100.0);
    assert_eq!(up.guides.len(), 1);
}

#[test]
fn local_bounds_overlay_only_for_active_element() {
    let mut drag = no_snap();
    let el = text_el(0.0, 0.0);
    drag.on_pointer_down(&el, DragMode::Move, Point::new(0.0, 0.0));
    drag.on_pointer_move(Point::new(5.0, 5.0), &Viewport::default(), 0.0, &[]);
    assert_eq!(drag.local_bounds(&el.id).map(|b| b.position()), Some(Point::new(5.0, 5.0)));
    assert!(drag.local_bounds(&Uuid::from_u128(9)).is_none());
}

// =============================================================
// Throttle
// =============================================================

#[test]
fn high_zoom_throttles_commits_within_interval() {
    let mut drag = no_snap();
    drag.on_pointer_down(&text_el(0.0, 0.0), DragMode::Move, Point::new(0.0, 0.0));
    let vp = Viewport::new(0.0, 0.0, 1.0);
    let first = drag.on_pointer_move(Point::new(1.0, 0.0), &vp, 100.0, &[]).unwrap();
    assert!(first.commit.is_some());
    let second = drag.on_pointer_move(Point::new(2.0, 0.0), &vp, 105.0, &[]).unwrap();
    assert!(second.commit.is_none());
    assert_eq!(second.local.x, 2.0);
    let third = drag.on_pointer_move(Point::new(3.0, 0.0), &vp, 116.0, &[]).unwrap();
    assert_eq!(third.commit.map(|b| b.x), Some(3.0));
}

#[test]
fn low_zoom_commits_every_move() {
    let mut drag = no_snap();
    drag.on_pointer_down(&text_el(0.0, 0.0), DragMode::Move, Point::new(0.0, 0.0));
    let vp = Viewport::new(0.0, 0.0, 0.75);
    assert!(drag.on_pointer_move(Point::new(1.0, 0.0), &vp, 100.0, &[]).unwrap().commit.is_some());
    assert!(drag.on_pointer_move(Point::new(2.0, 0.0), &vp, 101.0, &[]).unwrap().commit.is_some());
}

#[test]
fn unchanged_bounds_are_not_recommitted() {
    let mut drag = no_snap();
    drag.on_pointer_down(&text_el(0.0, 0.0), DragMode::Move, Point::new(0.0, 0.0));
    let vp = Viewport::new(0.0, 0.0, 0.5);
    assert!(drag.on_pointer_move(Point::new(0.0, 0.0), &vp, 0.0, &[]).unwrap().commit.is_none());
}

// =============================================================
// End
// =============================================================

#[test]
fn pointer_up_commits_final_local_bounds() {
    let mut drag = no_snap();
    let el = text_el(0.0, 0.0);
    drag.on_pointer_down(&el, DragMode::Move, Point::new(0.0, 0.0));
    let vp = Viewport::new(0.0, 0.0, 2.0);
    drag.on_pointer_move(Point::new(10.0, 0.0), &vp, 0.0, &[]);
    drag.on_pointer_move(Point::new(20.0, 0.0), &vp, 1.0, &[]);
    let end = drag.on_pointer_up().unwrap();
    assert_eq!(
        end,
        DragEnd::Committed { element_id: el.id, bounds: Bounds::new(10.0, 0.0, 300.0, 200.0), changed: true }
    );
    assert!(!drag.is_dragging());
}

#[test]
fn click_without_move_reports_unchanged() {
    let mut drag = no_snap();
    drag.on_pointer_down(&text_el(3.0, 4.0), DragMode::Move, Point::new(0.0, 0.0));
    let Some(DragEnd::Committed { changed, .. }) = drag.on_pointer_up() else {
        panic!("expected commit");
    };
    assert!(!changed);
}

#[test]
fn cancel_restores_start_bounds() {
    let mut drag = no_snap();
    let el = text_el(7.0, 8.0);
    drag.on_pointer_down(&el, DragMode::Move, Point::new(0.0, 0.0));
    drag.on_pointer_move(Point::new(100.0, 100.0), &Viewport::default(), 0.0, &[]);
    assert_eq!(drag.cancel(), Some(DragEnd::Cancelled { element_id: el.id, bounds: el.bounds, z_index: el.z_index }));
    assert!(drag.cancel().is_none());
}

#[test]
fn forget_drops_deleted_element() {
    let mut drag = no_snap();
    let el = text_el(0.0, 0.0);
    drag.on_pointer_down(&el, DragMode::Move, Point::new(0.0, 0.0));
    drag.forget(&[el.id]);
    assert!(drag.on_pointer_up().is_none());
}

// =============================================================
// Resize
// =============================================================

#[test]
fn resize_east_grows_width() {
    let b = Bounds::new(0.0, 0.0, 300.0, 200.0);
    let r = resize_bounds(&b, ResizeAnchor::E, 50.0, 999.0, ElementType::Text);
    assert_eq!(r, Bounds::new(0.0, 0.0, 350.0, 200.0));
}

#[test]
fn resize_north_west_keeps_opposite_corner() {
    let b = Bounds::new(100.0, 100.0, 300.0, 200.0);
    let r = resize_bounds(&b, ResizeAnchor::Nw, 20.0, 30.0, ElementType::Text);
    assert_eq!(r, Bounds::new(120.0, 130.0, 280.0, 170.0));
    assert_eq!(r.right(), b.right());
    assert_eq!(r.bottom(), b.bottom());
}

#[test]
fn resize_clamps_to_minimum_from_fixed_edge() {
    let b = Bounds::new(0.0, 0.0, 300.0, 200.0);
    let r = resize_bounds(&b, ResizeAnchor::W, 1000.0, 0.0, ElementType::Text);
    assert_eq!(r.width, 100.0);
    assert_eq!(r.right(), 300.0);
}

#[test]
fn resize_drag_snaps_moving_edge() {
    let mut drag = DragController::default();
    let el = CanvasElement { bounds: Bounds::new(0.0, 300.0, 300.0, 200.0), ..text_el(0.0, 0.0) };
    drag.on_pointer_down(&el, DragMode::Resize(ResizeAnchor::E), Point::new(300.0, 400.0));
    let neighbor = Bounds::new(400.0, 0.0, 100.0, 100.0);
    // Right edge to 396; neighbor's left edge at 400 is within threshold.
    let up = drag.on_pointer_move(Point::new(396.0, 400.0), &Viewport::default(), 0.0, &[neighbor]).unwrap();
    assert_eq!(up.proposed.right(), 396.0);
    assert_eq!(up.local, Bounds::new(0.0, 300.0, 400.0, 200.0));
}
