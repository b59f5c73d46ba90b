use uuid::Uuid;

use super::*;
use crate::doc::{CanvasElement, ChatData, Connection, ElementData, ElementPatch, TextData};

fn id(n: u128) -> ElementId {
    Uuid::from_u128(n)
}

fn text_at(doc: &mut DocStore, n: u128, x: f64, y: f64, z: i64) -> ElementId {
    let mut el = CanvasElement::new(id(n), ElementData::Text(TextData::default()), Point::new(x, y), 0);
    el.z_index = z;
    doc.add_element(el).unwrap();
    id(n)
}

// =============================================================
// ResizeAnchor
// =============================================================

#[test]
fn handle_points_sit_on_edges_and_corners() {
    let b = Bounds::new(0.0, 0.0, 100.0, 50.0);
    assert_eq!(ResizeAnchor::Nw.handle_point(&b), Point::new(0.0, 0.0));
    assert_eq!(ResizeAnchor::N.handle_point(&b), Point::new(50.0, 0.0));
    assert_eq!(ResizeAnchor::E.handle_point(&b), Point::new(100.0, 25.0));
    assert_eq!(ResizeAnchor::Se.handle_point(&b), Point::new(100.0, 50.0));
    assert_eq!(ResizeAnchor::Sw.handle_point(&b), Point::new(0.0, 50.0));
}

#[test]
fn side_handles_move_one_edge() {
    assert!(ResizeAnchor::E.moves_right());
    assert!(!ResizeAnchor::E.moves_top());
    assert!(!ResizeAnchor::E.moves_bottom());
    assert!(ResizeAnchor::N.moves_top());
    assert!(!ResizeAnchor::N.moves_left());
}

#[test]
fn snap_anchors_follow_moving_edges() {
    let a = ResizeAnchor::Se.snap_anchors();
    assert_eq!(a.x, AxisAnchors::END);
    assert_eq!(a.y, AxisAnchors::END);
    let a = ResizeAnchor::W.snap_anchors();
    assert_eq!(a.x, AxisAnchors::START);
    assert_eq!(a.y, AxisAnchors::NONE);
}

#[test]
fn opposite_corners_share_cursor() {
    assert_eq!(ResizeAnchor::Ne.cursor(), ResizeAnchor::Sw.cursor());
    assert_eq!(ResizeAnchor::Nw.cursor(), ResizeAnchor::Se.cursor());
    assert_ne!(ResizeAnchor::N.cursor(), ResizeAnchor::E.cursor());
}

// =============================================================
// hit_test
// =============================================================

#[test]
fn empty_board_hits_nothing() {
    let doc = DocStore::new();
    assert!(hit_test(Point::new(0.0, 0.0), &doc, &Viewport::default(), &[]).is_none());
}

#[test]
fn body_hit_inside_bounds() {
    let mut doc = DocStore::new();
    let a = text_at(&mut doc, 1, 0.0, 0.0, 0);
    let hit = hit_test(Point::new(50.0, 50.0), &doc, &Viewport::default(), &[]).unwrap();
    assert_eq!(hit, Hit { element_id: a, part: HitPart::Body });
}

#[test]
fn topmost_element_wins() {
    let mut doc = DocStore::new();
    let _low = text_at(&mut doc, 1, 0.0, 0.0, 5);
    let high = text_at(&mut doc, 2, 50.0, 50.0, 9);
    let hit = hit_test(Point::new(60.0, 60.0), &doc, &Viewport::default(), &[]).unwrap();
    assert_eq!(hit.element_id, high);
}

#[test]
fn selected_handle_beats_overlapping_body() {
    let mut doc = DocStore::new();
    let a = text_at(&mut doc, 1, 0.0, 0.0, 0);
    // b covers a's south-east corner and sits above it.
    let _b = text_at(&mut doc, 2, 250.0, 150.0, 1);
    let hit = hit_test(Point::new(301.0, 201.0), &doc, &Viewport::default(), &[a]).unwrap();
    assert_eq!(hit, Hit { element_id: a, part: HitPart::ResizeHandle(ResizeAnchor::Se) });
}

#[test]
fn handles_ignored_when_unselected() {
    let mut doc = DocStore::new();
    let a = text_at(&mut doc, 1, 0.0, 0.0, 0);
    let hit = hit_test(Point::new(1.0, 1.0), &doc, &Viewport::default(), &[]).unwrap();
    assert_eq!(hit, Hit { element_id: a, part: HitPart::Body });
}

#[test]
fn locked_element_has_no_handles() {
    let mut doc = DocStore::new();
    let a = text_at(&mut doc, 1, 0.0, 0.0, 0);
    doc.update_element(&a, &ElementPatch { is_locked: Some(true), ..Default::default() });
    let hit = hit_test(Point::new(0.0, 0.0), &doc, &Viewport::default(), &[a]).unwrap();
    assert_eq!(hit.part, HitPart::Body);
}

#[test]
fn handle_radius_scales_with_zoom() {
    let mut doc = DocStore::new();
    let a = text_at(&mut doc, 1, 0.0, 0.0, 0);
    // 8px at zoom 0.5 is 16 world units.
    let vp = Viewport::new(0.0, 0.0, 0.5);
    let hit = hit_test(Point::new(-10.0, -10.0), &doc, &vp, &[a]);
    assert_eq!(hit, Some(Hit { element_id: a, part: HitPart::ResizeHandle(ResizeAnchor::Nw) }));
    let hit = hit_test(Point::new(-10.0, -10.0), &doc, &Viewport::default(), &[a]);
    assert!(hit.is_none());
}

#[test]
fn connection_point_hit_on_right_edge() {
    let mut doc = DocStore::new();
    let a = text_at(&mut doc, 1, 0.0, 0.0, 0);
    let hit = hit_test(Point::new(302.0, 100.0), &doc, &Viewport::default(), &[]).unwrap();
    assert_eq!(hit, Hit { element_id: a, part: HitPart::ConnectionPoint });
}

#[test]
fn selected_connection_point_beats_east_handle() {
    let mut doc = DocStore::new();
    let a = text_at(&mut doc, 1, 0.0, 0.0, 0);
    let hit = hit_test(Point::new(300.0, 100.0), &doc, &Viewport::default(), &[a]).unwrap();
    assert_eq!(hit, Hit { element_id: a, part: HitPart::ConnectionPoint });
    // Other handles still resize.
    let hit = hit_test(Point::new(300.0, 200.0), &doc, &Viewport::default(), &[a]).unwrap();
    assert_eq!(hit.part, HitPart::ResizeHandle(ResizeAnchor::Se));
}

#[test]
fn selected_chat_connection_point_beats_west_handle() {
    let mut doc = DocStore::new();
    let chat = CanvasElement::new(id(2), ElementData::Chat(ChatData::default()), Point::new(0.0, 0.0), 0);
    let left_mid = Point::new(0.0, chat.bounds.center_y());
    doc.add_element(chat).unwrap();
    let hit = hit_test(left_mid, &doc, &Viewport::default(), &[id(2)]).unwrap();
    assert_eq!(hit, Hit { element_id: id(2), part: HitPart::ConnectionPoint });
}

#[test]
fn multi_selection_has_no_handles() {
    let mut doc = DocStore::new();
    let a = text_at(&mut doc, 1, 0.0, 0.0, 0);
    let b = text_at(&mut doc, 2, 500.0, 0.0, 0);
    let hit = hit_test(Point::new(300.0, 200.0), &doc, &Viewport::default(), &[a, b]).unwrap();
    assert_eq!(hit, Hit { element_id: a, part: HitPart::Body });
    assert!(hit_test(Point::new(-4.0, -4.0), &doc, &Viewport::default(), &[a, b]).is_none());
}

#[test]
fn hidden_elements_are_skipped() {
    let mut doc = DocStore::new();
    let a = text_at(&mut doc, 1, 0.0, 0.0, 0);
    doc.update_element(&a, &ElementPatch { is_visible: Some(false), ..Default::default() });
    assert!(hit_test(Point::new(50.0, 50.0), &doc, &Viewport::default(), &[a]).is_none());
}

// =============================================================
// hit_connection
// =============================================================

fn linked_board() -> (DocStore, ConnectionId) {
    let mut doc = DocStore::new();
    let a = text_at(&mut doc, 1, 0.0, 0.0, 0);
    let chat = CanvasElement::new(id(2), ElementData::Chat(ChatData::default()), Point::new(800.0, -200.0), 0);
    doc.add_element(chat).unwrap();
    let conn = Connection { id: id(99), from: a, to: id(2) };
    doc.add_connection(conn).unwrap();
    (doc, conn.id)
}

#[test]
fn pointer_on_curve_hits_connection() {
    let (doc, conn) = linked_board();
    let a = doc.get(&id(1)).unwrap();
    let b = doc.get(&id(2)).unwrap();
    let mid = connection_path(a, b).point_at(0.5);
    assert_eq!(hit_connection(mid, &doc, &Viewport::default()), Some(conn));
}

#[test]
fn pointer_far_from_curve_misses() {
    let (doc, _) = linked_board();
    assert!(hit_connection(Point::new(550.0, 600.0), &doc, &Viewport::default()).is_none());
}
