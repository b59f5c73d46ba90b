//! Rendering: draws the visible part of the board to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It reads engine state and produces pixels; it never mutates the board.
//! Only ids from the virtualized visible set are drawn. Elements under an
//! active drag are drawn at their overlay bounds.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

use std::collections::HashSet;
use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::align::{Guide, GuideKind};
use crate::camera::{Bounds, Point};
use crate::connect::{BezierPath, connection_point_for};
use crate::consts::HANDLE_RADIUS_PX;
use crate::doc::{CanvasElement, ChatData, CollectionData, Connection, ContentData, ElementData, ElementId, TextData};
use crate::engine::EngineCore;
use crate::hit::ResizeAnchor;

/// Selection dash segment length in screen pixels.
const SELECTION_DASH_PX: f64 = 4.0;

const ACCENT: &str = "#1E90FF";
const GUIDE_COLOR: &str = "#FF3B81";
const CARD_FILL: &str = "#FFFFFF";
const CARD_STROKE: &str = "#D4D4D8";
const INK: &str = "#1F1A17";
const MUTED_INK: &str = "#71717A";
const ERROR_INK: &str = "#DC2626";

/// Header band height for panels and collections, in world units.
const HEADER_H: f64 = 32.0;

/// Draw the full scene: connections, elements, guides, and selection UI.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(ctx: &CanvasRenderingContext2d, core: &EngineCore, visible: &[ElementId]) -> Result<(), JsValue> {
    let vp = core.viewport;
    let dpr = core.dpr;

    // Layer 1: clear and set up transforms.
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, core.viewport_width, core.viewport_height);
    ctx.translate(vp.x, vp.y)?;
    ctx.scale(vp.zoom, vp.zoom)?;

    // Layer 2: connections under elements.
    let visible_set: HashSet<ElementId> = visible.iter().copied().collect();
    for conn in core.doc.connections() {
        if !visible_set.contains(&conn.from) && !visible_set.contains(&conn.to) {
            continue;
        }
        let selected = core.ui.selected_connection == Some(conn.id);
        draw_connection(ctx, core, conn, selected, vp.zoom);
    }

    // Layer 3: elements in paint order.
    for id in visible {
        let (Some(el), Some(bounds)) = (core.doc.get(id), core.display_bounds(id)) else {
            continue;
        };
        draw_element(ctx, el, &bounds, vp.zoom)?;
    }

    // Layer 4: snap guides.
    for guide in &core.ui.guides {
        draw_guide(ctx, guide, vp.zoom);
    }

    // Layer 5: selection UI.
    let selected = core.selection.ids();
    let show_handles = selected.len() == 1;
    for id in selected {
        let (Some(el), Some(bounds)) = (core.doc.get(id), core.display_bounds(id)) else {
            continue;
        };
        draw_selection(ctx, &bounds, vp.zoom, show_handles && !el.is_locked)?;
    }

    if let Some(from) = core.connect.connecting_from()
        && let (Some(el), Some(bounds)) = (core.doc.get(&from), core.display_bounds(&from))
    {
        let p = connection_point_for(el.element_type(), &bounds);
        draw_connect_source(ctx, p, vp.zoom)?;
    }

    if let Some(m) = core.ui.marquee {
        draw_marquee(ctx, m, vp.zoom)?;
    }

    Ok(())
}

// =============================================================
// Element dispatch
// =============================================================

fn draw_element(ctx: &CanvasRenderingContext2d, el: &CanvasElement, b: &Bounds, zoom: f64) -> Result<(), JsValue> {
    match &el.data {
        ElementData::Content(c) => draw_content(ctx, c, b, zoom),
        ElementData::Chat(c) => draw_chat(ctx, c, b, zoom),
        ElementData::Text(t) => draw_text_note(ctx, t, b, zoom),
        ElementData::Collection(c) => draw_collection(ctx, c, b, zoom),
    }
}

fn draw_card_frame(ctx: &CanvasRenderingContext2d, b: &Bounds, fill: &str, zoom: f64) {
    ctx.set_fill_style_str(fill);
    ctx.fill_rect(b.x, b.y, b.width, b.height);
    ctx.set_stroke_style_str(CARD_STROKE);
    ctx.set_line_width(1.0 / zoom);
    ctx.stroke_rect(b.x, b.y, b.width, b.height);
}

fn draw_content(ctx: &CanvasRenderingContext2d, c: &ContentData, b: &Bounds, zoom: f64) -> Result<(), JsValue> {
    ctx.save();
    draw_card_frame(ctx, b, CARD_FILL, zoom);

    // Thumbnail placeholder; the host overlays the real image.
    let thumb_h = b.height * 0.6;
    ctx.set_fill_style_str("#F4F4F5");
    ctx.fill_rect(b.x, b.y, b.width, thumb_h);

    let max_w = (b.width - 24.0).max(1.0);
    ctx.set_text_align("left");
    ctx.set_text_baseline("top");

    ctx.set_fill_style_str(MUTED_INK);
    ctx.set_font("12px sans-serif");
    ctx.fill_text(c.platform.as_str(), b.x + 12.0, b.y + thumb_h + 10.0)?;

    let title = if c.title.is_empty() { c.url.as_str() } else { c.title.as_str() };
    ctx.set_fill_style_str(INK);
    ctx.set_font("15px sans-serif");
    let title_fit = fit_text_with_ellipsis(ctx, title, max_w);
    ctx.fill_text(&title_fit, b.x + 12.0, b.y + thumb_h + 30.0)?;

    let meta = &c.metadata;
    let (status, color) = if let Some(err) = meta.scraping_error.as_deref().or(meta.analysis_error.as_deref()) {
        (format!("Error: {err}"), ERROR_INK)
    } else if meta.is_scraping {
        ("Ingesting...".to_owned(), MUTED_INK)
    } else if meta.is_analyzing {
        ("Analyzing...".to_owned(), MUTED_INK)
    } else if meta.is_analyzed {
        ("Analyzed".to_owned(), MUTED_INK)
    } else {
        (String::new(), MUTED_INK)
    };
    if !status.is_empty() {
        ctx.set_fill_style_str(color);
        ctx.set_font("12px sans-serif");
        let status_fit = fit_text_with_ellipsis(ctx, &status, max_w);
        ctx.fill_text(&status_fit, b.x + 12.0, b.bottom() - 24.0)?;
    }

    ctx.restore();
    Ok(())
}

fn draw_chat(ctx: &CanvasRenderingContext2d, c: &ChatData, b: &Bounds, zoom: f64) -> Result<(), JsValue> {
    ctx.save();
    draw_card_frame(ctx, b, CARD_FILL, zoom);
    ctx.set_fill_style_str("#EEF2FF");
    ctx.fill_rect(b.x, b.y, b.width, HEADER_H);

    ctx.set_text_align("left");
    ctx.set_text_baseline("middle");
    ctx.set_fill_style_str(INK);
    ctx.set_font("14px sans-serif");
    let title = c
        .conversations
        .last()
        .map_or("New chat", |conv| if conv.title.is_empty() { "Chat" } else { conv.title.as_str() });
    ctx.fill_text(title, b.x + 12.0, b.y + HEADER_H * 0.5)?;

    let count = c.conversations.last().map_or(0, |conv| conv.messages.len());
    ctx.set_fill_style_str(MUTED_INK);
    ctx.set_font("12px sans-serif");
    ctx.fill_text(&format!("{count} messages"), b.x + 12.0, b.y + HEADER_H + 18.0)?;

    ctx.restore();
    Ok(())
}

fn draw_text_note(ctx: &CanvasRenderingContext2d, t: &TextData, b: &Bounds, zoom: f64) -> Result<(), JsValue> {
    ctx.save();
    draw_card_frame(ctx, b, "#FEF9C3", zoom);

    if !t.content.is_empty() {
        let font_size = 16.0;
        let line_height = font_size * 1.25;
        ctx.set_fill_style_str(INK);
        ctx.set_text_align("left");
        ctx.set_text_baseline("top");
        ctx.set_font(&format!("{font_size}px sans-serif"));

        let max_w = (b.width - 24.0).max(1.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let max_lines = (((b.height - 24.0) / line_height).floor() as usize).max(1);
        let mut lines = wrap_text_lines(ctx, &t.content, max_w);
        if lines.len() > max_lines {
            lines.truncate(max_lines);
            if let Some(last) = lines.last_mut() {
                *last = fit_text_with_ellipsis(ctx, &format!("{last}..."), max_w);
            }
        }
        let mut y = b.y + 12.0;
        for line in &lines {
            ctx.fill_text(line, b.x + 12.0, y)?;
            y += line_height;
        }
    }

    ctx.restore();
    Ok(())
}

fn draw_collection(ctx: &CanvasRenderingContext2d, c: &CollectionData, b: &Bounds, zoom: f64) -> Result<(), JsValue> {
    ctx.save();

    // Body fill is subtle so grouped elements remain visible.
    ctx.set_global_alpha(0.08);
    ctx.set_fill_style_str(&c.color);
    ctx.fill_rect(b.x, b.y, b.width, b.height);
    ctx.set_global_alpha(1.0);

    ctx.set_stroke_style_str(&c.color);
    ctx.set_line_width(2.0 / zoom);
    ctx.stroke_rect(b.x, b.y, b.width, b.height);

    ctx.set_fill_style_str(&c.color);
    ctx.fill_rect(b.x, b.y, b.width, HEADER_H);

    ctx.set_fill_style_str("#FFFFFF");
    ctx.set_text_align("left");
    ctx.set_text_baseline("middle");
    ctx.set_font("14px sans-serif");
    let label = format!("{} ({})", c.name, c.child_ids.len());
    let label_fit = fit_text_with_ellipsis(ctx, &label, (b.width - 24.0).max(1.0));
    ctx.fill_text(&label_fit, b.x + 12.0, b.y + HEADER_H * 0.5)?;

    ctx.restore();
    Ok(())
}

// =============================================================
// Connections and guides
// =============================================================

fn draw_connection(ctx: &CanvasRenderingContext2d, core: &EngineCore, conn: &Connection, selected: bool, zoom: f64) {
    let (Some(from), Some(to)) = (core.doc.get(&conn.from), core.doc.get(&conn.to)) else {
        return;
    };
    if !from.is_visible || !to.is_visible {
        return;
    }
    let (Some(fb), Some(tb)) = (core.display_bounds(&conn.from), core.display_bounds(&conn.to)) else {
        return;
    };
    let path = BezierPath::between(
        connection_point_for(from.element_type(), &fb),
        connection_point_for(to.element_type(), &tb),
    );

    ctx.save();
    ctx.set_stroke_style_str(if selected { ACCENT } else { "#A1A1AA" });
    ctx.set_line_width((if selected { 3.0 } else { 2.0 }) / zoom);
    ctx.begin_path();
    ctx.move_to(path.start.x, path.start.y);
    ctx.bezier_curve_to(path.c1.x, path.c1.y, path.c2.x, path.c2.y, path.end.x, path.end.y);
    ctx.stroke();
    ctx.restore();
}

fn draw_guide(ctx: &CanvasRenderingContext2d, guide: &Guide, zoom: f64) {
    ctx.save();
    ctx.set_stroke_style_str(GUIDE_COLOR);
    ctx.set_line_width(1.0 / zoom);
    ctx.begin_path();
    match guide.kind {
        GuideKind::Vertical => {
            ctx.move_to(guide.position, guide.start);
            ctx.line_to(guide.position, guide.end);
        }
        GuideKind::Horizontal => {
            ctx.move_to(guide.start, guide.position);
            ctx.line_to(guide.end, guide.position);
        }
    }
    ctx.stroke();
    ctx.restore();
}

// =============================================================
// Text layout
// =============================================================

fn wrap_text_lines(ctx: &CanvasRenderingContext2d, text: &str, max_w: f64) -> Vec<String> {
    let mut out = Vec::new();
    for raw_line in text.lines() {
        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            let candidate = if current.is_empty() { word.to_owned() } else { format!("{current} {word}") };
            if current.is_empty() || measured_text_width(ctx, &candidate) <= max_w {
                current = candidate;
            } else {
                out.push(std::mem::replace(&mut current, word.to_owned()));
            }
        }
        out.push(current);
    }
    out
}

fn fit_text_with_ellipsis(ctx: &CanvasRenderingContext2d, text: &str, max_w: f64) -> String {
    let trimmed = text.trim();
    if measured_text_width(ctx, trimmed) <= max_w {
        return trimmed.to_owned();
    }
    let mut chars: Vec<char> = trimmed.chars().collect();
    while chars.pop().is_some() {
        let candidate = format!("{}...", chars.iter().collect::<String>().trim_end());
        if measured_text_width(ctx, &candidate) <= max_w {
            return candidate;
        }
    }
    "...".to_owned()
}

fn measured_text_width(ctx: &CanvasRenderingContext2d, text: &str) -> f64 {
    match ctx.measure_text(text) {
        Ok(metrics) => metrics.width(),
        Err(_) => f64::INFINITY,
    }
}

// =============================================================
// Selection UI
// =============================================================

fn set_dashed(ctx: &CanvasRenderingContext2d, zoom: f64) -> Result<(), JsValue> {
    let dash_world = SELECTION_DASH_PX / zoom;
    let dash_array = js_sys::Array::new();
    dash_array.push(&dash_world.into());
    dash_array.push(&dash_world.into());
    ctx.set_line_dash(&dash_array)
}

fn draw_selection(ctx: &CanvasRenderingContext2d, b: &Bounds, zoom: f64, show_handles: bool) -> Result<(), JsValue> {
    ctx.save();
    ctx.set_stroke_style_str(ACCENT);
    ctx.set_line_width(1.0 / zoom);
    set_dashed(ctx, zoom)?;
    ctx.stroke_rect(b.x, b.y, b.width, b.height);
    ctx.set_line_dash(&js_sys::Array::new())?;

    if show_handles {
        let r = HANDLE_RADIUS_PX * 0.5 / zoom;
        ctx.set_fill_style_str("#fff");
        for anchor in ResizeAnchor::ALL {
            let p = anchor.handle_point(b);
            ctx.fill_rect(p.x - r, p.y - r, r * 2.0, r * 2.0);
            ctx.stroke_rect(p.x - r, p.y - r, r * 2.0, r * 2.0);
        }
    }

    ctx.restore();
    Ok(())
}

fn draw_connect_source(ctx: &CanvasRenderingContext2d, p: Point, zoom: f64) -> Result<(), JsValue> {
    ctx.save();
    ctx.begin_path();
    ctx.arc(p.x, p.y, HANDLE_RADIUS_PX / zoom, 0.0, 2.0 * PI)?;
    ctx.set_fill_style_str(ACCENT);
    ctx.fill();
    ctx.restore();
    Ok(())
}

fn draw_marquee(ctx: &CanvasRenderingContext2d, marquee: Bounds, zoom: f64) -> Result<(), JsValue> {
    ctx.save();
    set_dashed(ctx, zoom)?;
    ctx.set_stroke_style_str(ACCENT);
    ctx.set_fill_style_str("rgba(30, 144, 255, 0.12)");
    ctx.set_line_width(1.0 / zoom);
    ctx.fill_rect(marquee.x, marquee.y, marquee.width, marquee.height);
    ctx.stroke_rect(marquee.x, marquee.y, marquee.width, marquee.height);
    ctx.set_line_dash(&js_sys::Array::new())?;
    ctx.restore();
    Ok(())
}
