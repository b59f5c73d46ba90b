use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Bounds, Point, Viewport};
use crate::connect::{ConnectStep, ConnectionManager};
use crate::consts::{SNAP_THRESHOLD, VISIBLE_PADDING_PX, WHEEL_ZOOM_SENSITIVITY};
use crate::content::{IngestEvent, apply_ingest_event, parse_content_url};
use crate::cull::VisibleCache;
use crate::doc::{
    CanvasElement, CanvasState, ChatData, CollectionData, Connection, ConnectionId, ContentData, DocStore, ElementData,
    ElementId, ElementPatch, ElementType, Platform, Removed, TextData, system_now_ms,
};
use crate::drag::{DragController, DragEnd, DragMode};
use crate::hit::{self, HitPart};
use crate::ids::{IdSource, RandomIds};
use crate::input::{Button, InputState, Key, Modifiers, Tool, UiState, WheelDelta};
use crate::render;
use crate::select::Selection;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone)]
pub enum Action {
    ElementCreated(CanvasElement),
    ElementUpdated { id: ElementId, patch: ElementPatch },
    /// Elements and the connections cascaded with them, for remote cleanup.
    ElementsDeleted(Removed),
    ConnectionCreated(Connection),
    ConnectionDeleted(Connection),
    SelectionChanged(Vec<ElementId>),
    ViewportChanged(Viewport),
    /// A content card needs remote ingestion of `url`.
    IngestRequested { id: ElementId, url: String },
    SetCursor(String),
    RenderNeeded,
}

/// Interaction tunables.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub snap_threshold: f64,
    pub snap_enabled: bool,
    /// Virtualization margin in screen pixels.
    pub visible_padding: f64,
    pub wheel_sensitivity: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap_threshold: SNAP_THRESHOLD,
            snap_enabled: true,
            visible_padding: VISIBLE_PADDING_PX,
            wheel_sensitivity: WHEEL_ZOOM_SENSITIVITY,
        }
    }
}

/// Core engine state — all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub doc: DocStore,
    pub viewport: Viewport,
    pub selection: Selection,
    pub drag: DragController,
    pub connect: ConnectionManager,
    pub ui: UiState,
    pub input: InputState,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
    pub config: EngineConfig,
    ids: Box<dyn IdSource>,
    visible: VisibleCache,
    cursor: &'static str,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_parts(DocStore::new(), Box::new(RandomIds), EngineConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an engine around an existing store and id source.
    #[must_use]
    pub fn with_parts(doc: DocStore, ids: Box<dyn IdSource>, config: EngineConfig) -> Self {
        Self {
            doc,
            viewport: Viewport::default(),
            selection: Selection::new(),
            drag: DragController::new(config.snap_threshold, config.snap_enabled),
            connect: ConnectionManager::new(),
            ui: UiState::default(),
            input: InputState::default(),
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
            config,
            ids,
            visible: VisibleCache::new(),
            cursor: "default",
        }
    }

    // --- Data inputs ---

    /// Hydrate from a persisted board. Transient interaction state is reset.
    pub fn load_snapshot(&mut self, state: CanvasState) {
        let viewport = self.doc.load(state);
        self.viewport = viewport.sanitized(Viewport::default());
        self.selection = Selection::new();
        self.drag = DragController::new(self.config.snap_threshold, self.config.snap_enabled);
        self.connect = ConnectionManager::new();
        self.ui = UiState::default();
        self.input = InputState::Idle;
        self.visible.invalidate();
    }

    /// Export the board in its persisted shape.
    #[must_use]
    pub fn snapshot(&self) -> CanvasState {
        self.doc.snapshot(self.viewport)
    }

    /// Apply a host-side edit (text, title, visibility, ...).
    pub fn apply_update(&mut self, id: &ElementId, patch: &ElementPatch) -> bool {
        self.doc.update_element(id, patch)
    }

    /// Fold an ingestion/analysis outcome into a content card.
    pub fn apply_ingest(&mut self, id: &ElementId, event: IngestEvent) -> bool {
        apply_ingest_event(&mut self.doc, id, event)
    }

    /// Add an element built by the host (search results, imports).
    ///
    /// It goes on top of the z-order; the caller's id is kept.
    ///
    /// # Errors
    ///
    /// Propagates `DocError::DuplicateId`.
    pub fn insert_element(&mut self, mut element: CanvasElement) -> Result<Action, crate::doc::DocError> {
        element.z_index = self.doc.next_z_index();
        self.doc.add_element(element.clone())?;
        let stored = self.doc.get(&element.id).cloned().unwrap_or(element);
        Ok(Action::ElementCreated(stored))
    }

    /// Mint an id from the engine's id source.
    pub fn next_id(&mut self) -> ElementId {
        self.ids.next_id()
    }

    /// Remove elements (and their connections) from every controller.
    pub fn delete_elements(&mut self, ids: &[ElementId]) -> Vec<Action> {
        let removed = self.doc.delete_elements(ids);
        if removed.is_empty() {
            return Vec::new();
        }
        let gone: Vec<ElementId> = removed.elements.iter().map(|e| e.id).collect();
        self.drag.forget(&gone);
        self.connect.forget(&gone);
        if let Some(conn) = self.ui.selected_connection
            && removed.connections.iter().any(|c| c.id == conn)
        {
            self.ui.selected_connection = None;
        }
        let mut actions = vec![Action::ElementsDeleted(removed)];
        if self.selection.remove(&gone) {
            actions.push(self.selection_changed());
        }
        if matches!(self.input, InputState::Manipulating) && !self.drag.is_dragging() {
            self.input = InputState::Idle;
            self.ui.guides.clear();
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Viewport ---

    /// Update container dimensions (CSS pixels) and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
        self.dpr = dpr;
    }

    /// Replace pan/zoom. Non-finite input keeps the last good viewport.
    pub fn set_view(&mut self, viewport: Viewport) -> Vec<Action> {
        self.apply_viewport(viewport)
    }

    fn apply_viewport(&mut self, proposed: Viewport) -> Vec<Action> {
        let next = proposed.sanitized(self.viewport);
        if next == self.viewport {
            return Vec::new();
        }
        self.viewport = next;
        vec![Action::ViewportChanged(next), Action::RenderNeeded]
    }

    /// Center all visible content, zooming out as needed (never past 1:1).
    pub fn fit_to_screen(&mut self) -> Vec<Action> {
        let Some(content) = self.doc.content_bounds() else {
            return Vec::new();
        };
        match Viewport::fit_to(content, self.viewport_width, self.viewport_height) {
            Some(vp) => self.apply_viewport(vp),
            None => Vec::new(),
        }
    }

    /// World point at the center of the container.
    #[must_use]
    pub fn view_center(&self) -> Point {
        self.viewport.world_center(self.viewport_width, self.viewport_height)
    }

    // --- Creation ---

    /// Drop a palette tool: the new element is centered in the view, not at the drop point.
    pub fn on_drop(&mut self, tool: Tool) -> Vec<Action> {
        let data = match tool.element_type() {
            ElementType::Content => ElementData::Content(ContentData::default()),
            ElementType::Chat => ElementData::Chat(ChatData::default()),
            ElementType::Text => ElementData::Text(TextData::default()),
            ElementType::Collection => ElementData::Collection(CollectionData::default()),
        };
        self.create_at_center(data)
    }

    /// Paste: a recognized content URL becomes a content card queued for ingestion.
    pub fn on_paste(&mut self, text: &str) -> Vec<Action> {
        let (url, platform) = match parse_content_url(text) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::debug!("paste ignored: {e}");
                return Vec::new();
            }
        };
        if platform == Platform::Unknown {
            log::debug!("paste ignored: unrecognized platform for {url}");
            return Vec::new();
        }
        let url = url.to_string();
        let data = ElementData::Content(ContentData { url: url.clone(), platform, ..Default::default() });
        let mut actions = self.create_at_center(data);
        if let Some(Action::ElementCreated(el)) = actions.first() {
            let id = el.id;
            actions.push(Action::IngestRequested { id, url });
        }
        actions
    }

    fn create_at_center(&mut self, data: ElementData) -> Vec<Action> {
        let id = self.ids.next_id();
        let element = CanvasElement::centered(id, data, self.view_center(), self.doc.now());
        let created = match self.insert_element(element) {
            Ok(action) => action,
            Err(e) => {
                log::warn!("element creation rejected: {e}");
                return Vec::new();
            }
        };
        let mut actions = vec![created];
        if self.selection.click(id, Modifiers::default(), self.doc.ids_in_order()) {
            actions.push(self.selection_changed());
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        match button {
            Button::Secondary => {
                if self.connect.cancel() {
                    return vec![Action::RenderNeeded];
                }
                Vec::new()
            }
            Button::Middle => {
                self.input = InputState::Panning { last_screen: screen_pt };
                self.set_cursor("grabbing")
            }
            Button::Primary => self.primary_down(screen_pt, modifiers),
        }
    }

    fn primary_down(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let world = self.viewport.screen_to_world(screen_pt);
        let hit = hit::hit_test(world, &self.doc, &self.viewport, self.selection.ids());

        let Some(hit) = hit else {
            return self.background_down(screen_pt, world, modifiers);
        };
        self.ui.selected_connection = None;

        if self.connect.is_connecting() || hit.part == HitPart::ConnectionPoint {
            return self.connect_click(hit.element_id);
        }

        let mut actions = Vec::new();
        let mode = match hit.part {
            HitPart::ResizeHandle(anchor) => DragMode::Resize(anchor),
            HitPart::Body | HitPart::ConnectionPoint => {
                if self.selection.click(hit.element_id, modifiers, self.doc.ids_in_order()) {
                    actions.push(self.selection_changed());
                }
                DragMode::Move
            }
        };

        let draggable = self.selection.contains(&hit.element_id)
            && self.doc.get(&hit.element_id).is_some_and(|el| !el.is_locked);
        if draggable {
            // Start before raising so a cancel can restore the stacking order.
            let started = self
                .doc
                .get(&hit.element_id)
                .is_some_and(|el| self.drag.on_pointer_down(el, mode, screen_pt));
            if self.doc.bring_to_front(&hit.element_id)
                && let Some(el) = self.doc.get(&hit.element_id)
            {
                actions.push(Action::ElementUpdated {
                    id: el.id,
                    patch: ElementPatch { z_index: Some(el.z_index), ..Default::default() },
                });
            }
            if started {
                self.input = InputState::Manipulating;
                if let DragMode::Resize(anchor) = mode {
                    actions.extend(self.set_cursor(anchor.cursor()));
                }
            }
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    fn connect_click(&mut self, id: ElementId) -> Vec<Action> {
        match self.connect.start_or_complete(id, self.ids.as_mut()) {
            ConnectStep::Started(_) | ConnectStep::SelfLoopRejected(_) => vec![Action::RenderNeeded],
            ConnectStep::Completed(conn) => match self.doc.add_connection(conn) {
                Ok(()) => vec![Action::ConnectionCreated(conn), Action::RenderNeeded],
                Err(e) => {
                    log::info!("connection rejected: {e}");
                    vec![Action::RenderNeeded]
                }
            },
        }
    }

    fn background_down(&mut self, screen_pt: Point, world: Point, modifiers: Modifiers) -> Vec<Action> {
        if let Some(conn) = hit::hit_connection(world, &self.doc, &self.viewport) {
            self.ui.selected_connection = Some(conn);
            return vec![Action::RenderNeeded];
        }

        let mut actions = Vec::new();
        let had_connection = self.ui.selected_connection.take().is_some();
        if self.connect.cancel() || had_connection {
            actions.push(Action::RenderNeeded);
        }

        if modifiers.shift {
            self.input = InputState::Marquee { anchor_world: world, additive: modifiers.toggle() };
            self.ui.marquee = Some(Bounds::from_corners(world, world));
            actions.push(Action::RenderNeeded);
            return actions;
        }

        if self.selection.clear() {
            actions.push(self.selection_changed());
            actions.push(Action::RenderNeeded);
        }
        self.input = InputState::Panning { last_screen: screen_pt };
        actions.extend(self.set_cursor("grabbing"));
        actions
    }

    /// Pointer moved. `now_ms` is a monotonic timestamp used to throttle store writes.
    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers, now_ms: f64) -> Vec<Action> {
        match self.input.clone() {
            InputState::Idle => self.hover(screen_pt),
            InputState::Panning { last_screen } => {
                self.input = InputState::Panning { last_screen: screen_pt };
                let vp = self
                    .viewport
                    .panned(screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
                self.apply_viewport(vp)
            }
            InputState::Manipulating => self.drag_move(screen_pt, now_ms),
            InputState::Marquee { anchor_world, .. } => {
                let world = self.viewport.screen_to_world(screen_pt);
                self.ui.marquee = Some(Bounds::from_corners(anchor_world, world));
                vec![Action::RenderNeeded]
            }
        }
    }

    fn drag_move(&mut self, screen_pt: Point, now_ms: f64) -> Vec<Action> {
        let active = self.drag.active_id();
        let others: Vec<Bounds> = self
            .visible_elements()
            .iter()
            .filter(|id| Some(**id) != active)
            .filter_map(|id| self.doc.get(id).map(|el| el.bounds))
            .collect();

        let Some(update) = self.drag.on_pointer_move(screen_pt, &self.viewport, now_ms, &others) else {
            return Vec::new();
        };
        self.ui.guides = update.guides;

        let mut actions = Vec::new();
        if let Some(bounds) = update.commit {
            let patch = ElementPatch::bounds(bounds);
            if self.doc.update_element(&update.element_id, &patch) {
                actions.push(Action::ElementUpdated { id: update.element_id, patch });
            }
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    fn hover(&mut self, screen_pt: Point) -> Vec<Action> {
        let world = self.viewport.screen_to_world(screen_pt);
        let cursor = match hit::hit_test(world, &self.doc, &self.viewport, self.selection.ids()) {
            Some(h) => match h.part {
                HitPart::ResizeHandle(anchor) => anchor.cursor(),
                HitPart::ConnectionPoint => "crosshair",
                HitPart::Body => "move",
            },
            None if self.connect.is_connecting() => "crosshair",
            None => "default",
        };
        self.set_cursor(cursor)
    }

    pub fn on_pointer_up(&mut self, _screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        match std::mem::take(&mut self.input) {
            InputState::Idle => return actions,
            InputState::Panning { .. } => {}
            InputState::Manipulating => {
                if let Some(DragEnd::Committed { element_id, bounds, changed: true }) = self.drag.on_pointer_up() {
                    let patch = ElementPatch::bounds(bounds);
                    if self.doc.update_element(&element_id, &patch) {
                        actions.push(Action::ElementUpdated { id: element_id, patch });
                    }
                }
                self.ui.guides.clear();
                actions.push(Action::RenderNeeded);
            }
            InputState::Marquee { additive, .. } => {
                if let Some(rect) = self.ui.marquee.take()
                    && self.selection.marquee(&rect, &self.doc, additive)
                {
                    actions.push(self.selection_changed());
                }
                actions.push(Action::RenderNeeded);
            }
        }
        actions.extend(self.set_cursor("default"));
        actions
    }

    /// Wheel zooms around the cursor unless the pointer is over an interactive
    /// child (scrollable chat, text editor) with no modifier held.
    pub fn on_wheel(
        &mut self,
        screen_pt: Point,
        delta: WheelDelta,
        modifiers: Modifiers,
        over_interactive: bool,
    ) -> Vec<Action> {
        if over_interactive && !modifiers.any() {
            return Vec::new();
        }
        let factor = (-delta.dy * self.config.wheel_sensitivity).exp();
        let vp = self.viewport.zoom_at(screen_pt, factor);
        self.apply_viewport(vp)
    }

    // --- Keyboard ---

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        if key.is("Delete") || key.is("Backspace") {
            return self.delete_selection();
        }
        if key.is("Escape") {
            return self.escape();
        }
        if key.is("a") && modifiers.toggle() {
            if self.selection.select_all(self.doc.ids_in_order()) {
                return vec![self.selection_changed(), Action::RenderNeeded];
            }
            return Vec::new();
        }
        Vec::new()
    }

    fn delete_selection(&mut self) -> Vec<Action> {
        if let Some(conn_id) = self.ui.selected_connection.take() {
            return match self.doc.remove_connection(&conn_id) {
                Some(conn) => vec![Action::ConnectionDeleted(conn), Action::RenderNeeded],
                None => Vec::new(),
            };
        }
        let ids = self.selection.ids().to_vec();
        self.delete_elements(&ids)
    }

    /// Delete one connection by id.
    pub fn delete_connection(&mut self, id: &ConnectionId) -> Vec<Action> {
        if self.ui.selected_connection == Some(*id) {
            self.ui.selected_connection = None;
        }
        match self.doc.remove_connection(id) {
            Some(conn) => vec![Action::ConnectionDeleted(conn), Action::RenderNeeded],
            None => Vec::new(),
        }
    }

    fn escape(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        let mut dirty = self.connect.cancel();

        if let Some(DragEnd::Cancelled { element_id, bounds, z_index }) = self.drag.cancel() {
            let patch = ElementPatch { z_index: Some(z_index), ..ElementPatch::bounds(bounds) };
            if self.doc.update_element(&element_id, &patch) {
                actions.push(Action::ElementUpdated { id: element_id, patch });
            }
            dirty = true;
        }
        if matches!(self.input, InputState::Manipulating | InputState::Marquee { .. }) {
            self.input = InputState::Idle;
            dirty = true;
        }
        self.ui.guides.clear();
        self.ui.marquee = None;
        if dirty {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    // --- Queries ---

    /// Ids to render this frame, in paint order. Memoized.
    pub fn visible_elements(&mut self) -> Vec<ElementId> {
        self.visible
            .get(
                &self.doc,
                &self.viewport,
                self.viewport_width,
                self.viewport_height,
                self.config.visible_padding,
            )
            .to_vec()
    }

    /// Bounds to draw for `id`: the drag overlay when it is being dragged.
    #[must_use]
    pub fn display_bounds(&self, id: &ElementId) -> Option<Bounds> {
        self.drag
            .local_bounds(id)
            .or_else(|| self.doc.get(id).map(|el| el.bounds))
    }

    #[must_use]
    pub fn selected(&self) -> &[ElementId] {
        self.selection.ids()
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&CanvasElement> {
        self.doc.get(id)
    }

    #[must_use]
    pub fn cursor(&self) -> &'static str {
        self.cursor
    }

    fn selection_changed(&self) -> Action {
        Action::SelectionChanged(self.selection.ids().to_vec())
    }

    fn set_cursor(&mut self, cursor: &'static str) -> Vec<Action> {
        if self.cursor == cursor {
            return Vec::new();
        }
        self.cursor = cursor;
        vec![Action::SetCursor(cursor.to_owned())]
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        let doc = DocStore::with_clock(system_now_ms);
        Self { canvas, core: EngineCore::with_parts(doc, Box::new(RandomIds), EngineConfig::default()) }
    }

    pub fn load_snapshot(&mut self, state: CanvasState) {
        self.core.load_snapshot(state);
    }

    /// Resize the backing store to match CSS size times device pixel ratio.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.set_viewport(width_css, height_css, dpr);
        self.canvas.set_width((width_css * dpr).round().max(0.0) as u32);
        self.canvas.set_height((height_css * dpr).round().max(0.0) as u32);
    }

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers, now_ms: f64) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt, modifiers, now_ms)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button, modifiers)
    }

    pub fn on_wheel(
        &mut self,
        screen_pt: Point,
        delta: WheelDelta,
        modifiers: Modifiers,
        over_interactive: bool,
    ) -> Vec<Action> {
        self.core.on_wheel(screen_pt, delta, modifiers, over_interactive)
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    pub fn on_drop(&mut self, tool: Tool) -> Vec<Action> {
        self.core.on_drop(tool)
    }

    pub fn on_paste(&mut self, text: &str) -> Vec<Action> {
        self.core.on_paste(text)
    }

    pub fn fit_to_screen(&mut self) -> Vec<Action> {
        self.core.fit_to_screen()
    }

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the 2D context is unavailable or a draw call fails.
    pub fn render(&mut self) -> Result<(), JsValue> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let visible = self.core.visible_elements();
        render::draw(&ctx, &self.core, &visible)
    }
}
