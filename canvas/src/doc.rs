//! Document model: canvas elements, connections, and the in-memory store.
//!
//! This module defines what lives on the board (`CanvasElement` with its
//! per-type payload `ElementData`), the directed links between elements
//! (`Connection`), a sparse-update type for incremental edits
//! (`ElementPatch`), the persisted board shape (`CanvasState`), and the
//! runtime store that owns all of it (`DocStore`).
//!
//! `DocStore` is the sole owner of element state. Controllers receive
//! read-only views and return proposed updates; only the store mutates. Every
//! mutation stamps `updated_at` and bumps a revision counter that persistence
//! and the visibility cache key off.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::{Bounds, Point, Viewport};

/// Unique identifier for a canvas element.
pub type ElementId = Uuid;

/// Unique identifier for a connection.
pub type ConnectionId = Uuid;

/// Errors raised by store operations that indicate a caller bug.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocError {
    #[error("element already exists: {0}")]
    DuplicateId(ElementId),
    #[error("element not found: {0}")]
    NotFound(ElementId),
    #[error("connection endpoints must differ: {0}")]
    SelfLoop(ElementId),
    #[error("connection already links {from} and {to}")]
    DuplicateConnection { from: ElementId, to: ElementId },
    #[error("element {0} is not a collection")]
    NotACollection(ElementId),
}

// =============================================================
// Element types
// =============================================================

/// Discriminant of [`ElementData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Content,
    Chat,
    Text,
    #[serde(alias = "folder")]
    Collection,
}

/// Width/height pair used by the sizing rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl ElementType {
    /// Size given to a freshly created element of this type.
    #[must_use]
    pub fn default_size(self) -> Size {
        match self {
            Self::Content => Size::new(320.0, 480.0),
            Self::Chat => Size::new(850.0, 600.0),
            Self::Text => Size::new(300.0, 200.0),
            Self::Collection => Size::new(400.0, 300.0),
        }
    }

    #[must_use]
    pub fn min_size(self) -> Size {
        match self {
            Self::Content => Size::new(200.0, 280.0),
            Self::Chat => Size::new(600.0, 400.0),
            Self::Text => Size::new(100.0, 60.0),
            Self::Collection => Size::new(200.0, 150.0),
        }
    }

    #[must_use]
    pub fn max_size(self) -> Option<Size> {
        match self {
            Self::Content => Some(Size::new(640.0, 960.0)),
            Self::Chat | Self::Text | Self::Collection => None,
        }
    }

    /// Clamp a proposed width/height into this type's limits.
    #[must_use]
    pub fn clamp_size(self, width: f64, height: f64) -> Size {
        let min = self.min_size();
        let mut w = width.max(min.width);
        let mut h = height.max(min.height);
        if let Some(max) = self.max_size() {
            w = w.min(max.width);
            h = h.min(max.height);
        }
        Size::new(w, h)
    }
}

/// Source platform of a content card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Youtube,
    Tiktok,
    #[default]
    Unknown,
}

impl Platform {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Youtube => "youtube",
            Self::Tiktok => "tiktok",
            Self::Unknown => "unknown",
        }
    }
}

/// Structured insights returned by the analysis collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Analysis {
    pub hook_analysis: String,
    pub body_analysis: String,
    pub cta_analysis: String,
    pub key_topics: Vec<String>,
    pub engagement_tactics: Vec<String>,
    pub sentiment: String,
    pub complexity: String,
}

/// Ingestion/analysis lifecycle and engagement numbers for a content card.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentMetadata {
    pub scrape_id: Option<String>,
    pub is_scraping: bool,
    pub is_scraped: bool,
    pub scraping_error: Option<String>,
    pub is_analyzing: bool,
    pub is_analyzed: bool,
    pub analysis_error: Option<String>,
    pub analysis_retry_count: u32,
    pub likes: u64,
    pub comments: u64,
    pub views: u64,
    pub caption: Option<String>,
    pub processed_data: Option<serde_json::Value>,
    pub analysis: Option<Analysis>,
}

/// A social-media content card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentData {
    pub url: String,
    pub platform: Platform,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub metadata: ContentMetadata,
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// An AI chat panel. Linked content comes from connections, not from this record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatData {
    #[serde(default)]
    pub conversations: Vec<Conversation>,
    #[serde(default)]
    pub model: String,
}

impl ChatData {
    /// Open a new, empty conversation and return its index.
    pub fn start_conversation(&mut self, id: Uuid, title: impl Into<String>) -> usize {
        self.conversations
            .push(Conversation { id, title: title.into(), messages: Vec::new() });
        self.conversations.len() - 1
    }

    /// Append to the most recent conversation. Returns false when there is none.
    pub fn append_message(&mut self, message: ChatMessage) -> bool {
        let Some(conv) = self.conversations.last_mut() else {
            return false;
        };
        conv.messages.push(message);
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextData {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub last_modified: i64,
}

/// A folder that visually groups other elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionData {
    pub name: String,
    #[serde(default = "default_collection_color")]
    pub color: String,
    #[serde(default)]
    pub child_ids: Vec<ElementId>,
    #[serde(default = "default_true")]
    pub is_expanded: bool,
}

impl Default for CollectionData {
    fn default() -> Self {
        Self { name: "Collection".into(), color: default_collection_color(), child_ids: Vec::new(), is_expanded: true }
    }
}

fn default_collection_color() -> String {
    "#6366F1".into()
}

fn default_true() -> bool {
    true
}

/// Per-type payload, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementData {
    Content(ContentData),
    Chat(ChatData),
    Text(TextData),
    #[serde(alias = "folder")]
    Collection(CollectionData),
}

impl ElementData {
    #[must_use]
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Content(_) => ElementType::Content,
            Self::Chat(_) => ElementType::Chat,
            Self::Text(_) => ElementType::Text,
            Self::Collection(_) => ElementType::Collection,
        }
    }
}

/// An element on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasElement {
    pub id: ElementId,
    #[serde(flatten)]
    pub data: ElementData,
    #[serde(flatten)]
    pub bounds: Bounds,
    #[serde(default)]
    pub z_index: i64,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default)]
    pub is_locked: bool,
}

impl CanvasElement {
    /// Build an element with its type's default size, top-left at `position`.
    #[must_use]
    pub fn new(id: ElementId, data: ElementData, position: Point, now: i64) -> Self {
        let size = data.element_type().default_size();
        Self {
            id,
            data,
            bounds: Bounds::new(position.x, position.y, size.width, size.height),
            z_index: 0,
            created_at: now,
            updated_at: now,
            is_visible: true,
            is_locked: false,
        }
    }

    /// Build an element with its type's default size, centered on `center`.
    #[must_use]
    pub fn centered(id: ElementId, data: ElementData, center: Point, now: i64) -> Self {
        let size = data.element_type().default_size();
        let origin = Point::new(center.x - size.width * 0.5, center.y - size.height * 0.5);
        Self::new(id, data, origin, now)
    }

    #[must_use]
    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    #[must_use]
    pub fn as_content(&self) -> Option<&ContentData> {
        match &self.data {
            ElementData::Content(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_content_mut(&mut self) -> Option<&mut ContentData> {
        match &mut self.data {
            ElementData::Content(c) => Some(c),
            _ => None,
        }
    }
}

/// A directed link between two elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub from: ElementId,
    pub to: ElementId,
}

impl Connection {
    #[must_use]
    pub fn touches(&self, id: &ElementId) -> bool {
        self.from == *id || self.to == *id
    }

    /// The opposite endpoint, if `id` is one of the two.
    #[must_use]
    pub fn other(&self, id: &ElementId) -> Option<ElementId> {
        if self.from == *id {
            Some(self.to)
        } else if self.to == *id {
            Some(self.from)
        } else {
            None
        }
    }

    fn same_pair(&self, from: &ElementId, to: &ElementId) -> bool {
        (self.from == *from && self.to == *to) || (self.from == *to && self.to == *from)
    }
}

/// Sparse update for an element. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,
    /// Body of a text element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Title of a content card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Name of a collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Color of a collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_expanded: Option<bool>,
}

impl ElementPatch {
    #[must_use]
    pub fn position(p: Point) -> Self {
        Self { x: Some(p.x), y: Some(p.y), ..Default::default() }
    }

    #[must_use]
    pub fn bounds(b: Bounds) -> Self {
        Self { x: Some(b.x), y: Some(b.y), width: Some(b.width), height: Some(b.height), ..Default::default() }
    }
}

/// Persisted board shape: elements by id, connections, and the last viewport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasState {
    #[serde(default)]
    pub elements: BTreeMap<ElementId, CanvasElement>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub viewport: Viewport,
}

/// Everything removed by a delete, for host-side cleanup.
#[derive(Debug, Clone, Default)]
pub struct Removed {
    pub elements: Vec<CanvasElement>,
    pub connections: Vec<Connection>,
}

impl Removed {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.connections.is_empty()
    }
}

/// Current wall-clock time in unix milliseconds.
#[must_use]
pub fn system_now_ms() -> i64 {
    #[cfg(target_arch = "wasm32")]
    {
        #[allow(clippy::cast_possible_truncation)]
        {
            js_sys::Date::now() as i64
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
    }
}

// =============================================================
// Store
// =============================================================

/// In-memory store of elements and connections.
pub struct DocStore {
    elements: HashMap<ElementId, CanvasElement>,
    /// Insertion order; drives range selection.
    order: Vec<ElementId>,
    connections: Vec<Connection>,
    revision: u64,
    clock: fn() -> i64,
}

impl DocStore {
    /// Create an empty store stamped by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(system_now_ms)
    }

    /// Create an empty store stamped by `clock`.
    #[must_use]
    pub fn with_clock(clock: fn() -> i64) -> Self {
        Self { elements: HashMap::new(), order: Vec::new(), connections: Vec::new(), revision: 0, clock }
    }

    /// Current time according to the store's clock.
    #[must_use]
    pub fn now(&self) -> i64 {
        (self.clock)()
    }

    /// Monotonic change counter. Bumped once per mutation or batch.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    // --- Elements ---

    /// Insert a new element. The caller supplies the id.
    ///
    /// Size is clamped into the element type's limits.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if an element with the same id already exists.
    pub fn add_element(&mut self, mut element: CanvasElement) -> Result<(), DocError> {
        if self.elements.contains_key(&element.id) {
            return Err(DocError::DuplicateId(element.id));
        }
        let size = element
            .element_type()
            .clamp_size(element.bounds.width, element.bounds.height);
        element.bounds.width = size.width;
        element.bounds.height = size.height;
        self.order.push(element.id);
        self.elements.insert(element.id, element);
        self.touch();
        Ok(())
    }

    /// Apply a sparse update. Unknown ids are a no-op and return false.
    pub fn update_element(&mut self, id: &ElementId, patch: &ElementPatch) -> bool {
        let now = self.now();
        let Some(el) = self.elements.get_mut(id) else {
            log::debug!("update for unknown element {id} ignored");
            return false;
        };
        if let Some(x) = patch.x {
            el.bounds.x = x;
        }
        if let Some(y) = patch.y {
            el.bounds.y = y;
        }
        if patch.width.is_some() || patch.height.is_some() {
            let size = el.element_type().clamp_size(
                patch.width.unwrap_or(el.bounds.width),
                patch.height.unwrap_or(el.bounds.height),
            );
            el.bounds.width = size.width;
            el.bounds.height = size.height;
        }
        if let Some(z) = patch.z_index {
            el.z_index = z;
        }
        if let Some(v) = patch.is_visible {
            el.is_visible = v;
        }
        if let Some(l) = patch.is_locked {
            el.is_locked = l;
        }
        match &mut el.data {
            ElementData::Text(t) => {
                if let Some(text) = &patch.text {
                    t.content.clone_from(text);
                    t.last_modified = now;
                }
            }
            ElementData::Content(c) => {
                if let Some(title) = &patch.title {
                    c.title.clone_from(title);
                }
            }
            ElementData::Collection(c) => {
                if let Some(name) = &patch.name {
                    c.name.clone_from(name);
                }
                if let Some(color) = &patch.color {
                    c.color.clone_from(color);
                }
                if let Some(expanded) = patch.is_expanded {
                    c.is_expanded = expanded;
                }
            }
            ElementData::Chat(_) => {}
        }
        el.updated_at = now;
        self.touch();
        true
    }

    /// Run `f` against an element. `f` reports whether it changed anything;
    /// only then are `updated_at` and the revision bumped.
    ///
    /// Returns false when the element does not exist or `f` changed nothing.
    pub fn modify<F>(&mut self, id: &ElementId, f: F) -> bool
    where
        F: FnOnce(&mut CanvasElement) -> bool,
    {
        let now = self.now();
        let Some(el) = self.elements.get_mut(id) else {
            return false;
        };
        if !f(el) {
            return false;
        }
        el.updated_at = now;
        self.touch();
        true
    }

    /// Remove one element and every connection touching it.
    pub fn delete_element(&mut self, id: &ElementId) -> Removed {
        self.delete_elements(std::slice::from_ref(id))
    }

    /// Remove several elements at once. Connections touching any of them are
    /// removed, and the ids are pruned from collections. One revision bump.
    pub fn delete_elements(&mut self, ids: &[ElementId]) -> Removed {
        let mut removed = Removed::default();
        for id in ids {
            if let Some(el) = self.elements.remove(id) {
                removed.elements.push(el);
            }
        }
        if removed.elements.is_empty() {
            return removed;
        }
        let gone: HashSet<ElementId> = removed.elements.iter().map(|e| e.id).collect();
        self.order.retain(|id| !gone.contains(id));

        let (dropped, kept): (Vec<Connection>, Vec<Connection>) = self
            .connections
            .drain(..)
            .partition(|c| gone.contains(&c.from) || gone.contains(&c.to));
        self.connections = kept;
        removed.connections = dropped;

        for el in self.elements.values_mut() {
            if let ElementData::Collection(c) = &mut el.data {
                c.child_ids.retain(|child| !gone.contains(child));
            }
        }
        self.touch();
        removed
    }

    /// Return a reference to an element by id.
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&CanvasElement> {
        self.elements.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// All elements in insertion order.
    #[must_use]
    pub fn all(&self) -> Vec<&CanvasElement> {
        self.order
            .iter()
            .filter_map(|id| self.elements.get(id))
            .collect()
    }

    /// Element ids in insertion order.
    #[must_use]
    pub fn ids_in_order(&self) -> &[ElementId] {
        &self.order
    }

    /// All elements sorted by `(z_index, insertion order)` for paint order.
    #[must_use]
    pub fn sorted_by_z(&self) -> Vec<&CanvasElement> {
        let mut els = self.all();
        // Stable sort keeps insertion order among equal z.
        els.sort_by_key(|e| e.z_index);
        els
    }

    /// One above the current maximum z-index (0 for an empty store).
    #[must_use]
    pub fn next_z_index(&self) -> i64 {
        self.elements
            .values()
            .map(|e| e.z_index)
            .max()
            .map_or(0, |z| z + 1)
    }

    /// Raise an element above every other. No-op if it is already on top.
    pub fn bring_to_front(&mut self, id: &ElementId) -> bool {
        let Some(current) = self.elements.get(id).map(|e| e.z_index) else {
            return false;
        };
        let top = self
            .elements
            .values()
            .filter(|e| e.id != *id)
            .map(|e| e.z_index)
            .max();
        match top {
            Some(top) if top >= current => {
                self.update_element(id, &ElementPatch { z_index: Some(top + 1), ..Default::default() })
            }
            _ => false,
        }
    }

    /// Bounding box of every visible element.
    #[must_use]
    pub fn content_bounds(&self) -> Option<Bounds> {
        self.elements
            .values()
            .filter(|e| e.is_visible)
            .map(|e| e.bounds)
            .reduce(|acc, b| acc.union(&b))
    }

    /// Number of elements currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the store contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    // --- Connections ---

    /// Add a connection between two existing, distinct elements.
    ///
    /// # Errors
    ///
    /// `SelfLoop` when `from == to`, `NotFound` for a missing endpoint,
    /// `DuplicateConnection` when the pair is already linked in either direction.
    pub fn add_connection(&mut self, connection: Connection) -> Result<(), DocError> {
        if connection.from == connection.to {
            return Err(DocError::SelfLoop(connection.from));
        }
        for end in [connection.from, connection.to] {
            if !self.elements.contains_key(&end) {
                return Err(DocError::NotFound(end));
            }
        }
        if self
            .connections
            .iter()
            .any(|c| c.same_pair(&connection.from, &connection.to))
        {
            return Err(DocError::DuplicateConnection { from: connection.from, to: connection.to });
        }
        self.connections.push(connection);
        self.touch();
        Ok(())
    }

    /// Remove a connection by id.
    pub fn remove_connection(&mut self, id: &ConnectionId) -> Option<Connection> {
        let idx = self.connections.iter().position(|c| c.id == *id)?;
        let conn = self.connections.remove(idx);
        self.touch();
        Some(conn)
    }

    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    #[must_use]
    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == *id)
    }

    /// Connections touching `id`, in either direction.
    pub fn connections_of<'a>(&'a self, id: &'a ElementId) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| c.touches(id))
    }

    /// Content elements linked to `id` by any connection, in connection order.
    #[must_use]
    pub fn connected_content_ids(&self, id: &ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        for other in self.connections_of(id).filter_map(|c| c.other(id)) {
            let is_content = self
                .elements
                .get(&other)
                .is_some_and(|e| e.element_type() == ElementType::Content);
            if is_content && !out.contains(&other) {
                out.push(other);
            }
        }
        out
    }

    // --- Collections ---

    /// Append `child` to a collection's members (no duplicates).
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing id, `NotACollection` when `collection` has another type,
    /// `SelfLoop` when a collection is added to itself.
    pub fn add_to_collection(&mut self, collection: &ElementId, child: &ElementId) -> Result<bool, DocError> {
        if collection == child {
            return Err(DocError::SelfLoop(*child));
        }
        if !self.elements.contains_key(child) {
            return Err(DocError::NotFound(*child));
        }
        let el = self
            .elements
            .get(collection)
            .ok_or(DocError::NotFound(*collection))?;
        if el.element_type() != ElementType::Collection {
            return Err(DocError::NotACollection(*collection));
        }
        let child = *child;
        Ok(self.modify(collection, |el| match &mut el.data {
            ElementData::Collection(c) if !c.child_ids.contains(&child) => {
                c.child_ids.push(child);
                true
            }
            _ => false,
        }))
    }

    // --- Snapshot ---

    /// Export the board in its persisted shape.
    #[must_use]
    pub fn snapshot(&self, viewport: Viewport) -> CanvasState {
        CanvasState {
            elements: self
                .elements
                .iter()
                .map(|(id, el)| (*id, el.clone()))
                .collect(),
            connections: self.connections.clone(),
            viewport,
        }
    }

    /// Replace everything with a persisted board and return its viewport.
    ///
    /// Insertion order is rebuilt from `(created_at, id)`. Connections with a
    /// missing endpoint or identical endpoints are dropped.
    pub fn load(&mut self, state: CanvasState) -> Viewport {
        let mut elements: Vec<CanvasElement> = state.elements.into_values().collect();
        elements.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        self.order = elements.iter().map(|e| e.id).collect();
        self.elements = elements.into_iter().map(|e| (e.id, e)).collect();

        self.connections.clear();
        for conn in state.connections {
            let valid = conn.from != conn.to
                && self.elements.contains_key(&conn.from)
                && self.elements.contains_key(&conn.to);
            if valid {
                self.connections.push(conn);
            } else {
                log::warn!("dropping dangling connection {} on load", conn.id);
            }
        }
        self.touch();
        state.viewport
    }
}

impl Default for DocStore {
    fn default() -> Self {
        Self::new()
    }
}
