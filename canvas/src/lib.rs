//! Canvas interaction engine for the content board.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! interactive side of the board: pan/zoom, dragging and resizing with
//! alignment snapping, multi-selection, connections between elements, and
//! viewport virtualization for rendering. The host layer wires DOM events to
//! the engine, performs remote ingestion/analysis, and persists the resulting
//! [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Element store, element types, connections, persisted shape |
//! | [`camera`] | Points, bounds, and the pan/zoom viewport |
//! | [`drag`] | Move/resize state machine with throttled commits |
//! | [`align`] | Edge/center snapping and guide lines |
//! | [`select`] | Click, range, toggle, and marquee selection |
//! | [`connect`] | Connect gesture and bezier geometry |
//! | [`cull`] | Visible-set computation and its cache |
//! | [`hit`] | Hit-testing elements, handles, and connections |
//! | [`content`] | URL/handle validation and ingestion lifecycle |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`ids`] | Id generation |
//! | [`render`] | Scene rendering |
//! | [`consts`] | Shared numeric constants (zoom limits, thresholds, etc.) |

pub mod align;
pub mod camera;
pub mod connect;
pub mod consts;
pub mod content;
pub mod cull;
pub mod doc;
pub mod drag;
pub mod engine;
pub mod hit;
pub mod ids;
pub mod input;
pub mod render;
pub mod select;
