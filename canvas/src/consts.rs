//! Shared numeric constants for the canvas crate.

// ── Viewport ────────────────────────────────────────────────────

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.1;

/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 3.0;

/// Wheel delta (pixels) to zoom exponent. `factor = exp(-dy * k)`.
pub const WHEEL_ZOOM_SENSITIVITY: f64 = 0.0015;

/// Upper zoom bound used by fit-to-screen so small boards are not blown up.
pub const FIT_MAX_ZOOM: f64 = 1.0;

/// Screen margin kept around content by fit-to-screen, in CSS pixels.
pub const FIT_PADDING_PX: f64 = 50.0;

// ── Drag / resize ───────────────────────────────────────────────

/// Above this zoom, store commits during a drag are rate-limited.
pub const DRAG_THROTTLE_ZOOM: f64 = 0.75;

/// Minimum interval between throttled store commits (~60 Hz).
pub const DRAG_COMMIT_INTERVAL_MS: f64 = 16.0;

// ── Alignment ───────────────────────────────────────────────────

/// Default snap distance in world units.
pub const SNAP_THRESHOLD: f64 = 10.0;

// ── Virtualization ──────────────────────────────────────────────

/// Default margin around the visible region, in screen pixels.
pub const VISIBLE_PADDING_PX: f64 = 200.0;

// ── Connections ─────────────────────────────────────────────────

/// Horizontal control-point offset factor relative to `|dx|`.
pub const CURVE_OFFSET_RATIO: f64 = 0.5;

/// Cap on the horizontal control-point offset, in world units.
pub const CURVE_OFFSET_MAX: f64 = 100.0;

/// Number of segments a bezier is flattened into for hit-testing.
pub const CURVE_HIT_SAMPLES: usize = 32;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for handles, connectors and curves.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

// ── Search results ──────────────────────────────────────────────

/// Columns used when laying out a batch of new content cards.
pub const GRID_COLUMNS: usize = 4;

/// Gap between cards laid out in a grid, in world units.
pub const GRID_GAP: f64 = 40.0;
