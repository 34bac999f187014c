//! Shared numeric and style constants for the drawing crate.

// ── Geodesy ─────────────────────────────────────────────────────

/// Equatorial radius used for great-circle distances, in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Approximate meters per degree of latitude.
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Web-Mercator world size in pixels at zoom 0.
pub const TILE_SIZE_PX: f64 = 256.0;

/// Latitude clamp for Web-Mercator projection.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

// ── Input ───────────────────────────────────────────────────────

/// Movement in pixels beyond which a touch press becomes a drag.
pub const TOUCH_TAP_SLOP_PX: f64 = 10.0;

/// Movement in pixels beyond which a mouse press becomes a drag.
pub const MOUSE_DRAG_SLOP_PX: f64 = 3.0;

/// Screen-space radius in pixels for snapping onto an existing vertex.
pub const SNAP_TOLERANCE_PX: f64 = 8.0;

/// Smallest circle radius or rectangle side kept on finalize, in meters.
pub const MIN_SHAPE_METERS: f64 = 1.0;

/// Delay between attempts to finalize a touch drag whose preview is not ready.
pub const FINALIZE_POLL_MS: u64 = 50;

/// Attempts before a deferred finalize proceeds without its preview.
pub const FINALIZE_MAX_ATTEMPTS: u32 = 10;

// ── Style ───────────────────────────────────────────────────────

pub const POLYGON_COLOR: &str = "#FF0000";
pub const LINE_COLOR: &str = "#0000FF";
pub const CIRCLE_COLOR: &str = "#00FF00";
pub const RECTANGLE_COLOR: &str = "#FF00FF";

pub const STROKE_OPACITY: f64 = 0.8;
pub const PREVIEW_OPACITY: f64 = 0.4;
pub const FILL_OPACITY: f64 = 0.35;
pub const STROKE_WEIGHT: f64 = 2.0;
pub const LINE_STROKE_WEIGHT: f64 = 3.0;
