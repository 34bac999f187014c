//! The map-surface boundary: overlays, listener registration, events and projection.
//!
//! The drawing core never reaches into a map SDK. Everything it needs from the
//! map goes through [`MapSurface`]. Listener registrations are real resources
//! owned by whoever registered them: a strategy's tool session or an entry's
//! overlay handle. The host pushes [`SurfaceEvent`]s into the controller, which
//! only routes an event when it still holds a matching registration.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use crate::consts::{FILL_OPACITY, PREVIEW_OPACITY, STROKE_OPACITY, STROKE_WEIGHT};
use crate::geo::{self, Bounds, Pixel, Point};
use crate::input::InputSample;

/// Errors reported by a map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// The map or its geometry library has not finished loading.
    #[error("map surface not ready")]
    NotReady,
    /// The overlay id is not (or no longer) on the surface.
    #[error("unknown overlay: {0:?}")]
    UnknownOverlay(OverlayId),
}

/// Identifier of an overlay on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub u64);

/// Identifier of a listener registration on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Cursor override requested by the active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Crosshair,
}

/// What an event was raised on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Map,
    Overlay(OverlayId),
}

/// Event kinds a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    PointerDown,
    PointerMove,
    PointerUp,
    MouseOver,
    PathInsert,
    PathSet,
    PathRemove,
    DragEnd,
    CenterChanged,
    RadiusChanged,
    BoundsChanged,
}

/// How an editable path changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathChange {
    Insert,
    Set,
    Remove,
}

/// Pointer events raised on the map itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    Click(InputSample),
    PointerDown(InputSample),
    PointerMove(InputSample),
    PointerUp(InputSample),
}

impl MapEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Click(_) => EventKind::Click,
            Self::PointerDown(_) => EventKind::PointerDown,
            Self::PointerMove(_) => EventKind::PointerMove,
            Self::PointerUp(_) => EventKind::PointerUp,
        }
    }

    #[must_use]
    pub fn sample(&self) -> InputSample {
        match *self {
            Self::Click(s) | Self::PointerDown(s) | Self::PointerMove(s) | Self::PointerUp(s) => s,
        }
    }
}

/// Events raised by an overlay, carrying the overlay's geometry after the change.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    Click(InputSample),
    MouseOver(InputSample),
    /// A vertex was inserted, moved or removed. `path` is the full edited path
    /// (for a polygon, the open ring without the repeated first vertex).
    PathChanged { change: PathChange, path: Vec<Point> },
    /// The whole shape was dragged to `path`.
    DragEnd { path: Vec<Point> },
    CenterChanged { center: Point, radius_m: f64 },
    RadiusChanged { center: Point, radius_m: f64 },
    BoundsChanged(Bounds),
}

impl OverlayEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Click(_) => EventKind::Click,
            Self::MouseOver(_) => EventKind::MouseOver,
            Self::PathChanged { change: PathChange::Insert, .. } => EventKind::PathInsert,
            Self::PathChanged { change: PathChange::Set, .. } => EventKind::PathSet,
            Self::PathChanged { change: PathChange::Remove, .. } => EventKind::PathRemove,
            Self::DragEnd { .. } => EventKind::DragEnd,
            Self::CenterChanged { .. } => EventKind::CenterChanged,
            Self::RadiusChanged { .. } => EventKind::RadiusChanged,
            Self::BoundsChanged(_) => EventKind::BoundsChanged,
        }
    }
}

/// An event delivered by the host to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Map(MapEvent),
    Overlay { overlay: OverlayId, event: OverlayEvent },
}

impl SurfaceEvent {
    #[must_use]
    pub fn target(&self) -> EventTarget {
        match self {
            Self::Map(_) => EventTarget::Map,
            Self::Overlay { overlay, .. } => EventTarget::Overlay(*overlay),
        }
    }

    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Map(e) => e.kind(),
            Self::Overlay { event, .. } => event.kind(),
        }
    }
}

/// Stroke and fill styling for an overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub stroke_color: &'static str,
    pub stroke_opacity: f64,
    pub stroke_weight: f64,
    pub fill_color: Option<&'static str>,
    pub fill_opacity: f64,
}

impl Style {
    /// Stroke-only style at normal opacity.
    #[must_use]
    pub fn stroke(color: &'static str, weight: f64) -> Self {
        Self { stroke_color: color, stroke_opacity: STROKE_OPACITY, stroke_weight: weight, fill_color: None, fill_opacity: 0.0 }
    }

    /// Stroke plus translucent fill in the same color.
    #[must_use]
    pub fn filled(color: &'static str) -> Self {
        Self { fill_color: Some(color), fill_opacity: FILL_OPACITY, ..Self::stroke(color, STROKE_WEIGHT) }
    }

    /// Faded variant used for previews and shapes still being placed.
    #[must_use]
    pub fn preview(self) -> Self {
        Self { stroke_opacity: PREVIEW_OPACITY, fill_opacity: self.fill_opacity * PREVIEW_OPACITY, ..self }
    }
}

/// Geometry of an overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Closed polygon. `ring` does not repeat its first vertex.
    Polygon { ring: Vec<Point> },
    Polyline { path: Vec<Point> },
    Circle { center: Point, radius_m: f64 },
    Rectangle { bounds: Bounds },
}

/// A shape to add to the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub shape: Shape,
    pub style: Style,
    /// Whether the user can edit vertices, drag or resize it.
    pub editable: bool,
    /// Whether the overlay raises click/hover events.
    pub clickable: bool,
}

/// The map operations the drawing core consumes.
pub trait MapSurface {
    /// Whether the map and geometry library are loaded.
    fn is_ready(&self) -> bool;

    fn add_overlay(&mut self, overlay: Overlay) -> Result<OverlayId, SurfaceError>;

    /// Remove an overlay. Removing an unknown overlay is a no-op.
    fn remove_overlay(&mut self, id: OverlayId);

    fn add_listener(&mut self, target: EventTarget, kind: EventKind) -> Result<ListenerId, SurfaceError>;

    /// Detach a listener. Detaching an unknown listener is a no-op.
    fn remove_listener(&mut self, id: ListenerId);

    fn set_cursor(&mut self, cursor: Cursor);

    fn project(&self, point: Point) -> Pixel;

    fn unproject(&self, pixel: Pixel) -> Point;

    /// Distance in meters between two points.
    fn distance(&self, a: Point, b: Point) -> f64 {
        geo::distance_meters(a, b)
    }

    /// Screen distance in pixels between two points.
    fn pixel_distance(&self, a: Point, b: Point) -> f64 {
        self.project(a).distance_to(self.project(b))
    }
}

/// A set of listener registrations released together.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListenerSet {
    entries: Vec<(ListenerId, EventTarget, EventKind)>,
}

impl ListenerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `kind` on `target` and remember the registration.
    pub fn listen(
        &mut self,
        surface: &mut dyn MapSurface,
        target: EventTarget,
        kind: EventKind,
    ) -> Result<ListenerId, SurfaceError> {
        let id = surface.add_listener(target, kind)?;
        self.entries.push((id, target, kind));
        Ok(id)
    }

    /// Register several kinds on one target. Registrations made before a
    /// failure are released before the error is returned.
    pub fn listen_all(
        surface: &mut dyn MapSurface,
        target: EventTarget,
        kinds: &[EventKind],
    ) -> Result<Self, SurfaceError> {
        let mut set = Self::new();
        for kind in kinds {
            if let Err(e) = set.listen(surface, target, *kind) {
                set.release(surface);
                return Err(e);
            }
        }
        Ok(set)
    }

    /// Whether a registration matches `target` and `kind`.
    #[must_use]
    pub fn covers(&self, target: EventTarget, kind: EventKind) -> bool {
        self.entries.iter().any(|(_, t, k)| *t == target && *k == kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Detach every registration. Calling it again is a no-op.
    pub fn release(&mut self, surface: &mut dyn MapSurface) {
        for (id, _, _) in self.entries.drain(..) {
            surface.remove_listener(id);
        }
    }
}

/// One rendered entry: its overlay plus the edit listeners attached to it.
#[derive(Debug, PartialEq, Eq)]
pub struct OverlayHandle {
    pub overlay: OverlayId,
    pub listeners: ListenerSet,
}

impl OverlayHandle {
    /// Add `overlay` and attach `kinds` listeners to it. If any listener fails
    /// the overlay is removed again.
    pub fn create(
        surface: &mut dyn MapSurface,
        overlay: Overlay,
        kinds: &[EventKind],
    ) -> Result<Self, SurfaceError> {
        let id = surface.add_overlay(overlay)?;
        match ListenerSet::listen_all(surface, EventTarget::Overlay(id), kinds) {
            Ok(listeners) => Ok(Self { overlay: id, listeners }),
            Err(e) => {
                surface.remove_overlay(id);
                Err(e)
            }
        }
    }

    /// Detach listeners and remove the overlay.
    pub fn destroy(mut self, surface: &mut dyn MapSurface) {
        self.listeners.release(surface);
        surface.remove_overlay(self.overlay);
    }
}
