//! Click-to-place vertex accumulation shared by polygons and lines.
//!
//! Mouse clicks (or touch taps, told apart from map pans by the gesture
//! machine) append vertices to the in-progress entry, the last entry of the
//! strategy's kind that is not yet done and that the [`PathPolicy`] still
//! accepts vertices for. The policy decides per shape
//! whether a click appends, finishes, or is ignored. While a shape is in
//! progress a rubber-band preview follows the mouse from the last vertex,
//! snapping onto the first vertex when the cursor is within snap tolerance.

#[cfg(test)]
#[path = "path_test.rs"]
mod path_test;

use std::marker::PhantomData;

use crate::config::DrawConfig;
use crate::entry::{self, DrawingEntry, ShapeKind, Snapshot};
use crate::geo::Point;
use crate::input::{Gesture, InputSource, Release};
use crate::strategy::{appended, render, DrawingStrategy, Outcome, Preview};
use crate::surface::{
    Cursor, EventKind, EventTarget, ListenerSet, MapEvent, MapSurface, Overlay, OverlayEvent, OverlayHandle, Shape,
    Style, SurfaceError,
};

const MAP_EVENTS: &[EventKind] = &[EventKind::Click, EventKind::PointerMove, EventKind::PointerDown, EventKind::PointerUp];

/// What a click does to an in-progress path.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// Add the clicked point as a new vertex.
    Append,
    /// Finalize the entry with these points.
    Finish(Vec<Point>),
    /// Do nothing (e.g. a click on the vertex just placed).
    Ignore,
}

/// Shape-specific rules for a click-to-place path.
pub trait PathPolicy {
    const KIND: ShapeKind;

    /// Vertices required before the cursor snaps onto the first vertex.
    const SNAP_TO_FIRST_MIN: usize;

    /// Stroke style for this shape; previews use its faded variant.
    fn style() -> Style;

    /// Decide what a click at `click` does to a path with `points`. `near`
    /// reports whether two points are within snap tolerance on screen.
    fn place(points: &[Point], click: Point, near: &dyn Fn(Point, Point) -> bool) -> Placement;

    /// Whether `entry` can still take vertices. Entries that are not done
    /// are open unless the shape itself says otherwise.
    fn accepts_more(_entry: &DrawingEntry) -> bool {
        true
    }

    /// Overlay for `entry`.
    fn overlay(entry: &DrawingEntry, is_last_of_type: bool) -> Overlay;

    /// Overlay events to listen for on `entry`'s overlay.
    fn edit_events(entry: &DrawingEntry) -> &'static [EventKind];

    /// Points for `entry` after its overlay path was edited to `path`, or
    /// `None` to reject the edit.
    fn edited(entry: &DrawingEntry, path: &[Point]) -> Option<Vec<Point>>;
}

/// First and last vertex of the in-progress entry.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Active {
    first: Point,
    tail: Point,
    len: usize,
}

/// Drawing strategy for any [`PathPolicy`].
#[derive(Debug)]
pub struct PathStrategy<P> {
    config: DrawConfig,
    gesture: Gesture,
    preview: Preview,
    active: Option<Active>,
    policy: PhantomData<P>,
}

impl<P: PathPolicy> PathStrategy<P> {
    #[must_use]
    pub fn new(config: DrawConfig) -> Self {
        Self { config, gesture: Gesture::default(), preview: Preview::default(), active: None, policy: PhantomData }
    }

    /// Whether the rubber-band preview is currently on the surface.
    #[must_use]
    pub fn preview_shown(&self) -> bool {
        self.preview.is_shown()
    }

    fn in_progress(entries: &[DrawingEntry]) -> Option<usize> {
        entry::last_index_of(entries, P::KIND).filter(|&idx| !entries[idx].done && P::accepts_more(&entries[idx]))
    }

    fn place(&mut self, point: Point, entries: &[DrawingEntry], surface: &mut dyn MapSurface) -> Outcome {
        let Some(idx) = Self::in_progress(entries) else {
            self.preview.clear(surface);
            return Outcome::Commit(appended(entries, DrawingEntry::new(P::KIND, vec![point])));
        };

        let current = &entries[idx];
        let tolerance = self.config.snap_tolerance_px;
        let placement = {
            let near = |a: Point, b: Point| surface.pixel_distance(a, b) <= tolerance;
            P::place(&current.points, point, &near)
        };

        let replacement = match placement {
            Placement::Append => {
                let mut points = current.points.clone();
                points.push(point);
                current.with_points(points)
            }
            Placement::Finish(points) => {
                tracing::debug!(kind = ?P::KIND, vertices = points.len(), "path finished");
                current.finalized(points)
            }
            Placement::Ignore => return Outcome::Ignored,
        };

        self.preview.clear(surface);
        let mut next: Snapshot = entries.to_vec();
        next[idx] = replacement;
        Outcome::Commit(next)
    }

    fn rubber_band(&mut self, cursor: Point, surface: &mut dyn MapSurface) -> Outcome {
        let Some(active) = self.active else {
            self.preview.clear(surface);
            return Outcome::Ignored;
        };

        let snaps = active.len >= P::SNAP_TO_FIRST_MIN
            && surface.pixel_distance(cursor, active.first) <= self.config.snap_tolerance_px;
        let end = if snaps { active.first } else { cursor };

        let overlay = Overlay {
            shape: Shape::Polyline { path: vec![active.tail, end] },
            style: P::style().preview(),
            editable: false,
            clickable: false,
        };
        self.preview.show(surface, overlay);
        Outcome::Handled
    }
}

impl<P: PathPolicy> DrawingStrategy for PathStrategy<P> {
    fn kind(&self) -> ShapeKind {
        P::KIND
    }

    fn start_listeners(&mut self, surface: &mut dyn MapSurface) -> Result<ListenerSet, SurfaceError> {
        let listeners = ListenerSet::listen_all(surface, EventTarget::Map, MAP_EVENTS)?;
        surface.set_cursor(Cursor::Crosshair);
        Ok(listeners)
    }

    fn stop(&mut self, surface: &mut dyn MapSurface) {
        self.gesture.reset();
        self.preview.clear(surface);
    }

    fn on_map_event(&mut self, event: &MapEvent, entries: &[DrawingEntry], surface: &mut dyn MapSurface) -> Outcome {
        match *event {
            MapEvent::Click(s) if s.source == InputSource::Mouse => self.place(s.point, entries, surface),
            MapEvent::PointerMove(s) if s.source == InputSource::Mouse => self.rubber_band(s.point, surface),
            MapEvent::PointerMove(s) => {
                self.gesture.track(s, self.config.touch_tap_slop_px);
                Outcome::Handled
            }
            MapEvent::PointerDown(s) if s.source == InputSource::Touch => {
                self.gesture.press(s);
                Outcome::Handled
            }
            MapEvent::PointerUp(s) if s.source == InputSource::Touch => {
                match self.gesture.release(s, self.config.touch_tap_slop_px) {
                    Some(Release::Tap { at, .. }) => self.place(at.point, entries, surface),
                    Some(Release::DragEnd { .. }) | None => Outcome::Ignored,
                }
            }
            _ => Outcome::Ignored,
        }
    }

    fn sync(&mut self, entries: &[DrawingEntry], surface: &mut dyn MapSurface) {
        let active = Self::in_progress(entries).and_then(|idx| {
            let current = &entries[idx];
            Some(Active { first: current.first()?, tail: current.last()?, len: current.points.len() })
        });
        // The rubber band hangs off the old tail; it is redrawn on the next move.
        if active != self.active {
            self.preview.clear(surface);
        }
        self.active = active;
    }

    fn draw(&mut self, entry: &DrawingEntry, is_last_of_type: bool, surface: &mut dyn MapSurface) -> Option<OverlayHandle> {
        if !entry.is_renderable() {
            return None;
        }
        render(surface, entry.id, P::overlay(entry, is_last_of_type), P::edit_events(entry))
    }

    fn on_overlay_event(
        &mut self,
        entry: &DrawingEntry,
        event: &OverlayEvent,
        surface: &mut dyn MapSurface,
    ) -> Option<DrawingEntry> {
        match event {
            OverlayEvent::Click(s) if !entry.done => {
                let tolerance = self.config.snap_tolerance_px;
                let placement = {
                    let near = |a: Point, b: Point| surface.pixel_distance(a, b) <= tolerance;
                    P::place(&entry.points, s.point, &near)
                };
                match placement {
                    Placement::Finish(points) => {
                        self.preview.clear(surface);
                        Some(entry.finalized(points))
                    }
                    Placement::Append | Placement::Ignore => None,
                }
            }
            OverlayEvent::MouseOver(s) if !entry.done => {
                self.rubber_band(s.point, surface);
                None
            }
            OverlayEvent::PathChanged { path, .. } | OverlayEvent::DragEnd { path } => {
                let points = P::edited(entry, path)?;
                Some(entry.with_points(points))
            }
            _ => None,
        }
    }
}
