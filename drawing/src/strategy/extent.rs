//! Press-drag-release sizing shared by circles and rectangles.
//!
//! DESIGN
//! ======
//! Pointer-down anchors a placement entry (`done: false`) held by the strategy
//! and shown as a faded preview while the pointer is dragged. Pointer-up
//! commits a finished entry `[anchor, release]` only when the gesture was a
//! drag and the resulting shape is at least the configured minimum size;
//! anything smaller is an accidental tap and commits nothing.
//!
//! A touch drag can end before its preview overlay exists (the surface was
//! not ready when the drag started). The finalize is then deferred and
//! retried on a short poll until the preview can be shown, or until the
//! attempt budget runs out, after which the known geometry is committed anyway.

#[cfg(test)]
#[path = "extent_test.rs"]
mod extent_test;

use std::marker::PhantomData;

use crate::config::DrawConfig;
use crate::entry::{DrawingEntry, ShapeKind};
use crate::geo::Point;
use crate::input::{Gesture, InputSample, InputSource, Release};
use crate::strategy::{appended, render, DrawingStrategy, Outcome, Preview};
use crate::surface::{
    Cursor, EventKind, EventTarget, ListenerSet, MapEvent, MapSurface, Overlay, OverlayEvent, OverlayHandle, Shape,
    Style, SurfaceError,
};

const MAP_EVENTS: &[EventKind] = &[EventKind::PointerDown, EventKind::PointerMove, EventKind::PointerUp];

/// Shape-specific rules for a drag-sized shape.
pub trait ExtentPolicy {
    const KIND: ShapeKind;

    fn style() -> Style;

    /// Geometry spanned by `anchor` and `corner`.
    fn shape(anchor: Point, corner: Point, surface: &dyn MapSurface) -> Shape;

    /// Size in meters used for degenerate rejection.
    fn size_meters(anchor: Point, corner: Point, surface: &dyn MapSurface) -> f64;

    /// Overlay events to listen for on a finished shape.
    fn edit_events() -> &'static [EventKind];

    /// Points after an overlay edit, or `None` if `event` is not an edit.
    fn edited(event: &OverlayEvent) -> Option<Vec<Point>>;
}

/// A touch drag waiting for its preview before committing.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Deferred {
    anchor: Point,
    corner: Point,
    attempts: u32,
}

/// Drawing strategy for any [`ExtentPolicy`].
#[derive(Debug)]
pub struct ExtentStrategy<P> {
    config: DrawConfig,
    gesture: Gesture,
    placement: Option<DrawingEntry>,
    preview: Preview,
    deferred: Option<Deferred>,
    policy: PhantomData<P>,
}

impl<P: ExtentPolicy> ExtentStrategy<P> {
    #[must_use]
    pub fn new(config: DrawConfig) -> Self {
        Self {
            config,
            gesture: Gesture::default(),
            placement: None,
            preview: Preview::default(),
            deferred: None,
            policy: PhantomData,
        }
    }

    /// The shape currently being placed, if a press is in progress.
    #[must_use]
    pub fn placement(&self) -> Option<&DrawingEntry> {
        self.placement.as_ref()
    }

    #[must_use]
    pub fn is_deferred(&self) -> bool {
        self.deferred.is_some()
    }

    fn preview_overlay(anchor: Point, corner: Point, surface: &dyn MapSurface) -> Overlay {
        Overlay { shape: P::shape(anchor, corner, surface), style: P::style().preview(), editable: false, clickable: false }
    }

    fn press(&mut self, at: InputSample) {
        self.gesture.press(at);
        self.placement = Some(DrawingEntry::new(P::KIND, vec![at.point]));
    }

    fn drag(&mut self, at: InputSample, surface: &mut dyn MapSurface) -> Outcome {
        let Some(origin) = self.gesture.track(at, self.config.slop_px(at.source)) else {
            return Outcome::Ignored;
        };
        self.placement = self.placement.as_ref().map(|p| p.with_points(vec![origin.point, at.point]));
        let overlay = Self::preview_overlay(origin.point, at.point, surface);
        self.preview.show(surface, overlay);
        Outcome::Handled
    }

    fn release(&mut self, at: InputSample, entries: &[DrawingEntry], surface: &mut dyn MapSurface) -> Outcome {
        match self.gesture.release(at, self.config.slop_px(at.source)) {
            None => Outcome::Ignored,
            Some(Release::Tap { .. }) => {
                tracing::debug!(kind = ?P::KIND, "tap discarded");
                self.discard(surface);
                Outcome::Handled
            }
            Some(Release::DragEnd { origin, at }) => {
                if at.source == InputSource::Touch && !self.preview.is_shown() {
                    tracing::debug!(kind = ?P::KIND, "finalize deferred until preview is ready");
                    self.deferred = Some(Deferred { anchor: origin.point, corner: at.point, attempts: 0 });
                    return Outcome::RetryAfter(self.config.finalize_poll);
                }
                self.finalize(origin.point, at.point, entries, surface)
            }
        }
    }

    fn finalize(&mut self, anchor: Point, corner: Point, entries: &[DrawingEntry], surface: &mut dyn MapSurface) -> Outcome {
        let placement = self.placement.take();
        self.preview.clear(surface);

        let size = P::size_meters(anchor, corner, surface);
        if size < self.config.min_shape_meters {
            tracing::debug!(kind = ?P::KIND, size_m = size, "degenerate shape discarded");
            return Outcome::Handled;
        }

        let entry = match placement {
            Some(p) => p.finalized(vec![anchor, corner]),
            None => DrawingEntry::finished(P::KIND, vec![anchor, corner]),
        };
        tracing::debug!(kind = ?P::KIND, entry = %entry.id, size_m = size, "shape finished");
        Outcome::Commit(appended(entries, entry))
    }

    fn discard(&mut self, surface: &mut dyn MapSurface) {
        self.placement = None;
        self.preview.clear(surface);
    }
}

impl<P: ExtentPolicy> DrawingStrategy for ExtentStrategy<P> {
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
        self.deferred = None;
        self.discard(surface);
    }

    fn on_map_event(&mut self, event: &MapEvent, entries: &[DrawingEntry], surface: &mut dyn MapSurface) -> Outcome {
        match *event {
            MapEvent::PointerDown(s) => {
                // A new press settles any finalize still waiting on the surface.
                let settled = self.flush(entries, surface);
                self.press(s);
                match settled {
                    Outcome::Commit(_) => settled,
                    _ => Outcome::Handled,
                }
            }
            MapEvent::PointerMove(s) => self.drag(s, surface),
            MapEvent::PointerUp(s) => self.release(s, entries, surface),
            MapEvent::Click(_) => Outcome::Ignored,
        }
    }

    fn poll_deferred(&mut self, entries: &[DrawingEntry], surface: &mut dyn MapSurface) -> Outcome {
        let Some(mut deferred) = self.deferred.take() else {
            return Outcome::Ignored;
        };
        let overlay = Self::preview_overlay(deferred.anchor, deferred.corner, surface);
        deferred.attempts += 1;
        if self.preview.show(surface, overlay) || deferred.attempts >= self.config.finalize_max_attempts {
            return self.finalize(deferred.anchor, deferred.corner, entries, surface);
        }
        self.deferred = Some(deferred);
        Outcome::RetryAfter(self.config.finalize_poll)
    }

    fn flush(&mut self, entries: &[DrawingEntry], surface: &mut dyn MapSurface) -> Outcome {
        match self.deferred.take() {
            Some(deferred) => self.finalize(deferred.anchor, deferred.corner, entries, surface),
            None => Outcome::Ignored,
        }
    }

    fn draw(&mut self, entry: &DrawingEntry, _is_last_of_type: bool, surface: &mut dyn MapSurface) -> Option<OverlayHandle> {
        let [anchor, corner] = entry.points.as_slice() else {
            return None;
        };
        let shape = P::shape(*anchor, *corner, surface);
        if entry.done {
            let overlay = Overlay { shape, style: P::style(), editable: true, clickable: true };
            render(surface, entry.id, overlay, P::edit_events())
        } else {
            let overlay = Overlay { shape, style: P::style().preview(), editable: false, clickable: false };
            render(surface, entry.id, overlay, &[])
        }
    }

    fn on_overlay_event(
        &mut self,
        entry: &DrawingEntry,
        event: &OverlayEvent,
        _surface: &mut dyn MapSurface,
    ) -> Option<DrawingEntry> {
        let points = P::edited(event)?;
        Some(entry.with_points(points))
    }
}
