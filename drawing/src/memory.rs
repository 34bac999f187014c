//! Headless in-memory map surface.
//!
//! Projects with Web Mercator at a fixed zoom and origin, keeps overlays and
//! listener registrations in tables, and journals every mutating call so the
//! order of acquisitions and releases can be inspected.

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

use std::collections::BTreeMap;

use crate::geo::{self, Pixel, Point};
use crate::surface::{Cursor, EventKind, EventTarget, ListenerId, MapSurface, Overlay, OverlayId, SurfaceError};

/// A mutating call recorded by [`MemorySurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceOp {
    AddOverlay(OverlayId),
    RemoveOverlay(OverlayId),
    AddListener(ListenerId, EventTarget, EventKind),
    RemoveListener(ListenerId),
    SetCursor(Cursor),
}

#[derive(Debug, Clone)]
pub struct MemorySurface {
    ready: bool,
    zoom: f64,
    /// World-pixel offset of the viewport's top-left corner.
    origin: Pixel,
    next_id: u64,
    overlays: BTreeMap<OverlayId, Overlay>,
    listeners: BTreeMap<ListenerId, (EventTarget, EventKind)>,
    cursor: Cursor,
    journal: Vec<SurfaceOp>,
}

impl MemorySurface {
    /// A ready surface at `zoom`, with the viewport's top-left corner at world origin.
    #[must_use]
    pub fn new(zoom: f64) -> Self {
        Self {
            ready: true,
            zoom,
            origin: Pixel::new(0.0, 0.0),
            next_id: 1,
            overlays: BTreeMap::new(),
            listeners: BTreeMap::new(),
            cursor: Cursor::Default,
            journal: Vec::new(),
        }
    }

    /// A ready surface at `zoom` whose viewport is centered on `center`.
    #[must_use]
    pub fn centered(zoom: f64, center: Point, viewport_w: f64, viewport_h: f64) -> Self {
        let c = geo::web_mercator_project(center, zoom);
        Self { origin: Pixel::new(c.x - viewport_w / 2.0, c.y - viewport_h / 2.0), ..Self::new(zoom) }
    }

    /// Toggle readiness. While not ready, overlays and listeners cannot be added.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    #[must_use]
    pub fn overlay(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.get(&id)
    }

    /// Live overlays in creation order.
    pub fn overlays(&self) -> impl Iterator<Item = (OverlayId, &Overlay)> {
        self.overlays.iter().map(|(id, o)| (*id, o))
    }

    #[must_use]
    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Number of live listeners registered on `target`.
    #[must_use]
    pub fn listeners_on(&self, target: EventTarget) -> usize {
        self.listeners.values().filter(|(t, _)| *t == target).count()
    }

    #[must_use]
    pub fn has_listener(&self, target: EventTarget, kind: EventKind) -> bool {
        self.listeners.values().any(|(t, k)| *t == target && *k == kind)
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[must_use]
    pub fn journal(&self) -> &[SurfaceOp] {
        &self.journal
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    fn next(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl MapSurface for MemorySurface {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn add_overlay(&mut self, overlay: Overlay) -> Result<OverlayId, SurfaceError> {
        if !self.ready {
            return Err(SurfaceError::NotReady);
        }
        let id = OverlayId(self.next());
        self.overlays.insert(id, overlay);
        self.journal.push(SurfaceOp::AddOverlay(id));
        Ok(id)
    }

    fn remove_overlay(&mut self, id: OverlayId) {
        if self.overlays.remove(&id).is_some() {
            self.journal.push(SurfaceOp::RemoveOverlay(id));
        }
    }

    fn add_listener(&mut self, target: EventTarget, kind: EventKind) -> Result<ListenerId, SurfaceError> {
        if !self.ready {
            return Err(SurfaceError::NotReady);
        }
        if let EventTarget::Overlay(overlay) = target {
            if !self.overlays.contains_key(&overlay) {
                return Err(SurfaceError::UnknownOverlay(overlay));
            }
        }
        let id = ListenerId(self.next());
        self.listeners.insert(id, (target, kind));
        self.journal.push(SurfaceOp::AddListener(id, target, kind));
        Ok(id)
    }

    fn remove_listener(&mut self, id: ListenerId) {
        if self.listeners.remove(&id).is_some() {
            self.journal.push(SurfaceOp::RemoveListener(id));
        }
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
        self.journal.push(SurfaceOp::SetCursor(cursor));
    }

    fn project(&self, point: Point) -> Pixel {
        let world = geo::web_mercator_project(point, self.zoom);
        Pixel::new(world.x - self.origin.x, world.y - self.origin.y)
    }

    fn unproject(&self, pixel: Pixel) -> Point {
        geo::web_mercator_unproject(Pixel::new(pixel.x + self.origin.x, pixel.y + self.origin.y), self.zoom)
    }
}
