//! Per-shape drawing strategies.
//!
//! A strategy turns map pointer input into new or updated entries while its
//! tool is active, and renders entries of its kind as live overlays whose edit
//! events flow back as replacement entries. Polygon and line share the
//! click-to-place machinery in [`path`]; circle and rectangle share the
//! drag-to-size machinery in [`extent`]. The per-shape modules only supply
//! geometry, styling and finalize rules.
//!
//! | Module | Role |
//! |--------|------|
//! | [`path`] | Vertex accumulation, rubber-band preview, close/finish detection |
//! | [`polygon`] | Ring closure and rotation realignment |
//! | [`line`] | Open paths finished on first or last vertex |
//! | [`extent`] | Press-drag-release sizing with degenerate rejection and touch deferral |
//! | [`circle`] | Center + radius reference point |
//! | [`rectangle`] | Two opposite corners |

pub mod circle;
pub mod extent;
pub mod line;
pub mod path;
pub mod polygon;
pub mod rectangle;

use std::time::Duration;

use crate::entry::{DrawingEntry, EntryId, ShapeKind, Snapshot};
use crate::surface::{EventKind, ListenerSet, MapEvent, MapSurface, Overlay, OverlayEvent, OverlayHandle, OverlayId, SurfaceError};

pub use circle::CircleStrategy;
pub use line::LineStrategy;
pub use polygon::PolygonStrategy;
pub use rectangle::RectangleStrategy;

/// Result of feeding an event to a strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The event did not concern this strategy.
    Ignored,
    /// Internal state changed; nothing to commit.
    Handled,
    /// Push this snapshot into history.
    Commit(Snapshot),
    /// A finalize is waiting on the surface; poll again after the delay.
    RetryAfter(Duration),
}

/// Shape-specific input interpretation and overlay rendering.
pub trait DrawingStrategy {
    fn kind(&self) -> ShapeKind;

    /// Attach this strategy's map listeners and cursor. The returned set is
    /// owned by the caller and released when the tool is deactivated.
    fn start_listeners(&mut self, surface: &mut dyn MapSurface) -> Result<ListenerSet, SurfaceError>;

    /// Drop any in-progress gesture and transient preview.
    fn stop(&mut self, surface: &mut dyn MapSurface);

    /// Feed a map pointer event. `entries` is the current present snapshot.
    fn on_map_event(&mut self, event: &MapEvent, entries: &[DrawingEntry], surface: &mut dyn MapSurface) -> Outcome;

    /// Retry a deferred finalize.
    fn poll_deferred(&mut self, _entries: &[DrawingEntry], _surface: &mut dyn MapSurface) -> Outcome {
        Outcome::Ignored
    }

    /// Complete any deferred finalize immediately, before the tool goes away.
    fn flush(&mut self, _entries: &[DrawingEntry], _surface: &mut dyn MapSurface) -> Outcome {
        Outcome::Ignored
    }

    /// Observe the present snapshot after it changes.
    fn sync(&mut self, _entries: &[DrawingEntry], _surface: &mut dyn MapSurface) {}

    /// Render `entry` as a live overlay with its edit listeners attached.
    /// `None` when the surface is not ready or the entry cannot render yet.
    fn draw(&mut self, entry: &DrawingEntry, is_last_of_type: bool, surface: &mut dyn MapSurface) -> Option<OverlayHandle>;

    /// Feed an event raised on `entry`'s overlay. Returns the replacement
    /// entry when the event edited it.
    fn on_overlay_event(
        &mut self,
        entry: &DrawingEntry,
        event: &OverlayEvent,
        surface: &mut dyn MapSurface,
    ) -> Option<DrawingEntry>;
}

/// Create an overlay handle for `entry`, logging and returning `None` when the
/// surface refuses it. The controller retries on its next reconciliation.
pub(crate) fn render(
    surface: &mut dyn MapSurface,
    entry: EntryId,
    overlay: Overlay,
    kinds: &[EventKind],
) -> Option<OverlayHandle> {
    match OverlayHandle::create(surface, overlay, kinds) {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::debug!(%entry, error = %e, "overlay not drawn");
            None
        }
    }
}

/// Append `entry` to a copy of `entries`.
pub(crate) fn appended(entries: &[DrawingEntry], entry: DrawingEntry) -> Snapshot {
    let mut next = entries.to_vec();
    next.push(entry);
    next
}

/// A single transient, non-interactive overlay such as a rubber band.
#[derive(Debug, Default)]
pub struct Preview {
    overlay: Option<OverlayId>,
}

impl Preview {
    /// Replace the preview with `overlay`. Returns false if the surface refused it.
    pub fn show(&mut self, surface: &mut dyn MapSurface, overlay: Overlay) -> bool {
        self.clear(surface);
        match surface.add_overlay(overlay) {
            Ok(id) => {
                self.overlay = Some(id);
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "preview not shown");
                false
            }
        }
    }

    /// Remove the preview if shown. Calling it again is a no-op.
    pub fn clear(&mut self, surface: &mut dyn MapSurface) {
        if let Some(id) = self.overlay.take() {
            surface.remove_overlay(id);
        }
    }

    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.overlay.is_some()
    }

    #[must_use]
    pub fn overlay(&self) -> Option<OverlayId> {
        self.overlay
    }
}
