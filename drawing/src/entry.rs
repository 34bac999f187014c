//! Drawing entries: the persisted unit of the drawing history.
//!
//! A `DrawingEntry` is one shape on the map: its kind, its ordered points and
//! whether it has been finalized. Entries are values. Any change to an entry
//! (a new vertex, a drag, a resize) produces a replacement entry with a fresh
//! [`EntryId`], so the controller can tell which live overlays are stale by
//! identity alone.
//!
//! Point semantics per kind:
//!
//! | Kind | `points` |
//! |------|----------|
//! | polygon | vertices; a closed ring repeats the first vertex at the end |
//! | line | vertices in order |
//! | circle | `[center, radius_reference]` |
//! | rectangle | `[corner, opposite_corner]` |

#[cfg(test)]
#[path = "entry_test.rs"]
mod entry_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Point;

/// Identity of one version of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The geometric kind of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Polygon,
    Line,
    Circle,
    Rectangle,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [Self::Polygon, Self::Line, Self::Circle, Self::Rectangle];
}

/// One drawable shape plus its placement state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingEntry {
    #[serde(default)]
    pub id: EntryId,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub points: Vec<Point>,
    /// False while the shape is still being placed.
    #[serde(default)]
    pub done: bool,
}

impl DrawingEntry {
    /// A new in-progress entry.
    #[must_use]
    pub fn new(kind: ShapeKind, points: Vec<Point>) -> Self {
        Self { id: EntryId::new(), kind, points, done: false }
    }

    /// A new finalized entry.
    #[must_use]
    pub fn finished(kind: ShapeKind, points: Vec<Point>) -> Self {
        Self { id: EntryId::new(), kind, points, done: true }
    }

    /// Replacement for this entry with new points. Kind and `done` carry over.
    #[must_use]
    pub fn with_points(&self, points: Vec<Point>) -> Self {
        Self { id: EntryId::new(), kind: self.kind, points, done: self.done }
    }

    /// Replacement for this entry with new points, marked finalized.
    #[must_use]
    pub fn finalized(&self, points: Vec<Point>) -> Self {
        Self { id: EntryId::new(), kind: self.kind, points, done: true }
    }

    #[must_use]
    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Whether the points form a closed ring: more than two points with the
    /// first equal to the last.
    #[must_use]
    pub fn is_closed_ring(&self) -> bool {
        is_closed_ring(&self.points)
    }

    /// Whether the entry has enough points for its kind to render.
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        match self.kind {
            ShapeKind::Polygon | ShapeKind::Line => !self.points.is_empty(),
            ShapeKind::Circle | ShapeKind::Rectangle => self.points.len() == 2,
        }
    }
}

/// Closed-ring test shared by entries and raw point lists.
#[must_use]
pub fn is_closed_ring(points: &[Point]) -> bool {
    points.len() > 2 && points.first() == points.last()
}

/// An ordered list of entries representing the drawing at one moment.
pub type Snapshot = Vec<DrawingEntry>;

/// Replace the entry whose id is `old` with `new`, preserving order.
/// Returns `None` when `old` is not in the snapshot.
#[must_use]
pub fn replace_entry(entries: &[DrawingEntry], old: EntryId, new: DrawingEntry) -> Option<Snapshot> {
    let idx = entries.iter().position(|e| e.id == old)?;
    let mut next = entries.to_vec();
    next[idx] = new;
    Some(next)
}

/// Index of the last entry of `kind`, if any.
#[must_use]
pub fn last_index_of(entries: &[DrawingEntry], kind: ShapeKind) -> Option<usize> {
    entries.iter().rposition(|e| e.kind == kind)
}
