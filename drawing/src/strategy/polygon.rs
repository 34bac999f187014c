//! Polygon rules: a path closed by clicking its first vertex.
//!
//! A finished polygon is stored as a closed ring whose last point repeats the
//! first. Overlay editors report the ring without the repeated point and may
//! rotate it so a different vertex comes first; edits are realigned onto the
//! previous first vertex before the ring is closed again.

#[cfg(test)]
#[path = "polygon_test.rs"]
mod polygon_test;

use crate::consts::{POLYGON_COLOR, STROKE_WEIGHT};
use crate::entry::{is_closed_ring, DrawingEntry, ShapeKind};
use crate::geo::Point;
use crate::strategy::path::{PathPolicy, PathStrategy, Placement};
use crate::surface::{EventKind, Overlay, Shape, Style};

/// Fewest distinct vertices in a ring.
const MIN_RING_VERTICES: usize = 3;

const CLOSED_EVENTS: &[EventKind] = &[EventKind::PathInsert, EventKind::PathSet, EventKind::PathRemove];
const OPEN_EVENTS: &[EventKind] = &[
    EventKind::Click,
    EventKind::MouseOver,
    EventKind::PathInsert,
    EventKind::PathSet,
    EventKind::PathRemove,
];

#[derive(Debug)]
pub struct Polygon;

pub type PolygonStrategy = PathStrategy<Polygon>;

impl PathPolicy for Polygon {
    const KIND: ShapeKind = ShapeKind::Polygon;
    const SNAP_TO_FIRST_MIN: usize = MIN_RING_VERTICES;

    fn style() -> Style {
        Style::stroke(POLYGON_COLOR, STROKE_WEIGHT)
    }

    fn place(points: &[Point], click: Point, near: &dyn Fn(Point, Point) -> bool) -> Placement {
        let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
            return Placement::Append;
        };
        if near(click, first) {
            if points.len() >= MIN_RING_VERTICES {
                return Placement::Finish(close_ring(points));
            }
            return Placement::Ignore;
        }
        if near(click, last) {
            return Placement::Ignore;
        }
        Placement::Append
    }

    fn accepts_more(entry: &DrawingEntry) -> bool {
        !entry.is_closed_ring()
    }

    fn overlay(entry: &DrawingEntry, is_last_of_type: bool) -> Overlay {
        if entry.is_closed_ring() {
            return Overlay {
                shape: Shape::Polygon { ring: open_ring(&entry.points).to_vec() },
                style: Style::filled(POLYGON_COLOR),
                editable: true,
                clickable: true,
            };
        }
        let style = if is_last_of_type { Self::style() } else { Self::style().preview() };
        Overlay { shape: Shape::Polyline { path: entry.points.clone() }, style, editable: true, clickable: true }
    }

    fn edit_events(entry: &DrawingEntry) -> &'static [EventKind] {
        if entry.is_closed_ring() { CLOSED_EVENTS } else { OPEN_EVENTS }
    }

    fn edited(entry: &DrawingEntry, path: &[Point]) -> Option<Vec<Point>> {
        if entry.is_closed_ring() {
            let ring = realign(open_ring(&entry.points), open_ring(path));
            if ring.len() < MIN_RING_VERTICES {
                tracing::debug!(entry = %entry.id, vertices = ring.len(), "polygon edit rejected");
                return None;
            }
            return Some(close_ring(&ring));
        }
        if path.is_empty() {
            return None;
        }
        Some(path.to_vec())
    }
}

/// `points` followed by a copy of its first point.
#[must_use]
pub fn close_ring(points: &[Point]) -> Vec<Point> {
    let mut ring = points.to_vec();
    if let Some(&first) = points.first() {
        ring.push(first);
    }
    ring
}

/// `points` without the repeated closing point, if it is a closed ring.
#[must_use]
pub fn open_ring(points: &[Point]) -> &[Point] {
    if is_closed_ring(points) { &points[..points.len() - 1] } else { points }
}

/// Rotate `edited` so that `previous`'s first vertex comes first again. When
/// that vertex no longer exists in `edited` the edited order is kept.
#[must_use]
pub fn realign(previous: &[Point], edited: &[Point]) -> Vec<Point> {
    let mut ring = edited.to_vec();
    let Some(&first) = previous.first() else {
        return ring;
    };
    if let Some(offset) = ring.iter().position(|p| *p == first) {
        ring.rotate_left(offset);
    }
    ring
}
