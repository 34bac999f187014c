//! Line rules: an open path finished by clicking its first or last vertex.

#[cfg(test)]
#[path = "line_test.rs"]
mod line_test;

use crate::consts::{LINE_COLOR, LINE_STROKE_WEIGHT};
use crate::entry::{DrawingEntry, ShapeKind};
use crate::geo::Point;
use crate::strategy::path::{PathPolicy, PathStrategy, Placement};
use crate::surface::{EventKind, Overlay, Shape, Style};

/// Vertices a finished line needs.
const MIN_LINE_VERTICES: usize = 2;

const DONE_EVENTS: &[EventKind] = &[EventKind::PathInsert, EventKind::PathSet, EventKind::PathRemove, EventKind::DragEnd];
const PLACING_EVENTS: &[EventKind] = &[
    EventKind::Click,
    EventKind::MouseOver,
    EventKind::PathInsert,
    EventKind::PathSet,
    EventKind::PathRemove,
    EventKind::DragEnd,
];

#[derive(Debug)]
pub struct Line;

pub type LineStrategy = PathStrategy<Line>;

impl PathPolicy for Line {
    const KIND: ShapeKind = ShapeKind::Line;
    const SNAP_TO_FIRST_MIN: usize = MIN_LINE_VERTICES;

    fn style() -> Style {
        Style::stroke(LINE_COLOR, LINE_STROKE_WEIGHT)
    }

    fn place(points: &[Point], click: Point, near: &dyn Fn(Point, Point) -> bool) -> Placement {
        let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
            return Placement::Append;
        };
        let on_end = near(click, first) || near(click, last);
        if on_end && points.len() >= MIN_LINE_VERTICES {
            return Placement::Finish(points.to_vec());
        }
        if near(click, last) {
            return Placement::Ignore;
        }
        Placement::Append
    }

    fn overlay(entry: &DrawingEntry, is_last_of_type: bool) -> Overlay {
        let style = if entry.done || is_last_of_type { Self::style() } else { Self::style().preview() };
        Overlay { shape: Shape::Polyline { path: entry.points.clone() }, style, editable: true, clickable: true }
    }

    fn edit_events(entry: &DrawingEntry) -> &'static [EventKind] {
        if entry.done { DONE_EVENTS } else { PLACING_EVENTS }
    }

    fn edited(entry: &DrawingEntry, path: &[Point]) -> Option<Vec<Point>> {
        let required = if entry.done { MIN_LINE_VERTICES } else { 1 };
        if path.len() < required {
            tracing::debug!(entry = %entry.id, vertices = path.len(), "line edit rejected");
            return None;
        }
        Some(path.to_vec())
    }
}
