//! Rectangle rules: two opposite corners, stored south-west then north-east after an edit.

#[cfg(test)]
#[path = "rectangle_test.rs"]
mod rectangle_test;

use crate::consts::RECTANGLE_COLOR;
use crate::entry::ShapeKind;
use crate::geo::{Bounds, Point};
use crate::strategy::extent::{ExtentPolicy, ExtentStrategy};
use crate::surface::{EventKind, MapSurface, OverlayEvent, Shape, Style};

const EDIT_EVENTS: &[EventKind] = &[EventKind::BoundsChanged];

#[derive(Debug)]
pub struct Rectangle;

pub type RectangleStrategy = ExtentStrategy<Rectangle>;

impl ExtentPolicy for Rectangle {
    const KIND: ShapeKind = ShapeKind::Rectangle;

    fn style() -> Style {
        Style::filled(RECTANGLE_COLOR)
    }

    fn shape(a: Point, b: Point, _surface: &dyn MapSurface) -> Shape {
        Shape::Rectangle { bounds: Bounds::from_corners(a, b) }
    }

    /// The shorter side, so a zero-area box is degenerate however long it is.
    fn size_meters(a: Point, b: Point, _surface: &dyn MapSurface) -> f64 {
        let bounds = Bounds::from_corners(a, b);
        bounds.width_meters().min(bounds.height_meters())
    }

    fn edit_events() -> &'static [EventKind] {
        EDIT_EVENTS
    }

    fn edited(event: &OverlayEvent) -> Option<Vec<Point>> {
        match event {
            OverlayEvent::BoundsChanged(bounds) => Some(vec![bounds.south_west(), bounds.north_east()]),
            _ => None,
        }
    }
}
