//! Circle rules: `[center, radius_reference]`, radius is the great-circle distance.

#[cfg(test)]
#[path = "circle_test.rs"]
mod circle_test;

use crate::consts::CIRCLE_COLOR;
use crate::entry::ShapeKind;
use crate::geo::{self, Point};
use crate::strategy::extent::{ExtentPolicy, ExtentStrategy};
use crate::surface::{EventKind, MapSurface, OverlayEvent, Shape, Style};

const EDIT_EVENTS: &[EventKind] = &[EventKind::CenterChanged, EventKind::RadiusChanged];

#[derive(Debug)]
pub struct Circle;

pub type CircleStrategy = ExtentStrategy<Circle>;

impl ExtentPolicy for Circle {
    const KIND: ShapeKind = ShapeKind::Circle;

    fn style() -> Style {
        Style::filled(CIRCLE_COLOR)
    }

    fn shape(center: Point, reference: Point, surface: &dyn MapSurface) -> Shape {
        Shape::Circle { center, radius_m: surface.distance(center, reference) }
    }

    fn size_meters(center: Point, reference: Point, surface: &dyn MapSurface) -> f64 {
        surface.distance(center, reference)
    }

    fn edit_events() -> &'static [EventKind] {
        EDIT_EVENTS
    }

    fn edited(event: &OverlayEvent) -> Option<Vec<Point>> {
        match event {
            OverlayEvent::CenterChanged { center, radius_m } | OverlayEvent::RadiusChanged { center, radius_m } => {
                Some(vec![*center, geo::offset_north(*center, *radius_m)])
            }
            _ => None,
        }
    }
}
