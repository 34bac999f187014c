use super::*;
use crate::memory::MemorySurface;

fn p(lat: f64, lng: f64) -> Point {
    Point::new(lat, lng)
}

#[test]
fn radius_is_great_circle_distance_to_reference() {
    let surface = MemorySurface::new(10.0);
    let center = p(10.0, 10.0);
    let reference = p(10.1, 10.0);
    let Shape::Circle { center: c, radius_m } = Circle::shape(center, reference, &surface) else {
        panic!("expected circle");
    };
    assert_eq!(c, center);
    assert!((radius_m - geo::distance_meters(center, reference)).abs() < 1e-9);
    // 0.1 degree of latitude is a little over 11 km.
    assert!((11_000.0..11_300.0).contains(&radius_m));
}

#[test]
fn size_is_radius() {
    let surface = MemorySurface::new(10.0);
    let size = Circle::size_meters(p(10.0, 10.0), p(10.0, 10.0), &surface);
    assert!(size.abs() < 1e-9);
}

#[test]
fn style_is_filled_green() {
    let style = Circle::style();
    assert_eq!(style.stroke_color, CIRCLE_COLOR);
    assert_eq!(style.fill_color, Some(CIRCLE_COLOR));
}

#[test]
fn radius_edit_moves_reference_due_north() {
    let center = p(10.0, 10.0);
    let points = Circle::edited(&OverlayEvent::RadiusChanged { center, radius_m: 1113.2 }).unwrap();
    assert_eq!(points[0], center);
    assert!((points[1].lat - 10.01).abs() < 1e-9);
    assert!((points[1].lng - 10.0).abs() < f64::EPSILON);
}

#[test]
fn center_edit_keeps_radius() {
    let moved = p(20.0, 30.0);
    let points = Circle::edited(&OverlayEvent::CenterChanged { center: moved, radius_m: 500.0 }).unwrap();
    assert_eq!(points[0], moved);
    let radius = geo::distance_meters(points[0], points[1]);
    assert!((radius - 500.0).abs() < 5.0);
}

#[test]
fn other_events_are_not_edits() {
    let bounds = crate::geo::Bounds::from_corners(p(0.0, 0.0), p(1.0, 1.0));
    assert!(Circle::edited(&OverlayEvent::BoundsChanged(bounds)).is_none());
}
