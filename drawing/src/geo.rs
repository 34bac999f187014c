//! Geographic and screen-space primitives.
//!
//! `Point` is a latitude/longitude pair exactly as the map surface reports it;
//! `Pixel` is a screen position in CSS pixels. Distances are great-circle
//! distances in meters, good enough for on-screen editing.

#[cfg(test)]
#[path = "geo_test.rs"]
mod geo_test;

use serde::{Deserialize, Serialize};

use crate::consts::{EARTH_RADIUS_M, MAX_MERCATOR_LAT, METERS_PER_DEGREE_LAT, TILE_SIZE_PX};

/// A geographic coordinate. Two points are equal when both components are equal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A screen-space position in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl Pixel {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another pixel.
    #[must_use]
    pub fn distance_to(self, other: Pixel) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Great-circle distance between two points in meters (haversine).
#[must_use]
pub fn distance_meters(a: Point, b: Point) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// The point `meters` due north of `center`, used as a circle's radius reference.
#[must_use]
pub fn offset_north(center: Point, meters: f64) -> Point {
    Point::new(center.lat + meters / METERS_PER_DEGREE_LAT, center.lng)
}

/// Axis-aligned lat/lng box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Smallest box containing both corners, in either order.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            south: a.lat.min(b.lat),
            west: a.lng.min(b.lng),
            north: a.lat.max(b.lat),
            east: a.lng.max(b.lng),
        }
    }

    #[must_use]
    pub fn south_west(&self) -> Point {
        Point::new(self.south, self.west)
    }

    #[must_use]
    pub fn north_east(&self) -> Point {
        Point::new(self.north, self.east)
    }

    /// East-west extent measured along the southern edge.
    #[must_use]
    pub fn width_meters(&self) -> f64 {
        distance_meters(self.south_west(), Point::new(self.south, self.east))
    }

    /// North-south extent measured along the western edge.
    #[must_use]
    pub fn height_meters(&self) -> f64 {
        distance_meters(self.south_west(), Point::new(self.north, self.west))
    }
}

/// World size in pixels at the given zoom.
fn world_px(zoom: f64) -> f64 {
    TILE_SIZE_PX * zoom.exp2()
}

/// Project a point to Web-Mercator world pixels at `zoom`.
#[must_use]
pub fn web_mercator_project(point: Point, zoom: f64) -> Pixel {
    let size = world_px(zoom);
    let lat = point.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = (point.lng + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * size;
    Pixel { x, y }
}

/// Inverse of [`web_mercator_project`].
#[must_use]
pub fn web_mercator_unproject(pixel: Pixel, zoom: f64) -> Point {
    let size = world_px(zoom);
    let lng = pixel.x / size * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * pixel.y / size);
    let lat = n.sinh().atan().to_degrees();
    Point { lat, lng }
}
