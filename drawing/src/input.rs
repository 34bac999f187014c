//! Input model: tools, normalized pointer samples, and the tap/drag gesture machine.
//!
//! Mouse and touch input are normalized into [`InputSample`]s before reaching
//! a strategy. `Gesture` tracks one press from pointer-down to pointer-up and
//! decides, by the distance moved in screen pixels, whether the release ends a
//! tap or a drag:
//!
//! ```text
//! Idle --down--> Pressed --move beyond slop--> Dragging
//!                   |                             |
//!                   +--up--> Tap                  +--up--> DragEnd
//! ```

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::entry::ShapeKind;
use crate::geo::{Pixel, Point};
use crate::surface::MapSurface;

/// Which drawing tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// No tool; the map behaves normally.
    #[default]
    None,
    Polygon,
    Line,
    Circle,
    Rectangle,
}

impl Tool {
    /// The shape kind this tool draws, if any.
    #[must_use]
    pub fn shape(self) -> Option<ShapeKind> {
        match self {
            Self::None => None,
            Self::Polygon => Some(ShapeKind::Polygon),
            Self::Line => Some(ShapeKind::Line),
            Self::Circle => Some(ShapeKind::Circle),
            Self::Rectangle => Some(ShapeKind::Rectangle),
        }
    }
}

impl From<ShapeKind> for Tool {
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Polygon => Self::Polygon,
            ShapeKind::Line => Self::Line,
            ShapeKind::Circle => Self::Circle,
            ShapeKind::Rectangle => Self::Rectangle,
        }
    }
}

/// Device that produced a pointer sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    #[default]
    Mouse,
    Touch,
}

/// A pointer position normalized to both map and screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSample {
    pub point: Point,
    pub pixel: Pixel,
    pub source: InputSource,
    pub timestamp_ms: u64,
}

impl InputSample {
    /// Sample at a geographic point, projected through the surface.
    #[must_use]
    pub fn at_point(surface: &dyn MapSurface, point: Point, source: InputSource, timestamp_ms: u64) -> Self {
        Self { point, pixel: surface.project(point), source, timestamp_ms }
    }

    /// Sample at a screen position, unprojected through the surface.
    #[must_use]
    pub fn at_pixel(surface: &dyn MapSurface, pixel: Pixel, source: InputSource, timestamp_ms: u64) -> Self {
        Self { point: surface.unproject(pixel), pixel, source, timestamp_ms }
    }

    /// Normalize a touch list: the first touch drives the gesture.
    /// Returns `None` for an empty list.
    #[must_use]
    pub fn from_touches(surface: &dyn MapSurface, touches: &[Pixel], timestamp_ms: u64) -> Option<Self> {
        let first = touches.first()?;
        Some(Self::at_pixel(surface, *first, InputSource::Touch, timestamp_ms))
    }
}

/// How a press ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    /// The pointer never left the slop radius.
    Tap { origin: InputSample, at: InputSample },
    /// The pointer moved beyond the slop radius before release.
    DragEnd { origin: InputSample, at: InputSample },
}

/// Tap/drag state for one press.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    /// No press in progress.
    #[default]
    Idle,
    /// Pointer is down and has stayed within the slop radius.
    Pressed {
        origin: InputSample,
    },
    /// Pointer is down and has moved beyond the slop radius.
    Dragging {
        origin: InputSample,
        last: InputSample,
    },
}

impl Gesture {
    /// Begin a press. Any gesture already in progress is abandoned.
    pub fn press(&mut self, at: InputSample) {
        *self = Self::Pressed { origin: at };
    }

    /// Track movement. Returns the drag origin once the press has become a drag.
    pub fn track(&mut self, at: InputSample, slop_px: f64) -> Option<InputSample> {
        match *self {
            Self::Idle => None,
            Self::Pressed { origin } => {
                if origin.pixel.distance_to(at.pixel) > slop_px {
                    *self = Self::Dragging { origin, last: at };
                    Some(origin)
                } else {
                    None
                }
            }
            Self::Dragging { origin, .. } => {
                *self = Self::Dragging { origin, last: at };
                Some(origin)
            }
        }
    }

    /// End the press, returning to `Idle`. `None` when no press was in progress.
    pub fn release(&mut self, at: InputSample, slop_px: f64) -> Option<Release> {
        let released = match *self {
            Self::Idle => None,
            Self::Pressed { origin } => {
                if origin.pixel.distance_to(at.pixel) > slop_px {
                    Some(Release::DragEnd { origin, at })
                } else {
                    Some(Release::Tap { origin, at })
                }
            }
            Self::Dragging { origin, .. } => Some(Release::DragEnd { origin, at }),
        };
        *self = Self::Idle;
        released
    }

    /// Abandon any press in progress.
    pub fn reset(&mut self) {
        *self = Self::Idle;
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }
}
