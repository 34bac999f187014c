//! Drawing tolerances and limits, optionally read from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use crate::consts::{
    FINALIZE_MAX_ATTEMPTS, FINALIZE_POLL_MS, MIN_SHAPE_METERS, MOUSE_DRAG_SLOP_PX, SNAP_TOLERANCE_PX,
    TOUCH_TAP_SLOP_PX,
};
use crate::input::InputSource;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawConfig {
    pub touch_tap_slop_px: f64,
    pub mouse_drag_slop_px: f64,
    pub snap_tolerance_px: f64,
    pub min_shape_meters: f64,
    pub finalize_poll: Duration,
    pub finalize_max_attempts: u32,
    /// Maximum number of undo steps kept; `None` keeps everything.
    pub history_limit: Option<usize>,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            touch_tap_slop_px: TOUCH_TAP_SLOP_PX,
            mouse_drag_slop_px: MOUSE_DRAG_SLOP_PX,
            snap_tolerance_px: SNAP_TOLERANCE_PX,
            min_shape_meters: MIN_SHAPE_METERS,
            finalize_poll: Duration::from_millis(FINALIZE_POLL_MS),
            finalize_max_attempts: FINALIZE_MAX_ATTEMPTS,
            history_limit: None,
        }
    }
}

impl DrawConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// Optional:
    /// - `DRAW_TOUCH_TAP_SLOP_PX`: default 10
    /// - `DRAW_MOUSE_DRAG_SLOP_PX`: default 3
    /// - `DRAW_SNAP_TOLERANCE_PX`: default 8
    /// - `DRAW_MIN_SHAPE_METERS`: default 1
    /// - `DRAW_FINALIZE_POLL_MS`: default 50
    /// - `DRAW_FINALIZE_MAX_ATTEMPTS`: default 10
    /// - `DRAW_HISTORY_LIMIT`: default 0 (unbounded)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Unparseable numbers fall
    /// back to the default; parseable but out-of-range values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let history_limit = match parse_or(&lookup, "DRAW_HISTORY_LIMIT", 0_usize) {
            0 => None,
            n => Some(n),
        };

        Ok(Self {
            touch_tap_slop_px: tolerance(&lookup, "DRAW_TOUCH_TAP_SLOP_PX", defaults.touch_tap_slop_px)?,
            mouse_drag_slop_px: tolerance(&lookup, "DRAW_MOUSE_DRAG_SLOP_PX", defaults.mouse_drag_slop_px)?,
            snap_tolerance_px: tolerance(&lookup, "DRAW_SNAP_TOLERANCE_PX", defaults.snap_tolerance_px)?,
            min_shape_meters: tolerance(&lookup, "DRAW_MIN_SHAPE_METERS", defaults.min_shape_meters)?,
            finalize_poll: Duration::from_millis(parse_or(&lookup, "DRAW_FINALIZE_POLL_MS", FINALIZE_POLL_MS)),
            finalize_max_attempts: parse_or(&lookup, "DRAW_FINALIZE_MAX_ATTEMPTS", FINALIZE_MAX_ATTEMPTS),
            history_limit,
        })
    }

    /// Pixel movement separating a tap from a drag for the given input source.
    #[must_use]
    pub fn slop_px(&self, source: InputSource) -> f64 {
        match source {
            InputSource::Mouse => self.mouse_drag_slop_px,
            InputSource::Touch => self.touch_tap_slop_px,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn tolerance<F>(lookup: &F, key: &'static str, default: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(lookup, key, default);
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Invalid { key, value: value.to_string() })
    }
}
