//! Scripted replay of a drawing session over the headless map surface.
//!
//! A script is a JSON object with an optional `zoom` and `center` and a list
//! of `steps`, each tagged by `op`:
//!
//! ```json
//! {"zoom": 16, "steps": [
//!   {"op": "select", "tool": "circle"},
//!   {"op": "down", "at": {"lat": 40.0, "lng": -74.0}},
//!   {"op": "move", "at": {"lat": 40.001, "lng": -74.0}},
//!   {"op": "up", "at": {"lat": 40.001, "lng": -74.0}}
//! ]}
//! ```
//!
//! Deferred finalizes are settled before the next step by sleeping for the
//! requested interval and polling the controller.

#[cfg(test)]
#[path = "replay_test.rs"]
mod replay_test;

use drawing::config::ConfigError;
use drawing::geo::Point;
use drawing::input::{InputSample, InputSource};
use drawing::memory::MemorySurface;
use drawing::surface::MapEvent;
use drawing::{DrawConfig, DrawController, Snapshot, SurfaceEvent, Tool};
use serde::Deserialize;

pub const DEFAULT_ZOOM: f64 = 16.0;

/// Simulated time between consecutive steps.
const STEP_MS: u64 = 16;

/// Viewport used when the script centers the map.
const VIEWPORT_PX: (f64, f64) = (1024.0, 768.0);

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub zoom: Option<f64>,
    #[serde(default)]
    pub center: Option<Point>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Select { tool: Tool },
    Toggle { tool: Tool },
    Click {
        at: Point,
        #[serde(default)]
        source: InputSource,
    },
    Down {
        at: Point,
        #[serde(default)]
        source: InputSource,
    },
    Move {
        at: Point,
        #[serde(default)]
        source: InputSource,
    },
    Up {
        at: Point,
        #[serde(default)]
        source: InputSource,
    },
    Undo,
    Redo,
    Clear,
    Load { entries: Snapshot },
    /// Flip map readiness; turning it back on also refreshes the controller.
    Ready { ready: bool },
}

impl Script {
    /// Parse a script, filling in `default_zoom` when it sets none.
    pub fn parse(source: &str, default_zoom: f64) -> Result<Self, ReplayError> {
        let mut script: Self = serde_json::from_str(source)?;
        script.zoom = Some(script.zoom.unwrap_or(default_zoom));
        Ok(script)
    }

    fn surface(&self) -> MemorySurface {
        let zoom = self.zoom.unwrap_or(DEFAULT_ZOOM);
        match self.center {
            Some(center) => MemorySurface::centered(zoom, center, VIEWPORT_PX.0, VIEWPORT_PX.1),
            None => MemorySurface::new(zoom),
        }
    }
}

/// Run every step and return the final present snapshot. The controller is
/// torn down afterwards, so the surface ends empty.
pub async fn run(script: &Script, config: DrawConfig) -> Snapshot {
    let mut surface = script.surface();
    let mut controller = DrawController::new(config);

    for ((idx, step), clock_ms) in script.steps.iter().enumerate().zip(step_clock()) {
        tracing::debug!(step = idx, ?step, "replay step");
        let mut pending = apply(&mut controller, &mut surface, step, clock_ms);
        while let Some(delay) = pending {
            tokio::time::sleep(delay).await;
            pending = controller.poll_deferred(&mut surface);
        }
    }

    let snapshot = controller.present().to_vec();
    tracing::info!(
        steps = script.steps.len(),
        entries = snapshot.len(),
        undo = controller.has_undo(),
        redo = controller.has_redo(),
        "replay finished"
    );
    controller.teardown(&mut surface);
    snapshot
}

/// Simulated timestamps, one per step.
fn step_clock() -> impl Iterator<Item = u64> {
    (0_u64..).map(|n| n * STEP_MS)
}

fn apply(
    controller: &mut DrawController,
    surface: &mut MemorySurface,
    step: &Step,
    clock_ms: u64,
) -> Option<std::time::Duration> {
    let pointer = |surface: &MemorySurface, at: Point, source: InputSource| {
        InputSample::at_point(surface, at, source, clock_ms)
    };
    let event = match step {
        Step::Select { tool } => {
            controller.select_tool(*tool, surface);
            return None;
        }
        Step::Toggle { tool } => {
            controller.toggle_tool(*tool, surface);
            return None;
        }
        Step::Undo => {
            controller.undo(surface);
            return None;
        }
        Step::Redo => {
            controller.redo(surface);
            return None;
        }
        Step::Clear => {
            controller.clear(surface);
            return None;
        }
        Step::Load { entries } => {
            controller.load_snapshot(entries.clone(), surface);
            return None;
        }
        Step::Ready { ready } => {
            surface.set_ready(*ready);
            if *ready {
                controller.refresh(surface);
            }
            return None;
        }
        Step::Click { at, source } => MapEvent::Click(pointer(&*surface, *at, *source)),
        Step::Down { at, source } => MapEvent::PointerDown(pointer(&*surface, *at, *source)),
        Step::Move { at, source } => MapEvent::PointerMove(pointer(&*surface, *at, *source)),
        Step::Up { at, source } => MapEvent::PointerUp(pointer(&*surface, *at, *source)),
    };
    controller.dispatch(&SurfaceEvent::Map(event), surface)
}
