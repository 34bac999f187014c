//! Map drawing core: tools, gestures, undoable shape history and live overlays.
//!
//! This crate is host-agnostic. It never touches a map SDK directly; the host
//! implements [`surface::MapSurface`] for its map, forwards pointer and overlay
//! events into a [`controller::DrawController`], and calls
//! [`controller::DrawController::poll_deferred`] when asked to. The controller
//! turns those events into committed [`entry::DrawingEntry`] snapshots and keeps
//! exactly one overlay on the surface per entry in the present snapshot.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`controller`] | Tool selection, history, event routing and overlay reconciliation |
//! | [`strategy`] | Per-shape input interpretation and rendering |
//! | [`history`] | Generic past/present/future undo stack |
//! | [`entry`] | Drawing entries, shape kinds and snapshot helpers |
//! | [`input`] | Tools, normalized pointer samples and the tap/drag gesture machine |
//! | [`surface`] | The map-surface trait, events, overlays and listener ownership |
//! | [`memory`] | Headless [`surface::MapSurface`] for tests and replay |
//! | [`geo`] | Points, bounds, great-circle distance and Web-Mercator projection |
//! | [`config`] | Tolerances and limits, optionally from `DRAW_*` environment variables |
//! | [`consts`] | Shared numeric and style constants |

pub mod config;
pub mod consts;
pub mod controller;
pub mod entry;
pub mod geo;
pub mod history;
pub mod input;
pub mod memory;
pub mod strategy;
pub mod surface;

pub use config::{ConfigError, DrawConfig};
pub use controller::DrawController;
pub use entry::{DrawingEntry, EntryId, ShapeKind, Snapshot};
pub use input::Tool;
pub use surface::{MapSurface, SurfaceError, SurfaceEvent};
