//! Draw controller: tool selection, history, event routing and overlay reconciliation.
//!
//! DESIGN
//! ======
//! The controller owns the history and an arena of live overlay handles keyed
//! by entry identity. After every history change it reconciles: handles whose
//! entry left the present snapshot are destroyed, and every entry without a
//! handle is drawn by its kind's strategy. Entries are replaced (never mutated)
//! on edit, so a changed entry always gets a fresh overlay.
//!
//! Exactly one strategy holds map listeners at a time. Selecting a tool first
//! ends the current session (flushing any deferred finalize, stopping the
//! strategy, releasing its listeners and the cursor override) and only then
//! starts the next one.
//!
//! The host owns the map surface and passes it into every call. Events reach
//! a strategy only while the controller still holds a listener registration
//! matching the event's target and kind.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::config::DrawConfig;
use crate::entry::{self, DrawingEntry, EntryId, ShapeKind, Snapshot};
use crate::history::History;
use crate::input::Tool;
use crate::strategy::{
    CircleStrategy, DrawingStrategy, LineStrategy, Outcome, PolygonStrategy, RectangleStrategy,
};
use crate::surface::{Cursor, ListenerSet, MapSurface, OverlayHandle, OverlayId, SurfaceEvent};

/// The four shape strategies, one per kind.
struct Strategies {
    polygon: PolygonStrategy,
    line: LineStrategy,
    circle: CircleStrategy,
    rectangle: RectangleStrategy,
}

impl Strategies {
    fn new(config: DrawConfig) -> Self {
        Self {
            polygon: PolygonStrategy::new(config),
            line: LineStrategy::new(config),
            circle: CircleStrategy::new(config),
            rectangle: RectangleStrategy::new(config),
        }
    }

    fn get_mut(&mut self, kind: ShapeKind) -> &mut dyn DrawingStrategy {
        match kind {
            ShapeKind::Polygon => &mut self.polygon,
            ShapeKind::Line => &mut self.line,
            ShapeKind::Circle => &mut self.circle,
            ShapeKind::Rectangle => &mut self.rectangle,
        }
    }
}

/// Listeners held on behalf of the active tool.
struct ToolSession {
    kind: ShapeKind,
    listeners: ListenerSet,
}

pub struct DrawController {
    config: DrawConfig,
    history: History<DrawingEntry>,
    tool: Tool,
    session: Option<ToolSession>,
    strategies: Strategies,
    overlays: HashMap<EntryId, OverlayHandle>,
    owners: HashMap<OverlayId, EntryId>,
    torn_down: bool,
}

impl Default for DrawController {
    fn default() -> Self {
        Self::new(DrawConfig::default())
    }
}

impl DrawController {
    #[must_use]
    pub fn new(config: DrawConfig) -> Self {
        let history = match config.history_limit {
            Some(limit) => History::with_limit(limit),
            None => History::new(),
        };
        Self {
            config,
            history,
            tool: Tool::None,
            session: None,
            strategies: Strategies::new(config),
            overlays: HashMap::new(),
            owners: HashMap::new(),
            torn_down: false,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// The current snapshot.
    #[must_use]
    pub fn present(&self) -> &[DrawingEntry] {
        self.history.present()
    }

    #[must_use]
    pub fn has_undo(&self) -> bool {
        self.history.has_undo()
    }

    #[must_use]
    pub fn has_redo(&self) -> bool {
        self.history.has_redo()
    }

    #[must_use]
    pub fn config(&self) -> &DrawConfig {
        &self.config
    }

    /// Whether a strategy currently holds map listeners.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.session.is_some()
    }

    /// The overlay currently rendering `entry`, if any.
    #[must_use]
    pub fn overlay_of(&self, entry: EntryId) -> Option<OverlayId> {
        self.overlays.get(&entry).map(|h| h.overlay)
    }

    /// Number of entries with a live overlay.
    #[must_use]
    pub fn live_overlays(&self) -> usize {
        self.overlays.len()
    }

    /// Serialize the current snapshot.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self.history.present())
    }

    // --- Toolbar ---

    /// Activate `tool`, fully releasing the previous tool first.
    pub fn select_tool(&mut self, tool: Tool, surface: &mut dyn MapSurface) {
        if tool == self.tool {
            return;
        }
        self.end_session(surface);
        tracing::info!(from = ?self.tool, to = ?tool, "tool selected");
        self.tool = tool;
        self.start_session(surface);
    }

    /// Select `tool`, or deselect it if it is already active.
    pub fn toggle_tool(&mut self, tool: Tool, surface: &mut dyn MapSurface) {
        let next = if self.tool == tool { Tool::None } else { tool };
        self.select_tool(next, surface);
    }

    pub fn undo(&mut self, surface: &mut dyn MapSurface) {
        if self.history.undo() {
            self.reconcile(surface);
        }
    }

    pub fn redo(&mut self, surface: &mut dyn MapSurface) {
        if self.history.redo() {
            self.reconcile(surface);
        }
    }

    /// Commit an empty snapshot. Undoable.
    pub fn clear(&mut self, surface: &mut dyn MapSurface) {
        self.commit(Vec::new(), surface);
    }

    /// Commit `entries` as the new present. Undoable.
    pub fn load_snapshot(&mut self, entries: Snapshot, surface: &mut dyn MapSurface) {
        self.commit(entries, surface);
    }

    // --- Events ---

    /// Route a host event. Returns a delay after which
    /// [`poll_deferred`](Self::poll_deferred) should be called, if a finalize
    /// is waiting on the surface.
    pub fn dispatch(&mut self, event: &SurfaceEvent, surface: &mut dyn MapSurface) -> Option<Duration> {
        let outcome = match event {
            SurfaceEvent::Map(map_event) => {
                let Some(session) = &self.session else {
                    return None;
                };
                if !session.listeners.covers(event.target(), event.kind()) {
                    return None;
                }
                let kind = session.kind;
                self.strategies.get_mut(kind).on_map_event(map_event, self.history.present(), surface)
            }
            SurfaceEvent::Overlay { overlay, event: overlay_event } => {
                let Some(entry_id) = self.owners.get(overlay).copied() else {
                    return None;
                };
                let listening = self
                    .overlays
                    .get(&entry_id)
                    .is_some_and(|h| h.listeners.covers(event.target(), event.kind()));
                if !listening {
                    return None;
                }
                let Some(entry) = self.history.present().iter().find(|e| e.id == entry_id) else {
                    return None;
                };
                let updated = self.strategies.get_mut(entry.kind).on_overlay_event(entry, overlay_event, surface)?;
                match entry::replace_entry(self.history.present(), entry_id, updated) {
                    Some(next) => Outcome::Commit(next),
                    None => Outcome::Ignored,
                }
            }
        };
        self.apply(outcome, surface)
    }

    /// Retry a deferred finalize. Returns the next delay if still waiting.
    pub fn poll_deferred(&mut self, surface: &mut dyn MapSurface) -> Option<Duration> {
        let kind = self.session.as_ref()?.kind;
        let outcome = self.strategies.get_mut(kind).poll_deferred(self.history.present(), surface);
        self.apply(outcome, surface)
    }

    /// Reconcile overlays with the present snapshot, drawing anything the
    /// surface refused earlier and re-acquiring the tool's listeners if that
    /// failed. Hosts call this once the surface becomes ready.
    pub fn refresh(&mut self, surface: &mut dyn MapSurface) {
        if self.session.is_none() {
            self.start_session(surface);
        }
        self.reconcile(surface);
    }

    /// Release every listener and overlay and reset history.
    pub fn teardown(&mut self, surface: &mut dyn MapSurface) {
        self.end_session(surface);
        self.tool = Tool::None;
        for (_, handle) in self.overlays.drain() {
            handle.destroy(surface);
        }
        self.owners.clear();
        self.history.clean();
        self.torn_down = true;
        tracing::info!("draw controller torn down");
    }

    // --- Internals ---

    fn apply(&mut self, outcome: Outcome, surface: &mut dyn MapSurface) -> Option<Duration> {
        match outcome {
            Outcome::Commit(snapshot) => {
                self.commit(snapshot, surface);
                None
            }
            Outcome::RetryAfter(delay) => Some(delay),
            Outcome::Handled | Outcome::Ignored => None,
        }
    }

    fn commit(&mut self, snapshot: Snapshot, surface: &mut dyn MapSurface) {
        tracing::debug!(entries = snapshot.len(), "history entry added");
        self.history.add_entry(snapshot);
        self.torn_down = false;
        self.reconcile(surface);
    }

    fn start_session(&mut self, surface: &mut dyn MapSurface) {
        let Some(kind) = self.tool.shape() else {
            return;
        };
        match self.strategies.get_mut(kind).start_listeners(surface) {
            Ok(listeners) => {
                self.session = Some(ToolSession { kind, listeners });
                self.torn_down = false;
            }
            Err(e) => tracing::debug!(?kind, error = %e, "tool listeners not attached"),
        }
    }

    fn end_session(&mut self, surface: &mut dyn MapSurface) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        let strategy = self.strategies.get_mut(session.kind);
        let settled = strategy.flush(self.history.present(), surface);
        strategy.stop(surface);
        session.listeners.release(surface);
        surface.set_cursor(Cursor::Default);
        self.apply(settled, surface);
    }

    fn reconcile(&mut self, surface: &mut dyn MapSurface) {
        let present = self.history.present();
        let live: HashSet<EntryId> = present.iter().map(|e| e.id).collect();

        let stale: Vec<EntryId> = self.overlays.keys().filter(|id| !live.contains(id)).copied().collect();
        for id in stale {
            if let Some(handle) = self.overlays.remove(&id) {
                self.owners.remove(&handle.overlay);
                handle.destroy(surface);
            }
        }

        for kind in ShapeKind::ALL {
            self.strategies.get_mut(kind).sync(present, surface);
        }

        let last_of_type: HashMap<ShapeKind, usize> = ShapeKind::ALL
            .into_iter()
            .filter_map(|kind| entry::last_index_of(present, kind).map(|idx| (kind, idx)))
            .collect();

        for (idx, entry) in present.iter().enumerate() {
            if self.overlays.contains_key(&entry.id) {
                continue;
            }
            let is_last_of_type = last_of_type.get(&entry.kind) == Some(&idx);
            if let Some(handle) = self.strategies.get_mut(entry.kind).draw(entry, is_last_of_type, surface) {
                self.owners.insert(handle.overlay, entry.id);
                self.overlays.insert(entry.id, handle);
            }
        }
    }
}

impl Drop for DrawController {
    fn drop(&mut self) {
        if !self.torn_down && (self.session.is_some() || !self.overlays.is_empty()) {
            tracing::warn!(
                overlays = self.overlays.len(),
                listening = self.session.is_some(),
                "draw controller dropped without teardown; map resources leaked"
            );
        }
    }
}
