use super::*;
use crate::geo::Point;
use crate::input::{InputSample, InputSource};
use crate::memory::{MemorySurface, SurfaceOp};
use crate::strategy::polygon::close_ring;
use crate::surface::{EventKind, EventTarget, MapEvent, OverlayEvent, PathChange, Shape};

// At zoom 10, 0.1 degree is ~73 px: well outside snap tolerance.
const ZOOM: f64 = 10.0;

fn p(lat: f64, lng: f64) -> Point {
    Point::new(lat, lng)
}

fn setup() -> (DrawController, MemorySurface) {
    (DrawController::new(DrawConfig::default()), MemorySurface::new(ZOOM))
}

fn mouse(surface: &MemorySurface, point: Point) -> InputSample {
    InputSample::at_point(surface, point, InputSource::Mouse, 0)
}

fn click(ctrl: &mut DrawController, surface: &mut MemorySurface, point: Point) {
    let event = SurfaceEvent::Map(MapEvent::Click(mouse(surface, point)));
    ctrl.dispatch(&event, surface);
}

fn press_release(ctrl: &mut DrawController, surface: &mut MemorySurface, from: Point, via: Option<Point>, to: Point) {
    ctrl.dispatch(&SurfaceEvent::Map(MapEvent::PointerDown(mouse(surface, from))), surface);
    if let Some(via) = via {
        ctrl.dispatch(&SurfaceEvent::Map(MapEvent::PointerMove(mouse(surface, via))), surface);
    }
    ctrl.dispatch(&SurfaceEvent::Map(MapEvent::PointerMove(mouse(surface, to))), surface);
    ctrl.dispatch(&SurfaceEvent::Map(MapEvent::PointerUp(mouse(surface, to))), surface);
}

fn triangle() -> Vec<Point> {
    vec![p(10.0, 10.0), p(10.0, 10.1), p(10.1, 10.1)]
}

// =============================================================
// Tool selection
// =============================================================

#[test]
fn starts_with_no_tool_and_no_listeners() {
    let (ctrl, surface) = setup();
    assert_eq!(ctrl.tool(), Tool::None);
    assert!(!ctrl.is_listening());
    assert!(ctrl.present().is_empty());
    assert_eq!(surface.listener_count(), 0);
}

#[test]
fn selecting_tool_attaches_its_map_listeners() {
    let (mut ctrl, mut surface) = setup();
    ctrl.select_tool(Tool::Polygon, &mut surface);
    assert_eq!(ctrl.tool(), Tool::Polygon);
    assert!(ctrl.is_listening());
    assert_eq!(surface.listeners_on(EventTarget::Map), 4);
    assert_eq!(surface.cursor(), Cursor::Crosshair);
}

#[test]
fn switching_tools_releases_before_acquiring() {
    let (mut ctrl, mut surface) = setup();
    ctrl.select_tool(Tool::Polygon, &mut surface);
    surface.clear_journal();

    ctrl.select_tool(Tool::Circle, &mut surface);

    let journal = surface.journal();
    let last_release = journal.iter().rposition(|op| matches!(op, SurfaceOp::RemoveListener(_))).unwrap();
    let first_acquire = journal.iter().position(|op| matches!(op, SurfaceOp::AddListener(..))).unwrap();
    assert!(last_release < first_acquire);
    assert_eq!(journal.iter().filter(|op| matches!(op, SurfaceOp::RemoveListener(_))).count(), 4);
    assert_eq!(surface.listeners_on(EventTarget::Map), 3);
    assert!(!surface.has_listener(EventTarget::Map, EventKind::Click));
}

#[test]
fn at_most_one_tool_listens_across_many_switches() {
    let (mut ctrl, mut surface) = setup();
    for tool in [Tool::Line, Tool::Rectangle, Tool::Polygon, Tool::Circle, Tool::Line] {
        ctrl.select_tool(tool, &mut surface);
        let expected = if matches!(tool, Tool::Polygon | Tool::Line) { 4 } else { 3 };
        assert_eq!(surface.listeners_on(EventTarget::Map), expected);
    }
}

#[test]
fn selecting_none_releases_listeners_and_cursor() {
    let (mut ctrl, mut surface) = setup();
    ctrl.select_tool(Tool::Line, &mut surface);
    ctrl.select_tool(Tool::None, &mut surface);
    assert!(!ctrl.is_listening());
    assert_eq!(surface.listener_count(), 0);
    assert_eq!(surface.cursor(), Cursor::Default);
}

#[test]
fn reselecting_same_tool_is_noop() {
    let (mut ctrl, mut surface) = setup();
    ctrl.select_tool(Tool::Polygon, &mut surface);
    surface.clear_journal();
    ctrl.select_tool(Tool::Polygon, &mut surface);
    assert!(surface.journal().is_empty());
}

#[test]
fn toggle_deselects_active_tool() {
    let (mut ctrl, mut surface) = setup();
    ctrl.toggle_tool(Tool::Rectangle, &mut surface);
    assert_eq!(ctrl.tool(), Tool::Rectangle);
    ctrl.toggle_tool(Tool::Rectangle, &mut surface);
    assert_eq!(ctrl.tool(), Tool::None);
    assert_eq!(surface.listener_count(), 0);
}

#[test]
fn map_events_without_tool_are_ignored() {
    let (mut ctrl, mut surface) = setup();
    click(&mut ctrl, &mut surface, p(10.0, 10.0));
    assert!(ctrl.present().is_empty());
    assert!(!ctrl.has_undo());
}

// =============================================================
// Polygon and line drawing
// =============================================================

#[test]
fn clicking_triangle_and_first_vertex_closes_polygon() {
    let (mut ctrl, mut surface) = setup();
    ctrl.select_tool(Tool::Polygon, &mut surface);
    for point in triangle() {
        click(&mut ctrl, &mut surface, point);
    }
    assert_eq!(ctrl.present().len(), 1);
    assert!(!ctrl.present()[0].done);

    click(&mut ctrl, &mut surface, p(10.0, 10.0));

    let entry = &ctrl.present()[0];
    assert!(entry.done);
    assert_eq!(entry.points, close_ring(&triangle()));
    let overlay = surface.overlay(ctrl.overlay_of(entry.id).unwrap()).unwrap();
    assert_eq!(overlay.shape, Shape::Polygon { ring: triangle() });
    // One overlay for the entry; the rubber band is gone.
    assert_eq!(surface.overlay_count(), 1);
}

#[test]
fn undo_reopens_closed_polygon() {
    let (mut ctrl, mut surface) = setup();
    ctrl.select_tool(Tool::Polygon, &mut surface);
    for point in triangle() {
        click(&mut ctrl, &mut surface, point);
    }
    click(&mut ctrl, &mut surface, p(10.0, 10.0));

    ctrl.undo(&mut surface);
    let entry = &ctrl.present()[0];
    assert!(!entry.done);
    assert_eq!(entry.points, triangle());
    assert_eq!(surface.overlay_count(), 1);

    ctrl.redo(&mut surface);
    assert!(ctrl.present()[0].done);
    assert!(!ctrl.has_redo());

    // Four commits: three vertices and the closing click.
    for _ in 0..3 {
        ctrl.undo(&mut surface);
        assert!(ctrl.has_undo());
    }
    ctrl.undo(&mut surface);
    assert!(ctrl.present().is_empty());
    assert!(!ctrl.has_undo());
    assert_eq!(surface.overlay_count(), 0);
}

#[test]
fn line_finishes_on_last_vertex_click() {
    let (mut ctrl, mut surface) = setup();
    ctrl.select_tool(Tool::Line, &mut surface);
    click(&mut ctrl, &mut surface, p(10.0, 10.0));
    click(&mut ctrl, &mut surface, p(10.0, 10.1));
    click(&mut ctrl, &mut surface, p(10.0, 10.1));
    let entry = &ctrl.present()[0];
    assert!(entry.done);
    assert_eq!(entry.points, vec![p(10.0, 10.0), p(10.0, 10.1)]);
}

#[test]
fn unfinished_polygon_resumes_after_tool_switch() {
    let (mut ctrl, mut surface) = setup();
    ctrl.select_tool(Tool::Polygon, &mut surface);
    click(&mut ctrl, &mut surface, p(10.0, 10.0));
    click(&mut ctrl, &mut surface, p(10.0, 10.1));

    ctrl.select_tool(Tool::Line, &mut surface);
    ctrl.select_tool(Tool::Polygon, &mut surface);
    click(&mut ctrl, &mut surface, p(10.1, 10.1));

    assert_eq!(ctrl.present().len(), 1);
    assert_eq!(ctrl.present()[0].points, triangle());
}

#[test]
fn loaded_closed_ring_is_not_reopened_by_next_click() {
    let (mut ctrl, mut surface) = setup();
    let loaded: Vec<DrawingEntry> = serde_json::from_str(
        r#"[{"type": "polygon", "points": [
            {"lat": 10.0, "lng": 10.0}, {"lat": 10.0, "lng": 10.1},
            {"lat": 10.1, "lng": 10.1}, {"lat": 10.0, "lng": 10.0}
        ]}]"#,
    )
    .unwrap();
    assert!(!loaded[0].done);
    ctrl.load_snapshot(loaded, &mut surface);

    ctrl.select_tool(Tool::Polygon, &mut surface);
    click(&mut ctrl, &mut surface, p(11.0, 11.0));

    assert_eq!(ctrl.present().len(), 2);
    assert_eq!(ctrl.present()[0].points, close_ring(&triangle()));
    assert_eq!(ctrl.present()[1].points, vec![p(11.0, 11.0)]);
}

fn rubber_bands(surface: &MemorySurface) -> usize {
    surface.overlays().filter(|(_, overlay)| !overlay.editable).count()
}

#[test]
fn undo_and_redo_drop_rubber_band_from_old_tail() {
    let (mut ctrl, mut surface) = setup();
    ctrl.select_tool(Tool::Polygon, &mut surface);
    click(&mut ctrl, &mut surface, p(10.0, 10.0));
    click(&mut ctrl, &mut surface, p(10.0, 10.1));
    let hover = SurfaceEvent::Map(MapEvent::PointerMove(mouse(&surface, p(10.2, 10.2))));
    ctrl.dispatch(&hover, &mut surface);
    assert_eq!(rubber_bands(&surface), 1);

    ctrl.undo(&mut surface);
    assert_eq!(ctrl.present()[0].points, vec![p(10.0, 10.0)]);
    assert_eq!(rubber_bands(&surface), 0);

    ctrl.dispatch(&hover, &mut surface);
    assert_eq!(rubber_bands(&surface), 1);
    ctrl.redo(&mut surface);
    assert_eq!(rubber_bands(&surface), 0);
}

#[test]
fn undo_to_empty_drops_rubber_band() {
    let (mut ctrl, mut surface) = setup();
    ctrl.select_tool(Tool::Line, &mut surface);
    click(&mut ctrl, &mut surface, p(10.0, 10.0));
    let hover = SurfaceEvent::Map(MapEvent::PointerMove(mouse(&surface, p(10.1, 10.1))));
    ctrl.dispatch(&hover, &mut surface);
    assert_eq!(rubber_bands(&surface), 1);

    ctrl.undo(&mut surface);
    assert!(ctrl.present().is_empty());
    assert_eq!(surface.overlay_count(), 0);
}

#[test]
fn every_commit_is_one_undo_step() {
    let (mut ctrl, mut surface) = setup();
    ctrl.select_tool(Tool::Line, &mut surface);
    click(&mut ctrl, &mut surface, p(10.0, 10.0));
    click(&mut ctrl, &mut surface, p(10.0, 10.1));
    ctrl.undo(&mut surface);
    assert_eq!(ctrl.present()[0].points, vec![p(10.0, 10.0)]);
    ctrl.undo(&mut surface);
    assert!(ctrl.present().is_empty());
    assert!(!ctrl.has_undo());
    assert_eq!(surface.overlay_count(), 0);
}

// =============================================================
// Circle and rectangle drawing
// =============================================================

#[test]
fn circle_drag_commits_one_finished_entry() {
    let (mut ctrl, mut surface) = setup();
    ctrl.select_tool(Tool::Circle, &mut surface);
    press_release(&mut ctrl, &mut surface, p(10.0, 10.0), None, p(10.1, 10.0));
    assert_eq!(ctrl.present().len(), 1);
    let entry = &ctrl.present()[0];
    assert_eq!(entry.kind, ShapeKind::Circle);
    assert!(entry.done);
    assert!(ctrl.overlay_of(entry.id).is_some());
    assert_eq!(surface.overlay_count(), 1);
}

#[test]
fn tiny_circle_press_release_commits_nothing() {
    let (mut ctrl, mut surface) = setup();
    ctrl.select_tool(Tool::Circle, &mut surface);
    press_release(&mut ctrl, &mut surface, p(10.0, 10.0), None, p(10.000_01, 10.000_01));
    assert!(ctrl.present().is_empty());
    assert!(!ctrl.has_undo());
    assert_eq!(surface.overlay_count(), 0);
}

#[test]
fn sub_meter_rectangle_after_drag_commits_nothing() {
    let (mut ctrl, mut surface) = setup();
    ctrl.select_tool(Tool::Rectangle, &mut surface);
    press_release(&mut ctrl, &mut surface, p(10.0, 10.0), Some(p(10.1, 10.1)), p(10.000_001, 10.000_001));
    assert!(ctrl.present().is_empty());
    assert_eq!(surface.overlay_count(), 0);
}

#[test]
fn tool_switch_flushes_deferred_touch_finalize() {
    let (mut ctrl, mut surface) = setup();
    ctrl.select_tool(Tool::Circle, &mut surface);

    let touch = |s: &MemorySurface, point| InputSample::at_point(s, point, InputSource::Touch, 0);
    ctrl.dispatch(&SurfaceEvent::Map(MapEvent::PointerDown(touch(&surface, p(10.0, 10.0)))), &mut surface);
    // The map drops out while the drag is in flight, so no preview is shown.
    surface.set_ready(false);
    ctrl.dispatch(&SurfaceEvent::Map(MapEvent::PointerMove(touch(&surface, p(10.1, 10.0)))), &mut surface);
    surface.set_ready(true);
    let delay = ctrl.dispatch(&SurfaceEvent::Map(MapEvent::PointerUp(touch(&surface, p(10.1, 10.0)))), &mut surface);
    assert_eq!(delay, Some(ctrl.config().finalize_poll));
    assert!(ctrl.present().is_empty());

    ctrl.select_tool(Tool::Line, &mut surface);
    assert_eq!(ctrl.present().len(), 1);
    assert!(ctrl.present()[0].done);
}

#[test]
fn poll_deferred_commits_once_preview_can_show() {
    let (mut ctrl, mut surface) = setup();
    ctrl.select_tool(Tool::Rectangle, &mut surface);
    let touch = |s: &MemorySurface, point| InputSample::at_point(s, point, InputSource::Touch, 0);
    ctrl.dispatch(&SurfaceEvent::Map(MapEvent::PointerDown(touch(&surface, p(10.0, 10.0)))), &mut surface);
    surface.set_ready(false);
    ctrl.dispatch(&SurfaceEvent::Map(MapEvent::PointerMove(touch(&surface, p(10.1, 10.1)))), &mut surface);
    assert!(ctrl.dispatch(&SurfaceEvent::Map(MapEvent::PointerUp(touch(&surface, p(10.1, 10.1)))), &mut surface).is_some());

    assert!(ctrl.poll_deferred(&mut surface).is_some());
    surface.set_ready(true);
    assert!(ctrl.poll_deferred(&mut surface).is_none());
    assert_eq!(ctrl.present().len(), 1);
    assert_eq!(surface.overlay_count(), 1);
}

// =============================================================
// Overlay edits
// =============================================================

#[test]
fn overlay_edit_replaces_entry_and_its_overlay() {
    let (mut ctrl, mut surface) = setup();
    let line = DrawingEntry::finished(ShapeKind::Line, vec![p(10.0, 10.0), p(10.0, 10.1)]);
    ctrl.load_snapshot(vec![line.clone()], &mut surface);
    let old_overlay = ctrl.overlay_of(line.id).unwrap();

    let moved = vec![p(11.0, 10.0), p(11.0, 10.1)];
    let event = SurfaceEvent::Overlay { overlay: old_overlay, event: OverlayEvent::DragEnd { path: moved.clone() } };
    ctrl.dispatch(&event, &mut surface);

    let entry = &ctrl.present()[0];
    assert_ne!(entry.id, line.id);
    assert_eq!(entry.points, moved);
    assert!(ctrl.overlay_of(line.id).is_none());
    assert!(surface.overlay(old_overlay).is_none());
    assert_eq!(surface.listeners_on(EventTarget::Overlay(old_overlay)), 0);
    assert_eq!(surface.overlay_count(), 1);
    assert!(ctrl.has_undo());
}

#[test]
fn event_on_stale_overlay_is_ignored() {
    let (mut ctrl, mut surface) = setup();
    let line = DrawingEntry::finished(ShapeKind::Line, vec![p(10.0, 10.0), p(10.0, 10.1)]);
    ctrl.load_snapshot(vec![line.clone()], &mut surface);
    let overlay = ctrl.overlay_of(line.id).unwrap();
    ctrl.clear(&mut surface);

    let event = SurfaceEvent::Overlay { overlay, event: OverlayEvent::DragEnd { path: vec![p(1.0, 1.0), p(2.0, 2.0)] } };
    ctrl.dispatch(&event, &mut surface);
    assert!(ctrl.present().is_empty());
}

#[test]
fn unsubscribed_overlay_event_kind_is_ignored() {
    let (mut ctrl, mut surface) = setup();
    let line = DrawingEntry::finished(ShapeKind::Line, vec![p(10.0, 10.0), p(10.0, 10.1)]);
    ctrl.load_snapshot(vec![line.clone()], &mut surface);
    let overlay = ctrl.overlay_of(line.id).unwrap();

    let event = SurfaceEvent::Overlay { overlay, event: OverlayEvent::BoundsChanged(crate::geo::Bounds::from_corners(p(0.0, 0.0), p(1.0, 1.0))) };
    ctrl.dispatch(&event, &mut surface);
    assert_eq!(ctrl.present()[0], line);
}

#[test]
fn polygon_vertex_edit_keeps_ring_closed() {
    let (mut ctrl, mut surface) = setup();
    let polygon = DrawingEntry::finished(ShapeKind::Polygon, close_ring(&triangle()));
    ctrl.load_snapshot(vec![polygon.clone()], &mut surface);
    let overlay = ctrl.overlay_of(polygon.id).unwrap();

    let mut edited = triangle();
    edited.push(p(10.1, 10.0));
    let event = SurfaceEvent::Overlay { overlay, event: OverlayEvent::PathChanged { change: PathChange::Insert, path: edited.clone() } };
    ctrl.dispatch(&event, &mut surface);

    assert_eq!(ctrl.present()[0].points, close_ring(&edited));
}

#[test]
fn circle_radius_edit_updates_reference_point() {
    let (mut ctrl, mut surface) = setup();
    let circle = DrawingEntry::finished(ShapeKind::Circle, vec![p(10.0, 10.0), p(10.1, 10.0)]);
    ctrl.load_snapshot(vec![circle.clone()], &mut surface);
    let overlay = ctrl.overlay_of(circle.id).unwrap();

    let event = SurfaceEvent::Overlay { overlay, event: OverlayEvent::RadiusChanged { center: p(10.0, 10.0), radius_m: 1113.2 } };
    ctrl.dispatch(&event, &mut surface);

    let points = &ctrl.present()[0].points;
    assert_eq!(points[0], p(10.0, 10.0));
    assert!((points[1].lat - 10.01).abs() < 1e-9);
}

// =============================================================
// Snapshots
// =============================================================

#[test]
fn clear_is_undoable() {
    let (mut ctrl, mut surface) = setup();
    let line = DrawingEntry::finished(ShapeKind::Line, vec![p(10.0, 10.0), p(10.0, 10.1)]);
    ctrl.load_snapshot(vec![line.clone()], &mut surface);
    ctrl.clear(&mut surface);
    assert!(ctrl.present().is_empty());
    assert_eq!(surface.overlay_count(), 0);

    ctrl.undo(&mut surface);
    assert_eq!(ctrl.present(), &[line]);
    assert_eq!(surface.overlay_count(), 1);
}

#[test]
fn export_json_uses_type_field() {
    let (mut ctrl, mut surface) = setup();
    ctrl.load_snapshot(vec![DrawingEntry::finished(ShapeKind::Circle, vec![p(1.0, 2.0), p(1.5, 2.0)])], &mut surface);
    let json: serde_json::Value = serde_json::from_str(&ctrl.export_json().unwrap()).unwrap();
    assert_eq!(json[0]["type"], "circle");
    assert_eq!(json[0]["done"], true);
    assert_eq!(json[0]["points"][0]["lat"], 1.0);
}

#[test]
fn history_limit_caps_undo_depth() {
    let config = DrawConfig { history_limit: Some(2), ..DrawConfig::default() };
    let mut ctrl = DrawController::new(config);
    let mut surface = MemorySurface::new(ZOOM);
    for i in 0..5 {
        let lat = f64::from(i);
        ctrl.load_snapshot(vec![DrawingEntry::finished(ShapeKind::Line, vec![p(lat, 0.0), p(lat, 1.0)])], &mut surface);
    }
    ctrl.undo(&mut surface);
    ctrl.undo(&mut surface);
    assert!(!ctrl.has_undo());
    assert_eq!(ctrl.present()[0].points[0], p(2.0, 0.0));
}

#[test]
fn older_unfinished_paths_render_faded() {
    let (mut ctrl, mut surface) = setup();
    let older = DrawingEntry::new(ShapeKind::Line, vec![p(10.0, 10.0), p(10.0, 10.1)]);
    let newer = DrawingEntry::new(ShapeKind::Line, vec![p(11.0, 10.0), p(11.0, 10.1)]);
    ctrl.load_snapshot(vec![older.clone(), newer.clone()], &mut surface);
    let faded = surface.overlay(ctrl.overlay_of(older.id).unwrap()).unwrap().style.stroke_opacity;
    let active = surface.overlay(ctrl.overlay_of(newer.id).unwrap()).unwrap().style.stroke_opacity;
    assert!(faded < active);
}

// =============================================================
// Readiness and teardown
// =============================================================

#[test]
fn unready_surface_is_retried_on_refresh() {
    let (mut ctrl, mut surface) = setup();
    surface.set_ready(false);
    ctrl.select_tool(Tool::Polygon, &mut surface);
    ctrl.load_snapshot(vec![DrawingEntry::finished(ShapeKind::Line, vec![p(10.0, 10.0), p(10.0, 10.1)])], &mut surface);
    assert!(!ctrl.is_listening());
    assert_eq!(ctrl.live_overlays(), 0);

    surface.set_ready(true);
    ctrl.refresh(&mut surface);
    assert!(ctrl.is_listening());
    assert_eq!(ctrl.live_overlays(), 1);
    assert_eq!(surface.listeners_on(EventTarget::Map), 4);
}

#[test]
fn teardown_releases_every_listener_and_overlay() {
    let (mut ctrl, mut surface) = setup();
    ctrl.load_snapshot(
        vec![
            DrawingEntry::finished(ShapeKind::Polygon, close_ring(&triangle())),
            DrawingEntry::finished(ShapeKind::Circle, vec![p(11.0, 11.0), p(11.1, 11.0)]),
        ],
        &mut surface,
    );
    ctrl.select_tool(Tool::Line, &mut surface);
    click(&mut ctrl, &mut surface, p(12.0, 12.0));
    ctrl.dispatch(&SurfaceEvent::Map(MapEvent::PointerMove(mouse(&surface, p(12.1, 12.0)))), &mut surface);
    assert!(surface.listener_count() > 0);

    ctrl.teardown(&mut surface);

    assert_eq!(surface.listener_count(), 0);
    assert_eq!(surface.overlay_count(), 0);
    assert_eq!(surface.cursor(), Cursor::Default);
    assert_eq!(ctrl.tool(), Tool::None);
    assert!(ctrl.present().is_empty());
    assert!(!ctrl.has_undo());
}

#[test]
fn teardown_twice_is_harmless() {
    let (mut ctrl, mut surface) = setup();
    ctrl.select_tool(Tool::Circle, &mut surface);
    ctrl.teardown(&mut surface);
    surface.clear_journal();
    ctrl.teardown(&mut surface);
    assert!(surface.journal().is_empty());
}
