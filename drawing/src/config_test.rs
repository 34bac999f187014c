#![allow(clippy::float_cmp)]

use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_match_constants() {
    let cfg = DrawConfig::default();
    assert_eq!(cfg.touch_tap_slop_px, 10.0);
    assert_eq!(cfg.mouse_drag_slop_px, 3.0);
    assert_eq!(cfg.snap_tolerance_px, 8.0);
    assert_eq!(cfg.min_shape_meters, 1.0);
    assert_eq!(cfg.finalize_poll, Duration::from_millis(50));
    assert_eq!(cfg.finalize_max_attempts, 10);
    assert_eq!(cfg.history_limit, None);
}

#[test]
fn empty_lookup_yields_defaults() {
    let cfg = DrawConfig::from_lookup(|_| None).unwrap();
    assert_eq!(cfg, DrawConfig::default());
}

#[test]
fn overrides_are_applied() {
    let cfg = DrawConfig::from_lookup(lookup_from(&[
        ("DRAW_TOUCH_TAP_SLOP_PX", "12.5"),
        ("DRAW_MIN_SHAPE_METERS", "2"),
        ("DRAW_FINALIZE_POLL_MS", "20"),
        ("DRAW_HISTORY_LIMIT", "100"),
    ]))
    .unwrap();
    assert_eq!(cfg.touch_tap_slop_px, 12.5);
    assert_eq!(cfg.min_shape_meters, 2.0);
    assert_eq!(cfg.finalize_poll, Duration::from_millis(20));
    assert_eq!(cfg.history_limit, Some(100));
}

#[test]
fn zero_history_limit_means_unbounded() {
    let cfg = DrawConfig::from_lookup(lookup_from(&[("DRAW_HISTORY_LIMIT", "0")])).unwrap();
    assert_eq!(cfg.history_limit, None);
}

#[test]
fn garbage_number_falls_back_to_default() {
    let cfg = DrawConfig::from_lookup(lookup_from(&[("DRAW_SNAP_TOLERANCE_PX", "wide")])).unwrap();
    assert_eq!(cfg.snap_tolerance_px, 8.0);
}

#[test]
fn negative_tolerance_is_rejected() {
    let err = DrawConfig::from_lookup(lookup_from(&[("DRAW_MIN_SHAPE_METERS", "-1")])).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { key: "DRAW_MIN_SHAPE_METERS", value: "-1".into() });
}

#[test]
fn slop_depends_on_source() {
    let cfg = DrawConfig::default();
    assert_eq!(cfg.slop_px(InputSource::Touch), 10.0);
    assert_eq!(cfg.slop_px(InputSource::Mouse), 3.0);
}
