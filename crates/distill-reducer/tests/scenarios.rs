//! End-to-end reductions of small hand-written sessions

use distill_core::{
    flatten_log, ActionEvent, ActionKind, Button, Child, Key, RawEvent, Recording, ReducerConfig,
    Screenshot, WindowEvent,
};
use distill_reducer::{Pipeline, PairingIssueKind};
use std::collections::BTreeSet;
use tracing_subscriber::{fmt, EnvFilter};

fn init_tracing() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
        .with_test_writer()
        .try_init();
}

fn click(t: f64, x: f64, y: f64, button: Button) -> Vec<RawEvent> {
    vec![
        RawEvent::click(t, x, y, button, true),
        RawEvent::click(t + 0.05, x, y, button, false),
    ]
}

fn config(interval: f64) -> ReducerConfig {
    ReducerConfig {
        double_click_interval_seconds: interval,
        ..Default::default()
    }
}

fn window(ts: f64, title: &str) -> WindowEvent {
    WindowEvent {
        timestamp: ts,
        title: title.into(),
        left: 0,
        top: 0,
        width: 1280,
        height: 800,
        window_id: None,
    }
}

#[test]
fn double_click_just_inside_interval() {
    // release at 0.05, next press 0.29 later
    let mut events = click(0.0, 100.0, 100.0, Button::Left);
    events.extend(click(0.34, 100.0, 100.0, Button::Left));

    let reduction = Pipeline::new(config(0.3)).unwrap().reduce(events.clone());
    assert_eq!(reduction.actions.len(), 1);
    assert!(matches!(
        reduction.actions[0].kind,
        ActionKind::DoubleClick { button: Button::Left, .. }
    ));
    assert_eq!(flatten_log(&reduction.actions), events);
}

#[test]
fn two_singles_just_outside_interval() {
    let mut events = click(0.0, 100.0, 100.0, Button::Left);
    events.extend(click(0.36, 100.0, 100.0, Button::Left));

    let reduction = Pipeline::new(config(0.3)).unwrap().reduce(events);
    let kinds: Vec<&str> = reduction.actions.iter().map(|a| a.kind.name()).collect();
    assert_eq!(kinds, vec!["singleclick", "singleclick"]);
}

#[test]
fn right_button_needs_opting_in() {
    let mut right = click(0.0, 10.0, 10.0, Button::Right);
    right.extend(click(0.1, 10.0, 10.0, Button::Right));
    let mut left = click(0.0, 10.0, 10.0, Button::Left);
    left.extend(click(0.1, 10.0, 10.0, Button::Left));

    let pipeline = Pipeline::new(ReducerConfig::default()).unwrap();

    let out = pipeline.reduce(right.clone()).actions;
    assert_eq!(out.len(), 4);
    assert!(out.iter().all(ActionEvent::is_passthrough));

    let out = pipeline.reduce(left).actions;
    assert_eq!(out.len(), 1);
    assert!(matches!(out[0].kind, ActionKind::DoubleClick { .. }));

    let both = ReducerConfig {
        fusable_buttons: BTreeSet::from([Button::Left, Button::Right]),
        ..Default::default()
    };
    let out = Pipeline::new(both).unwrap().reduce(right).actions;
    assert_eq!(out.len(), 1);
    assert!(matches!(
        out[0].kind,
        ActionKind::DoubleClick { button: Button::Right, .. }
    ));
}

#[test]
fn scroll_deltas_sum() {
    let events = vec![
        RawEvent::scroll(1.0, 0.0, 0.0, 2.0, 0.0),
        RawEvent::scroll(1.1, 0.0, 0.0, 1.0, 0.0),
        RawEvent::scroll(1.2, 0.0, 0.0, -1.0, 0.0),
    ];
    let out = Pipeline::new(ReducerConfig::default())
        .unwrap()
        .reduce(events)
        .actions;
    assert_eq!(out.len(), 1);
    match out[0].kind {
        ActionKind::Scroll { dx, dy, .. } => {
            assert_eq!(dx, 2.0);
            assert_eq!(dy, 0.0);
        }
        ref other => panic!("expected scroll, got {:?}", other),
    }
    assert_eq!(out[0].children.len(), 3);
}

#[test]
fn move_between_clicks_joins_the_next_click() {
    let mut events = click(1.0, 0.0, 0.0, Button::Left);
    events.push(RawEvent::mouse_move(2.0, 300.0, 300.0));
    events.extend(click(3.0, 300.0, 300.0, Button::Left));

    let out = Pipeline::new(ReducerConfig::default())
        .unwrap()
        .reduce(events.clone())
        .actions;
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].children.len(), 2);
    let ts: Vec<f64> = out[1].flatten().iter().map(|r| r.timestamp).collect();
    assert_eq!(ts, vec![2.0, 3.0, 3.05]);
    assert!(matches!(out[1].children[0], Child::Action(ref m) if m.is_move()));
    assert_eq!(flatten_log(&out), events);
}

#[test]
fn unreferenced_window_events_are_pruned() {
    let mut rec = Recording::new("prune");
    rec.events = vec![
        RawEvent::mouse_move(1.0, 0.0, 0.0).with_window_event(0.5),
        RawEvent::mouse_move(1.1, 5.0, 5.0).with_window_event(0.9),
        RawEvent::key_press(2.0, Key::Char('x')).with_window_event(0.9),
        RawEvent::key_release(2.1, Key::Char('x')).with_window_event(0.9).with_screenshot(2.1),
    ];
    rec.window_events = vec![window(0.5, "desktop"), window(0.9, "editor")];
    rec.screenshots = vec![
        Screenshot { timestamp: 1.0, path: None },
        Screenshot { timestamp: 2.1, path: Some("s/2.png".into()) },
    ];

    let reduced = Pipeline::new(ReducerConfig::default())
        .unwrap()
        .reduce_recording(&rec)
        .unwrap();

    // the merged move and the typed text both anchor on window 0.9
    assert_eq!(reduced.window_events, vec![window(0.9, "editor")]);
    assert_eq!(reduced.screenshots, vec![rec.screenshots[1].clone()]);
    let retained = reduced.report.window_events.unwrap();
    assert_eq!((retained.before, retained.after), (2, 1));
    assert_eq!(reduced.name, "prune");
}

#[test]
fn malformed_pairing_is_reported_not_fatal() {
    init_tracing();
    let events = vec![
        RawEvent::click(0.0, 0.0, 0.0, Button::Left, false),
        RawEvent::click(1.0, 0.0, 0.0, Button::Left, true),
        RawEvent::mouse_move(1.1, 50.0, 0.0),
        RawEvent::click(1.2, 50.0, 0.0, Button::Left, false),
        RawEvent::click(2.0, 50.0, 0.0, Button::Left, true),
    ];
    let reduction = Pipeline::new(ReducerConfig::default())
        .unwrap()
        .reduce(events.clone());

    let kinds: Vec<PairingIssueKind> = reduction.report.issues.iter().map(|i| i.kind).collect();
    assert_eq!(
        kinds,
        vec![
            PairingIssueKind::ReleaseWithoutPress,
            PairingIssueKind::Interrupted,
            PairingIssueKind::PressWithoutRelease,
        ]
    );
    assert_eq!(flatten_log(&reduction.actions), events);
    assert!(reduction.report.ordering_violations.is_empty());
}

#[test]
fn empty_recording_reduces_to_nothing() {
    let reduced = Pipeline::new(ReducerConfig::default())
        .unwrap()
        .reduce_recording(&Recording::new("empty"))
        .unwrap();
    assert!(reduced.actions.is_empty());
    assert!(reduced.window_events.is_empty());
    assert_eq!(reduced.report.compression_ratio(), 1.0);
}

#[test]
fn reduced_recording_serializes() {
    let mut rec = Recording::new("json");
    rec.events = click(0.0, 1.0, 1.0, Button::Left);
    let reduced = Pipeline::new(ReducerConfig::default())
        .unwrap()
        .reduce_recording(&rec)
        .unwrap();
    let json = serde_json::to_value(&reduced).unwrap();
    assert_eq!(json["actions"][0]["kind"], "singleclick");
    assert_eq!(json["actions"][0]["reducers"][0], "click_fusion");
}
