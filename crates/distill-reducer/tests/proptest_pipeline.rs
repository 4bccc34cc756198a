//! Property-based tests for the reduction pipeline.
//!
//! Over arbitrary timestamp-ordered logs:
//! - Losslessness: flattening the output reproduces the input exactly
//! - Fixed point: reducing a reduced log changes nothing
//! - Monotonicity: top-level timestamps never go backwards
//! - Pruning: kept side-channel records are exactly the referenced ones

use proptest::prelude::*;
use std::collections::BTreeSet;

use distill_core::{
    flatten_log, Button, Key, MoveMergeMode, RawEvent, Recording, ReducerConfig, WindowEvent,
};
use distill_reducer::Pipeline;

// ────────────────────────────────────────────────────────────────────
// Strategies
// ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Step {
    Move(f64, f64),
    Press(Button),
    Release(Button),
    Scroll(f64, f64),
    KeyDown(Key),
    KeyUp(Key),
}

fn arb_button() -> impl Strategy<Value = Button> {
    prop_oneof![Just(Button::Left), Just(Button::Right), Just(Button::Middle)]
}

fn arb_key() -> impl Strategy<Value = Key> {
    prop_oneof![
        Just(Key::Char('a')),
        Just(Key::Char('b')),
        Just(Key::Named("shift".into())),
        Just(Key::Named("ctrl".into())),
    ]
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (-4.0..4.0_f64, -4.0..4.0_f64).prop_map(|(dx, dy)| Step::Move(dx, dy)),
        2 => arb_button().prop_map(Step::Press),
        2 => arb_button().prop_map(Step::Release),
        1 => (-2.0..2.0_f64, -2.0..2.0_f64).prop_map(|(dx, dy)| Step::Scroll(dx, dy)),
        1 => arb_key().prop_map(Step::KeyDown),
        1 => arb_key().prop_map(Step::KeyUp),
    ]
}

/// Steps with gaps of 0..400ms; clicks land wherever the pointer is.
/// Every event tags itself with the window and screenshot current at its time.
fn arb_log() -> impl Strategy<Value = Vec<RawEvent>> {
    prop::collection::vec((arb_step(), 0u32..400, any::<bool>()), 0..80).prop_map(|steps| {
        let mut t = 0.0;
        let (mut x, mut y) = (100.0, 100.0);
        let mut window = 0.0;
        steps
            .into_iter()
            .map(|(step, gap_ms, new_window)| {
                t += f64::from(gap_ms) / 1000.0;
                if new_window {
                    window = t;
                }
                let raw = match step {
                    Step::Move(dx, dy) => {
                        x += dx;
                        y += dy;
                        RawEvent::mouse_move(t, x, y)
                    }
                    Step::Press(b) => RawEvent::click(t, x, y, b, true),
                    Step::Release(b) => RawEvent::click(t, x, y, b, false),
                    Step::Scroll(dx, dy) => RawEvent::scroll(t, x, y, dx, dy),
                    Step::KeyDown(k) => RawEvent::key_press(t, k),
                    Step::KeyUp(k) => RawEvent::key_release(t, k),
                };
                raw.with_window_event(window).with_screenshot(t)
            })
            .collect()
    })
}

fn arb_config() -> impl Strategy<Value = ReducerConfig> {
    (
        0.0..1.0_f64,
        0.0..10.0_f64,
        any::<bool>(),
        any::<bool>(),
        prop::option::of(1.0..20.0_f64),
        2usize..16,
    )
        .prop_map(|(interval, distance, right, group, threshold, cap)| {
            let mut buttons = BTreeSet::from([Button::Left]);
            if right {
                buttons.insert(Button::Right);
            }
            ReducerConfig {
                double_click_interval_seconds: interval,
                double_click_distance_pixels: distance,
                fusable_buttons: buttons,
                group_named_keys: group,
                max_chord_events: cap,
                move_merge_mode: match threshold {
                    Some(pixels) => MoveMergeMode::DistanceThreshold { pixels },
                    None => MoveMergeMode::Adjacency,
                },
                max_passes: 1,
            }
        })
}

// ────────────────────────────────────────────────────────────────────
// Pipeline invariants
// ────────────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Flattening the reduced log gives back the input, event for event.
    #[test]
    fn prop_reduction_is_lossless(log in arb_log(), config in arb_config()) {
        let pipeline = Pipeline::new(config).unwrap();
        let reduction = pipeline.reduce(log.clone());
        prop_assert_eq!(flatten_log(&reduction.actions), log.clone());
        prop_assert_eq!(reduction.report.raw_events, log.len());
        prop_assert!(reduction.actions.len() <= log.len());
    }

    /// A reduced log is its own reduction.
    #[test]
    fn prop_reduction_is_fixed_point(log in arb_log(), config in arb_config()) {
        let pipeline = Pipeline::new(config).unwrap();
        let once = pipeline.reduce(log).actions;
        let twice = pipeline.reduce_actions(once.clone()).actions;
        prop_assert_eq!(twice, once);
    }

    /// Top-level timestamps stay non-decreasing after every stage.
    #[test]
    fn prop_top_level_is_ordered(log in arb_log(), config in arb_config()) {
        let reduction = Pipeline::new(config).unwrap().reduce(log);
        prop_assert!(reduction.report.ordering_violations.is_empty());
        for pair in reduction.actions.windows(2) {
            prop_assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }

    /// Extra passes never change the result of the first.
    #[test]
    fn prop_extra_passes_agree(log in arb_log(), config in arb_config()) {
        let single = Pipeline::new(config.clone()).unwrap().reduce(log.clone());
        let multi = Pipeline::new(ReducerConfig { max_passes: 3, ..config })
            .unwrap()
            .reduce(log);
        prop_assert_eq!(multi.actions, single.actions);
        prop_assert!(multi.report.passes <= 2);
    }

    /// Window events survive exactly when a top-level action points at them.
    #[test]
    fn prop_pruned_windows_are_referenced(log in arb_log()) {
        let mut windows: Vec<f64> = log.iter().filter_map(|e| e.window_event_ts).collect();
        windows.dedup();

        let mut rec = Recording::new("prop");
        rec.window_events = windows
            .iter()
            .map(|&ts| WindowEvent {
                timestamp: ts,
                title: format!("w{}", ts),
                left: 0,
                top: 0,
                width: 10,
                height: 10,
                window_id: None,
            })
            .collect();
        rec.events = log;

        let reduced = Pipeline::new(ReducerConfig::default())
            .unwrap()
            .reduce_recording(&rec)
            .unwrap();
        let referenced: Vec<f64> = reduced
            .actions
            .iter()
            .filter_map(|a| a.refs.window_event_ts)
            .collect();
        for w in &reduced.window_events {
            prop_assert!(referenced.contains(&w.timestamp));
        }
        for ts in referenced {
            prop_assert!(reduced.window_events.iter().any(|w| w.timestamp == ts));
        }
    }
}
