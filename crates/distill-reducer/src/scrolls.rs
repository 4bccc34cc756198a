//! Collapse runs of scroll events, summing their deltas

use crate::reducer::Reducer;
use crate::report::Diagnostics;
use crate::runs::merge_raw_runs;
use distill_core::{ActionEvent, ActionKind, Child, InputData, RawEvent, Stage};

#[derive(Debug, Default)]
pub struct ScrollRunCoalescer;

impl ScrollRunCoalescer {
    pub fn new() -> Self {
        Self
    }

    pub fn coalesce(&self, events: Vec<ActionEvent>) -> Vec<ActionEvent> {
        merge_raw_runs(
            Stage::ScrollRuns,
            events,
            |raw| matches!(raw.data, InputData::Scroll { .. }),
            |run| vec![merge_scrolls(run)],
        )
    }
}

impl Reducer for ScrollRunCoalescer {
    fn stage(&self) -> Stage {
        Stage::ScrollRuns
    }

    fn reduce(&self, events: Vec<ActionEvent>, _diagnostics: &mut Diagnostics) -> Vec<ActionEvent> {
        self.coalesce(events)
    }
}

fn merge_scrolls(run: Vec<RawEvent>) -> ActionEvent {
    let (dx, dy) = run.iter().fold((0.0, 0.0), |(sx, sy), raw| match raw.data {
        InputData::Scroll { dx, dy, .. } => (sx + dx, sy + dy),
        _ => (sx, sy),
    });
    let anchor = run[run.len() - 1].clone();
    let (x, y) = anchor.position().unwrap_or_default();
    ActionEvent::composite(
        ActionKind::Scroll { x, y, dx, dy },
        &anchor,
        run.into_iter().map(Child::Raw).collect(),
        Stage::ScrollRuns,
    )
}
