//! Collapse runs of mouse moves into one representative move

use crate::reducer::Reducer;
use crate::report::Diagnostics;
use crate::runs::{distance, merge_raw_runs};
use distill_core::{ActionEvent, ActionKind, Child, InputData, MoveMergeMode, RawEvent, Stage};
use tracing::debug;

pub struct MoveRunCoalescer {
    mode: MoveMergeMode,
}

impl MoveRunCoalescer {
    pub fn new(mode: MoveMergeMode) -> Self {
        Self { mode }
    }

    pub fn coalesce(&self, events: Vec<ActionEvent>) -> Vec<ActionEvent> {
        merge_raw_runs(
            Stage::MoveRuns,
            events,
            |raw| matches!(raw.data, InputData::Move { .. }),
            |run| match self.mode {
                MoveMergeMode::Adjacency => vec![merge_moves(run)],
                MoveMergeMode::DistanceThreshold { pixels } => split_by_distance(run, pixels)
                    .into_iter()
                    .map(merge_moves)
                    .collect(),
            },
        )
    }
}

impl Default for MoveRunCoalescer {
    fn default() -> Self {
        Self::new(MoveMergeMode::Adjacency)
    }
}

impl Reducer for MoveRunCoalescer {
    fn stage(&self) -> Stage {
        Stage::MoveRuns
    }

    fn reduce(&self, events: Vec<ActionEvent>, _diagnostics: &mut Diagnostics) -> Vec<ActionEvent> {
        self.coalesce(events)
    }
}

/// The last move is the node's identity and also stays as its final child.
fn merge_moves(run: Vec<RawEvent>) -> ActionEvent {
    let anchor = run[run.len() - 1].clone();
    let (x, y) = anchor.position().unwrap_or_default();
    ActionEvent::composite(
        ActionKind::Move { x, y },
        &anchor,
        run.into_iter().map(Child::Raw).collect(),
        Stage::MoveRuns,
    )
}

/// Cut a run wherever its summed path length would exceed `pixels`.
fn split_by_distance(run: Vec<RawEvent>, pixels: f64) -> Vec<Vec<RawEvent>> {
    let mut groups = Vec::new();
    let mut current: Vec<RawEvent> = Vec::new();
    let mut travelled = 0.0;

    for raw in run {
        let prev = current.last().and_then(RawEvent::position);
        if let (Some(prev), Some(pos)) = (prev, raw.position()) {
            let step = distance(prev, pos);
            if travelled + step > pixels {
                debug!(travelled, step, pixels, "move run split");
                groups.push(std::mem::take(&mut current));
                travelled = 0.0;
            } else {
                travelled += step;
            }
        }
        current.push(raw);
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}
