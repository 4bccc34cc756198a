//! Shared run detection for the coalescing stages

use distill_core::{ActionEvent, RawEvent, Stage};
use tracing::{debug, info};

/// Merge maximal runs of consecutive passthrough events matching `is_target`.
///
/// Each run is handed to `merge` as raw events; every other node passes
/// through untouched. Composites never join a run, so a stage leaves the
/// output of an earlier pass alone.
pub(crate) fn merge_raw_runs<P, M>(
    stage: Stage,
    events: Vec<ActionEvent>,
    is_target: P,
    mut merge: M,
) -> Vec<ActionEvent>
where
    P: Fn(&RawEvent) -> bool,
    M: FnMut(Vec<RawEvent>) -> Vec<ActionEvent>,
{
    let before = events.len();
    let mut out = Vec::with_capacity(before);
    let mut run: Vec<RawEvent> = Vec::new();
    let mut runs = 0usize;

    for event in events {
        let event = if event.raw().is_some_and(|raw| is_target(raw)) {
            match event.into_raw() {
                Ok(raw) => {
                    run.push(raw);
                    continue;
                }
                Err(event) => event,
            }
        } else {
            event
        };
        if !run.is_empty() {
            runs += 1;
            out.extend(merge(std::mem::take(&mut run)));
        }
        out.push(event);
    }
    if !run.is_empty() {
        runs += 1;
        out.extend(merge(run));
    }

    debug!(stage = %stage, runs, "merged runs");
    info!(
        stage = %stage,
        before,
        after = out.len(),
        removed = before.saturating_sub(out.len()),
        "stage done"
    );
    out
}

pub(crate) fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}
