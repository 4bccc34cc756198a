//! Merge runs of key events into typed-text actions

use crate::reducer::Reducer;
use crate::report::Diagnostics;
use crate::runs::merge_raw_runs;
use distill_core::{ActionEvent, ActionKind, Child, InputData, Key, RawEvent, ReducerConfig, Stage};
use std::collections::HashSet;
use tracing::{debug, warn};

pub struct KeyRunFuser {
    group_named_keys: bool,
    max_chord_events: usize,
}

impl KeyRunFuser {
    pub fn new(config: &ReducerConfig) -> Self {
        Self {
            group_named_keys: config.group_named_keys,
            max_chord_events: config.max_chord_events,
        }
    }

    pub fn fuse(&self, events: Vec<ActionEvent>) -> Vec<ActionEvent> {
        merge_raw_runs(Stage::KeyRuns, events, RawEvent::is_key, |run| {
            if self.group_named_keys {
                self.chord_segments(run).into_iter().map(merge_keys).collect()
            } else {
                vec![merge_keys(run)]
            }
        })
    }

    /// Split a key run into plain typing and chords.
    ///
    /// A chord opens on a named-key press while no named key is held and
    /// closes on the release that leaves none held. A chord longer than
    /// `max_chord_events` is cut so a stuck key cannot swallow the session.
    fn chord_segments(&self, run: Vec<RawEvent>) -> Vec<Vec<RawEvent>> {
        let mut segments = Vec::new();
        let mut current: Vec<RawEvent> = Vec::new();
        let mut held: HashSet<Key> = HashSet::new();

        for raw in run {
            let mut close = false;
            match &raw.data {
                InputData::KeyPress { key } if key.is_named() => {
                    if held.is_empty() && !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    }
                    if !held.insert(key.clone()) {
                        debug!(%key, "named key pressed while already held");
                    }
                }
                InputData::KeyRelease { key } if key.is_named() => {
                    if held.remove(key) {
                        close = held.is_empty();
                    } else {
                        debug!(%key, "named key released without press");
                    }
                }
                _ => {}
            }
            current.push(raw);

            if close {
                segments.push(std::mem::take(&mut current));
            } else if !held.is_empty() && current.len() >= self.max_chord_events {
                warn!(
                    held = held.len(),
                    events = current.len(),
                    "chord exceeded max_chord_events, splitting"
                );
                segments.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

impl Reducer for KeyRunFuser {
    fn stage(&self) -> Stage {
        Stage::KeyRuns
    }

    fn reduce(&self, events: Vec<ActionEvent>, _diagnostics: &mut Diagnostics) -> Vec<ActionEvent> {
        self.fuse(events)
    }
}

/// Printable keys verbatim, named keys as `<name>`, presses only.
pub fn typed_text<'a>(events: impl IntoIterator<Item = &'a RawEvent>) -> String {
    events
        .into_iter()
        .filter_map(|raw| match &raw.data {
            InputData::KeyPress { key } => Some(key.to_string()),
            _ => None,
        })
        .collect()
}

fn merge_keys(run: Vec<RawEvent>) -> ActionEvent {
    let text = typed_text(&run);
    let anchor = run[run.len() - 1].clone();
    ActionEvent::composite(
        ActionKind::Type { text },
        &anchor,
        run.into_iter().map(Child::Raw).collect(),
        Stage::KeyRuns,
    )
}
