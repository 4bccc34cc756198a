//! Drop side-channel records no surviving action refers to

use distill_core::{ActionEvent, Screenshot, SideChannelRefs, WindowEvent};
use std::collections::HashSet;
use tracing::debug;

/// A record the capture subsystem keys by timestamp
pub trait TimestampKeyed {
    fn timestamp(&self) -> f64;
}

impl TimestampKeyed for WindowEvent {
    fn timestamp(&self) -> f64 {
        self.timestamp
    }
}

impl TimestampKeyed for Screenshot {
    fn timestamp(&self) -> f64 {
        self.timestamp
    }
}

// -0.0 and 0.0 must collide
fn ts_key(ts: f64) -> u64 {
    (ts + 0.0).to_bits()
}

#[derive(Debug, Default)]
pub struct SideChannelPruner;

impl SideChannelPruner {
    pub fn new() -> Self {
        Self
    }

    /// Keep records whose timestamp some top-level action references via `key`.
    pub fn prune<T, F>(&self, records: Vec<T>, actions: &[ActionEvent], key: F) -> Vec<T>
    where
        T: TimestampKeyed,
        F: Fn(&SideChannelRefs) -> Option<f64>,
    {
        let referenced: HashSet<u64> = actions
            .iter()
            .filter_map(|a| key(&a.refs))
            .map(ts_key)
            .collect();
        let before = records.len();
        let kept: Vec<T> = records
            .into_iter()
            .filter(|r| referenced.contains(&ts_key(r.timestamp())))
            .collect();
        debug!(before, after = kept.len(), "side channel pruned");
        kept
    }

    pub fn prune_window_events(&self, records: Vec<WindowEvent>, actions: &[ActionEvent]) -> Vec<WindowEvent> {
        self.prune(records, actions, |refs| refs.window_event_ts)
    }

    pub fn prune_screenshots(&self, records: Vec<Screenshot>, actions: &[ActionEvent]) -> Vec<Screenshot> {
        self.prune(records, actions, |refs| refs.screenshot_ts)
    }
}
