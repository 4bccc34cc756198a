//! What a reduction did: per-stage counts and recovered anomalies

use distill_core::{Button, Stage};
use serde::{Deserialize, Serialize};

/// Why a button event could not be paired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingIssueKind {
    /// Press with no release before the stream ends or the button is pressed again
    PressWithoutRelease,
    /// Release with no press before it
    ReleaseWithoutPress,
    /// Press whose release comes later, after other input (a drag)
    Interrupted,
}

/// Malformed press/release pairing, recovered by leaving the events unfused
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairingIssue {
    pub kind: PairingIssueKind,
    pub button: Button,
    pub timestamp: f64,
}

/// Top-level timestamps that went backwards after a stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderingViolation {
    pub stage: Stage,
    pub index: usize,
    pub previous: f64,
    pub current: f64,
}

/// Anomalies collected while stages run
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub issues: Vec<PairingIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pairing(&mut self, kind: PairingIssueKind, button: Button, timestamp: f64) {
        self.issues.push(PairingIssue {
            kind,
            button,
            timestamp,
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageStats {
    pub stage: Stage,
    pub pass: usize,
    pub before: usize,
    pub after: usize,
}

impl StageStats {
    pub fn removed(&self) -> usize {
        self.before.saturating_sub(self.after)
    }
}

/// Side-channel records kept out of those supplied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Retained {
    pub before: usize,
    pub after: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReduceReport {
    pub passes: usize,
    pub raw_events: usize,
    pub actions: usize,
    /// Last minus first raw timestamp
    pub duration_seconds: f64,
    pub stages: Vec<StageStats>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub issues: Vec<PairingIssue>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub ordering_violations: Vec<OrderingViolation>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub window_events: Option<Retained>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub screenshots: Option<Retained>,
}

impl ReduceReport {
    /// Top-level actions per raw event; 1.0 for an empty log
    pub fn compression_ratio(&self) -> f64 {
        if self.raw_events == 0 {
            return 1.0;
        }
        self.actions as f64 / self.raw_events as f64
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty() && self.ordering_violations.is_empty()
    }
}
