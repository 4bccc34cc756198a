//! distill-reducer - Coalesce raw input events into semantic actions
//!
//! A recording arrives as thousands of low-level events. The stages here
//! fold them into the handful of actions a person actually performed:
//!
//! - **MoveRuns**: consecutive pointer moves become one move
//! - **ScrollRuns**: consecutive scrolls become one scroll with summed deltas
//! - **ClickFusion**: press/release pairs become single or double clicks
//! - **KeyRuns**: key runs become typed text, optionally split into chords
//! - **OrphanMoves**: leftover moves attach to the neighboring click
//!
//! Every raw event stays reachable through the action tree, and a reduced
//! log reduces to itself.

pub mod clicks;
pub mod keys;
pub mod moves;
pub mod orphans;
pub mod pipeline;
pub mod prune;
pub mod reducer;
pub mod report;
mod runs;
pub mod scrolls;
pub mod storage;

pub use clicks::{ClickFuser, ClickPairer, ClickUnit, Paired};
pub use keys::{typed_text, KeyRunFuser};
pub use moves::MoveRunCoalescer;
pub use orphans::OrphanMoveAbsorber;
pub use pipeline::{Pipeline, ReducedRecording, Reduction};
pub use prune::{SideChannelPruner, TimestampKeyed};
pub use reducer::Reducer;
pub use report::{
    Diagnostics, OrderingViolation, PairingIssue, PairingIssueKind, ReduceReport, Retained,
    StageStats,
};
pub use scrolls::ScrollRunCoalescer;
pub use storage::RecordingStorage;

pub mod prelude {
    pub use crate::pipeline::{Pipeline, ReducedRecording, Reduction};
    pub use crate::report::{PairingIssue, PairingIssueKind, ReduceReport};
    pub use crate::storage::RecordingStorage;
}
