//! Runs the stages in their fixed order and prunes the side channels

use crate::clicks::ClickFuser;
use crate::keys::KeyRunFuser;
use crate::moves::MoveRunCoalescer;
use crate::orphans::OrphanMoveAbsorber;
use crate::prune::SideChannelPruner;
use crate::reducer::Reducer;
use crate::report::{Diagnostics, OrderingViolation, ReduceReport, Retained, StageStats};
use crate::scrolls::ScrollRunCoalescer;
use distill_core::{
    wrap_raw, ActionEvent, RawEvent, Recording, ReducerConfig, Result, Screenshot, Stage, WindowEvent,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Reduced action log plus what it took to get there
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub actions: Vec<ActionEvent>,
    pub report: ReduceReport,
}

/// A recording after reduction, ready for replay or prompting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReducedRecording {
    pub name: String,
    pub actions: Vec<ActionEvent>,
    pub window_events: Vec<WindowEvent>,
    pub screenshots: Vec<Screenshot>,
    pub report: ReduceReport,
}

struct Session {
    actions: Vec<ActionEvent>,
    window_events: Vec<WindowEvent>,
    screenshots: Vec<Screenshot>,
}

impl Session {
    fn counts(&self) -> (usize, usize, usize) {
        (
            self.actions.len(),
            self.window_events.len(),
            self.screenshots.len(),
        )
    }
}

pub struct Pipeline {
    config: ReducerConfig,
    stages: Vec<Box<dyn Reducer>>,
    pruner: SideChannelPruner,
}

impl Pipeline {
    /// Validates `config` before anything runs.
    pub fn new(config: ReducerConfig) -> Result<Self> {
        config.validate()?;
        let stages: Vec<Box<dyn Reducer>> = vec![
            Box::new(MoveRunCoalescer::new(config.move_merge_mode)),
            Box::new(ScrollRunCoalescer::new()),
            Box::new(ClickFuser::new(&config)),
            Box::new(KeyRunFuser::new(&config)),
            Box::new(OrphanMoveAbsorber::new()),
        ];
        Ok(Self {
            config,
            stages,
            pruner: SideChannelPruner::new(),
        })
    }

    pub fn config(&self) -> &ReducerConfig {
        &self.config
    }

    pub fn stage_order(&self) -> Vec<Stage> {
        self.stages.iter().map(|s| s.stage()).collect()
    }

    pub fn reduce(&self, events: Vec<RawEvent>) -> Reduction {
        self.reduce_actions(wrap_raw(events))
    }

    /// Reduce an existing log. Feeding a reduced log back yields it unchanged.
    pub fn reduce_actions(&self, actions: Vec<ActionEvent>) -> Reduction {
        let session = Session {
            actions,
            window_events: Vec::new(),
            screenshots: Vec::new(),
        };
        let (session, report) = self.run(session);
        Reduction {
            actions: session.actions,
            report,
        }
    }

    /// Reduce a recording, honoring its own double-click settings, and drop
    /// window events and screenshots nothing refers to any more.
    pub fn reduce_recording(&self, recording: &Recording) -> Result<ReducedRecording> {
        let config = self.config.for_recording(recording)?;
        if config != self.config {
            debug!(
                interval = config.double_click_interval_seconds,
                distance = config.double_click_distance_pixels,
                "using recording double-click settings"
            );
            return Ok(Pipeline::new(config)?.run_recording(recording));
        }
        Ok(self.run_recording(recording))
    }

    fn run_recording(&self, recording: &Recording) -> ReducedRecording {
        let session = Session {
            actions: wrap_raw(recording.events.clone()),
            window_events: recording.window_events.clone(),
            screenshots: recording.screenshots.clone(),
        };
        let (session, mut report) = self.run(session);
        report.window_events = Some(Retained {
            before: recording.window_events.len(),
            after: session.window_events.len(),
        });
        report.screenshots = Some(Retained {
            before: recording.screenshots.len(),
            after: session.screenshots.len(),
        });
        ReducedRecording {
            name: recording.name.clone(),
            actions: session.actions,
            window_events: session.window_events,
            screenshots: session.screenshots,
            report,
        }
    }

    fn run(&self, mut session: Session) -> (Session, ReduceReport) {
        let raw: Vec<&RawEvent> = session.actions.iter().flat_map(|a| a.flatten()).collect();
        let mut report = ReduceReport {
            raw_events: raw.len(),
            duration_seconds: match (raw.first(), raw.last()) {
                (Some(first), Some(last)) => last.timestamp - first.timestamp,
                _ => 0.0,
            },
            ..Default::default()
        };

        let mut diagnostics = Diagnostics::new();
        for pass in 0..self.config.max_passes {
            let counts = session.counts();
            // later passes revisit the same leftovers; report them once
            let mut scratch = Diagnostics::new();
            let diag = if pass == 0 {
                &mut diagnostics
            } else {
                &mut scratch
            };

            for stage in &self.stages {
                let before = session.actions.len();
                session.actions = stage.reduce(std::mem::take(&mut session.actions), diag);
                report.stages.push(StageStats {
                    stage: stage.stage(),
                    pass,
                    before,
                    after: session.actions.len(),
                });
                check_order(stage.stage(), &session.actions, &mut report.ordering_violations);
            }

            session.window_events = self
                .pruner
                .prune_window_events(std::mem::take(&mut session.window_events), &session.actions);
            session.screenshots = self
                .pruner
                .prune_screenshots(std::mem::take(&mut session.screenshots), &session.actions);

            report.passes = pass + 1;
            if session.counts() == counts {
                break;
            }
        }

        report.actions = session.actions.len();
        report.issues = diagnostics.issues;
        info!(
            passes = report.passes,
            raw_events = report.raw_events,
            actions = report.actions,
            window_events = session.window_events.len(),
            screenshots = session.screenshots.len(),
            issues = report.issues.len(),
            "reduction done"
        );
        (session, report)
    }
}

fn check_order(stage: Stage, actions: &[ActionEvent], violations: &mut Vec<OrderingViolation>) {
    for (idx, pair) in actions.windows(2).enumerate() {
        if pair[1].timestamp < pair[0].timestamp {
            error!(
                %stage,
                index = idx + 1,
                previous = pair[0].timestamp,
                current = pair[1].timestamp,
                "timestamps out of order"
            );
            violations.push(OrderingViolation {
                stage,
                index: idx + 1,
                previous: pair[0].timestamp,
                current: pair[1].timestamp,
            });
        }
    }
}
