//! Pair button presses with releases, then fuse pairs into single/double clicks

use crate::reducer::Reducer;
use crate::report::{Diagnostics, PairingIssueKind};
use distill_core::{ActionEvent, ActionKind, Button, Child, InputData, RawEvent, ReducerConfig, Stage};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// A press immediately followed by the release of the same button
#[derive(Debug, Clone, PartialEq)]
pub struct ClickUnit {
    pub button: Button,
    pub press: RawEvent,
    pub release: RawEvent,
}

impl ClickUnit {
    /// Where the button went down
    pub fn position(&self) -> (f64, f64) {
        self.press.position().unwrap_or_default()
    }
}

/// Output of pairing: a unit, or any node that did not pair
#[derive(Debug, Clone, PartialEq)]
pub enum Paired {
    Unit(ClickUnit),
    Other(ActionEvent),
}

fn raw_button(event: &ActionEvent) -> Option<(Button, bool)> {
    match event.raw()?.data {
        InputData::Click { button, pressed, .. } => Some((button, pressed)),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub struct ClickPairer;

impl ClickPairer {
    pub fn new() -> Self {
        Self
    }

    /// Pair adjacent press/release events. Anything unpaired passes through
    /// unchanged and is reported in `diagnostics`.
    pub fn pair(&self, events: Vec<ActionEvent>, diagnostics: &mut Diagnostics) -> Vec<Paired> {
        let unit_starts = self.find_units(&events, diagnostics);

        let mut out = Vec::with_capacity(events.len());
        let mut iter = events.into_iter().enumerate();
        while let Some((idx, event)) = iter.next() {
            if !unit_starts[idx] {
                out.push(Paired::Other(event));
                continue;
            }
            let Some((_, next)) = iter.next() else {
                out.push(Paired::Other(event));
                continue;
            };
            let button = raw_button(&event).map(|(button, _)| button);
            match (button, event.into_raw(), next.into_raw()) {
                (Some(button), Ok(press), Ok(release)) => {
                    out.push(Paired::Unit(ClickUnit {
                        button,
                        press,
                        release,
                    }));
                }
                (_, press, release) => {
                    out.push(Paired::Other(press.map_or_else(|e| e, ActionEvent::from_raw)));
                    out.push(Paired::Other(release.map_or_else(|e| e, ActionEvent::from_raw)));
                }
            }
        }
        out
    }

    fn find_units(&self, events: &[ActionEvent], diagnostics: &mut Diagnostics) -> Vec<bool> {
        let mut starts = vec![false; events.len()];
        // buttons whose release is expected after intervening input
        let mut interrupted: BTreeSet<Button> = BTreeSet::new();
        let mut idx = 0;

        while idx < events.len() {
            let Some((button, pressed)) = raw_button(&events[idx]) else {
                idx += 1;
                continue;
            };
            let ts = events[idx].timestamp;

            if !pressed {
                if interrupted.remove(&button) {
                    debug!(%button, ts, "release after interrupted press");
                } else {
                    warn!(%button, ts, "release without press");
                    diagnostics.pairing(PairingIssueKind::ReleaseWithoutPress, button, ts);
                }
                idx += 1;
                continue;
            }

            if let Some((next_button, false)) = events.get(idx + 1).and_then(raw_button) {
                if next_button == button {
                    starts[idx] = true;
                    idx += 2;
                    continue;
                }
            }

            if release_follows(&events[idx + 1..], button) {
                debug!(%button, ts, "press interrupted before release");
                interrupted.insert(button);
                diagnostics.pairing(PairingIssueKind::Interrupted, button, ts);
            } else {
                warn!(%button, ts, "press without release");
                diagnostics.pairing(PairingIssueKind::PressWithoutRelease, button, ts);
            }
            idx += 1;
        }
        starts
    }
}

/// Whether a raw release of `button` comes before its next raw press.
fn release_follows(rest: &[ActionEvent], button: Button) -> bool {
    rest.iter()
        .filter_map(raw_button)
        .find(|(b, _)| *b == button)
        .is_some_and(|(_, pressed)| !pressed)
}

/// Fuses click units of eligible buttons into single and double clicks
pub struct ClickFuser {
    interval: f64,
    distance: f64,
    buttons: BTreeSet<Button>,
    pairer: ClickPairer,
}

impl ClickFuser {
    pub fn new(config: &ReducerConfig) -> Self {
        Self {
            interval: config.double_click_interval_seconds,
            distance: config.double_click_distance_pixels,
            buttons: config.fusable_buttons.clone(),
            pairer: ClickPairer::new(),
        }
    }

    pub fn fuse(&self, events: Vec<ActionEvent>, diagnostics: &mut Diagnostics) -> Vec<ActionEvent> {
        let before = events.len();
        let paired = self.pairer.pair(events, diagnostics);

        let mut out = Vec::with_capacity(paired.len());
        let mut doubles = 0usize;
        let mut iter = paired.into_iter().peekable();

        while let Some(item) = iter.next() {
            let unit = match item {
                Paired::Other(event) => {
                    out.push(event);
                    continue;
                }
                Paired::Unit(unit) if !self.buttons.contains(&unit.button) => {
                    out.push(ActionEvent::from_raw(unit.press));
                    out.push(ActionEvent::from_raw(unit.release));
                    continue;
                }
                Paired::Unit(unit) => unit,
            };

            let fuses = matches!(iter.peek(), Some(Paired::Unit(next)) if self.is_double(&unit, next));
            if fuses {
                if let Some(Paired::Unit(second)) = iter.next() {
                    doubles += 1;
                    out.push(double_click(unit, second));
                    continue;
                }
            }
            out.push(single_click(unit));
        }

        info!(
            stage = %Stage::ClickFusion,
            before,
            after = out.len(),
            doubles,
            "stage done"
        );
        out
    }

    fn is_double(&self, first: &ClickUnit, second: &ClickUnit) -> bool {
        if first.button != second.button {
            return false;
        }
        let gap = second.press.timestamp - first.release.timestamp;
        let (x0, y0) = first.position();
        let (x1, y1) = second.position();
        gap <= self.interval && (x1 - x0).abs() <= self.distance && (y1 - y0).abs() <= self.distance
    }
}

impl Reducer for ClickFuser {
    fn stage(&self) -> Stage {
        Stage::ClickFusion
    }

    fn reduce(&self, events: Vec<ActionEvent>, diagnostics: &mut Diagnostics) -> Vec<ActionEvent> {
        self.fuse(events, diagnostics)
    }
}

fn single_click(unit: ClickUnit) -> ActionEvent {
    let (x, y) = unit.position();
    let anchor = unit.release.clone();
    ActionEvent::composite(
        ActionKind::SingleClick {
            x,
            y,
            button: unit.button,
        },
        &anchor,
        vec![Child::Raw(unit.press), Child::Raw(unit.release)],
        Stage::ClickFusion,
    )
}

fn double_click(first: ClickUnit, second: ClickUnit) -> ActionEvent {
    let (x, y) = first.position();
    let anchor = second.release.clone();
    ActionEvent::composite(
        ActionKind::DoubleClick {
            x,
            y,
            button: first.button,
        },
        &anchor,
        vec![
            Child::Raw(first.press),
            Child::Raw(first.release),
            Child::Raw(second.press),
            Child::Raw(second.release),
        ],
        Stage::ClickFusion,
    )
}
