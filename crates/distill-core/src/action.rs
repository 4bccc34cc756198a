//! Action events - the nodes of a reduced log
//!
//! A node is either a passthrough wrapping exactly one raw event, or a
//! composite built by a reducer stage. Composites own their children, so the
//! original raw sequence is always recoverable with [`flatten_log`].

use crate::events::{Button, InputData, Key, RawEvent};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reducer stage that built or wrapped a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    MoveRuns,
    ScrollRuns,
    ClickFusion,
    KeyRuns,
    OrphanMoves,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::MoveRuns => "move_runs",
            Stage::ScrollRuns => "scroll_runs",
            Stage::ClickFusion => "click_fusion",
            Stage::KeyRuns => "key_runs",
            Stage::OrphanMoves => "orphan_moves",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind plus kind-specific attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionKind {
    Move { x: f64, y: f64 },
    Scroll { x: f64, y: f64, dx: f64, dy: f64 },
    /// Raw, unfused button press or release
    Click { x: f64, y: f64, button: Button, pressed: bool },
    #[serde(rename = "singleclick")]
    SingleClick { x: f64, y: f64, button: Button },
    #[serde(rename = "doubleclick")]
    DoubleClick { x: f64, y: f64, button: Button },
    /// Bare key event that no stage has grouped yet
    Key { key: Key, pressed: bool },
    Type { text: String },
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Move { .. } => "move",
            ActionKind::Scroll { .. } => "scroll",
            ActionKind::Click { .. } => "click",
            ActionKind::SingleClick { .. } => "singleclick",
            ActionKind::DoubleClick { .. } => "doubleclick",
            ActionKind::Key { .. } => "key",
            ActionKind::Type { .. } => "type",
        }
    }

    pub fn position(&self) -> Option<(f64, f64)> {
        match *self {
            ActionKind::Move { x, y }
            | ActionKind::Scroll { x, y, .. }
            | ActionKind::Click { x, y, .. }
            | ActionKind::SingleClick { x, y, .. }
            | ActionKind::DoubleClick { x, y, .. } => Some((x, y)),
            ActionKind::Key { .. } | ActionKind::Type { .. } => None,
        }
    }
}

impl From<&InputData> for ActionKind {
    fn from(data: &InputData) -> Self {
        match data {
            InputData::Move { x, y } => ActionKind::Move { x: *x, y: *y },
            InputData::Scroll { x, y, dx, dy } => ActionKind::Scroll {
                x: *x,
                y: *y,
                dx: *dx,
                dy: *dy,
            },
            InputData::Click {
                x,
                y,
                button,
                pressed,
            } => ActionKind::Click {
                x: *x,
                y: *y,
                button: *button,
                pressed: *pressed,
            },
            InputData::KeyPress { key } => ActionKind::Key {
                key: key.clone(),
                pressed: true,
            },
            InputData::KeyRelease { key } => ActionKind::Key {
                key: key.clone(),
                pressed: false,
            },
        }
    }
}

/// Foreign keys into the side channels, inherited from a node's anchor
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SideChannelRefs {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub window_event_ts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub screenshot_ts: Option<f64>,
}

impl From<&RawEvent> for SideChannelRefs {
    fn from(raw: &RawEvent) -> Self {
        Self {
            window_event_ts: raw.window_event_ts,
            screenshot_ts: raw.screenshot_ts,
        }
    }
}

/// Child of a node: a raw event or a nested action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Child {
    Raw(RawEvent),
    Action(ActionEvent),
}

impl Child {
    pub fn timestamp(&self) -> f64 {
        match self {
            Child::Raw(raw) => raw.timestamp,
            Child::Action(action) => action.timestamp,
        }
    }

    fn collect_raw<'a>(&'a self, out: &mut Vec<&'a RawEvent>) {
        match self {
            Child::Raw(raw) => out.push(raw),
            Child::Action(action) => action.collect_raw(out),
        }
    }
}

/// Node in the reduced log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEvent {
    #[serde(flatten)]
    pub kind: ActionKind,
    pub timestamp: f64,
    #[serde(flatten)]
    pub refs: SideChannelRefs,
    /// Stages that built or wrapped this node, in order; empty for passthroughs
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub reducers: Vec<Stage>,
    pub children: Vec<Child>,
}

impl ActionEvent {
    /// Wrap a raw event unchanged.
    pub fn from_raw(raw: RawEvent) -> Self {
        Self {
            kind: ActionKind::from(&raw.data),
            timestamp: raw.timestamp,
            refs: SideChannelRefs::from(&raw),
            reducers: Vec::new(),
            children: vec![Child::Raw(raw)],
        }
    }

    /// Build a composite whose timestamp and side-channel refs come from `anchor`.
    pub fn composite(kind: ActionKind, anchor: &RawEvent, children: Vec<Child>, stage: Stage) -> Self {
        Self {
            kind,
            timestamp: anchor.timestamp,
            refs: SideChannelRefs::from(anchor),
            reducers: vec![stage],
            children,
        }
    }

    pub fn is_passthrough(&self) -> bool {
        self.reducers.is_empty()
            && self.children.len() == 1
            && matches!(self.children[0], Child::Raw(_))
    }

    /// The wrapped raw event, if this node is a passthrough.
    pub fn raw(&self) -> Option<&RawEvent> {
        if !self.is_passthrough() {
            return None;
        }
        match self.children.first() {
            Some(Child::Raw(raw)) => Some(raw),
            _ => None,
        }
    }

    /// Unwrap a passthrough back into its raw event; composites are returned as-is.
    pub fn into_raw(self) -> std::result::Result<RawEvent, Self> {
        if !self.is_passthrough() {
            return Err(self);
        }
        let mut node = self;
        match node.children.pop() {
            Some(Child::Raw(raw)) => Ok(raw),
            Some(other) => {
                node.children.push(other);
                Err(node)
            }
            None => Err(node),
        }
    }

    /// Text of a `Type` node
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            ActionKind::Type { text } => Some(text),
            _ => None,
        }
    }

    pub fn is_click_family(&self) -> bool {
        matches!(
            self.kind,
            ActionKind::Click { .. } | ActionKind::SingleClick { .. } | ActionKind::DoubleClick { .. }
        )
    }

    pub fn is_move(&self) -> bool {
        matches!(self.kind, ActionKind::Move { .. })
    }

    pub fn position(&self) -> Option<(f64, f64)> {
        self.kind.position()
    }

    /// Raw events below this node, in original order.
    pub fn flatten(&self) -> Vec<&RawEvent> {
        let mut out = Vec::new();
        self.collect_raw(&mut out);
        out
    }

    fn collect_raw<'a>(&'a self, out: &mut Vec<&'a RawEvent>) {
        for child in &self.children {
            child.collect_raw(out);
        }
    }

    /// Number of raw events below this node
    pub fn raw_len(&self) -> usize {
        self.children
            .iter()
            .map(|c| match c {
                Child::Raw(_) => 1,
                Child::Action(a) => a.raw_len(),
            })
            .sum()
    }
}

impl fmt::Display for ActionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ActionKind::Move { x, y } => write!(f, "move({}, {})", x, y),
            ActionKind::Scroll { dx, dy, .. } => write!(f, "scroll({}, {})", dx, dy),
            ActionKind::Click {
                x,
                y,
                button,
                pressed,
            } => {
                let state = if *pressed { "press" } else { "release" };
                write!(f, "{}_{}({}, {})", button, state, x, y)
            }
            ActionKind::SingleClick { x, y, button } => write!(f, "{}_singleclick({}, {})", button, x, y),
            ActionKind::DoubleClick { x, y, button } => write!(f, "{}_doubleclick({}, {})", button, x, y),
            ActionKind::Key { key, pressed } => {
                let state = if *pressed { "press" } else { "release" };
                write!(f, "{}({})", state, key)
            }
            ActionKind::Type { text } => write!(f, "type({:?})", text),
        }
    }
}

/// Wrap every raw event as a passthrough node.
pub fn wrap_raw(events: Vec<RawEvent>) -> Vec<ActionEvent> {
    events.into_iter().map(ActionEvent::from_raw).collect()
}

/// Recursively flatten a log back into its raw events.
pub fn flatten_log(actions: &[ActionEvent]) -> Vec<RawEvent> {
    actions
        .iter()
        .flat_map(|a| a.flatten())
        .cloned()
        .collect()
}
