//! Raw input events as emitted by the capture subsystem
//!
//! Events serialize to compact JSON objects so a recording stays readable as
//! JSON lines.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Left,
    Right,
    Middle,
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Button::Left => "left",
            Button::Right => "right",
            Button::Middle => "middle",
        };
        f.write_str(s)
    }
}

impl FromStr for Button {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "left" | "l" => Ok(Button::Left),
            "right" | "r" => Ok(Button::Right),
            "middle" | "center" | "m" => Ok(Button::Middle),
            other => Err(Error::invalid_config(
                "fusable_buttons",
                &format!("unknown button '{}'", other),
            )
            .with_suggestions(vec!["left".into(), "right".into(), "middle".into()])),
        }
    }
}

/// A keyboard key.
///
/// Printable keys serialize as a one-character string, special keys by name
/// (`"shift"`, `"enter"`, ...). `Named` must hold a name of two or more
/// characters: a one-character name reads back as `Char`. Build keys with
/// [`Key::parse`], which upholds this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Char(char),
    Named(String),
}

impl Key {
    /// Build a key from its captured name; single characters become `Char`.
    pub fn parse(name: &str) -> Self {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Key::Char(c),
            _ => Key::Named(name.to_lowercase()),
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Key::Named(_))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            Key::Named(n) => write!(f, "<{}>", n),
        }
    }
}

/// Single raw event - flat structure, one per captured input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Seconds since the epoch of the recording clock
    #[serde(rename = "t")]
    pub timestamp: f64,
    /// Timestamp of the window snapshot active when the event was captured
    #[serde(rename = "we", skip_serializing_if = "Option::is_none", default)]
    pub window_event_ts: Option<f64>,
    /// Timestamp of the screenshot taken for this event
    #[serde(rename = "ss", skip_serializing_if = "Option::is_none", default)]
    pub screenshot_ts: Option<f64>,
    #[serde(flatten)]
    pub data: InputData,
}

/// Event data - tagged union over the device inputs we record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "e")]
pub enum InputData {
    #[serde(rename = "m")]
    Move { x: f64, y: f64 },

    #[serde(rename = "c")]
    Click {
        x: f64,
        y: f64,
        #[serde(rename = "b")]
        button: Button,
        #[serde(rename = "p")]
        pressed: bool,
    },

    /// Scroll deltas are incremental, not positional
    #[serde(rename = "s")]
    Scroll { x: f64, y: f64, dx: f64, dy: f64 },

    #[serde(rename = "kp")]
    KeyPress {
        #[serde(rename = "k")]
        key: Key,
    },

    #[serde(rename = "kr")]
    KeyRelease {
        #[serde(rename = "k")]
        key: Key,
    },
}

impl RawEvent {
    pub fn new(timestamp: f64, data: InputData) -> Self {
        Self {
            timestamp,
            window_event_ts: None,
            screenshot_ts: None,
            data,
        }
    }

    pub fn mouse_move(timestamp: f64, x: f64, y: f64) -> Self {
        Self::new(timestamp, InputData::Move { x, y })
    }

    pub fn click(timestamp: f64, x: f64, y: f64, button: Button, pressed: bool) -> Self {
        Self::new(
            timestamp,
            InputData::Click {
                x,
                y,
                button,
                pressed,
            },
        )
    }

    pub fn scroll(timestamp: f64, x: f64, y: f64, dx: f64, dy: f64) -> Self {
        Self::new(timestamp, InputData::Scroll { x, y, dx, dy })
    }

    pub fn key_press(timestamp: f64, key: Key) -> Self {
        Self::new(timestamp, InputData::KeyPress { key })
    }

    pub fn key_release(timestamp: f64, key: Key) -> Self {
        Self::new(timestamp, InputData::KeyRelease { key })
    }

    pub fn with_window_event(mut self, ts: f64) -> Self {
        self.window_event_ts = Some(ts);
        self
    }

    pub fn with_screenshot(mut self, ts: f64) -> Self {
        self.screenshot_ts = Some(ts);
        self
    }

    /// Cursor position, for the events that carry one
    pub fn position(&self) -> Option<(f64, f64)> {
        match self.data {
            InputData::Move { x, y }
            | InputData::Click { x, y, .. }
            | InputData::Scroll { x, y, .. } => Some((x, y)),
            InputData::KeyPress { .. } | InputData::KeyRelease { .. } => None,
        }
    }

    pub fn is_key(&self) -> bool {
        matches!(
            self.data,
            InputData::KeyPress { .. } | InputData::KeyRelease { .. }
        )
    }
}

/// Snapshot of the active window, keyed by timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowEvent {
    pub timestamp: f64,
    pub title: String,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub window_id: Option<String>,
}

/// Screenshot reference, keyed by timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screenshot {
    pub timestamp: f64,
    /// Where the storage collaborator keeps the image
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub path: Option<String>,
}

/// A complete recorded session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub name: String,
    /// Per-recording override of the configured double-click interval
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub double_click_interval_seconds: Option<f64>,
    /// Per-recording override of the configured double-click distance
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub double_click_distance_pixels: Option<f64>,
    #[serde(default)]
    pub events: Vec<RawEvent>,
    #[serde(default)]
    pub window_events: Vec<WindowEvent>,
    #[serde(default)]
    pub screenshots: Vec<Screenshot>,
}

impl Recording {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Check what the reducer relies on: finite, non-decreasing timestamps.
    pub fn validate(&self) -> Result<()> {
        let mut prev: Option<f64> = None;
        for (idx, event) in self.events.iter().enumerate() {
            if !event.timestamp.is_finite() {
                return Err(Error::malformed_recording(format!(
                    "event {} has non-finite timestamp",
                    idx
                )));
            }
            if let Some(p) = prev {
                if event.timestamp < p {
                    return Err(Error::malformed_recording(format!(
                        "event {} at {} precedes previous event at {}",
                        idx, event.timestamp, p
                    ))
                    .with_context(serde_json::json!({ "index": idx })));
                }
            }
            prev = Some(event.timestamp);
        }
        Ok(())
    }

    /// Last minus first raw timestamp
    pub fn duration(&self) -> f64 {
        match (self.events.first(), self.events.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        }
    }
}
