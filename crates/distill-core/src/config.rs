//! Reducer configuration

use crate::error::{Error, Result};
use crate::events::{Button, Recording};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// How consecutive moves are grouped
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MoveMergeMode {
    /// Every maximal run of consecutive moves becomes one node
    #[default]
    Adjacency,
    /// Split a run once its summed path length would exceed `pixels`.
    /// Path length, not net displacement: a pointer jittering in place
    /// still accumulates distance and gets split.
    DistanceThreshold { pixels: f64 },
}

/// Reducer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReducerConfig {
    /// Max gap between first release and second press of a double click
    pub double_click_interval_seconds: f64,
    /// Max per-axis distance between the two presses of a double click
    pub double_click_distance_pixels: f64,
    /// Buttons whose clicks become single/double-click composites
    pub fusable_buttons: BTreeSet<Button>,
    /// Keep a named key held across other keys together as one chord
    pub group_named_keys: bool,
    /// Upper bound on events in one chord, guards against stuck modifiers
    pub max_chord_events: usize,
    pub move_merge_mode: MoveMergeMode,
    /// Re-run the stage sequence until counts stop changing, at most this often
    pub max_passes: usize,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            double_click_interval_seconds: 0.5,
            double_click_distance_pixels: 5.0,
            fusable_buttons: BTreeSet::from([Button::Left]),
            group_named_keys: false,
            max_chord_events: 64,
            move_merge_mode: MoveMergeMode::Adjacency,
            max_passes: 1,
        }
    }
}

impl ReducerConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            Error::invalid_config("file", &e.to_string())
                .with_context(serde_json::json!({ "path": path.display().to_string() }))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_non_negative(
            "double_click_interval_seconds",
            self.double_click_interval_seconds,
        )?;
        check_non_negative(
            "double_click_distance_pixels",
            self.double_click_distance_pixels,
        )?;
        if let MoveMergeMode::DistanceThreshold { pixels } = self.move_merge_mode {
            if !pixels.is_finite() || pixels <= 0.0 {
                return Err(Error::invalid_config(
                    "move_merge_mode.pixels",
                    &format!("must be a positive number, got {}", pixels),
                ));
            }
        }
        if self.max_chord_events == 0 {
            return Err(Error::invalid_config("max_chord_events", "must be at least 1"));
        }
        if self.max_passes == 0 {
            return Err(Error::invalid_config("max_passes", "must be at least 1"));
        }
        Ok(())
    }

    /// Apply the double-click settings a recording carries, if any.
    pub fn for_recording(&self, recording: &Recording) -> Result<Self> {
        let mut config = self.clone();
        if let Some(interval) = recording.double_click_interval_seconds {
            config.double_click_interval_seconds = interval;
        }
        if let Some(distance) = recording.double_click_distance_pixels {
            config.double_click_distance_pixels = distance;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn is_fusable(&self, button: Button) -> bool {
        self.fusable_buttons.contains(&button)
    }
}

fn check_non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::invalid_config(
            field,
            &format!("must be a finite number >= 0, got {}", value),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;

    #[test]
    fn default_is_valid() {
        let config = ReducerConfig::default();
        config.validate().unwrap();
        assert!(config.is_fusable(Button::Left));
        assert!(!config.is_fusable(Button::Right));
    }

    #[test]
    fn rejects_negative_interval() {
        let config = ReducerConfig {
            double_click_interval_seconds: -0.1,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfig);
        assert!(err.message.contains("double_click_interval_seconds"));
    }

    #[test]
    fn rejects_nan_distance_and_bad_threshold() {
        let config = ReducerConfig {
            double_click_distance_pixels: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ReducerConfig {
            move_merge_mode: MoveMergeMode::DistanceThreshold { pixels: 0.0 },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ReducerConfig = serde_json::from_str(
            r#"{"fusable_buttons":["left","right"],"move_merge_mode":{"mode":"distance_threshold","pixels":40}}"#,
        )
        .unwrap();
        assert_eq!(config.double_click_interval_seconds, 0.5);
        assert!(config.is_fusable(Button::Right));
        assert_eq!(
            config.move_merge_mode,
            MoveMergeMode::DistanceThreshold { pixels: 40.0 }
        );
    }

    #[test]
    fn recording_overrides_double_click() {
        let mut rec = Recording::new("r");
        rec.double_click_interval_seconds = Some(0.25);
        let config = ReducerConfig::default().for_recording(&rec).unwrap();
        assert_eq!(config.double_click_interval_seconds, 0.25);
        assert_eq!(config.double_click_distance_pixels, 5.0);

        rec.double_click_distance_pixels = Some(-1.0);
        assert!(ReducerConfig::default().for_recording(&rec).is_err());
    }
}
