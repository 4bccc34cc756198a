//! Recording storage - JSON lines, one record per line

use crate::pipeline::ReducedRecording;
use anyhow::{Context, Result};
use distill_core::{RawEvent, Recording, Screenshot, WindowEvent};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// First line of a stored recording
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecordingMeta {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    double_click_interval_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    double_click_distance_pixels: Option<f64>,
    #[serde(default)]
    events: usize,
    #[serde(default)]
    window_events: usize,
    #[serde(default)]
    screenshots: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "r")]
enum RecordLine {
    #[serde(rename = "ev")]
    Event(RawEvent),
    #[serde(rename = "win")]
    Window(WindowEvent),
    #[serde(rename = "ss")]
    Screenshot(Screenshot),
}

pub struct RecordingStorage {
    dir: PathBuf,
}

impl RecordingStorage {
    pub fn new() -> Result<Self> {
        let home = std::env::var("HOME").context("HOME not set")?;
        Self::with_dir(PathBuf::from(home).join(".distill"))
    }

    pub fn with_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// A path as given if it exists, otherwise a file inside the storage dir.
    pub fn resolve(&self, file: &str) -> PathBuf {
        let given = PathBuf::from(file);
        if given.exists() {
            given
        } else {
            self.dir.join(file)
        }
    }

    /// Save as JSON lines: metadata first, then events, window events, screenshots
    pub fn save_recording(&self, recording: &Recording) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}_{}.jsonl", sanitize(&recording.name), stamp()));
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        let mut w = BufWriter::new(file);

        let meta = RecordingMeta {
            name: recording.name.clone(),
            double_click_interval_seconds: recording.double_click_interval_seconds,
            double_click_distance_pixels: recording.double_click_distance_pixels,
            events: recording.events.len(),
            window_events: recording.window_events.len(),
            screenshots: recording.screenshots.len(),
        };
        serde_json::to_writer(&mut w, &meta)?;
        writeln!(w)?;

        let lines = recording
            .events
            .iter()
            .cloned()
            .map(RecordLine::Event)
            .chain(recording.window_events.iter().cloned().map(RecordLine::Window))
            .chain(recording.screenshots.iter().cloned().map(RecordLine::Screenshot));
        for line in lines {
            serde_json::to_writer(&mut w, &line)?;
            writeln!(w)?;
        }

        w.flush()?;
        debug!(path = %path.display(), events = meta.events, "recording saved");
        Ok(path)
    }

    /// Load and validate a stored recording
    pub fn load_recording(&self, file: &str) -> Result<Recording> {
        let path = self.resolve(file);
        let f = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
        let mut lines = BufReader::new(f).lines();

        let meta_line = lines.next().context("Empty file")??;
        let meta: RecordingMeta =
            serde_json::from_str(&meta_line).context("reading recording metadata")?;

        let mut recording = Recording::new(meta.name);
        recording.double_click_interval_seconds = meta.double_click_interval_seconds;
        recording.double_click_distance_pixels = meta.double_click_distance_pixels;

        for (idx, line) in lines.enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: RecordLine = serde_json::from_str(&line)
                .with_context(|| format!("line {} of {}", idx + 2, path.display()))?;
            match record {
                RecordLine::Event(e) => recording.events.push(e),
                RecordLine::Window(w) => recording.window_events.push(w),
                RecordLine::Screenshot(s) => recording.screenshots.push(s),
            }
        }

        recording.validate()?;
        Ok(recording)
    }

    /// Save a reduction as pretty JSON next to the recordings
    pub fn save_reduced(&self, reduced: &ReducedRecording) -> Result<PathBuf> {
        let path = self
            .dir
            .join(format!("{}_{}.reduced.json", sanitize(&reduced.name), stamp()));
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        let mut w = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut w, reduced)?;
        writeln!(w)?;
        w.flush()?;
        Ok(path)
    }

    /// List stored recordings
    pub fn list(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if let Some(s) = name.to_str() {
                if s.ends_with(".jsonl") {
                    files.push(s.to_string());
                }
            }
        }
        files.sort();
        Ok(files)
    }

    pub fn delete(&self, file: &str) -> Result<()> {
        let path = self.dir.join(file);
        fs::remove_file(&path).with_context(|| format!("deleting {}", path.display()))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}

fn stamp() -> String {
    chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string()
}

fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
