//! dl - distill CLI
//!
//! Reduce stored input recordings to action logs, and inspect them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use distill::prelude::*;

#[derive(Parser)]
#[command(name = "dl")]
#[command(about = "distill - reduce recorded input sessions to replayable actions")]
#[command(version)]
struct Cli {
    /// Debug logging on stderr (RUST_LOG wins when set)
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Storage directory (defaults to ~/.distill)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reduce a recording to actions
    Reduce {
        file: String,
        /// Reducer config as JSON; flags below override it
        #[arg(long)]
        config: Option<PathBuf>,
        /// Double-click interval in seconds
        #[arg(long)]
        interval: Option<f64>,
        /// Double-click distance in pixels
        #[arg(long)]
        distance: Option<f64>,
        /// Buttons eligible for click fusion, e.g. left,right
        #[arg(long, value_delimiter = ',')]
        buttons: Option<Vec<Button>>,
        /// Split key runs into chords around named keys
        #[arg(long)]
        group_named_keys: bool,
        /// Split move runs after this much pointer travel
        #[arg(long)]
        move_threshold: Option<f64>,
        /// Maximum passes over the stage sequence
        #[arg(long)]
        passes: Option<usize>,
        /// Write the reduced recording here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also keep the result in the storage directory
        #[arg(long)]
        save: bool,
    },
    /// Show recording info
    Show {
        file: String,
        #[arg(long)]
        all: bool,
    },
    /// Check that reducing a recording loses nothing and is stable
    Verify {
        file: String,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List saved recordings
    List,
    /// Delete a recording
    Delete {
        file: String,
    },
}

#[derive(Serialize)]
struct Output<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Error>,
}

impl<T: Serialize> Output<T> {
    fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }
    fn err(e: Error) -> Output<()> {
        Output { success: false, data: None, error: Some(e) }
    }
}

fn print_json<T: Serialize>(output: &T) {
    match serde_json::to_string_pretty(output) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

// ── Main ────────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = storage(cli.dir.as_ref()).and_then(|storage| match cli.command {
        Commands::Reduce {
            file,
            config,
            interval,
            distance,
            buttons,
            group_named_keys,
            move_threshold,
            passes,
            output,
            save,
        } => {
            let overrides = Overrides {
                interval,
                distance,
                buttons,
                group_named_keys,
                move_threshold,
                passes,
            };
            reduce(&storage, &file, config, overrides, output, save)
        }
        Commands::Show { file, all } => show(&storage, &file, all),
        Commands::Verify { file, config } => verify(&storage, &file, config),
        Commands::List => list(&storage),
        Commands::Delete { file } => delete(&storage, &file),
    });

    if let Err(e) = result {
        match e.downcast_ref::<Error>() {
            Some(err) => print_json(&Output::<()>::err(err.clone())),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn storage(dir: Option<&PathBuf>) -> Result<RecordingStorage> {
    match dir {
        Some(dir) => RecordingStorage::with_dir(dir),
        None => RecordingStorage::new(),
    }
}

// ── Config ──────────────────────────────────────────────────────────────────

struct Overrides {
    interval: Option<f64>,
    distance: Option<f64>,
    buttons: Option<Vec<Button>>,
    group_named_keys: bool,
    move_threshold: Option<f64>,
    passes: Option<usize>,
}

fn load_config(path: Option<PathBuf>) -> Result<ReducerConfig> {
    Ok(match path {
        Some(path) => ReducerConfig::from_json_file(&path)?,
        None => ReducerConfig::default(),
    })
}

fn apply(mut config: ReducerConfig, o: Overrides) -> ReducerConfig {
    if let Some(interval) = o.interval {
        config.double_click_interval_seconds = interval;
    }
    if let Some(distance) = o.distance {
        config.double_click_distance_pixels = distance;
    }
    if let Some(buttons) = o.buttons {
        config.fusable_buttons = buttons.into_iter().collect();
    }
    if o.group_named_keys {
        config.group_named_keys = true;
    }
    if let Some(pixels) = o.move_threshold {
        config.move_merge_mode = MoveMergeMode::DistanceThreshold { pixels };
    }
    if let Some(passes) = o.passes {
        config.max_passes = passes;
    }
    config
}

// ── Commands ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Written<'a> {
    path: PathBuf,
    actions: usize,
    report: &'a ReduceReport,
}

fn reduce(
    storage: &RecordingStorage,
    file: &str,
    config: Option<PathBuf>,
    overrides: Overrides,
    output: Option<PathBuf>,
    save: bool,
) -> Result<()> {
    let config = apply(load_config(config)?, overrides);
    let pipeline = Pipeline::new(config)?;
    let recording = storage.load_recording(file)?;
    let reduced = pipeline.reduce_recording(&recording)?;

    if save {
        let path = storage.save_reduced(&reduced)?;
        tracing::info!(path = %path.display(), "reduced recording saved");
    }

    match output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&reduced)?;
            std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            print_json(&Output::ok(Written {
                path,
                actions: reduced.actions.len(),
                report: &reduced.report,
            }));
        }
        None => print_json(&Output::ok(&reduced)),
    }
    Ok(())
}

fn show(storage: &RecordingStorage, file: &str, all: bool) -> Result<()> {
    let recording = storage.load_recording(file)?;
    println!("Name: {}", recording.name);
    println!("Events: {}", recording.events.len());
    println!("Duration: {:.2}s", recording.duration());
    let (mut moves, mut clicks, mut scrolls, mut presses, mut releases) = (0, 0, 0, 0, 0);
    for e in &recording.events {
        match &e.data {
            InputData::Move { .. } => moves += 1,
            InputData::Click { .. } => clicks += 1,
            InputData::Scroll { .. } => scrolls += 1,
            InputData::KeyPress { .. } => presses += 1,
            InputData::KeyRelease { .. } => releases += 1,
        }
    }
    println!(
        "\nSummary: {} moves, {} clicks, {} scrolls, {} key presses, {} key releases, {} windows, {} screenshots",
        moves,
        clicks,
        scrolls,
        presses,
        releases,
        recording.window_events.len(),
        recording.screenshots.len()
    );
    if all {
        for (i, e) in recording.events.iter().enumerate() {
            println!("{}: {:?}", i, e);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct Verdict {
    lossless: bool,
    fixed_point: bool,
    ordered: bool,
    raw_events: usize,
    actions: usize,
    compression_ratio: f64,
    issues: Vec<PairingIssue>,
}

fn verify(storage: &RecordingStorage, file: &str, config: Option<PathBuf>) -> Result<()> {
    let pipeline = Pipeline::new(load_config(config)?)?;
    let recording = storage.load_recording(file)?;
    let reduced = pipeline.reduce_recording(&recording)?;

    let lossless = flatten_log(&reduced.actions) == recording.events;
    let again = pipeline.reduce_actions(reduced.actions.clone());
    let fixed_point = again.actions == reduced.actions;
    let ordered = reduced.report.ordering_violations.is_empty();

    let verdict = Verdict {
        lossless,
        fixed_point,
        ordered,
        raw_events: reduced.report.raw_events,
        actions: reduced.report.actions,
        compression_ratio: reduced.report.compression_ratio(),
        issues: reduced.report.issues.clone(),
    };
    print_json(&Output::ok(&verdict));

    if !(lossless && fixed_point && ordered) {
        anyhow::bail!("verification failed for {}", file);
    }
    Ok(())
}

fn list(storage: &RecordingStorage) -> Result<()> {
    let files = storage.list()?;
    if files.is_empty() {
        println!("No recordings saved.");
    } else {
        for f in files {
            println!("{}", f);
        }
    }
    Ok(())
}

fn delete(storage: &RecordingStorage, file: &str) -> Result<()> {
    storage.delete(file)?;
    println!("Deleted: {}", file);
    Ok(())
}
