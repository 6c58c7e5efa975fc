//! keyfall: falling-note MIDI player.
//!
//! `schedule` and `simulate` run headless; `play` drives the audio device
//! and takes live input from a window.

mod window;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use keyfall_audio::{ClipLibrary, KiraAudioBackend, SilentBackend};
use keyfall_play::{AppConfig, KeyboardLayout, PedalState, ScriptedInput, Studio, import_schedule};
use keyfall_types::KeyIdentifier;
use log::{debug, info, warn};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "keyfall", about = "Falling-note MIDI player")]
struct Args {
    /// Path to config JSON file.
    #[arg(long, env = "KEYFALL_CONFIG")]
    config: Option<PathBuf>,

    /// Path to keyboard layout JSON file (default: 88-key piano).
    #[arg(long)]
    layout: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the spawn schedule of a MIDI file as JSON.
    Schedule {
        /// MIDI file to import.
        midi: PathBuf,
    },
    /// Run the full pipeline without sound and print a summary.
    Simulate {
        /// MIDI file to play.
        midi: PathBuf,

        /// Simulation ticks per second.
        #[arg(long, default_value_t = 60)]
        fps: u32,

        /// Length of every simulated clip, in seconds.
        #[arg(long, default_value_t = 4.0)]
        clip_length: f64,
    },
    /// Play through the default audio device, with live keyboard input.
    Play {
        /// MIDI file to play along with (omit to only play live).
        midi: Option<PathBuf>,

        /// Directory of key clips named like `Cs4_61.wav`.
        #[arg(long)]
        clips: PathBuf,

        /// Ticks per second.
        #[arg(long, default_value_t = 60)]
        fps: u32,

        /// Quit once the file has played out instead of waiting for Escape.
        #[arg(long)]
        exit_when_done: bool,
    },
}

/// Counters reported by `simulate`.
#[derive(Debug, Default, Serialize)]
struct Summary {
    scheduled: usize,
    spawned: u64,
    dropped: u64,
    triggered: usize,
    played: usize,
    peak_voices: usize,
    steals: u64,
    seconds: f64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let layout = match &args.layout {
        Some(path) => KeyboardLayout::read(path)?,
        None => KeyboardLayout::piano(KeyboardLayout::PIANO_RANGE),
    };

    match args.command {
        Command::Schedule { midi } => schedule(&midi, &config),
        Command::Simulate {
            midi,
            fps,
            clip_length,
        } => simulate(&midi, &layout, &config, fps, clip_length),
        Command::Play {
            midi,
            clips,
            fps,
            exit_when_done,
        } => play(midi.as_deref(), &clips, &layout, &config, fps, exit_when_done),
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };
    match AppConfig::read(path) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            Ok(config)
        }
        Err(e) if !path.exists() => {
            warn!("{e:#}, using defaults");
            Ok(AppConfig::default())
        }
        Err(e) => Err(e),
    }
}

fn schedule(midi: &Path, config: &AppConfig) -> Result<()> {
    let timeline = keyfall_midi::load_timeline(midi)?;
    let schedule = import_schedule(
        &timeline,
        config.play.sustain_extension,
        &mut PedalState::default(),
    );
    println!("{}", serde_json::to_string_pretty(&schedule)?);
    Ok(())
}

/// One silent clip per key, named the way the key looks for it.
fn synthetic_clips(
    layout: &KeyboardLayout,
    backend: &mut SilentBackend,
    length: f64,
) -> ClipLibrary {
    let mut clips = ClipLibrary::new();
    for key in &layout.keys {
        match KeyIdentifier::parse(key) {
            Ok(id) => {
                let [name, ..] = id.clip_name_candidates();
                clips.insert(&name, backend.add_clip(length));
            }
            Err(e) => debug!("No clip for {key:?}: {e}"),
        }
    }
    clips
}

fn simulate(
    midi: &Path,
    layout: &KeyboardLayout,
    config: &AppConfig,
    fps: u32,
    clip_length: f64,
) -> Result<()> {
    let mut backend = SilentBackend::new(clip_length);
    let clips = synthetic_clips(layout, &mut backend, clip_length);
    let mut studio = Studio::build(layout, &clips, backend, config);

    let mut summary = Summary {
        scheduled: studio.load_midi_from_path(midi)?,
        ..Default::default()
    };

    let dt = 1.0 / f64::from(fps.max(1));
    let mut input = ScriptedInput::default();
    while !studio.is_idle() {
        let report = studio.tick(dt, &mut input);
        summary.triggered += report.triggered;
        summary.played += report.played;
        summary.peak_voices = summary
            .peak_voices
            .max(studio.keyboard().pool().busy_count());
        summary.seconds += dt;
    }

    summary.spawned = studio.notes().spawned();
    summary.dropped = studio.notes().dropped();
    summary.steals = studio.keyboard().pool().steal_count();
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn play(
    midi: Option<&Path>,
    clip_dir: &Path,
    layout: &KeyboardLayout,
    config: &AppConfig,
    fps: u32,
    exit_when_done: bool,
) -> Result<()> {
    let mut backend = KiraAudioBackend::new()?;
    let clips = ClipLibrary::scan(clip_dir, &mut backend)
        .with_context(|| format!("Failed to load clips from {}", clip_dir.display()))?;
    let mut studio = Studio::build(layout, &clips, backend, config);
    if let Some(midi) = midi {
        studio.load_midi_from_path(midi)?;
    }

    window::run_live(studio, fps, exit_when_done)
}
