//! Shared fixtures: MIDI files written to disk and sessions on the silent backend.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use keyfall_audio::{AudioConfig, ClipLibrary, SilentBackend};
use keyfall_play::{AppConfig, KeyboardLayout, Studio};
use keyfall_types::{KeyIdentifier, MidiNumber};
use log::{Level, LevelFilter, Log, Metadata, Record};
use midly::num::{u4, u7, u15, u28};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};

pub const TICKS_PER_BEAT: u16 = 480;
pub const DT: f64 = 0.25;

/// Logger that keeps every record so tests can assert on diagnostics.
struct CaptureLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

/// Route this test binary's log output into memory.
pub fn capture_logs() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(LevelFilter::Debug);
    });
}

/// Whether a record at `level` containing `text` has been logged.
pub fn logged(level: Level, text: &str) -> bool {
    LOGGER
        .records
        .lock()
        .unwrap()
        .iter()
        .any(|(l, message)| *l == level && message.contains(text))
}

pub fn note_on(key: u8) -> TrackEventKind<'static> {
    TrackEventKind::Midi {
        channel: u4::new(0),
        message: MidiMessage::NoteOn {
            key: u7::new(key),
            vel: u7::new(100),
        },
    }
}

pub fn note_off(key: u8) -> TrackEventKind<'static> {
    TrackEventKind::Midi {
        channel: u4::new(0),
        message: MidiMessage::NoteOff {
            key: u7::new(key),
            vel: u7::new(0),
        },
    }
}

pub fn sustain(value: u8) -> TrackEventKind<'static> {
    TrackEventKind::Midi {
        channel: u4::new(0),
        message: MidiMessage::Controller {
            controller: u7::new(64),
            value: u7::new(value),
        },
    }
}

/// Write a single-track file at 120 BPM; events are (absolute tick, event).
/// 960 ticks are one second.
pub fn write_midi(dir: &Path, name: &str, mut events: Vec<(u32, TrackEventKind<'static>)>) -> PathBuf {
    events.sort_by_key(|(tick, _)| *tick);
    let mut last = 0;
    let mut track = Vec::new();
    for (tick, kind) in events {
        track.push(TrackEvent {
            delta: u28::new(tick - last),
            kind,
        });
        last = tick;
    }
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    let smf = Smf {
        header: Header {
            format: Format::SingleTrack,
            timing: Timing::Metrical(u15::new(TICKS_PER_BEAT)),
        },
        tracks: vec![track],
    };
    let mut bytes = Vec::new();
    smf.write(&mut bytes).unwrap();

    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// A session over C3..C5 whose clips ring for eight seconds.
pub fn studio_with(layout: &KeyboardLayout, max_polyphony: usize) -> Studio<SilentBackend> {
    let mut backend = SilentBackend::default();
    let mut clips = ClipLibrary::new();
    for key in &layout.keys {
        let id = KeyIdentifier::parse(key).unwrap();
        clips.insert(&format!("{}{}_{}", id.name, id.octave, id.midi), backend.add_clip(8.0));
    }
    let config = AppConfig {
        audio: AudioConfig {
            max_polyphony,
            volume: 1.0,
            ..Default::default()
        },
        ..Default::default()
    };
    Studio::build(layout, &clips, backend, &config)
}

pub fn studio() -> Studio<SilentBackend> {
    studio_with(&KeyboardLayout::piano(48..=72), 8)
}

pub fn midi(value: u8) -> MidiNumber {
    MidiNumber::new(value).unwrap()
}

