//! MIDI import boundary.
//!
//! This module provides:
//! - [`load_timeline`]: read a Standard MIDI File from disk
//! - [`MidiTimeline`]: merged, tempo-mapped events plus the note-length lookup
//! - [`TempoMap`]: tick to seconds conversion for metrical and timecode files
//! - [`MidiLoadError`]: why a file could not be imported

mod error;
mod tempo;
mod timeline;

pub use error::MidiLoadError;
pub use tempo::{DEFAULT_MICROS_PER_BEAT, TempoMap};
pub use timeline::{EventKind, MidiTimeline, NoteSpan, TimedEvent, load_timeline};

/// MIDI controller number of the sustain (damper) pedal.
pub const SUSTAIN_CONTROLLER: u8 = 64;
