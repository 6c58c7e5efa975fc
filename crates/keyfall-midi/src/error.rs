use std::path::PathBuf;
use thiserror::Error;

/// Failure to import a MIDI file. Fatal to the load only.
#[derive(Debug, Error)]
pub enum MidiLoadError {
    #[error("MIDI file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read MIDI file: {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse MIDI file: {0}")]
    Parse(String),
}
