use thiserror::Error;

/// Why a key, lane or clip identifier could not be parsed.
///
/// These are per-entry failures: callers skip the entry and carry on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("expected 3 underscore-separated fields, found {found} in {identifier:?}")]
    FieldCount { identifier: String, found: usize },

    #[error("MIDI number field is not an integer: {0:?}")]
    InvalidMidiNumber(String),

    #[error("MIDI number out of range: {0}")]
    MidiOutOfRange(i64),

    #[error("note label has no octave digit: {0:?}")]
    MissingOctave(String),
}
