use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::IdentifierError;
use crate::pitch::PitchClass;

/// A MIDI note number, guaranteed to lie in `0..=127`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct MidiNumber(u8);

impl MidiNumber {
    pub const MAX: u8 = 127;
    /// Number of distinct MIDI numbers; size of tables indexed by them.
    pub const COUNT: usize = 128;
    pub const MIDDLE_C: MidiNumber = MidiNumber(60);

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Index into a `[_; MidiNumber::COUNT]` table.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn pitch_class(self) -> PitchClass {
        PitchClass::from_semitone(self.0 % 12)
    }

    /// Scientific pitch octave (middle C = C4).
    pub fn octave(self) -> i8 {
        (self.0 / 12) as i8 - 1
    }

    /// MIDI number of `pitch` in `octave`, if it is representable.
    pub fn from_pitch(pitch: PitchClass, octave: i8) -> Option<Self> {
        let value = (octave as i16 + 1) * 12 + pitch.semitone() as i16;
        u8::try_from(value).ok().and_then(Self::new)
    }

    pub fn all() -> impl Iterator<Item = MidiNumber> {
        (0..=Self::MAX).map(MidiNumber)
    }
}

impl TryFrom<i64> for MidiNumber {
    type Error = IdentifierError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(IdentifierError::MidiOutOfRange(value))
    }
}

impl From<MidiNumber> for u8 {
    fn from(midi: MidiNumber) -> Self {
        midi.0
    }
}

impl fmt::Display for MidiNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range() {
        assert!(MidiNumber::new(0).is_some());
        assert!(MidiNumber::new(127).is_some());
        assert!(MidiNumber::new(128).is_none());
        assert!(MidiNumber::try_from(-1i64).is_err());
        assert_eq!(
            MidiNumber::try_from(300i64),
            Err(IdentifierError::MidiOutOfRange(300))
        );
    }

    #[test]
    fn test_middle_c() {
        let c4 = MidiNumber::MIDDLE_C;
        assert_eq!(c4.pitch_class(), PitchClass::C);
        assert_eq!(c4.octave(), 4);
        assert_eq!(MidiNumber::from_pitch(PitchClass::C, 4), Some(c4));
    }

    #[test]
    fn test_from_pitch_bounds() {
        assert_eq!(MidiNumber::from_pitch(PitchClass::C, -1).map(u8::from), Some(0));
        assert_eq!(MidiNumber::from_pitch(PitchClass::G, 9).map(u8::from), Some(127));
        assert_eq!(MidiNumber::from_pitch(PitchClass::GSharp, 9), None);
        assert_eq!(MidiNumber::from_pitch(PitchClass::B, -2), None);
    }

    #[test]
    fn test_all_covers_table() {
        assert_eq!(MidiNumber::all().count(), MidiNumber::COUNT);
    }

    #[test]
    fn test_serde_validates() {
        let midi: MidiNumber = serde_json::from_str("61").unwrap();
        assert_eq!(midi.value(), 61);
        assert!(serde_json::from_str::<MidiNumber>("128").is_err());
        assert_eq!(serde_json::to_string(&midi).unwrap(), "61");
    }
}
