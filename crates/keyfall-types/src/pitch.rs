use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the twelve pitch classes, spelled with sharps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Semitones above C (0..=11).
    pub fn semitone(self) -> u8 {
        self as u8
    }

    pub fn from_semitone(semitone: u8) -> Self {
        Self::ALL[(semitone % 12) as usize]
    }

    /// True for the five pitch classes played on black keys.
    pub fn is_black(self) -> bool {
        matches!(
            self,
            PitchClass::CSharp
                | PitchClass::DSharp
                | PitchClass::FSharp
                | PitchClass::GSharp
                | PitchClass::ASharp
        )
    }

    /// Parse a note label without octave.
    ///
    /// Accepts a letter `A`-`G` (any case) followed by nothing, a sharp
    /// (`#` or the letter `s`) or a flat (`b`). `Cs`, `C#` and `Db` all
    /// parse to [`PitchClass::CSharp`].
    pub fn parse_label(label: &str) -> Option<Self> {
        let mut chars = label.chars();
        let natural = match chars.next()?.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };
        let shift: i8 = match chars.as_str() {
            "" => 0,
            "#" | "s" | "S" => 1,
            "b" => -1,
            _ => return None,
        };
        Some(Self::from_semitone((natural + shift).rem_euclid(12) as u8))
    }

    /// Sharp spelling, e.g. `C#`.
    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }

    /// Spelling used in asset identifiers, where `#` is written as `s`.
    pub fn identifier_name(self) -> String {
        self.name().replace('#', "s")
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
