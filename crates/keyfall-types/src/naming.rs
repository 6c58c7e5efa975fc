//! The `<Color>_<Label><Octave>_<Midi>` naming convention shared by key
//! buttons and lanes, and the `<Label><Octave>_<Midi>` clip convention.

use serde::{Deserialize, Serialize};

use crate::error::IdentifierError;
use crate::midi_number::MidiNumber;
use crate::pitch::PitchClass;

/// Idle color class of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyColor {
    White,
    Black,
}

impl KeyColor {
    /// A color field containing `black` in any case is black, anything else white.
    pub fn from_field(field: &str) -> Self {
        if field.to_lowercase().contains("black") {
            KeyColor::Black
        } else {
            KeyColor::White
        }
    }

    pub fn is_black(self) -> bool {
        self == KeyColor::Black
    }

    /// Field spelling used when generating identifiers.
    pub fn field(self) -> &'static str {
        match self {
            KeyColor::White => "White",
            KeyColor::Black => "Black",
        }
    }
}

/// A fully parsed key identifier such as `Black_Cs4_61`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyIdentifier {
    pub color: KeyColor,
    /// Note label without octave, as written (`Cs`, `C#`, `Db`, ...).
    pub name: String,
    pub octave: u8,
    pub midi: MidiNumber,
}

impl KeyIdentifier {
    pub fn parse(identifier: &str) -> Result<Self, IdentifierError> {
        let [color, label, midi] = split_fields(identifier)?;
        let midi = parse_midi_field(midi)?;

        // Octave is the last digit in the label; everything before it is the name.
        let (index, digit) = label
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_ascii_digit())
            .ok_or_else(|| IdentifierError::MissingOctave(label.to_string()))?;
        let octave = digit.to_digit(10).unwrap_or_default() as u8;

        Ok(Self {
            color: KeyColor::from_field(color),
            name: label[..index].to_string(),
            octave,
            midi,
        })
    }

    /// Build the canonical identifier for a MIDI number, e.g. `Black_Cs4_61`.
    pub fn canonical(midi: MidiNumber) -> String {
        let pitch = midi.pitch_class();
        let color = if pitch.is_black() {
            KeyColor::Black
        } else {
            KeyColor::White
        };
        format!(
            "{}_{}{}_{}",
            color.field(),
            pitch.identifier_name(),
            midi.octave(),
            midi
        )
    }

    pub fn pitch_class(&self) -> Option<PitchClass> {
        PitchClass::parse_label(&self.name)
    }

    /// The three clip names this key may be recorded under, in match order:
    /// as written, with `s` spelled `#`, and as the flat equivalent.
    pub fn clip_name_candidates(&self) -> [String; 3] {
        let suffix = format!("{}_{}", self.octave, self.midi);
        [
            format!("{}{suffix}", self.name),
            format!("{}{suffix}", self.name.replace('s', "#")),
            format!("{}{suffix}", sharp_to_flat(&self.name)),
        ]
    }

    /// Return the first of `clip_names` matching a candidate spelling,
    /// compared case-insensitively.
    pub fn find_clip<'a, I>(&self, clip_names: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        self.clip_name_candidates().iter().find_map(|candidate| {
            clip_names
                .clone()
                .into_iter()
                .find(|name| name.eq_ignore_ascii_case(candidate))
        })
    }
}

/// A lane name such as `White_C4_60`; only the MIDI field has to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneIdentifier {
    pub color: KeyColor,
    pub midi: MidiNumber,
}

impl LaneIdentifier {
    pub fn parse(name: &str) -> Result<Self, IdentifierError> {
        let [color, _, midi] = split_fields(name)?;
        Ok(Self {
            // Lanes are black only when explicitly prefixed `Black_`.
            color: if color == "Black" {
                KeyColor::Black
            } else {
                KeyColor::White
            },
            midi: parse_midi_field(midi)?,
        })
    }
}

/// Rewrite a sharp label to its flat equivalent (`C#`/`Cs` -> `Db`).
/// Labels outside the five sharps are returned unchanged.
pub fn sharp_to_flat(name: &str) -> String {
    match name.replace('#', "s").to_uppercase().as_str() {
        "CS" => "Db".to_string(),
        "DS" => "Eb".to_string(),
        "FS" => "Gb".to_string(),
        "GS" => "Ab".to_string(),
        "AS" => "Bb".to_string(),
        _ => name.to_string(),
    }
}

fn split_fields(identifier: &str) -> Result<[&str; 3], IdentifierError> {
    let parts: Vec<&str> = identifier.split('_').collect();
    match parts.as_slice() {
        [a, b, c] => Ok([*a, *b, *c]),
        _ => Err(IdentifierError::FieldCount {
            identifier: identifier.to_string(),
            found: parts.len(),
        }),
    }
}

fn parse_midi_field(field: &str) -> Result<MidiNumber, IdentifierError> {
    let value: i64 = field
        .trim()
        .parse()
        .map_err(|_| IdentifierError::InvalidMidiNumber(field.to_string()))?;
    MidiNumber::try_from(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn midi(n: u8) -> MidiNumber {
        MidiNumber::new(n).unwrap()
    }

    #[test]
    fn test_parse_white_key() {
        let id = KeyIdentifier::parse("White_C4_60").unwrap();
        assert_eq!(id.color, KeyColor::White);
        assert_eq!(id.name, "C");
        assert_eq!(id.octave, 4);
        assert_eq!(id.midi, midi(60));
        assert_eq!(id.pitch_class(), Some(PitchClass::C));
    }

    #[test]
    fn test_parse_black_key_any_case() {
        let id = KeyIdentifier::parse("key-BLACK_Cs4_61").unwrap();
        assert_eq!(id.color, KeyColor::Black);
        assert_eq!(id.name, "Cs");
        assert_eq!(id.pitch_class(), Some(PitchClass::CSharp));
    }

    #[test]
    fn test_octave_is_last_digit() {
        let id = KeyIdentifier::parse("White_A0_21").unwrap();
        assert_eq!(id.name, "A");
        assert_eq!(id.octave, 0);
    }

    #[test]
    fn test_malformed_identifiers() {
        assert!(matches!(
            KeyIdentifier::parse("White_C4"),
            Err(IdentifierError::FieldCount { found: 2, .. })
        ));
        assert!(matches!(
            KeyIdentifier::parse("White_C4_sixty"),
            Err(IdentifierError::InvalidMidiNumber(_))
        ));
        assert!(matches!(
            KeyIdentifier::parse("White_C_60"),
            Err(IdentifierError::MissingOctave(_))
        ));
        assert!(matches!(
            KeyIdentifier::parse("White_C4_200"),
            Err(IdentifierError::MidiOutOfRange(200))
        ));
    }

    #[test]
    fn test_clip_candidates() {
        let id = KeyIdentifier::parse("Black_Cs4_61").unwrap();
        assert_eq!(
            id.clip_name_candidates(),
            ["Cs4_61".to_string(), "C#4_61".to_string(), "Db4_61".to_string()]
        );
    }

    #[test]
    fn test_find_clip_prefers_first_candidate() {
        let id = KeyIdentifier::parse("Black_Cs4_61").unwrap();
        let clips = ["db4_61", "cs4_61"];
        assert_eq!(id.find_clip(clips.iter().copied()), Some("cs4_61"));
    }

    #[test]
    fn test_find_clip_flat_spelling() {
        let id = KeyIdentifier::parse("Black_As3_58").unwrap();
        let clips = ["C4_60", "BB3_58"];
        assert_eq!(id.find_clip(clips.iter().copied()), Some("BB3_58"));
    }

    #[test]
    fn test_find_clip_none() {
        let id = KeyIdentifier::parse("White_D4_62").unwrap();
        let clips = ["C4_60"];
        assert_eq!(id.find_clip(clips.iter().copied()), None);
    }

    #[test]
    fn test_sharp_to_flat() {
        assert_eq!(sharp_to_flat("C#"), "Db");
        assert_eq!(sharp_to_flat("gs"), "Ab");
        assert_eq!(sharp_to_flat("E"), "E");
    }

    #[test]
    fn test_canonical_round_trips() {
        for n in [21u8, 60, 61, 108] {
            let name = KeyIdentifier::canonical(midi(n));
            let id = KeyIdentifier::parse(&name).unwrap();
            assert_eq!(id.midi, midi(n));
            assert_eq!(id.color.is_black(), midi(n).pitch_class().is_black());
        }
        assert_eq!(KeyIdentifier::canonical(midi(61)), "Black_Cs4_61");
    }

    #[test]
    fn test_lane_identifier() {
        let lane = LaneIdentifier::parse("Black_Fs3_54").unwrap();
        assert_eq!(lane.color, KeyColor::Black);
        assert_eq!(lane.midi, midi(54));
        // Lane labels are not validated.
        assert!(LaneIdentifier::parse("White_xx_60").is_ok());
        assert!(LaneIdentifier::parse("Lane60").is_err());
    }
}
