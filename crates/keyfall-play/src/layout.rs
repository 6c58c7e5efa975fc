use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::{Context, Result};
use keyfall_types::{KeyIdentifier, MidiNumber, Vec2};
use serde::{Deserialize, Serialize};

/// A named lane and where its notes fall to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneDef {
    pub name: String,
    pub position: Vec2,
}

/// Key and lane names making up a keyboard, as stored in a layout file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardLayout {
    /// Key identifiers, e.g. `White_C4_60`.
    pub keys: Vec<String>,
    pub lanes: Vec<LaneDef>,
}

impl KeyboardLayout {
    /// Standard 88-key piano, A0 to C8.
    pub const PIANO_RANGE: RangeInclusive<u8> = 21..=108;

    /// Generate a keyboard covering `range`, one key and one lane per note.
    ///
    /// White keys sit one unit apart starting at x = 0; black keys sit halfway
    /// between their neighbours. Every lane lies on y = 0.
    pub fn piano(range: RangeInclusive<u8>) -> Self {
        let mut layout = Self::default();
        let mut white_x: f32 = 0.0;
        let mut first_white = true;

        for midi in range.filter_map(MidiNumber::new) {
            let name = KeyIdentifier::canonical(midi);
            let x = if midi.pitch_class().is_black() {
                white_x + 0.5
            } else {
                if !first_white {
                    white_x += 1.0;
                }
                first_white = false;
                white_x
            };
            layout.keys.push(name.clone());
            layout.lanes.push(LaneDef {
                name,
                position: Vec2::new(x, 0.0),
            });
        }
        layout
    }

    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout: {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse layout: {}", path.display()))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write layout: {}", path.display()))?;
        Ok(())
    }
}
