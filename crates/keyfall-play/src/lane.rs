use std::collections::HashMap;

use keyfall_types::{KeyColor, LaneIdentifier, MidiNumber, Vec2};
use log::debug;

use crate::config::PlayConfig;
use crate::layout::LaneDef;

/// A spatial track notes of one MIDI number fall along.
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub name: String,
    pub position: Vec2,
    pub color: KeyColor,
}

impl Lane {
    /// Width of the notes falling in this lane.
    pub fn note_width(&self, config: &PlayConfig) -> f32 {
        match self.color {
            KeyColor::Black => config.black_key_width,
            KeyColor::White => config.white_key_width,
        }
    }
}

/// MIDI number -> lane, built once from the layout.
#[derive(Debug, Clone, Default)]
pub struct LaneMap {
    lanes: HashMap<MidiNumber, Lane>,
}

impl LaneMap {
    /// Map every lane whose name parses. Later lanes replace earlier ones
    /// with the same MIDI number.
    pub fn from_layout(lanes: &[LaneDef]) -> Self {
        let mut map = Self::default();
        for def in lanes {
            match LaneIdentifier::parse(&def.name) {
                Ok(id) => {
                    map.lanes.insert(
                        id.midi,
                        Lane {
                            name: def.name.clone(),
                            position: def.position,
                            color: id.color,
                        },
                    );
                }
                Err(e) => debug!("Ignoring lane {:?}: {e}", def.name),
            }
        }
        map
    }

    pub fn get(&self, midi: MidiNumber) -> Option<&Lane> {
        self.lanes.get(&midi)
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}
