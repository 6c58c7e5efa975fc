use std::collections::HashMap;

use keyfall_audio::{ClipId, ClipLibrary};
use keyfall_types::{KeyColor, KeyIdentifier, MidiNumber, PitchClass, Rgba};
use log::{debug, info, warn};

use crate::config::PlayConfig;

/// Colors a key is drawn with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPalette {
    pub pressed: Rgba,
    pub white: Rgba,
    pub black: Rgba,
}

impl KeyPalette {
    pub fn idle(&self, color: KeyColor) -> Rgba {
        match color {
            KeyColor::White => self.white,
            KeyColor::Black => self.black,
        }
    }
}

impl From<&PlayConfig> for KeyPalette {
    fn from(config: &PlayConfig) -> Self {
        Self {
            pressed: config.pressed_color,
            white: config.white_color,
            black: config.black_color,
        }
    }
}

/// A playable key.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    pub midi: MidiNumber,
    /// Note label as written in the identifier (`Cs`, `Db`, ...).
    pub name: String,
    pub pitch: Option<PitchClass>,
    pub octave: u8,
    pub color: KeyColor,
    pub clip: ClipId,
    /// Clip name the key was matched to.
    pub clip_name: String,
    /// Identifier of the on-screen button.
    pub button: String,
    /// Current visual color.
    pub visual: Rgba,
}

/// Keys indexed by MIDI number, with their pressed state.
///
/// Built once from key identifiers and the available clips; afterwards only
/// pressed state and the derived colors change.
pub struct KeyRegistry {
    keys: Vec<Option<Key>>,
    pressed: Vec<bool>,
    /// (pitch, octave as written) -> key, for the manual keyboard.
    by_pitch: HashMap<(PitchClass, u8), MidiNumber>,
    palette: KeyPalette,
    len: usize,
}

impl KeyRegistry {
    /// Build the registry. Identifiers that do not parse and keys without a
    /// matching clip are skipped.
    pub fn build<I, S>(identifiers: I, clips: &ClipLibrary, palette: KeyPalette) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self {
            keys: vec![None; MidiNumber::COUNT],
            pressed: vec![false; MidiNumber::COUNT],
            by_pitch: HashMap::new(),
            palette,
            len: 0,
        };

        for identifier in identifiers {
            let identifier = identifier.as_ref();
            let parsed = match KeyIdentifier::parse(identifier) {
                Ok(parsed) => parsed,
                Err(e) => {
                    debug!("Skipping key {identifier:?}: {e}");
                    continue;
                }
            };
            let Some(clip_name) = parsed.find_clip(clips.names()) else {
                warn!("No clip matches key {identifier}, dropping it");
                continue;
            };
            let Some(clip) = clips.get(clip_name) else {
                continue;
            };
            registry.insert(identifier, parsed, clip_name.to_string(), clip);
        }

        info!("Key registry built with {} keys", registry.len);
        registry
    }

    fn insert(&mut self, button: &str, parsed: KeyIdentifier, clip_name: String, clip: ClipId) {
        let pitch = parsed.pitch_class();
        if let Some(pitch) = pitch {
            self.by_pitch
                .entry((pitch, parsed.octave))
                .or_insert(parsed.midi);
        }
        let slot = &mut self.keys[parsed.midi.index()];
        if slot.is_none() {
            self.len += 1;
        }
        *slot = Some(Key {
            midi: parsed.midi,
            name: parsed.name,
            pitch,
            octave: parsed.octave,
            color: parsed.color,
            clip,
            clip_name,
            button: button.to_string(),
            visual: self.palette.idle(parsed.color),
        });
    }

    pub fn lookup(&self, midi: MidiNumber) -> Option<&Key> {
        self.keys[midi.index()].as_ref()
    }

    /// Key for a note name and octave as written in the identifiers.
    pub fn midi_for(&self, pitch: PitchClass, octave: u8) -> Option<MidiNumber> {
        self.by_pitch.get(&(pitch, octave)).copied()
    }

    /// Record a press or release and recolor the key if it exists.
    pub fn set_pressed(&mut self, midi: MidiNumber, pressed: bool) {
        self.pressed[midi.index()] = pressed;
        let palette = self.palette;
        if let Some(key) = self.keys[midi.index()].as_mut() {
            key.visual = if pressed {
                palette.pressed
            } else {
                palette.idle(key.color)
            };
        }
    }

    pub fn is_pressed(&self, midi: MidiNumber) -> bool {
        self.pressed[midi.index()]
    }

    pub fn pressed_keys(&self) -> impl Iterator<Item = MidiNumber> + '_ {
        MidiNumber::all().filter(|&midi| self.is_pressed(midi))
    }

    /// Release every pressed key.
    pub fn clear_pressed(&mut self) {
        for midi in MidiNumber::all() {
            if self.is_pressed(midi) {
                self.set_pressed(midi, false);
            }
        }
    }

    /// Current color of a key, for a renderer.
    pub fn key_color(&self, midi: MidiNumber) -> Option<Rgba> {
        self.lookup(midi).map(|k| k.visual)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.keys.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> KeyPalette {
        KeyPalette::from(&PlayConfig::default())
    }

    fn midi(value: u8) -> MidiNumber {
        MidiNumber::new(value).unwrap()
    }

    fn library(names: &[&str]) -> ClipLibrary {
        let mut library = ClipLibrary::new();
        for (i, name) in names.iter().enumerate() {
            library.insert(name, ClipId(i as u32));
        }
        library
    }

    #[test]
    fn test_build_matches_clip_spellings() {
        let clips = library(&["C4_60", "C#4_61", "eb4_63"]);
        let registry = KeyRegistry::build(
            ["White_C4_60", "Black_Cs4_61", "Black_Ds4_63"],
            &clips,
            palette(),
        );

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.lookup(midi(60)).unwrap().clip, ClipId(0));
        assert_eq!(registry.lookup(midi(61)).unwrap().clip_name, "C#4_61");
        assert_eq!(registry.lookup(midi(63)).unwrap().clip, ClipId(2));
        assert!(registry.lookup(midi(63)).unwrap().color.is_black());
    }

    #[test]
    fn test_malformed_and_unmatched_entries_are_skipped() {
        let clips = library(&["C4_60", "D4_62"]);
        let registry = KeyRegistry::build(
            ["White_C4_60", "garbage", "White_D_62", "White_D4_x", "White_E4_64"],
            &clips,
            palette(),
        );

        assert_eq!(registry.len(), 1);
        assert!(registry.lookup(midi(60)).is_some());
        assert!(registry.lookup(midi(62)).is_none());
        assert!(registry.lookup(midi(64)).is_none());
    }

    #[test]
    fn test_pressed_state_recolors_key() {
        let clips = library(&["Cs4_61"]);
        let mut registry = KeyRegistry::build(["Black_Cs4_61"], &clips, palette());
        let key = midi(61);

        assert!(!registry.is_pressed(key));
        assert_eq!(registry.key_color(key), Some(Rgba::BLACK));

        registry.set_pressed(key, true);
        assert!(registry.is_pressed(key));
        assert_eq!(registry.key_color(key), Some(Rgba::GRAY));

        registry.set_pressed(key, false);
        assert_eq!(registry.key_color(key), Some(Rgba::BLACK));
    }

    #[test]
    fn test_unknown_key_press_is_tracked_without_visual() {
        let mut registry = KeyRegistry::build(Vec::<String>::new(), &ClipLibrary::new(), palette());
        registry.set_pressed(midi(70), true);
        assert!(registry.is_pressed(midi(70)));
        assert_eq!(registry.key_color(midi(70)), None);
    }

    #[test]
    fn test_clear_pressed() {
        let clips = library(&["C4_60", "D4_62"]);
        let mut registry = KeyRegistry::build(["White_C4_60", "White_D4_62"], &clips, palette());
        registry.set_pressed(midi(60), true);
        registry.set_pressed(midi(62), true);
        assert_eq!(registry.pressed_keys().count(), 2);

        registry.clear_pressed();
        assert_eq!(registry.pressed_keys().count(), 0);
        assert_eq!(registry.key_color(midi(60)), Some(Rgba::WHITE));
    }

    #[test]
    fn test_duplicate_midi_number_keeps_last_entry() {
        let clips = library(&["C4_60"]);
        let registry = KeyRegistry::build(["White_C4_60", "Black_C4_60"], &clips, palette());
        assert_eq!(registry.len(), 1);
        let key = registry.lookup(midi(60)).unwrap();
        assert_eq!(key.button, "Black_C4_60");
        assert!(key.color.is_black());
    }

    #[test]
    fn test_midi_for_uses_written_octave() {
        let clips = library(&["C4_60", "Db4_61"]);
        let registry = KeyRegistry::build(["White_C4_60", "Black_Db4_61"], &clips, palette());
        assert_eq!(registry.midi_for(PitchClass::C, 4), Some(midi(60)));
        assert_eq!(registry.midi_for(PitchClass::CSharp, 4), Some(midi(61)));
        assert_eq!(registry.midi_for(PitchClass::C, 5), None);
    }
}
