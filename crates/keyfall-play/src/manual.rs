//! Live playing from a computer keyboard.

use std::collections::HashSet;

use keyfall_audio::AudioBackend;
use keyfall_types::{MidiNumber, PitchClass};
use serde::{Deserialize, Serialize};

use crate::keyboard::VirtualKeyboard;

/// Physical keys used for live playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManualKey {
    A,
    W,
    S,
    E,
    D,
    F,
    T,
    G,
    Y,
    H,
    U,
    J,
    K,
    Z,
    X,
    C,
    V,
    B,
    N,
    M,
}

impl ManualKey {
    pub const ALL: [ManualKey; 20] = [
        ManualKey::A,
        ManualKey::W,
        ManualKey::S,
        ManualKey::E,
        ManualKey::D,
        ManualKey::F,
        ManualKey::T,
        ManualKey::G,
        ManualKey::Y,
        ManualKey::H,
        ManualKey::U,
        ManualKey::J,
        ManualKey::K,
        ManualKey::Z,
        ManualKey::X,
        ManualKey::C,
        ManualKey::V,
        ManualKey::B,
        ManualKey::N,
        ManualKey::M,
    ];

    /// Note name and octave this key plays.
    ///
    /// The home row and the row above play C4 to C5 chromatically; the
    /// bottom row plays the white keys of octave 3.
    pub fn note(self) -> (PitchClass, u8) {
        match self {
            ManualKey::A => (PitchClass::C, 4),
            ManualKey::W => (PitchClass::CSharp, 4),
            ManualKey::S => (PitchClass::D, 4),
            ManualKey::E => (PitchClass::DSharp, 4),
            ManualKey::D => (PitchClass::E, 4),
            ManualKey::F => (PitchClass::F, 4),
            ManualKey::T => (PitchClass::FSharp, 4),
            ManualKey::G => (PitchClass::G, 4),
            ManualKey::Y => (PitchClass::GSharp, 4),
            ManualKey::H => (PitchClass::A, 4),
            ManualKey::U => (PitchClass::ASharp, 4),
            ManualKey::J => (PitchClass::B, 4),
            ManualKey::K => (PitchClass::C, 5),
            ManualKey::Z => (PitchClass::C, 3),
            ManualKey::X => (PitchClass::D, 3),
            ManualKey::C => (PitchClass::E, 3),
            ManualKey::V => (PitchClass::F, 3),
            ManualKey::B => (PitchClass::G, 3),
            ManualKey::N => (PitchClass::A, 3),
            ManualKey::M => (PitchClass::B, 3),
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        let key = match c.to_ascii_uppercase() {
            'A' => ManualKey::A,
            'W' => ManualKey::W,
            'S' => ManualKey::S,
            'E' => ManualKey::E,
            'D' => ManualKey::D,
            'F' => ManualKey::F,
            'T' => ManualKey::T,
            'G' => ManualKey::G,
            'Y' => ManualKey::Y,
            'H' => ManualKey::H,
            'U' => ManualKey::U,
            'J' => ManualKey::J,
            'K' => ManualKey::K,
            'Z' => ManualKey::Z,
            'X' => ManualKey::X,
            'C' => ManualKey::C,
            'V' => ManualKey::V,
            'B' => ManualKey::B,
            'N' => ManualKey::N,
            'M' => ManualKey::M,
            _ => return None,
        };
        Some(key)
    }
}

/// A key going down or up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManualEvent {
    Down(ManualKey),
    Up(ManualKey),
}

/// Abstraction over live input devices.
/// Implementations: ScriptedInput (tests, demos).
pub trait InputSource {
    /// Events that happened up to `now` (seconds) since the last call.
    fn poll_events(&mut self, now: f64) -> Vec<ManualEvent>;
}

/// Replays canned events at fixed times.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    events: Vec<(f64, ManualEvent)>,
    index: usize,
}

impl ScriptedInput {
    pub fn new(mut events: Vec<(f64, ManualEvent)>) -> Self {
        events.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { events, index: 0 }
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.events.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll_events(&mut self, now: f64) -> Vec<ManualEvent> {
        let start = self.index;
        while self.index < self.events.len() && self.events[self.index].0 <= now {
            self.index += 1;
        }
        self.events[start..self.index]
            .iter()
            .map(|&(_, event)| event)
            .collect()
    }
}

/// Turns key events into note-on/note-off on a [`VirtualKeyboard`].
///
/// A key that is already down ignores repeated `Down` events.
#[derive(Debug, Default)]
pub struct ManualInput {
    held: HashSet<ManualKey>,
}

impl ManualInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event. Returns the MIDI number it resolved to, if any.
    pub fn handle<A: AudioBackend>(
        &mut self,
        event: ManualEvent,
        keyboard: &mut VirtualKeyboard<A>,
    ) -> Option<MidiNumber> {
        let (key, down) = match event {
            ManualEvent::Down(key) => (key, true),
            ManualEvent::Up(key) => (key, false),
        };
        let (pitch, octave) = key.note();
        let midi = keyboard.registry().midi_for(pitch, octave)?;

        if down {
            if self.held.insert(key) {
                keyboard.play_note(midi);
            }
        } else {
            self.held.remove(&key);
            keyboard.stop_note(midi);
        }
        Some(midi)
    }

    /// Forget held keys, e.g. after the keyboard was reset.
    pub fn clear(&mut self) {
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayConfig;
    use crate::key_registry::{KeyPalette, KeyRegistry};
    use crate::layout::KeyboardLayout;
    use keyfall_audio::{AudioConfig, ClipLibrary, SilentBackend, VoicePool};
    use keyfall_types::KeyIdentifier;

    fn keyboard() -> VirtualKeyboard<SilentBackend> {
        let layout = KeyboardLayout::piano(KeyboardLayout::PIANO_RANGE);
        let mut backend = SilentBackend::default();
        let mut clips = ClipLibrary::new();
        for key in &layout.keys {
            let id = KeyIdentifier::parse(key).unwrap();
            let clip_name = format!("{}{}_{}", id.name, id.octave, id.midi);
            clips.insert(&clip_name, backend.add_clip(2.0));
        }
        let registry = KeyRegistry::build(
            &layout.keys,
            &clips,
            KeyPalette::from(&PlayConfig::default()),
        );
        VirtualKeyboard::new(registry, VoicePool::new(backend, &AudioConfig::default()))
    }

    #[test]
    fn test_key_map_spans_two_octaves() {
        let kb = keyboard();
        let notes: Vec<u8> = ManualKey::ALL
            .iter()
            .map(|key| {
                let (pitch, octave) = key.note();
                kb.registry().midi_for(pitch, octave).unwrap().value()
            })
            .collect();
        assert_eq!(&notes[..13], &[60, 61, 62, 63, 64, 65, 66, 67, 68, 69, 70, 71, 72]);
        assert_eq!(&notes[13..], &[48, 50, 52, 53, 55, 57, 59]);
    }

    #[test]
    fn test_down_plays_up_releases() {
        let mut kb = keyboard();
        let mut input = ManualInput::new();

        let midi = input.handle(ManualEvent::Down(ManualKey::W), &mut kb);
        assert_eq!(midi.map(|m| m.value()), Some(61));
        assert!(kb.registry().is_pressed(MidiNumber::new(61).unwrap()));

        // Auto-repeat while held does not retrigger.
        input.handle(ManualEvent::Down(ManualKey::W), &mut kb);
        assert_eq!(kb.notes_played(), 1);

        input.handle(ManualEvent::Up(ManualKey::W), &mut kb);
        assert!(!kb.registry().is_pressed(MidiNumber::new(61).unwrap()));

        input.handle(ManualEvent::Down(ManualKey::W), &mut kb);
        assert_eq!(kb.notes_played(), 2);
    }

    #[test]
    fn test_missing_key_is_ignored() {
        let mut kb = keyboard();
        // No clips, so the registry has no keys.
        let registry = KeyRegistry::build(
            ["White_C4_60"],
            &ClipLibrary::new(),
            KeyPalette::from(&PlayConfig::default()),
        );
        assert!(registry.is_empty());
        let mut input = ManualInput::new();
        let mut empty = VirtualKeyboard::new(
            registry,
            VoicePool::new(SilentBackend::default(), &AudioConfig::default()),
        );
        assert_eq!(input.handle(ManualEvent::Down(ManualKey::A), &mut empty), None);
        assert!(input.handle(ManualEvent::Down(ManualKey::A), &mut kb).is_some());
    }

    #[test]
    fn test_from_char() {
        assert_eq!(ManualKey::from_char('a'), Some(ManualKey::A));
        assert_eq!(ManualKey::from_char('M'), Some(ManualKey::M));
        assert_eq!(ManualKey::from_char('q'), None);
    }

    #[test]
    fn test_scripted_input_replays_in_time_order() {
        let mut input = ScriptedInput::new(vec![
            (1.0, ManualEvent::Up(ManualKey::A)),
            (0.5, ManualEvent::Down(ManualKey::A)),
        ]);
        assert!(input.poll_events(0.25).is_empty());
        assert_eq!(input.poll_events(0.5), vec![ManualEvent::Down(ManualKey::A)]);
        assert_eq!(input.poll_events(2.0), vec![ManualEvent::Up(ManualKey::A)]);
        assert!(input.is_finished());
    }
}
