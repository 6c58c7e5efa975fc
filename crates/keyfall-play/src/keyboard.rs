use std::collections::HashMap;

use keyfall_audio::{AudioBackend, VoicePool};
use keyfall_types::MidiNumber;
use log::debug;

use crate::importer::SustainPedal;
use crate::key_registry::KeyRegistry;
use crate::playfield::Trigger;
use crate::timer::{TaskId, TaskQueue};

/// The playable keyboard: keys, the voices they sound on, and the timed
/// release of scheduled key presses.
pub struct VirtualKeyboard<A: AudioBackend> {
    registry: KeyRegistry,
    pool: VoicePool<A>,
    /// Keys to release, keyed by keyboard time.
    releases: TaskQueue<MidiNumber>,
    /// The one pending release per key; a new press cancels it.
    pending: HashMap<MidiNumber, TaskId>,
    clock: f64,
    sustain_pedal: bool,
    notes_played: u64,
}

impl<A: AudioBackend> VirtualKeyboard<A> {
    pub fn new(registry: KeyRegistry, pool: VoicePool<A>) -> Self {
        Self {
            registry,
            pool,
            releases: TaskQueue::new(),
            pending: HashMap::new(),
            clock: 0.0,
            sustain_pedal: false,
            notes_played: 0,
        }
    }

    /// Sound a key until its clip ends and hold it down until [`Self::stop_note`].
    pub fn play_note(&mut self, midi: MidiNumber) -> bool {
        self.start(midi, None)
    }

    /// Sound a key for `audio_duration` seconds (at least the pool's minimum
    /// hold), fading out afterwards, and release the key after
    /// `visual_duration`. The two timers are independent.
    pub fn play_note_with_visual_duration(
        &mut self,
        midi: MidiNumber,
        audio_duration: f64,
        visual_duration: f64,
    ) -> bool {
        if !self.start(midi, Some(audio_duration)) {
            return false;
        }
        let task = self.releases.schedule(self.clock + visual_duration, midi);
        self.pending.insert(midi, task);
        true
    }

    /// Play a note that crossed the trigger boundary.
    pub fn handle_trigger(&mut self, trigger: &Trigger) -> bool {
        self.play_note_with_visual_duration(
            trigger.midi,
            trigger.audio_duration,
            trigger.visual_duration,
        )
    }

    fn start(&mut self, midi: MidiNumber, hold: Option<f64>) -> bool {
        let Some(key) = self.registry.lookup(midi) else {
            debug!("No playable key for MIDI note {midi}");
            return false;
        };
        if self.pool.play(key.clip, hold).is_none() {
            return false;
        }
        if let Some(task) = self.pending.remove(&midi) {
            self.releases.cancel(task);
        }
        self.registry.set_pressed(midi, true);
        self.notes_played += 1;
        true
    }

    /// Release a key. The sound keeps ringing.
    pub fn stop_note(&mut self, midi: MidiNumber) {
        self.registry.set_pressed(midi, false);
    }

    /// Fade out every voice, drop pending releases and release every key.
    pub fn stop_all_notes(&mut self) {
        self.pool.stop_all();
        self.releases.cancel_all();
        self.pending.clear();
        self.registry.clear_pressed();
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.pool.set_volume(volume);
    }

    pub fn volume(&self) -> f32 {
        self.pool.volume()
    }

    /// Advance voices and fades, then release keys whose time is up.
    pub fn update(&mut self, dt: f64) {
        self.clock += dt;
        self.pool.update(dt);
        for midi in self.releases.drain_due(self.clock) {
            self.pending.remove(&midi);
            self.registry.set_pressed(midi, false);
        }
    }

    pub fn is_sustain_pedal_on(&self) -> bool {
        self.sustain_pedal
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    pub fn pool(&self) -> &VoicePool<A> {
        &self.pool
    }

    pub fn notes_played(&self) -> u64 {
        self.notes_played
    }

    pub fn pending_releases(&self) -> usize {
        self.releases.len()
    }
}

impl<A: AudioBackend> SustainPedal for VirtualKeyboard<A> {
    fn set_sustain_pedal(&mut self, on: bool) {
        self.sustain_pedal = on;
    }
}
