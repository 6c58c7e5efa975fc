use std::path::Path;

use keyfall_audio::{AudioBackend, ClipLibrary, VoicePool};
use keyfall_midi::{MidiLoadError, MidiTimeline};
use log::{info, warn};

use crate::config::AppConfig;
use crate::key_registry::{KeyPalette, KeyRegistry};
use crate::keyboard::VirtualKeyboard;
use crate::lane::LaneMap;
use crate::layout::KeyboardLayout;
use crate::manual::{InputSource, ManualInput};
use crate::note_manager::NoteManager;

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Notes that crossed the trigger boundary.
    pub triggered: usize,
    /// Triggered notes that actually started a voice.
    pub played: usize,
    pub input_events: usize,
}

/// A playback session: the note schedule, the keyboard it plays, and live
/// input, all advanced together by [`Studio::tick`].
pub struct Studio<A: AudioBackend> {
    notes: NoteManager,
    keyboard: VirtualKeyboard<A>,
    manual: ManualInput,
}

impl<A: AudioBackend> Studio<A> {
    pub fn new(notes: NoteManager, keyboard: VirtualKeyboard<A>) -> Self {
        Self {
            notes,
            keyboard,
            manual: ManualInput::new(),
        }
    }

    /// Assemble a session from a layout and the clips loaded into `backend`.
    pub fn build(
        layout: &KeyboardLayout,
        clips: &ClipLibrary,
        backend: A,
        config: &AppConfig,
    ) -> Self {
        let registry = KeyRegistry::build(&layout.keys, clips, KeyPalette::from(&config.play));
        let lanes = LaneMap::from_layout(&layout.lanes);
        info!(
            "Studio ready: {} keys, {} lanes, {} voices",
            registry.len(),
            lanes.len(),
            config.audio.max_polyphony
        );
        let pool = VoicePool::new(backend, &config.audio);
        Self::new(
            NoteManager::new(lanes, &config.play),
            VirtualKeyboard::new(registry, pool),
        )
    }

    /// Replace the current schedule with the file at `path`.
    ///
    /// The previous session is torn down only once the file has been read,
    /// so a failed load leaves it untouched. Returns the number of notes
    /// scheduled.
    pub fn load_midi_from_path(&mut self, path: &Path) -> Result<usize, MidiLoadError> {
        let timeline = keyfall_midi::load_timeline(path).inspect_err(|e| warn!("{e}"))?;
        Ok(self.load_timeline(&timeline))
    }

    /// Tear down the current session and schedule `timeline`.
    pub fn load_timeline(&mut self, timeline: &MidiTimeline) -> usize {
        self.reset();
        self.notes.load_timeline(timeline, &mut self.keyboard)
    }

    /// Cancel pending spawns, destroy falling notes, then fade out every
    /// voice and release every key.
    pub fn reset(&mut self) {
        self.notes.cancel_all_note_tasks();
        self.notes.clear_existing_notes();
        self.keyboard.stop_all_notes();
        self.manual.clear();
    }

    /// Advance the session by `dt` seconds.
    pub fn tick<I: InputSource + ?Sized>(&mut self, dt: f64, input: &mut I) -> TickReport {
        let mut report = TickReport::default();

        self.keyboard.update(dt);
        for trigger in self.notes.update(dt) {
            report.triggered += 1;
            if self.keyboard.handle_trigger(&trigger) {
                report.played += 1;
            }
        }

        for event in input.poll_events(self.notes.clock()) {
            report.input_events += 1;
            self.manual.handle(event, &mut self.keyboard);
        }
        report
    }

    /// True once nothing is scheduled, falling or sounding.
    pub fn is_idle(&self) -> bool {
        self.notes.pending_spawns() == 0
            && self.notes.playfield().is_empty()
            && self.keyboard.pool().busy_count() == 0
    }

    pub fn notes(&self) -> &NoteManager {
        &self.notes
    }

    pub fn keyboard(&self) -> &VirtualKeyboard<A> {
        &self.keyboard
    }
}
