use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use kira::sound::PlaybackState;
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle};
use kira::{AudioManager, AudioManagerSettings, Decibels, Tween};

use crate::backend::{AudioBackend, ClipId, OutputId};

/// Quietest level sent to kira; anything below is treated as silence.
const SILENCE_DB: f32 = -60.0;

/// Convert a linear gain to kira's decibel volume.
fn gain_to_decibels(gain: f32) -> Decibels {
    Decibels((20.0 * gain.max(0.0).log10()).max(SILENCE_DB))
}

fn immediate() -> Tween {
    Tween {
        duration: std::time::Duration::ZERO,
        ..Default::default()
    }
}

/// Audio backend backed by kira for low-latency playback.
pub struct KiraAudioBackend {
    manager: AudioManager,
    /// Loaded sound data keyed by ClipId.
    clips: HashMap<u32, StaticSoundData>,
    /// Live playback handles keyed by OutputId.
    outputs: HashMap<u64, StaticSoundHandle>,
    next_clip: u32,
    next_output: u64,
}

impl KiraAudioBackend {
    /// Create a new backend on the default output device.
    pub fn new() -> Result<Self> {
        let manager = AudioManager::new(AudioManagerSettings::default())
            .context("Failed to create audio manager")?;
        Ok(Self {
            manager,
            clips: HashMap::new(),
            outputs: HashMap::new(),
            next_clip: 1,
            next_output: 1,
        })
    }
}

impl AudioBackend for KiraAudioBackend {
    fn load_clip(&mut self, path: &Path) -> Result<ClipId> {
        let data = StaticSoundData::from_file(path)
            .with_context(|| format!("Failed to load clip: {}", path.display()))?;
        let id = self.next_clip;
        self.next_clip += 1;
        self.clips.insert(id, data);
        Ok(ClipId(id))
    }

    fn play(&mut self, clip: ClipId, gain: f32) -> Result<OutputId> {
        let data = self
            .clips
            .get(&clip.0)
            .ok_or_else(|| anyhow!("Clip not found: {:?}", clip))?
            .clone()
            .volume(gain_to_decibels(gain));
        let handle = self
            .manager
            .play(data)
            .map_err(|e| anyhow!("Failed to play clip: {e}"))?;
        let id = self.next_output;
        self.next_output += 1;
        self.outputs.insert(id, handle);
        Ok(OutputId(id))
    }

    fn set_gain(&mut self, output: OutputId, gain: f32) {
        if let Some(handle) = self.outputs.get_mut(&output.0) {
            handle.set_volume(gain_to_decibels(gain), Tween::default());
        }
    }

    fn stop(&mut self, output: OutputId) {
        if let Some(mut handle) = self.outputs.remove(&output.0) {
            handle.stop(immediate());
        }
    }

    fn is_playing(&self, output: OutputId) -> bool {
        self.outputs
            .get(&output.0)
            .is_some_and(|h| h.state() != PlaybackState::Stopped)
    }

    fn update(&mut self, _dt: f64) {
        self.outputs
            .retain(|_, h| h.state() != PlaybackState::Stopped);
    }
}
