use std::collections::HashMap;
use std::path::Path;

use anyhow::{Result, anyhow};

use crate::backend::{AudioBackend, ClipId, OutputId};

#[derive(Debug, Clone)]
struct SilentOutput {
    gain: f32,
    elapsed: f64,
    length: f64,
    stopped: bool,
}

/// Backend that produces no sound but tracks every output on its own clock.
///
/// An output stops playing once its clip length has elapsed, so voice
/// allocation behaves exactly as it would on a device. Used for headless
/// simulation and throughout the tests.
#[derive(Debug, Clone)]
pub struct SilentBackend {
    default_length: f64,
    clip_lengths: Vec<f64>,
    outputs: HashMap<u64, SilentOutput>,
    next_output: u64,
    /// Every `play` call in order: (output, clip, gain).
    pub played: Vec<(OutputId, ClipId, f32)>,
    /// Every output stopped through `stop`, in order.
    pub stopped: Vec<OutputId>,
}

impl SilentBackend {
    /// Clips loaded from files are given `default_length` seconds.
    pub fn new(default_length: f64) -> Self {
        Self {
            default_length,
            clip_lengths: Vec::new(),
            outputs: HashMap::new(),
            next_output: 1,
            played: Vec::new(),
            stopped: Vec::new(),
        }
    }

    /// Register a clip of the given length without touching the filesystem.
    pub fn add_clip(&mut self, length: f64) -> ClipId {
        self.clip_lengths.push(length);
        ClipId(self.clip_lengths.len() as u32 - 1)
    }

    /// Current gain of a live output.
    pub fn gain(&self, output: OutputId) -> Option<f32> {
        self.outputs
            .get(&output.0)
            .filter(|o| !o.stopped)
            .map(|o| o.gain)
    }

    pub fn playing_count(&self) -> usize {
        self.outputs
            .keys()
            .filter(|&&id| self.is_playing(OutputId(id)))
            .count()
    }
}

impl Default for SilentBackend {
    fn default() -> Self {
        Self::new(4.0)
    }
}

impl AudioBackend for SilentBackend {
    fn load_clip(&mut self, path: &Path) -> Result<ClipId> {
        if !path.is_file() {
            return Err(anyhow!("Clip file not found: {}", path.display()));
        }
        Ok(self.add_clip(self.default_length))
    }

    fn play(&mut self, clip: ClipId, gain: f32) -> Result<OutputId> {
        let length = *self
            .clip_lengths
            .get(clip.0 as usize)
            .ok_or_else(|| anyhow!("Clip not found: {:?}", clip))?;
        let id = OutputId(self.next_output);
        self.next_output += 1;
        self.outputs.insert(
            id.0,
            SilentOutput {
                gain,
                elapsed: 0.0,
                length,
                stopped: false,
            },
        );
        self.played.push((id, clip, gain));
        Ok(id)
    }

    fn set_gain(&mut self, output: OutputId, gain: f32) {
        if let Some(o) = self.outputs.get_mut(&output.0) {
            o.gain = gain;
        }
    }

    fn stop(&mut self, output: OutputId) {
        if let Some(o) = self.outputs.get_mut(&output.0) {
            if !o.stopped {
                o.stopped = true;
                self.stopped.push(output);
            }
        }
    }

    fn is_playing(&self, output: OutputId) -> bool {
        self.outputs
            .get(&output.0)
            .is_some_and(|o| !o.stopped && o.elapsed < o.length)
    }

    fn update(&mut self, dt: f64) {
        for o in self.outputs.values_mut() {
            o.elapsed += dt;
        }
    }
}
