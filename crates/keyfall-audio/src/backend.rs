use std::path::Path;

use anyhow::Result;

/// Handle for a loaded clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipId(pub u32);

/// Handle for one playing instance of a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputId(pub u64);

/// Abstraction over sound outputs.
/// Implementations: KiraAudioBackend (real-time), SilentBackend (headless, testing).
pub trait AudioBackend {
    fn load_clip(&mut self, path: &Path) -> Result<ClipId>;

    /// Start `clip` from the beginning at linear `gain` (0.0..=1.0).
    fn play(&mut self, clip: ClipId, gain: f32) -> Result<OutputId>;

    fn set_gain(&mut self, output: OutputId, gain: f32);

    /// Stop an output immediately. Unknown outputs are ignored.
    fn stop(&mut self, output: OutputId);

    /// Whether the output is still producing sound.
    fn is_playing(&self, output: OutputId) -> bool;

    /// Called once per tick with the elapsed time in seconds.
    fn update(&mut self, _dt: f64) {}
}
