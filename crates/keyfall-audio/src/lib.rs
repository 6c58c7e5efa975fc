//! Audio subsystem.
//!
//! This module provides:
//! - [`AudioBackend`]: the seam between the voice pool and a sound output
//! - [`KiraAudioBackend`]: real-time playback through kira
//! - [`SilentBackend`]: clock-driven backend for headless runs and tests
//! - [`ClipLibrary`]: clips loaded from a directory, indexed by name
//! - [`VoicePool`]: fixed-size polyphony with round-robin stealing and fades
//! - [`AudioConfig`]: configuration for audio settings

mod audio_config;
mod backend;
mod clip_library;
mod fade;
mod kira_backend;
mod silent_backend;
mod voice_pool;

pub use audio_config::AudioConfig;
pub use backend::{AudioBackend, ClipId, OutputId};
pub use clip_library::ClipLibrary;
pub use fade::Fade;
pub use kira_backend::KiraAudioBackend;
pub use silent_backend::SilentBackend;
pub use voice_pool::{VoiceId, VoicePool};
