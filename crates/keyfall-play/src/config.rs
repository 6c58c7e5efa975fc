use std::path::Path;

use anyhow::{Context, Result};
use keyfall_audio::AudioConfig;
use keyfall_types::{Rgba, Vec2};
use serde::{Deserialize, Serialize};

/// Playfield and keyboard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayConfig {
    /// Fall speed of notes, in units per second.
    pub fall_speed: f32,
    /// Offset from a lane's position at which notes appear.
    pub spawn_offset: Vec2,
    /// A note fires its audio once its leading edge falls below this height.
    pub trigger_y: f32,
    /// Height of the hit line; notes are clipped from here down.
    pub hit_line_y: f32,
    /// Notes are destroyed this far below the hit line.
    pub despawn_margin: f32,
    pub black_key_width: f32,
    pub white_key_width: f32,
    /// Extra audio length for notes starting while the sustain pedal is down, in seconds.
    pub sustain_extension: f64,
    pub pressed_color: Rgba,
    pub white_color: Rgba,
    pub black_color: Rgba,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            fall_speed: 2.0,
            spawn_offset: Vec2::new(0.0, 5.0),
            trigger_y: -3.0,
            hit_line_y: 0.0,
            despawn_margin: 10.0,
            black_key_width: 0.6,
            white_key_width: 1.0,
            sustain_extension: 5.0,
            pressed_color: Rgba::GRAY,
            white_color: Rgba::WHITE,
            black_color: Rgba::BLACK,
        }
    }
}

impl PlayConfig {
    pub fn validate(&mut self) {
        if self.fall_speed.is_nan() || self.fall_speed <= 0.0 {
            self.fall_speed = Self::default().fall_speed;
        }
        self.despawn_margin = self.despawn_margin.max(0.0);
        self.black_key_width = self.black_key_width.max(0.0);
        self.white_key_width = self.white_key_width.max(0.0);
        self.sustain_extension = self.sustain_extension.max(0.0);
    }

    /// Seconds between a note spawning and firing its audio, for a lane at `lane_y`.
    pub fn travel_time(&self, lane_y: f32) -> f64 {
        f64::from((lane_y + self.spawn_offset.y - self.trigger_y).max(0.0) / self.fall_speed)
    }
}

/// Everything a session reads from its config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub audio: AudioConfig,
    pub play: PlayConfig,
}

impl AppConfig {
    pub fn validate(&mut self) {
        self.audio.validate();
        self.play.validate();
    }

    /// Read config from a JSON file.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let mut config: AppConfig = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.validate();
        Ok(config)
    }

    /// Write config to a JSON file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}
