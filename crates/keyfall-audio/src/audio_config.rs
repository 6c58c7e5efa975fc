use serde::{Deserialize, Serialize};

/// Audio system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Output volume (0.0 - 1.0).
    pub volume: f32,
    /// Number of voices in the pool.
    pub max_polyphony: usize,
    /// Fade applied to a voice stolen for a new note, in seconds.
    pub steal_fade: f64,
    /// Fade applied when a note is released or everything is stopped, in seconds.
    pub stop_fade: f64,
    /// Shortest audio hold for scheduled notes, in seconds.
    pub min_hold: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: 0.8,
            max_polyphony: 32,
            steal_fade: 0.05,
            stop_fade: 0.1,
            min_hold: 1.0,
        }
    }
}

impl AudioConfig {
    pub const MAX_POLYPHONY: usize = 64;

    pub fn validate(&mut self) {
        self.volume = self.volume.clamp(0.0, 1.0);
        self.max_polyphony = self.max_polyphony.clamp(1, Self::MAX_POLYPHONY);
        self.steal_fade = self.steal_fade.max(0.0);
        self.stop_fade = self.stop_fade.max(0.0);
        self.min_hold = self.min_hold.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AudioConfig::default();
        assert!((config.volume - 0.8).abs() < f32::EPSILON);
        assert_eq!(config.max_polyphony, 32);
        assert!((config.steal_fade - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_clamps() {
        let mut config = AudioConfig {
            volume: 1.5,
            max_polyphony: 500,
            steal_fade: -1.0,
            ..Default::default()
        };
        config.validate();
        assert_eq!(config.volume, 1.0);
        assert_eq!(config.max_polyphony, 64);
        assert_eq!(config.steal_fade, 0.0);

        config.max_polyphony = 0;
        config.validate();
        assert_eq!(config.max_polyphony, 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AudioConfig = serde_json::from_str(r#"{"max_polyphony": 10}"#).unwrap();
        assert_eq!(config.max_polyphony, 10);
        assert!((config.stop_fade - 0.1).abs() < f64::EPSILON);
    }
}
