use log::{debug, warn};

use crate::audio_config::AudioConfig;
use crate::backend::{AudioBackend, ClipId, OutputId};
use crate::fade::Fade;

/// Index of a voice inside its pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceId(pub usize);

/// The note a voice is currently assigned.
#[derive(Debug, Clone, Copy)]
struct Playback {
    output: OutputId,
    clip: ClipId,
    /// Pool time at which the note starts fading out, if held for a fixed time.
    release_at: Option<f64>,
}

/// A previous output still fading out after a steal or release.
#[derive(Debug, Clone, Copy)]
struct Tail {
    output: OutputId,
    fade: Fade,
}

#[derive(Debug, Default, Clone)]
struct Voice {
    current: Option<Playback>,
    tail: Option<Tail>,
}

/// Fixed set of playback slots shared by scheduled and live notes.
///
/// `acquire` never blocks and never fails: a free voice is used when one
/// exists, otherwise the voice at a rotating index is reclaimed and its
/// current output fades out over `steal_fade` while the new note starts.
/// Voices free themselves once their output finishes.
///
/// Each voice carries at most one note. A reclaimed or released note lives
/// on as the voice's tail for the length of its fade, so the device can
/// briefly carry two outputs per voice (`2 * max_polyphony` in total). A
/// voice holds one tail at most; stealing it again cuts the old tail.
pub struct VoicePool<A: AudioBackend> {
    backend: A,
    voices: Vec<Voice>,
    /// Next voice to reclaim when every voice is busy.
    next_steal: usize,
    volume: f32,
    steal_fade: f64,
    stop_fade: f64,
    min_hold: f64,
    /// Seconds since the pool was created, advanced by `update`.
    time: f64,
    steals: u64,
}

impl<A: AudioBackend> VoicePool<A> {
    pub fn new(backend: A, config: &AudioConfig) -> Self {
        let size = config.max_polyphony.max(1);
        Self {
            backend,
            voices: vec![Voice::default(); size],
            next_steal: 0,
            volume: config.volume.clamp(0.0, 1.0),
            steal_fade: config.steal_fade,
            stop_fade: config.stop_fade,
            min_hold: config.min_hold,
            time: 0.0,
            steals: 0,
        }
    }

    pub fn max_polyphony(&self) -> usize {
        self.voices.len()
    }

    /// A voice is busy while it, or its fading tail, is still producing sound.
    pub fn is_busy(&self, voice: VoiceId) -> bool {
        self.voices.get(voice.0).is_some_and(|v| {
            v.current.is_some_and(|p| self.backend.is_playing(p.output))
                || v.tail.is_some_and(|t| self.backend.is_playing(t.output))
        })
    }

    pub fn busy_count(&self) -> usize {
        (0..self.voices.len())
            .filter(|&i| self.is_busy(VoiceId(i)))
            .count()
    }

    /// Whether the voice has an output fading out.
    pub fn is_fading(&self, voice: VoiceId) -> bool {
        self.voices
            .get(voice.0)
            .is_some_and(|v| v.tail.is_some())
    }

    /// Clip currently assigned to a voice.
    pub fn clip(&self, voice: VoiceId) -> Option<ClipId> {
        self.voices
            .get(voice.0)
            .and_then(|v| v.current.map(|p| p.clip))
    }

    /// Output currently assigned to a voice.
    pub fn output(&self, voice: VoiceId) -> Option<OutputId> {
        self.voices
            .get(voice.0)
            .and_then(|v| v.current.map(|p| p.output))
    }

    /// Pick a voice for a new note.
    ///
    /// Returns the first idle voice. When all are busy, the voice at the
    /// round-robin index is reclaimed: its output starts a short fade and the
    /// index advances.
    pub fn acquire(&mut self) -> VoiceId {
        let voice = self.next_voice();
        self.claim(voice);
        voice
    }

    /// Play `clip` on a freshly acquired voice.
    ///
    /// With `hold`, the note fades out after `max(min_hold, hold)` seconds;
    /// without it the clip plays to its natural end. Returns `None` when the
    /// backend refuses the clip. The note is dropped and no voice is claimed.
    pub fn play(&mut self, clip: ClipId, hold: Option<f64>) -> Option<VoiceId> {
        let voice = self.next_voice();
        let output = match self.backend.play(clip, self.volume) {
            Ok(output) => output,
            Err(e) => {
                warn!("Dropping note, clip {:?} failed to play: {e:#}", clip);
                return None;
            }
        };
        self.claim(voice);
        let release_at = hold.map(|h| self.time + h.max(self.min_hold));
        self.voices[voice.0].current = Some(Playback {
            output,
            clip,
            release_at,
        });
        Some(voice)
    }

    /// The voice the next note would use, without touching any state.
    fn next_voice(&self) -> VoiceId {
        let free = (0..self.voices.len()).find(|&i| !self.is_busy(VoiceId(i)));
        VoiceId(free.unwrap_or(self.next_steal))
    }

    /// Take `voice` for a new note, stealing it if it is still sounding.
    fn claim(&mut self, voice: VoiceId) {
        if !self.is_busy(voice) {
            self.voices[voice.0] = Voice::default();
            return;
        }
        self.next_steal = (voice.0 + 1) % self.voices.len();
        self.steals += 1;
        debug!("Stealing voice {}", voice.0);
        self.fade_out(voice.0, self.steal_fade);
    }

    /// Advance the pool clock: release held notes that are due and step fades.
    pub fn update(&mut self, dt: f64) {
        self.time += dt;
        self.backend.update(dt);

        for i in 0..self.voices.len() {
            // Step fades before releasing, so a fade begins on the tick after it starts.
            if let Some(mut tail) = self.voices[i].tail {
                tail.fade.advance(dt);
                if tail.fade.is_finished() || !self.backend.is_playing(tail.output) {
                    self.backend.stop(tail.output);
                    self.voices[i].tail = None;
                } else {
                    self.backend
                        .set_gain(tail.output, self.volume * tail.fade.level());
                    self.voices[i].tail = Some(tail);
                }
            }

            if let Some(playback) = self.voices[i].current {
                if !self.backend.is_playing(playback.output) {
                    self.voices[i].current = None;
                } else if playback.release_at.is_some_and(|at| self.time >= at) {
                    self.fade_out(i, self.stop_fade);
                }
            }
        }
    }

    /// Fade out every busy voice and cancel all pending releases.
    pub fn stop_all(&mut self) {
        for i in 0..self.voices.len() {
            self.fade_out(i, self.stop_fade);
        }
    }

    /// Set the output volume, clamped to `0.0..=1.0`.
    ///
    /// Applies immediately to every output; fading outputs continue their
    /// fade from the new base.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        for voice in &self.voices {
            if let Some(playback) = voice.current {
                self.backend.set_gain(playback.output, self.volume);
            }
            if let Some(tail) = voice.tail {
                self.backend
                    .set_gain(tail.output, self.volume * tail.fade.level());
            }
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of voices reclaimed from a busy note so far.
    pub fn steal_count(&self) -> u64 {
        self.steals
    }

    pub fn backend(&self) -> &A {
        &self.backend
    }

    /// Move a voice's current output into its tail and start fading it.
    /// An older tail is cut off; a finished output is simply dropped.
    fn fade_out(&mut self, index: usize, duration: f64) {
        let Some(playback) = self.voices[index].current.take() else {
            return;
        };
        if !self.backend.is_playing(playback.output) {
            return;
        }
        if let Some(old) = self.voices[index].tail.take() {
            self.backend.stop(old.output);
        }
        self.voices[index].tail = Some(Tail {
            output: playback.output,
            fade: Fade::new(duration),
        });
    }
}
