/// Tempo assumed until the first tempo event: 120 BPM.
pub const DEFAULT_MICROS_PER_BEAT: u32 = 500_000;

#[derive(Debug, Clone, Copy, PartialEq)]
struct TempoSegment {
    tick: u64,
    /// Absolute time of `tick`.
    seconds: f64,
    micros_per_beat: u32,
}

#[derive(Debug, Clone, PartialEq)]
enum Timebase {
    Metrical {
        ticks_per_beat: f64,
        /// Sorted by tick; the first segment always starts at tick 0.
        segments: Vec<TempoSegment>,
    },
    Timecode {
        ticks_per_second: f64,
    },
}

/// Converts absolute ticks to seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    timebase: Timebase,
}

impl TempoMap {
    /// Build a map for a metrical file from tempo changes `(tick, micros per beat)`.
    ///
    /// Changes need not be sorted. When several share a tick, the last one wins.
    pub fn metrical(ticks_per_beat: u16, changes: impl IntoIterator<Item = (u64, u32)>) -> Self {
        let ticks_per_beat = f64::from(ticks_per_beat.max(1));
        let mut changes: Vec<(u64, u32)> = changes.into_iter().collect();
        changes.sort_by_key(|&(tick, _)| tick);

        let mut segments = vec![TempoSegment {
            tick: 0,
            seconds: 0.0,
            micros_per_beat: DEFAULT_MICROS_PER_BEAT,
        }];
        for (tick, micros_per_beat) in changes {
            let last = segments[segments.len() - 1];
            if last.tick == tick {
                if let Some(segment) = segments.last_mut() {
                    segment.micros_per_beat = micros_per_beat;
                }
                continue;
            }
            segments.push(TempoSegment {
                tick,
                seconds: segment_seconds(&last, tick, ticks_per_beat),
                micros_per_beat,
            });
        }

        Self {
            timebase: Timebase::Metrical {
                ticks_per_beat,
                segments,
            },
        }
    }

    /// Build a map for an SMPTE timecode file: `fps` frames of `subframes` ticks.
    pub fn timecode(fps: f32, subframes: u8) -> Self {
        let ticks_per_second = f64::from(fps) * f64::from(subframes.max(1));
        Self {
            timebase: Timebase::Timecode { ticks_per_second },
        }
    }

    pub fn seconds_at(&self, tick: u64) -> f64 {
        match &self.timebase {
            Timebase::Metrical {
                ticks_per_beat,
                segments,
            } => {
                let index = segments.partition_point(|s| s.tick <= tick);
                // partition_point is at least 1: segment 0 starts at tick 0.
                let segment = &segments[index.saturating_sub(1)];
                segment_seconds(segment, tick, *ticks_per_beat)
            }
            Timebase::Timecode { ticks_per_second } => {
                if *ticks_per_second > 0.0 {
                    tick as f64 / ticks_per_second
                } else {
                    0.0
                }
            }
        }
    }

    /// Length in seconds of the tick range `start..end`.
    pub fn span_seconds(&self, start: u64, end: u64) -> f64 {
        (self.seconds_at(end) - self.seconds_at(start)).max(0.0)
    }
}

fn segment_seconds(segment: &TempoSegment, tick: u64, ticks_per_beat: f64) -> f64 {
    let beats = tick.saturating_sub(segment.tick) as f64 / ticks_per_beat;
    segment.seconds + beats * f64::from(segment.micros_per_beat) / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_default_tempo() {
        let map = TempoMap::metrical(480, []);
        assert!(approx(map.seconds_at(480), 0.5));
        assert!(approx(map.seconds_at(960), 1.0));
    }

    #[test]
    fn test_tempo_change_midway() {
        // 120 BPM for one beat, then 60 BPM.
        let map = TempoMap::metrical(480, [(480, 1_000_000)]);
        assert!(approx(map.seconds_at(480), 0.5));
        assert!(approx(map.seconds_at(960), 1.5));
        assert!(approx(map.span_seconds(240, 720), 0.25 + 0.5));
    }

    #[test]
    fn test_tempo_at_zero_replaces_default() {
        let map = TempoMap::metrical(96, [(0, 250_000)]);
        assert!(approx(map.seconds_at(96), 0.25));
    }

    #[test]
    fn test_unsorted_changes() {
        let map = TempoMap::metrical(100, [(200, 1_000_000), (100, 250_000)]);
        // 100 ticks at 0.5s/beat, 100 at 0.25s/beat, then 1.0s/beat.
        assert!(approx(map.seconds_at(300), 0.5 + 0.25 + 1.0));
    }

    #[test]
    fn test_timecode() {
        let map = TempoMap::timecode(25.0, 40);
        assert!(approx(map.seconds_at(1000), 1.0));
        assert!(approx(map.span_seconds(500, 250), 0.0));
    }
}
