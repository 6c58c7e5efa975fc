use std::collections::{HashMap, VecDeque};
use std::path::Path;

use log::{debug, info};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

use crate::error::MidiLoadError;
use crate::tempo::TempoMap;

/// Channel event kinds the playback pipeline cares about.
///
/// A note-on with velocity 0 is reported as [`EventKind::NoteOff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    NoteOn { key: u8, velocity: u8 },
    NoteOff { key: u8 },
    ControlChange { controller: u8, value: u8 },
}

/// A channel event at an absolute position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEvent {
    pub tick: u64,
    /// Seconds from the start of the file.
    pub time: f64,
    pub channel: u8,
    pub kind: EventKind,
}

/// A note-on paired with its note-off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteSpan {
    pub key: u8,
    pub channel: u8,
    pub velocity: u8,
    pub start_tick: u64,
    pub end_tick: u64,
    /// Seconds from the start of the file.
    pub start: f64,
    /// Length in seconds.
    pub length: f64,
}

/// All channel events of a file merged into one ordered stream, with tick
/// positions already converted to seconds, and the notes found in it.
#[derive(Debug, Clone, Default)]
pub struct MidiTimeline {
    events: Vec<TimedEvent>,
    notes: Vec<NoteSpan>,
    /// (key, start tick) -> length of the first note starting there.
    lengths: HashMap<(u8, u64), f64>,
}

impl MidiTimeline {
    /// Assemble a timeline from events and notes that are already timed.
    pub fn from_parts(events: Vec<TimedEvent>, notes: Vec<NoteSpan>) -> Self {
        let mut lengths = HashMap::new();
        for note in &notes {
            lengths
                .entry((note.key, note.start_tick))
                .or_insert(note.length);
        }
        Self {
            events,
            notes,
            lengths,
        }
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, MidiLoadError> {
        let smf = Smf::parse(bytes).map_err(|e| MidiLoadError::Parse(e.to_string()))?;
        Ok(Self::from_smf(&smf))
    }

    pub fn from_smf(smf: &Smf) -> Self {
        let mut raw: Vec<(u64, u8, EventKind)> = Vec::new();
        let mut tempo_changes: Vec<(u64, u32)> = Vec::new();

        for track in &smf.tracks {
            let mut tick: u64 = 0;
            for event in track {
                tick += u64::from(event.delta.as_int());
                match event.kind {
                    TrackEventKind::Midi { channel, message } => {
                        if let Some(kind) = channel_event(message) {
                            raw.push((tick, channel.as_int(), kind));
                        }
                    }
                    TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => {
                        tempo_changes.push((tick, tempo.as_int()));
                    }
                    _ => {}
                }
            }
        }
        // Stable: events on the same tick keep track order, then file order.
        raw.sort_by_key(|&(tick, _, _)| tick);

        let tempo = match smf.header.timing {
            Timing::Metrical(ticks_per_beat) => {
                TempoMap::metrical(ticks_per_beat.as_int(), tempo_changes)
            }
            Timing::Timecode(fps, subframes) => TempoMap::timecode(fps.as_f32(), subframes),
        };

        let events: Vec<TimedEvent> = raw
            .into_iter()
            .map(|(tick, channel, kind)| TimedEvent {
                tick,
                time: tempo.seconds_at(tick),
                channel,
                kind,
            })
            .collect();
        let notes = pair_notes(&events, &tempo);

        Self::from_parts(events, notes)
    }

    /// Events in playback order.
    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    /// Completed notes, ordered by start tick.
    pub fn notes(&self) -> &[NoteSpan] {
        &self.notes
    }

    /// Length in seconds of the note on `key` starting at `start_tick`.
    pub fn note_length(&self, key: u8, start_tick: u64) -> Option<f64> {
        self.lengths.get(&(key, start_tick)).copied()
    }

    /// Time of the last event, in seconds.
    pub fn duration(&self) -> f64 {
        self.events.last().map_or(0.0, |e| e.time)
    }
}

/// Read and convert a Standard MIDI File.
///
/// A missing file fails with [`MidiLoadError::FileNotFound`] before anything
/// is read.
pub fn load_timeline<P: AsRef<Path>>(path: P) -> Result<MidiTimeline, MidiLoadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MidiLoadError::FileNotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|source| MidiLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let timeline = MidiTimeline::parse(&bytes)?;
    info!(
        "Loaded {}: {} events, {} notes, {:.2}s",
        path.display(),
        timeline.events.len(),
        timeline.notes.len(),
        timeline.duration()
    );
    Ok(timeline)
}

fn channel_event(message: MidiMessage) -> Option<EventKind> {
    match message {
        MidiMessage::NoteOn { key, vel } if vel.as_int() == 0 => Some(EventKind::NoteOff {
            key: key.as_int(),
        }),
        MidiMessage::NoteOn { key, vel } => Some(EventKind::NoteOn {
            key: key.as_int(),
            velocity: vel.as_int(),
        }),
        MidiMessage::NoteOff { key, .. } => Some(EventKind::NoteOff { key: key.as_int() }),
        MidiMessage::Controller { controller, value } => Some(EventKind::ControlChange {
            controller: controller.as_int(),
            value: value.as_int(),
        }),
        _ => None,
    }
}

/// Pair each note-on with the first following note-off of the same channel
/// and key. Overlapping notes on one key close in the order they opened.
fn pair_notes(events: &[TimedEvent], tempo: &TempoMap) -> Vec<NoteSpan> {
    let mut open: HashMap<(u8, u8), VecDeque<(u64, u8)>> = HashMap::new();
    let mut notes = Vec::new();

    for event in events {
        match event.kind {
            EventKind::NoteOn { key, velocity } => {
                open.entry((event.channel, key))
                    .or_default()
                    .push_back((event.tick, velocity));
            }
            EventKind::NoteOff { key } => {
                let Some((start_tick, velocity)) = open
                    .get_mut(&(event.channel, key))
                    .and_then(|queue| queue.pop_front())
                else {
                    continue;
                };
                notes.push(NoteSpan {
                    key,
                    channel: event.channel,
                    velocity,
                    start_tick,
                    end_tick: event.tick,
                    start: tempo.seconds_at(start_tick),
                    length: tempo.span_seconds(start_tick, event.tick),
                });
            }
            EventKind::ControlChange { .. } => {}
        }
    }

    let unterminated: usize = open.values().map(VecDeque::len).sum();
    if unterminated > 0 {
        debug!("{unterminated} notes have no note-off and were left unpaired");
    }

    notes.sort_by_key(|n| n.start_tick);
    notes
}
